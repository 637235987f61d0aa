//! Secure file endpoints: `{org}/{project}/_apis/distributedtask/securefiles`

use async_trait::async_trait;
use reqwest::Method;
use reqwest::header::CONTENT_TYPE;
use sfm_core::{
    GetOptions, SecureFileStore, StoreError, StoreResult, UploadRequest, require_non_empty,
};
use sfm_model::{RemoteFile, SecureFilePatch};
use url::Url;
use uuid::Uuid;

use crate::client::DevOpsClient;

const AREA: [&str; 2] = ["distributedtask", "securefiles"];

impl DevOpsClient {
    fn secure_files_url(&self, project: &str) -> StoreResult<Url> {
        self.endpoint(project, &AREA)
    }

    fn secure_file_url(&self, project: &str, file_id: Uuid) -> StoreResult<Url> {
        let id = file_id.to_string();
        self.endpoint(project, &[AREA[0], AREA[1], id.as_str()])
    }
}

#[async_trait]
impl SecureFileStore for DevOpsClient {
    async fn upload(&self, request: UploadRequest) -> StoreResult<RemoteFile> {
        require_non_empty("args.Name", &request.name)?;
        if request.content.is_empty() {
            return Err(StoreError::missing("args.Content"));
        }

        let mut url = self.secure_files_url(&request.project)?;
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("name", &request.name);
            if let Some(authorize) = request.authorize_pipelines {
                query.append_pair("authorizePipelines", if authorize { "true" } else { "false" });
            }
        }

        let response = self
            .send(
                self.request(Method::POST, url)
                    .header(CONTENT_TYPE, "application/octet-stream")
                    .body(request.content),
            )
            .await?;
        self.json(response).await
    }

    async fn get(
        &self,
        project: &str,
        file_id: Uuid,
        options: GetOptions,
    ) -> StoreResult<RemoteFile> {
        let mut url = self.secure_file_url(project, file_id)?;
        {
            let mut query = url.query_pairs_mut();
            if let Some(include) = options.include_download_ticket {
                query.append_pair("includeDownloadTicket", if include { "true" } else { "false" });
            }
            if let Some(filter) = options.action_filter {
                query.append_pair("actionFilter", filter.as_str());
            }
        }

        let response = self.send(self.request(Method::GET, url)).await?;
        self.json_or_default(response).await
    }

    async fn update(
        &self,
        project: &str,
        file_id: Uuid,
        patch: &SecureFilePatch,
    ) -> StoreResult<RemoteFile> {
        let url = self.secure_file_url(project, file_id)?;
        let response = self
            .send(self.request(Method::PATCH, url).json(patch))
            .await?;
        self.json_or_default(response).await
    }

    async fn delete(&self, project: &str, file_id: Uuid) -> StoreResult<()> {
        let url = self.secure_file_url(project, file_id)?;
        self.send(self.request(Method::DELETE, url)).await?;
        Ok(())
    }
}
