//! Resource authorization endpoints: `{org}/{project}/_apis/build/authorizedresources`

use async_trait::async_trait;
use reqwest::Method;
use sfm_core::{AuthorizationFilter, AuthorizationStore, StoreResult};
use sfm_model::AuthorizationReference;

use crate::client::{DevOpsClient, ListResponse};

const AREA: [&str; 2] = ["build", "authorizedresources"];

#[async_trait]
impl AuthorizationStore for DevOpsClient {
    async fn list(
        &self,
        project: &str,
        filter: &AuthorizationFilter,
    ) -> StoreResult<Vec<AuthorizationReference>> {
        let mut url = self.endpoint(project, &AREA)?;
        {
            let mut query = url.query_pairs_mut();
            if let Some(resource_type) = &filter.resource_type {
                query.append_pair("type", resource_type);
            }
            if let Some(id) = &filter.id {
                query.append_pair("id", id);
            }
        }

        let response = self.send(self.request(Method::GET, url)).await?;
        let list: ListResponse<AuthorizationReference> = self.json(response).await?;
        Ok(list.into_vec())
    }

    async fn patch(
        &self,
        project: &str,
        references: &[AuthorizationReference],
    ) -> StoreResult<Vec<AuthorizationReference>> {
        let url = self.endpoint(project, &AREA)?;
        let response = self
            .send(self.request(Method::PATCH, url).json(references))
            .await?;
        let list: ListResponse<AuthorizationReference> = self.json(response).await?;
        Ok(list.into_vec())
    }
}
