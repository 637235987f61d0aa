//! HTTP plumbing shared by both store implementations.

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use sfm_core::{ApiError, StoreError, StoreResult, require_non_empty};
use tracing::debug;
use url::Url;

use crate::error::Result;
use crate::options::ClientOptions;

/// REST API version requested on every call
pub const API_VERSION: &str = "5.0-preview.1";

/// Error body the service returns alongside non-success statuses
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ErrorBody {
    message: String,
    #[serde(default)]
    type_key: Option<String>,
}

/// List responses are wrapped as `{count, value}`
#[derive(Deserialize)]
#[serde(untagged)]
pub(crate) enum ListResponse<T> {
    Wrapped { value: Vec<T> },
    Bare(Vec<T>),
}

impl<T> ListResponse<T> {
    pub(crate) fn into_vec(self) -> Vec<T> {
        match self {
            Self::Wrapped { value } => value,
            Self::Bare(value) => value,
        }
    }
}

/// Authenticated client for one Azure DevOps organisation
///
/// Cheap to clone; clones share the connection pool.
#[derive(Clone)]
pub struct DevOpsClient {
    http: Client,
    base_url: Url,
    token: String,
}

impl std::fmt::Debug for DevOpsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DevOpsClient")
            .field("base_url", &self.base_url.as_str())
            .finish_non_exhaustive()
    }
}

impl DevOpsClient {
    /// Build a client from validated options.
    ///
    /// # Errors
    ///
    /// Returns a configuration error if the URL or token is missing or
    /// malformed, or an HTTP error if the TLS backend cannot be initialised.
    pub fn new(options: &ClientOptions) -> Result<Self> {
        let (base_url, token) = options.validate()?;
        let user_agent = options.user_agent();
        debug!(url = %base_url, user_agent = %user_agent, "Building Azure DevOps client");

        let http = Client::builder()
            .user_agent(user_agent)
            .timeout(options.timeout)
            .build()?;

        Ok(Self {
            http,
            base_url,
            token,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{org}/{project}/_apis/{area...}` with the API version attached
    pub(crate) fn endpoint(&self, project: &str, area: &[&str]) -> StoreResult<Url> {
        require_non_empty("args.Project", project)?;

        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|()| {
                StoreError::transport(format!("cannot build a route under {}", self.base_url))
            })?
            .pop_if_empty()
            .push(project)
            .push("_apis")
            .extend(area);
        url.query_pairs_mut().append_pair("api-version", API_VERSION);
        Ok(url)
    }

    pub(crate) fn request(&self, method: Method, url: Url) -> RequestBuilder {
        debug!(%method, %url, "Sending request");
        self.http
            .request(method, url)
            .basic_auth("", Some(&self.token))
            .header(reqwest::header::ACCEPT, "application/json")
    }

    /// Send and turn any non-success status into [`StoreError::Api`].
    pub(crate) async fn send(&self, request: RequestBuilder) -> StoreResult<Response> {
        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let text = response.text().await.unwrap_or_default();
        let error = api_error(status, &text);
        debug!(status = status.as_u16(), message = %error.message, "Request failed");
        Err(StoreError::Api(error))
    }

    /// Decode a JSON body, treating an empty body as `T::default()`.
    pub(crate) async fn json_or_default<T>(&self, response: Response) -> StoreResult<T>
    where
        T: DeserializeOwned + Default,
    {
        let text = response.text().await.map_err(transport)?;
        if text.trim().is_empty() {
            return Ok(T::default());
        }
        decode(&text)
    }

    pub(crate) async fn json<T: DeserializeOwned>(&self, response: Response) -> StoreResult<T> {
        let text = response.text().await.map_err(transport)?;
        decode(&text)
    }
}

fn decode<T: DeserializeOwned>(text: &str) -> StoreResult<T> {
    serde_json::from_str(text)
        .map_err(|e| StoreError::transport(format!("Failed to decode response: {e}")))
}

fn transport(err: reqwest::Error) -> StoreError {
    StoreError::transport(err.to_string())
}

/// Normalise a failed response to status and message
fn api_error(status: StatusCode, body: &str) -> ApiError {
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        return ApiError {
            status: status.as_u16(),
            message: parsed.message,
            type_key: parsed.type_key,
        };
    }

    let body = body.trim();
    let message = if body.is_empty() {
        status.canonical_reason().unwrap_or("no response body").to_string()
    } else {
        body.to_string()
    };
    ApiError::new(status.as_u16(), message)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn client(url: &str) -> DevOpsClient {
        DevOpsClient::new(&ClientOptions::new(url, "token")).unwrap()
    }

    #[test]
    fn endpoint_appends_project_and_area() {
        let url = client("https://dev.azure.com/acme/")
            .endpoint("My Project", &["distributedtask", "securefiles"])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "https://dev.azure.com/acme/My%20Project/_apis/distributedtask/securefiles?api-version=5.0-preview.1"
        );
    }

    #[test]
    fn endpoint_rejects_empty_project() {
        let err = client("https://dev.azure.com/acme")
            .endpoint("", &["build", "authorizedresources"])
            .unwrap_err();
        assert_eq!(err, StoreError::missing("args.Project"));
    }

    #[test]
    fn api_error_prefers_json_body() {
        let body = r#"{"$id":"1","message":"VS800075: The project with id 'x' does not exist","typeKey":"ProjectDoesNotExistException","errorCode":0}"#;
        let error = api_error(StatusCode::BAD_REQUEST, body);
        assert_eq!(error.status, 400);
        assert!(error.message.starts_with("VS800075"));
        assert_eq!(error.type_key.as_deref(), Some("ProjectDoesNotExistException"));
    }

    #[test]
    fn api_error_falls_back_to_text_or_reason() {
        assert_eq!(api_error(StatusCode::UNAUTHORIZED, "").message, "Unauthorized");
        assert_eq!(
            api_error(StatusCode::BAD_GATEWAY, "upstream down\n").message,
            "upstream down"
        );
    }

    #[test]
    fn list_response_accepts_both_shapes() {
        let wrapped: ListResponse<u8> = serde_json::from_str(r#"{"count":2,"value":[1,2]}"#).unwrap();
        let bare: ListResponse<u8> = serde_json::from_str("[3]").unwrap();
        assert_eq!(wrapped.into_vec(), vec![1, 2]);
        assert_eq!(bare.into_vec(), vec![3]);
    }
}
