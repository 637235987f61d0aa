//! Connection options for the Azure DevOps client

use std::fmt;
use std::time::Duration;

use sfm_model::{Error as ModelError, FieldError};
use url::Url;

pub const ORG_SERVICE_URL_ENV: &str = "AZDO_ORG_SERVICE_URL";
pub const PERSONAL_ACCESS_TOKEN_ENV: &str = "AZDO_PERSONAL_ACCESS_TOKEN";

/// HTTP timeout when none is configured
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

const ORG_SERVICE_URL_FIELD: &str = "org_service_url";
const PERSONAL_ACCESS_TOKEN_FIELD: &str = "personal_access_token";

/// How to reach and authenticate against an organisation
#[derive(Clone)]
pub struct ClientOptions {
    /// e.g. `https://dev.azure.com/my-org`
    pub org_service_url: Option<String>,
    pub personal_access_token: Option<String>,
    pub timeout: Duration,
    /// Appended to the user agent, e.g. `my-pipeline/1.2`
    pub product: Option<String>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            org_service_url: None,
            personal_access_token: None,
            timeout: DEFAULT_TIMEOUT,
            product: None,
        }
    }
}

// The token must never reach logs.
impl fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientOptions")
            .field("org_service_url", &self.org_service_url)
            .field(
                "personal_access_token",
                &self.personal_access_token.as_ref().map(|_| "<redacted>"),
            )
            .field("timeout", &self.timeout)
            .field("product", &self.product)
            .finish()
    }
}

impl ClientOptions {
    pub fn new(
        org_service_url: impl Into<String>,
        personal_access_token: impl Into<String>,
    ) -> Self {
        Self {
            org_service_url: Some(org_service_url.into()),
            personal_access_token: Some(personal_access_token.into()),
            ..Self::default()
        }
    }

    /// Read the URL and token from `AZDO_ORG_SERVICE_URL` and `AZDO_PERSONAL_ACCESS_TOKEN`
    pub fn from_env() -> Self {
        Self {
            org_service_url: std::env::var(ORG_SERVICE_URL_ENV).ok(),
            personal_access_token: std::env::var(PERSONAL_ACCESS_TOKEN_ENV).ok(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_product(mut self, product: impl Into<String>) -> Self {
        self.product = Some(product.into());
        self
    }

    /// User agent sent with every request
    pub fn user_agent(&self) -> String {
        let base = format!("sfm/{}", env!("CARGO_PKG_VERSION"));
        match self.product.as_deref().map(str::trim) {
            Some(product) if !product.is_empty() => format!("{base} {product}"),
            _ => base,
        }
    }

    /// Check the options and return the parsed service URL and token.
    ///
    /// # Errors
    ///
    /// Returns a configuration error listing every missing or malformed option.
    pub fn validate(&self) -> Result<(Url, String), ModelError> {
        let mut problems = Vec::new();

        let url = match non_empty(&self.org_service_url) {
            None => {
                problems.push(FieldError::new(
                    ORG_SERVICE_URL_FIELD,
                    "Organisation service URL not set",
                ));
                None
            }
            Some(raw) => match Url::parse(raw) {
                Ok(url) if url.cannot_be_a_base() || !matches!(url.scheme(), "http" | "https") => {
                    problems.push(FieldError::new(
                        ORG_SERVICE_URL_FIELD,
                        format!("expected an http(s) URL, got {raw:?}"),
                    ));
                    None
                }
                Ok(url) => Some(url),
                Err(e) => {
                    problems.push(FieldError::new(
                        ORG_SERVICE_URL_FIELD,
                        format!("invalid URL {raw:?}: {e}"),
                    ));
                    None
                }
            },
        };

        let token = non_empty(&self.personal_access_token);
        if token.is_none() {
            problems.push(FieldError::new(
                PERSONAL_ACCESS_TOKEN_FIELD,
                "Personal access token not set",
            ));
        }

        match (url, token) {
            (Some(url), Some(token)) if problems.is_empty() => Ok((url, token.to_string())),
            _ => Err(ModelError::Configuration { problems }),
        }
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}
