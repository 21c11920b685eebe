use crate::error::{ProvisionError, Result};
use crate::naming::{DEFAULT_PREFIX_TAG, DEFAULT_SUFFIX_LENGTH};
use crate::storage::{CreationPolicy, RetryPolicy};
use clap::ValueEnum;
use reqwest::Client as ReqwestClient;
use std::fmt;
use std::num::NonZeroUsize;
use std::time::Duration;
use url::Url;

pub const DEFAULT_AUTH_ENDPOINT: &str = "https://auth.lyve.seagate.com";
pub const DEFAULT_API_ENDPOINT: &str = "https://api.lyvecloud.seagate.com";
pub const DEFAULT_STORAGE_DOMAIN: &str = "lyvecloud.seagate.com";
pub const DEFAULT_REGION: &str = "us-west-1";
pub const DEFAULT_AUDIENCE: &str = "https://lyvecloud/customer/api";
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(30);

/// Management API generation. Each has its own auth flow and wire format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ApiVersion {
    /// OAuth client-credentials grant, `PUT /v1/...` resources
    #[default]
    V1,
    /// Account id + access key + secret, `POST /v2/...` resources
    V2,
}

impl fmt::Display for ApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiVersion::V1 => write!(f, "v1"),
            ApiVersion::V2 => write!(f, "v2"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub auth: String,
    pub api: String,
    pub audience: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            auth: DEFAULT_AUTH_ENDPOINT.to_string(),
            api: DEFAULT_API_ENDPOINT.to_string(),
            audience: DEFAULT_AUDIENCE.to_string(),
        }
    }
}

impl Endpoints {
    pub fn new(auth: &str, api: &str) -> Result<Self> {
        Ok(Self {
            auth: normalize_endpoint(auth)?,
            api: normalize_endpoint(api)?,
            audience: DEFAULT_AUDIENCE.to_string(),
        })
    }
}

/// Everything a provisioning run needs besides the tenant credential.
#[derive(Debug, Clone)]
pub struct ProvisionConfig {
    pub api_version: ApiVersion,
    pub endpoints: Endpoints,
    pub region: String,
    pub storage_domain: String,
    /// Overrides the `https://s3.{region}.{domain}` endpoint.
    pub s3_endpoint: Option<String>,
    pub prefix_tag: String,
    pub suffix_length: NonZeroUsize,
    /// Fixed prefix instead of a generated one.
    pub prefix: Option<String>,
    pub creation: CreationPolicy,
    pub delete_after_create: bool,
    pub reveal_secret: bool,
    pub http_timeout: Duration,
}

impl Default for ProvisionConfig {
    fn default() -> Self {
        Self {
            api_version: ApiVersion::default(),
            endpoints: Endpoints::default(),
            region: DEFAULT_REGION.to_string(),
            storage_domain: DEFAULT_STORAGE_DOMAIN.to_string(),
            s3_endpoint: None,
            prefix_tag: DEFAULT_PREFIX_TAG.to_string(),
            suffix_length: DEFAULT_SUFFIX_LENGTH,
            prefix: None,
            creation: CreationPolicy::Retry(RetryPolicy::default()),
            delete_after_create: false,
            reveal_secret: false,
            http_timeout: DEFAULT_HTTP_TIMEOUT,
        }
    }
}

impl ProvisionConfig {
    pub fn s3_endpoint(&self) -> Result<Url> {
        let endpoint = match &self.s3_endpoint {
            Some(endpoint) => normalize_endpoint(endpoint)?,
            None => format!("https://s3.{}.{}", self.region, self.storage_domain),
        };
        Ok(Url::parse(&endpoint)?)
    }

    pub fn http_client(&self) -> Result<ReqwestClient> {
        let client = ReqwestClient::builder()
            .timeout(self.http_timeout)
            .build()?;
        Ok(client)
    }
}

/// Adds an `https://` scheme when missing and strips trailing slashes.
pub fn normalize_endpoint(endpoint: &str) -> Result<String> {
    let endpoint = endpoint.trim();
    if endpoint.is_empty() {
        return Err(ProvisionError::Config("endpoint must not be empty".to_string()));
    }

    let base_url = if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
        format!("https://{}", endpoint)
    } else {
        endpoint.to_string()
    };
    let base_url = base_url.trim_end_matches('/').to_string();

    Url::parse(&base_url)?;
    Ok(base_url)
}
