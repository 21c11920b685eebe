use crate::config::{
    ApiVersion, DEFAULT_API_ENDPOINT, DEFAULT_AUTH_ENDPOINT, DEFAULT_REGION,
    DEFAULT_STORAGE_DOMAIN, Endpoints, ProvisionConfig,
};
use crate::error::{ProvisionError, Result};
use crate::naming::{DEFAULT_PREFIX_TAG, DEFAULT_SUFFIX_LENGTH};
use crate::prompt::CredentialInput;
use crate::storage::{CreationPolicy, DEFAULT_FIXED_DELAY, DEFAULT_RETRY_INTERVAL, RetryPolicy};
use clap::{Args, Parser, Subcommand};
use std::num::NonZeroUsize;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "lyveprov")]
#[command(about = "Provision a Lyve Cloud service account and a bucket scoped to it", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Create a permission, a service account and a bucket
    Provision(ProvisionArgs),

    /// Delete a bucket with an existing service-account credential
    DeleteBucket(DeleteBucketArgs),

    /// Print a generated prefix and the bucket name it yields
    Name {
        /// Prefix tag placed before the random suffix
        #[arg(long, default_value = DEFAULT_PREFIX_TAG)]
        tag: String,

        /// Number of random lowercase letters
        #[arg(short, long, default_value_t = DEFAULT_SUFFIX_LENGTH)]
        length: NonZeroUsize,

        /// Region appended to the bucket name
        #[arg(short, long, env = "LYVE_REGION", default_value = DEFAULT_REGION)]
        region: String,
    },
}

#[derive(Args, Debug)]
pub struct StorageArgs {
    /// Storage region
    #[arg(short, long, env = "LYVE_REGION", default_value = DEFAULT_REGION)]
    pub region: String,

    /// Domain of the S3 endpoint (https://s3.{region}.{domain})
    #[arg(long, env = "LYVE_STORAGE_DOMAIN", default_value = DEFAULT_STORAGE_DOMAIN)]
    pub storage_domain: String,

    /// Explicit S3 endpoint URL, overriding region and domain
    #[arg(long, env = "LYVE_S3_ENDPOINT")]
    pub s3_endpoint: Option<String>,

    /// HTTP request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub http_timeout_secs: u64,
}

#[derive(Args, Debug)]
pub struct ProvisionArgs {
    /// Management API generation
    #[arg(long, value_enum, env = "LYVE_API_VERSION", default_value_t = ApiVersion::V1)]
    pub api_version: ApiVersion,

    /// Identity endpoint (v1 token exchange)
    #[arg(long, env = "LYVE_AUTH_ENDPOINT", default_value = DEFAULT_AUTH_ENDPOINT)]
    pub auth_endpoint: String,

    /// Management API endpoint
    #[arg(long, env = "LYVE_API_ENDPOINT", default_value = DEFAULT_API_ENDPOINT)]
    pub api_endpoint: String,

    /// Account id (v2 only)
    #[arg(long, env = "LYVE_ACCOUNT_ID", hide_env_values = true)]
    pub account_id: Option<String>,

    /// Client id (v1) or access key (v2)
    #[arg(long, env = "LYVE_CLIENT_ID", hide_env_values = true)]
    pub client_id: Option<String>,

    /// Client secret
    #[arg(long, env = "LYVE_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    #[command(flatten)]
    pub storage: StorageArgs,

    /// Use this prefix instead of generating one
    #[arg(short, long)]
    pub prefix: Option<String>,

    /// Wait once and make a single creation attempt instead of retrying
    #[arg(long)]
    pub fixed_delay: bool,

    /// Seconds between creation attempts (or the single wait with --fixed-delay)
    #[arg(long)]
    pub interval_secs: Option<u64>,

    /// Stop retrying after this many attempts
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Stop retrying after this many seconds
    #[arg(long)]
    pub timeout_secs: Option<u64>,

    /// Delete the bucket again once it has been created
    #[arg(short, long)]
    pub delete: bool,

    /// Print the service-account secret in clear text
    #[arg(long)]
    pub show_secret: bool,
}

impl ProvisionArgs {
    pub fn credential_input(&self) -> CredentialInput {
        CredentialInput {
            account_id: self.account_id.clone(),
            client_id: self.client_id.clone(),
            client_secret: self.client_secret.clone(),
        }
    }

    pub fn to_config(&self) -> Result<ProvisionConfig> {
        if self.fixed_delay && (self.max_attempts.is_some() || self.timeout_secs.is_some()) {
            return Err(ProvisionError::Config(
                "--max-attempts and --timeout-secs only apply to the retry policy".to_string(),
            ));
        }
        if self.max_attempts == Some(0) {
            return Err(ProvisionError::Config(
                "--max-attempts must be at least 1".to_string(),
            ));
        }

        let creation = if self.fixed_delay {
            CreationPolicy::FixedDelay(
                self.interval_secs
                    .map(Duration::from_secs)
                    .unwrap_or(DEFAULT_FIXED_DELAY),
            )
        } else {
            CreationPolicy::Retry(RetryPolicy {
                interval: self
                    .interval_secs
                    .map(Duration::from_secs)
                    .unwrap_or(DEFAULT_RETRY_INTERVAL),
                max_attempts: self.max_attempts,
                deadline: self.timeout_secs.map(Duration::from_secs),
            })
        };

        Ok(ProvisionConfig {
            api_version: self.api_version,
            endpoints: Endpoints::new(&self.auth_endpoint, &self.api_endpoint)?,
            region: self.storage.region.clone(),
            storage_domain: self.storage.storage_domain.clone(),
            s3_endpoint: self.storage.s3_endpoint.clone(),
            prefix: self.prefix.clone(),
            creation,
            delete_after_create: self.delete,
            reveal_secret: self.show_secret,
            http_timeout: Duration::from_secs(self.storage.http_timeout_secs),
            ..ProvisionConfig::default()
        })
    }
}

#[derive(Args, Debug)]
pub struct DeleteBucketArgs {
    /// Name of the bucket to delete
    #[arg(short, long)]
    pub bucket: String,

    /// Service-account access key
    #[arg(short = 'k', long, env = "LYVE_ACCESS_KEY", hide_env_values = true)]
    pub access_key: String,

    /// Service-account secret
    #[arg(short, long, env = "LYVE_ACCESS_SECRET", hide_env_values = true)]
    pub secret: String,

    #[command(flatten)]
    pub storage: StorageArgs,
}

impl DeleteBucketArgs {
    pub fn to_config(&self) -> ProvisionConfig {
        ProvisionConfig {
            region: self.storage.region.clone(),
            storage_domain: self.storage.storage_domain.clone(),
            s3_endpoint: self.storage.s3_endpoint.clone(),
            http_timeout: Duration::from_secs(self.storage.http_timeout_secs),
            ..ProvisionConfig::default()
        }
    }
}
