use std::fmt;
use thiserror::Error;

/// Which management resource a provisioning call was creating.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResourceKind {
    Permission,
    ServiceAccount,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResourceKind::Permission => write!(f, "permission"),
            ResourceKind::ServiceAccount => write!(f, "service account"),
        }
    }
}

/// A failed call against the object-storage endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageFailure {
    /// The request never produced a response (DNS, TLS, timeout, ...).
    Transport(String),
    /// The endpoint answered with a non-success status.
    Status {
        status: u16,
        code: Option<String>,
        message: String,
    },
}

impl StorageFailure {
    /// S3 error code, when the endpoint returned one.
    pub fn code(&self) -> Option<&str> {
        match self {
            StorageFailure::Status { code, .. } => code.as_deref(),
            StorageFailure::Transport(_) => None,
        }
    }
}

impl fmt::Display for StorageFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageFailure::Transport(reason) => write!(f, "transport error: {}", reason),
            StorageFailure::Status {
                status,
                code: Some(code),
                message,
            } => write!(f, "status {} ({}): {}", status, code, message),
            StorageFailure::Status {
                status,
                code: None,
                message,
            } => write!(f, "status {}: {}", status, message),
        }
    }
}

#[derive(Error, Debug)]
pub enum ProvisionError {
    #[error("Authentication failed with status {status}: {body}")]
    Authentication { status: u16, body: String },

    #[error("Malformed response from {endpoint}: {reason}")]
    MalformedResponse { endpoint: String, reason: String },

    #[error("Failed to create {resource} (status {status}): {body}")]
    Provisioning {
        resource: ResourceKind,
        status: u16,
        body: String,
    },

    #[error("Bucket creation failed: {0}")]
    TransientStorage(StorageFailure),

    #[error("Storage operation failed: {0}")]
    FatalStorage(StorageFailure),

    #[error("Gave up creating bucket {bucket} after {attempts} attempts: {last}")]
    RetriesExhausted {
        bucket: String,
        attempts: u32,
        last: StorageFailure,
    },

    #[error("Creation of bucket {bucket} cancelled after {attempts} attempts")]
    Cancelled { bucket: String, attempts: u32 },

    #[error("Bucket {bucket} is {state}, cannot {operation}")]
    InvalidState {
        bucket: String,
        state: String,
        operation: &'static str,
    },

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Operator input failed: {0}")]
    Prompt(String),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("Invalid bucket: {0}")]
    Bucket(#[from] rusty_s3::BucketError),
}

impl ProvisionError {
    /// HTTP status carried by the error, if the provider returned one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ProvisionError::Authentication { status, .. }
            | ProvisionError::Provisioning { status, .. } => Some(*status),
            ProvisionError::TransientStorage(StorageFailure::Status { status, .. })
            | ProvisionError::FatalStorage(StorageFailure::Status { status, .. }) => Some(*status),
            _ => None,
        }
    }
}

impl From<dialoguer::Error> for ProvisionError {
    fn from(e: dialoguer::Error) -> Self {
        ProvisionError::Prompt(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ProvisionError>;
