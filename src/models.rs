use crate::naming::ResourcePrefix;
use std::fmt;

const REDACTED: &str = "<redacted>";

/// Operator credential for the identity API. Immutable for a run.
#[derive(Clone)]
pub struct TenantCredential {
    pub account_id: Option<String>,
    pub client_id: String,
    pub client_secret: String,
}

impl TenantCredential {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            account_id: None,
            client_id: client_id.into(),
            client_secret: client_secret.into(),
        }
    }

    pub fn with_account_id(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }
}

impl fmt::Debug for TenantCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TenantCredential")
            .field("account_id", &self.account_id)
            .field("client_id", &self.client_id)
            .field("client_secret", &REDACTED)
            .finish()
    }
}

/// Short-lived bearer token. Used immediately, never persisted or refreshed.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("AccessToken").field(&REDACTED).finish()
    }
}

/// Provider-assigned permission identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionId(String);

impl PermissionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PermissionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionSet {
    AllOperations,
}

impl ActionSet {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActionSet::AllOperations => "all-operations",
        }
    }
}

/// A permission to be created, before the provider has assigned its id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionSpec {
    pub name: String,
    pub description: String,
    pub scope_pattern: String,
    pub actions: ActionSet,
}

impl PermissionSpec {
    /// Full access to every bucket whose name starts with `prefix`.
    pub fn for_prefix(prefix: &ResourcePrefix) -> Self {
        Self {
            name: prefix.to_string(),
            description: prefix.to_string(),
            scope_pattern: prefix.scope_pattern(),
            actions: ActionSet::AllOperations,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceAccountSpec {
    pub name: String,
    pub description: String,
}

impl ServiceAccountSpec {
    pub fn for_prefix(prefix: &ResourcePrefix) -> Self {
        Self {
            name: prefix.to_string(),
            description: format!("Service account for {}", prefix),
        }
    }
}

/// Access key and secret minted for a service account. Handed to the S3
/// client; the secret is kept out of `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct ServiceAccountCredential {
    access_key: String,
    access_secret: String,
}

impl ServiceAccountCredential {
    pub fn new(access_key: impl Into<String>, access_secret: impl Into<String>) -> Self {
        Self {
            access_key: access_key.into(),
            access_secret: access_secret.into(),
        }
    }

    pub fn access_key(&self) -> &str {
        &self.access_key
    }

    pub fn access_secret(&self) -> &str {
        &self.access_secret
    }

    /// Secret as it should be shown to the operator.
    pub fn display_secret(&self, reveal: bool) -> &str {
        if reveal { &self.access_secret } else { REDACTED }
    }
}

impl fmt::Debug for ServiceAccountCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServiceAccountCredential")
            .field("access_key", &self.access_key)
            .field("access_secret", &REDACTED)
            .finish()
    }
}
