//! Identity and management API clients.
//!
//! The provider exposes two API generations with different auth flows,
//! verbs and field names. Each one is a separate [`ProviderClient`]
//! implementation chosen from [`ApiVersion`] when the run is configured.

mod v1;
mod v2;

pub use v1::V1Client;
pub use v2::V2Client;

use crate::config::{ApiVersion, Endpoints};
use crate::error::{ProvisionError, ResourceKind, Result};
use crate::models::{
    AccessToken, PermissionId, PermissionSpec, ServiceAccountCredential, ServiceAccountSpec,
    TenantCredential,
};
use async_trait::async_trait;
use reqwest::{Client as ReqwestClient, RequestBuilder};
use serde::de::DeserializeOwned;

#[async_trait]
pub trait ProviderClient: Send + Sync {
    fn api_version(&self) -> ApiVersion;

    /// Exchanges the tenant credential for a bearer token. Never retried.
    async fn authenticate(&self, credential: &TenantCredential) -> Result<AccessToken>;

    /// Creates a permission and returns the id the provider assigned to it.
    async fn create_permission(
        &self,
        token: &AccessToken,
        permission: &PermissionSpec,
    ) -> Result<PermissionId>;

    /// Creates a service account bound to exactly one permission.
    async fn create_service_account(
        &self,
        token: &AccessToken,
        account: &ServiceAccountSpec,
        permission: &PermissionId,
    ) -> Result<ServiceAccountCredential>;
}

pub fn build_provider(
    version: ApiVersion,
    endpoints: Endpoints,
    http: ReqwestClient,
) -> Box<dyn ProviderClient> {
    match version {
        ApiVersion::V1 => Box::new(V1Client::new(http, endpoints)),
        ApiVersion::V2 => Box::new(V2Client::new(http, endpoints)),
    }
}

/// Raw outcome of one management API call.
struct ApiResponse {
    url: String,
    status: u16,
    body: String,
}

impl ApiResponse {
    fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    fn decode<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(|e| ProvisionError::MalformedResponse {
            endpoint: self.url.clone(),
            reason: e.to_string(),
        })
    }

    /// Fails with the provisioning error for `resource` unless the call succeeded.
    fn provisioned(self, resource: ResourceKind) -> Result<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(ProvisionError::Provisioning {
                resource,
                status: self.status,
                body: self.body,
            })
        }
    }
}

async fn send(url: String, request: RequestBuilder) -> Result<ApiResponse> {
    log::debug!("sending request to {}", url);
    let response = request.send().await?;
    let status = response.status().as_u16();
    let body = response.text().await?;
    log::debug!("{} answered with status {}", url, status);
    Ok(ApiResponse { url, status, body })
}

/// Unwraps a response field that must be present and non-empty.
fn required(response: &ApiResponse, field: &str, value: Option<String>) -> Result<String> {
    match value {
        Some(value) if !value.is_empty() => Ok(value),
        _ => Err(ProvisionError::MalformedResponse {
            endpoint: response.url.clone(),
            reason: format!("missing field `{}`", field),
        }),
    }
}
