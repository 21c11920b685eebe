use super::{ProviderClient, required, send};
use crate::config::{ApiVersion, Endpoints};
use crate::error::{ProvisionError, ResourceKind, Result};
use crate::models::{
    AccessToken, PermissionId, PermissionSpec, ServiceAccountCredential, ServiceAccountSpec,
    TenantCredential,
};
use async_trait::async_trait;
use reqwest::Client as ReqwestClient;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct TokenRequest<'a> {
    client_id: &'a str,
    client_secret: &'a str,
    audience: &'a str,
    grant_type: &'a str,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
}

#[derive(Debug, Serialize)]
struct PermissionRequest<'a> {
    name: &'a str,
    description: &'a str,
    actions: &'a str,
    buckets: [&'a str; 1],
}

#[derive(Debug, Deserialize)]
struct PermissionResponse {
    id: Option<String>,
}

#[derive(Debug, Serialize)]
struct ServiceAccountRequest<'a> {
    name: &'a str,
    description: &'a str,
    permissions: [&'a str; 1],
}

#[derive(Debug, Deserialize)]
struct ServiceAccountResponse {
    access_key: Option<String>,
    access_secret: Option<String>,
}

/// Client-credentials flow against `{auth}/oauth/token`, resources created
/// with `PUT {api}/v1/...`.
pub struct V1Client {
    http: ReqwestClient,
    endpoints: Endpoints,
}

impl V1Client {
    pub fn new(http: ReqwestClient, endpoints: Endpoints) -> Self {
        Self { http, endpoints }
    }
}

#[async_trait]
impl ProviderClient for V1Client {
    fn api_version(&self) -> ApiVersion {
        ApiVersion::V1
    }

    async fn authenticate(&self, credential: &TenantCredential) -> Result<AccessToken> {
        let url = format!("{}/oauth/token", self.endpoints.auth);
        let request = TokenRequest {
            client_id: &credential.client_id,
            client_secret: &credential.client_secret,
            audience: &self.endpoints.audience,
            grant_type: "client_credentials",
        };

        let response = send(url.clone(), self.http.post(&url).json(&request)).await?;
        if !response.is_success() {
            return Err(ProvisionError::Authentication {
                status: response.status,
                body: response.body,
            });
        }

        let token: TokenResponse = response.decode()?;
        let token = required(&response, "access_token", token.access_token)?;
        Ok(AccessToken::new(token))
    }

    async fn create_permission(
        &self,
        token: &AccessToken,
        permission: &PermissionSpec,
    ) -> Result<PermissionId> {
        let url = format!("{}/v1/permission", self.endpoints.api);
        let request = PermissionRequest {
            name: &permission.name,
            description: &permission.description,
            actions: permission.actions.as_str(),
            buckets: [&permission.scope_pattern],
        };

        let response = send(
            url.clone(),
            self.http
                .put(&url)
                .bearer_auth(token.as_str())
                .json(&request),
        )
        .await?
        .provisioned(ResourceKind::Permission)?;

        let created: PermissionResponse = response.decode()?;
        Ok(PermissionId::new(required(&response, "id", created.id)?))
    }

    async fn create_service_account(
        &self,
        token: &AccessToken,
        account: &ServiceAccountSpec,
        permission: &PermissionId,
    ) -> Result<ServiceAccountCredential> {
        let url = format!("{}/v1/service-account", self.endpoints.api);
        let request = ServiceAccountRequest {
            name: &account.name,
            description: &account.description,
            permissions: [permission.as_str()],
        };

        let response = send(
            url.clone(),
            self.http
                .put(&url)
                .bearer_auth(token.as_str())
                .json(&request),
        )
        .await?
        .provisioned(ResourceKind::ServiceAccount)?;

        let created: ServiceAccountResponse = response.decode()?;
        let access_key = required(&response, "access_key", created.access_key)?;
        let access_secret = required(&response, "access_secret", created.access_secret)?;
        Ok(ServiceAccountCredential::new(access_key, access_secret))
    }
}
