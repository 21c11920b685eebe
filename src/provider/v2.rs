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

// Permission type granting the listed bucket names (wildcards allowed).
const BUCKET_NAMES: &str = "bucket-names";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct TokenRequest<'a> {
    account_id: &'a str,
    access_key: &'a str,
    secret: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenResponse {
    token: Option<String>,
    expiration_sec: Option<u64>,
}

#[derive(Debug, Serialize)]
struct PermissionRequest<'a> {
    name: &'a str,
    description: &'a str,
    #[serde(rename = "type")]
    kind: &'a str,
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
    #[serde(rename = "accessKey", alias = "access_key")]
    access_key: Option<String>,
    #[serde(rename = "secret", alias = "access_secret")]
    secret: Option<String>,
}

/// Account-key flow against `{api}/v2/auth/token`, resources created with
/// `POST {api}/v2/...`.
pub struct V2Client {
    http: ReqwestClient,
    endpoints: Endpoints,
}

impl V2Client {
    pub fn new(http: ReqwestClient, endpoints: Endpoints) -> Self {
        Self { http, endpoints }
    }
}

#[async_trait]
impl ProviderClient for V2Client {
    fn api_version(&self) -> ApiVersion {
        ApiVersion::V2
    }

    async fn authenticate(&self, credential: &TenantCredential) -> Result<AccessToken> {
        let account_id = credential.account_id.as_deref().ok_or_else(|| {
            ProvisionError::Config("the v2 API requires an account id".to_string())
        })?;

        let url = format!("{}/v2/auth/token", self.endpoints.api);
        let request = TokenRequest {
            account_id,
            access_key: &credential.client_id,
            secret: &credential.client_secret,
        };

        let response = send(url.clone(), self.http.post(&url).json(&request)).await?;
        if !response.is_success() {
            return Err(ProvisionError::Authentication {
                status: response.status,
                body: response.body,
            });
        }

        let token: TokenResponse = response.decode()?;
        if let Some(expires_in) = token.expiration_sec {
            log::debug!("access token expires in {}s", expires_in);
        }
        let token = required(&response, "token", token.token)?;
        Ok(AccessToken::new(token))
    }

    async fn create_permission(
        &self,
        token: &AccessToken,
        permission: &PermissionSpec,
    ) -> Result<PermissionId> {
        let url = format!("{}/v2/permissions", self.endpoints.api);
        let request = PermissionRequest {
            name: &permission.name,
            description: &permission.description,
            kind: BUCKET_NAMES,
            actions: permission.actions.as_str(),
            buckets: [&permission.scope_pattern],
        };

        let response = send(
            url.clone(),
            self.http
                .post(&url)
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
        let url = format!("{}/v2/service-accounts", self.endpoints.api);
        let request = ServiceAccountRequest {
            name: &account.name,
            description: &account.description,
            permissions: [permission.as_str()],
        };

        let response = send(
            url.clone(),
            self.http
                .post(&url)
                .bearer_auth(token.as_str())
                .json(&request),
        )
        .await?
        .provisioned(ResourceKind::ServiceAccount)?;

        let created: ServiceAccountResponse = response.decode()?;
        let access_key = required(&response, "accessKey", created.access_key)?;
        let secret = required(&response, "secret", created.secret)?;
        Ok(ServiceAccountCredential::new(access_key, secret))
    }
}
