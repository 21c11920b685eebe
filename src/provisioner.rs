use crate::error::Result;
use crate::models::{
    AccessToken, PermissionId, PermissionSpec, ServiceAccountCredential, ServiceAccountSpec,
    TenantCredential,
};
use crate::naming::ResourcePrefix;
use crate::provider::ProviderClient;
use log::info;

/// Authenticates and mints the scoped service account, one call per step.
///
/// None of these calls is retried: the provider would end up with duplicate
/// permissions or accounts. A permission left behind by a failed service
/// account call is not rolled back.
pub struct Provisioner<'a> {
    provider: &'a dyn ProviderClient,
}

impl<'a> Provisioner<'a> {
    pub fn new(provider: &'a dyn ProviderClient) -> Self {
        Self { provider }
    }

    pub async fn authenticate(&self, credential: &TenantCredential) -> Result<AccessToken> {
        let token = self.provider.authenticate(credential).await?;
        info!(
            "successfully authenticated with the {} API",
            self.provider.api_version()
        );
        Ok(token)
    }

    pub async fn create_permission(
        &self,
        token: &AccessToken,
        prefix: &ResourcePrefix,
    ) -> Result<PermissionId> {
        let permission = PermissionSpec::for_prefix(prefix);
        let id = self.provider.create_permission(token, &permission).await?;
        info!(
            "successfully created permission for [{}]: {}",
            permission.scope_pattern, id
        );
        Ok(id)
    }

    pub async fn create_service_account(
        &self,
        token: &AccessToken,
        prefix: &ResourcePrefix,
        permission: &PermissionId,
    ) -> Result<ServiceAccountCredential> {
        let account = ServiceAccountSpec::for_prefix(prefix);
        let credential = self
            .provider
            .create_service_account(token, &account, permission)
            .await?;
        info!("successfully created service account [{}]", account.name);
        Ok(credential)
    }

    /// Authenticate, create the permission, then the account bound to it.
    pub async fn provision(
        &self,
        credential: &TenantCredential,
        prefix: &ResourcePrefix,
    ) -> Result<ServiceAccountCredential> {
        let token = self.authenticate(credential).await?;
        let permission = self.create_permission(&token, prefix).await?;
        self.create_service_account(&token, prefix, &permission).await
    }
}
