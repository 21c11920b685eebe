//! The provisioning run: name → authenticate → permission → service
//! account → bucket (→ optional delete). Each step consumes the previous
//! step's output and any error aborts the run.

use crate::config::ProvisionConfig;
use crate::error::Result;
use crate::models::{ServiceAccountCredential, TenantCredential};
use crate::naming::{BucketName, ResourcePrefix};
use crate::provider::ProviderClient;
use crate::provisioner::Provisioner;
use crate::storage::{BucketClient, BucketLifecycle, CreationReport, S3BucketClient};
use chrono::{DateTime, Utc};
use log::info;
use reqwest::Client as ReqwestClient;
use std::future::Future;
use url::Url;

#[derive(Debug, Clone)]
pub struct ProvisionOutcome {
    pub credential: ServiceAccountCredential,
    pub prefix: ResourcePrefix,
    pub bucket: BucketName,
    pub s3_endpoint: Url,
    pub creation: CreationReport,
    pub deleted: bool,
    pub completed_at: DateTime<Utc>,
}

pub struct Pipeline<'a> {
    config: &'a ProvisionConfig,
    provider: &'a dyn ProviderClient,
}

impl<'a> Pipeline<'a> {
    pub fn new(config: &'a ProvisionConfig, provider: &'a dyn ProviderClient) -> Self {
        Self { config, provider }
    }

    /// The configured prefix, or a freshly generated one, and its bucket name.
    pub fn resolve_names(&self) -> Result<(ResourcePrefix, BucketName)> {
        let prefix = match &self.config.prefix {
            Some(prefix) => ResourcePrefix::parse(prefix)?,
            None => ResourcePrefix::generate(&self.config.prefix_tag, self.config.suffix_length)?,
        };
        let bucket = BucketName::derive(&prefix, &self.config.region)?;
        Ok((prefix, bucket))
    }

    /// Runs the pipeline against the S3 endpoint derived from the config.
    pub async fn run_with_s3<S>(
        &self,
        credential: &TenantCredential,
        http: ReqwestClient,
        shutdown: S,
    ) -> Result<ProvisionOutcome>
    where
        S: Future<Output = ()>,
    {
        let endpoint = self.config.s3_endpoint()?;
        let region = self.config.region.clone();
        self.run(
            credential,
            move |account, bucket| S3BucketClient::new(http, endpoint, &region, account, bucket),
            shutdown,
        )
        .await
    }

    /// Runs the pipeline, building the storage client with `connect` once
    /// the service-account credential exists.
    pub async fn run<C, F, S>(
        &self,
        credential: &TenantCredential,
        connect: F,
        shutdown: S,
    ) -> Result<ProvisionOutcome>
    where
        C: BucketClient,
        F: FnOnce(&ServiceAccountCredential, &BucketName) -> Result<C>,
        S: Future<Output = ()>,
    {
        let (prefix, bucket) = self.resolve_names()?;
        let s3_endpoint = self.config.s3_endpoint()?;
        info!("provisioning service account [{}]", prefix);

        let account = Provisioner::new(self.provider)
            .provision(credential, &prefix)
            .await?;
        info!("service account access key: {}", account.access_key());

        let client = connect(&account, &bucket)?;
        let mut lifecycle = BucketLifecycle::new(client);

        info!(
            "trying to create a bucket [{}] at endpoint [{}]",
            bucket, s3_endpoint
        );
        let creation = lifecycle.create(&self.config.creation, shutdown).await?;
        info!(
            "bucket [{}] created after {} attempt(s) in {:.2?}",
            bucket, creation.attempts, creation.elapsed
        );

        let deleted = if self.config.delete_after_create {
            lifecycle.delete().await?;
            true
        } else {
            false
        };

        Ok(ProvisionOutcome {
            credential: account,
            prefix,
            bucket,
            s3_endpoint,
            creation,
            deleted,
            completed_at: Utc::now(),
        })
    }
}
