use super::BucketClient;
use crate::error::{ProvisionError, Result, StorageFailure};
use crate::models::ServiceAccountCredential;
use crate::naming::BucketName;
use async_trait::async_trait;
use quick_xml::de::from_str;
use reqwest::{Client as ReqwestClient, RequestBuilder};
use rusty_s3::{Bucket, Credentials, S3Action, UrlStyle};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use url::Url;

const SIGN_DURATION: Duration = Duration::from_secs(600);
const ALREADY_OWNED: &str = "BucketAlreadyOwnedByYou";
const S3_NAMESPACE: &str = "http://s3.amazonaws.com/doc/2006-03-01/";

// S3 error body, e.g. <Error><Code>AccessDenied</Code><Message>...</Message></Error>
#[derive(Debug, Deserialize)]
struct S3ErrorResponse {
    #[serde(rename = "Code")]
    code: String,
    #[serde(rename = "Message", default)]
    message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename = "CreateBucketConfiguration")]
struct CreateBucketConfiguration<'a> {
    #[serde(rename = "@xmlns")]
    xmlns: &'a str,
    #[serde(rename = "LocationConstraint")]
    location_constraint: &'a str,
}

/// S3-compatible client bound to one bucket, signing requests with the
/// service-account credential.
pub struct S3BucketClient {
    name: BucketName,
    bucket: Bucket,
    credentials: Credentials,
    client: ReqwestClient,
    create_body: Option<String>,
}

impl S3BucketClient {
    pub fn new(
        client: ReqwestClient,
        endpoint: Url,
        region: &str,
        credential: &ServiceAccountCredential,
        name: &BucketName,
    ) -> Result<Self> {
        let bucket = Bucket::new(
            endpoint,
            UrlStyle::Path,
            name.as_str().to_string(),
            region.to_string(),
        )?;
        log::debug!("bucket URL: {}", bucket.base_url());

        let credentials = Credentials::new(
            credential.access_key().to_string(),
            credential.access_secret().to_string(),
        );

        Ok(Self {
            name: name.clone(),
            bucket,
            credentials,
            client,
            create_body: create_bucket_body(region)?,
        })
    }

    async fn execute(&self, request: RequestBuilder) -> std::result::Result<(), StorageFailure> {
        let response = request
            .send()
            .await
            .map_err(|e| StorageFailure::Transport(e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(failure_from_response(status.as_u16(), &body))
    }
}

#[async_trait]
impl BucketClient for S3BucketClient {
    fn bucket(&self) -> &BucketName {
        &self.name
    }

    async fn create_bucket(&self) -> std::result::Result<(), StorageFailure> {
        let action = self.bucket.create_bucket(&self.credentials);
        let url = action.sign(SIGN_DURATION);

        let mut request = self.client.put(url);
        if let Some(body) = &self.create_body {
            request = request
                .header("Content-Type", "application/xml")
                .body(body.clone());
        }

        match self.execute(request).await {
            Err(failure) if failure.code() == Some(ALREADY_OWNED) => {
                log::info!("bucket [{}] already exists and is owned by this account", self.name);
                Ok(())
            }
            result => result,
        }
    }

    async fn delete_bucket(&self) -> std::result::Result<(), StorageFailure> {
        let action = self.bucket.delete_bucket(&self.credentials);
        let url = action.sign(SIGN_DURATION);
        self.execute(self.client.delete(url)).await
    }
}

/// `us-east-1` is the implicit default location and takes no body.
fn create_bucket_body(region: &str) -> Result<Option<String>> {
    if region == "us-east-1" {
        return Ok(None);
    }
    let configuration = CreateBucketConfiguration {
        xmlns: S3_NAMESPACE,
        location_constraint: region,
    };
    quick_xml::se::to_string(&configuration)
        .map(Some)
        .map_err(|e| ProvisionError::Config(format!("cannot encode bucket configuration: {}", e)))
}

fn failure_from_response(status: u16, body: &str) -> StorageFailure {
    match from_str::<S3ErrorResponse>(body) {
        Ok(error) => StorageFailure::Status {
            status,
            code: Some(error.code),
            message: error.message,
        },
        Err(_) => StorageFailure::Status {
            status,
            code: None,
            message: body.trim().to_string(),
        },
    }
}
