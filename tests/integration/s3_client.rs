use super::test_helpers::*;
use lyveprov::error::StorageFailure;
use lyveprov::models::ServiceAccountCredential;
use lyveprov::naming::BucketName;
use lyveprov::storage::{BucketClient, S3BucketClient};
use url::Url;
use wiremock::matchers::{body_string_contains, method, path, query_param_contains};
use wiremock::{Mock, ResponseTemplate};

const BUCKET: &str = "pf-abcdefgh-us-west-1";

fn client_for(endpoint: &str) -> S3BucketClient {
    S3BucketClient::new(
        reqwest::Client::new(),
        Url::parse(endpoint).unwrap(),
        "us-west-1",
        &ServiceAccountCredential::new("AK", "SK"),
        &BucketName::parse(BUCKET).unwrap(),
    )
    .expect("Failed to build S3 client")
}

fn s3_error(code: &str, message: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><Error><Code>{}</Code><Message>{}</Message><BucketName>{}</BucketName></Error>"#,
        code, message, BUCKET
    )
}

#[tokio::test]
async fn create_bucket_sends_signed_request_with_location() {
    let env = test_setup!();

    Mock::given(method("PUT"))
        .and(path(format!("/{}", BUCKET)))
        .and(query_param_contains("X-Amz-Credential", "AK/"))
        .and(body_string_contains(
            "<LocationConstraint>us-west-1</LocationConstraint>",
        ))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&env.server)
        .await;

    let client = client_for(&env.uri());
    assert_eq!(client.bucket().as_str(), BUCKET);
    client.create_bucket().await.expect("bucket should be created");
}

#[tokio::test]
async fn bucket_already_owned_counts_as_created() {
    let env = test_setup!();

    Mock::given(method("PUT"))
        .and(path(format!("/{}", BUCKET)))
        .respond_with(ResponseTemplate::new(409).set_body_string(s3_error(
            "BucketAlreadyOwnedByYou",
            "Your previous request to create the named bucket succeeded",
        )))
        .mount(&env.server)
        .await;

    client_for(&env.uri()).create_bucket().await.unwrap();
}

#[tokio::test]
async fn bucket_owned_elsewhere_is_a_failure() {
    let env = test_setup!();

    Mock::given(method("PUT"))
        .and(path(format!("/{}", BUCKET)))
        .respond_with(ResponseTemplate::new(409).set_body_string(s3_error(
            "BucketAlreadyExists",
            "The requested bucket name is not available",
        )))
        .mount(&env.server)
        .await;

    let failure = client_for(&env.uri()).create_bucket().await.unwrap_err();
    assert_eq!(failure.code(), Some("BucketAlreadyExists"));
}

#[tokio::test]
async fn create_bucket_reports_s3_error() {
    let env = test_setup!();

    Mock::given(method("PUT"))
        .and(path(format!("/{}", BUCKET)))
        .respond_with(ResponseTemplate::new(403).set_body_string(s3_error(
            "InvalidAccessKeyId",
            "The Access Key Id you provided does not exist in our records.",
        )))
        .mount(&env.server)
        .await;

    let failure = client_for(&env.uri()).create_bucket().await.unwrap_err();
    assert_eq!(
        failure,
        StorageFailure::Status {
            status: 403,
            code: Some("InvalidAccessKeyId".to_string()),
            message: "The Access Key Id you provided does not exist in our records.".to_string(),
        }
    );
}

#[tokio::test]
async fn delete_bucket_issues_delete() {
    let env = test_setup!();

    Mock::given(method("DELETE"))
        .and(path(format!("/{}", BUCKET)))
        .and(query_param_contains("X-Amz-Credential", "AK/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&env.server)
        .await;

    client_for(&env.uri()).delete_bucket().await.unwrap();
}

#[tokio::test]
async fn delete_bucket_reports_failure() {
    let env = test_setup!();

    Mock::given(method("DELETE"))
        .and(path(format!("/{}", BUCKET)))
        .respond_with(ResponseTemplate::new(409).set_body_string(s3_error(
            "BucketNotEmpty",
            "The bucket you tried to delete is not empty",
        )))
        .mount(&env.server)
        .await;

    let failure = client_for(&env.uri()).delete_bucket().await.unwrap_err();
    assert_eq!(failure.code(), Some("BucketNotEmpty"));
}

#[tokio::test]
async fn unreachable_endpoint_is_transport_failure() {
    let failure = client_for("http://127.0.0.1:1").create_bucket().await.unwrap_err();
    assert!(matches!(failure, StorageFailure::Transport(_)), "{}", failure);
}
