use super::test_helpers::*;
use lyveprov::config::ApiVersion;
use lyveprov::error::ProvisionError;
use lyveprov::models::{AccessToken, PermissionId, PermissionSpec, ServiceAccountSpec, TenantCredential};
use lyveprov::naming::ResourcePrefix;
use lyveprov::provider::ProviderClient;
use serde_json::json;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, ResponseTemplate};

fn prefix() -> ResourcePrefix {
    ResourcePrefix::parse("pf-abcdefgh").unwrap()
}

#[tokio::test]
async fn authenticate_with_account_credentials() {
    let env = test_setup!();

    Mock::given(method("POST"))
        .and(path("/v2/auth/token"))
        .and(body_json(json!({
            "accountId": "acc1",
            "accessKey": "ck",
            "secret": "cs"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "T",
            "expirationSec": 864000
        })))
        .expect(1)
        .mount(&env.server)
        .await;

    let provider = env.provider(ApiVersion::V2);
    assert_eq!(provider.api_version(), ApiVersion::V2);

    let token = provider.authenticate(&tenant()).await.unwrap();
    assert_eq!(token.as_str(), "T");
}

#[tokio::test]
async fn authenticate_requires_account_id() {
    let env = test_setup!();

    let err = env
        .provider(ApiVersion::V2)
        .authenticate(&TenantCredential::new("ck", "cs"))
        .await
        .unwrap_err();

    assert!(matches!(err, ProvisionError::Config(_)), "{}", err);
    assert_eq!(env.request_count().await, 0);
}

#[tokio::test]
async fn authenticate_ignores_v1_token_field() {
    let env = test_setup!();

    Mock::given(method("POST"))
        .and(path("/v2/auth/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "access_token": "T" })))
        .mount(&env.server)
        .await;

    let err = env
        .provider(ApiVersion::V2)
        .authenticate(&tenant())
        .await
        .unwrap_err();
    assert!(matches!(err, ProvisionError::MalformedResponse { .. }), "{}", err);
}

#[tokio::test]
async fn authenticate_surfaces_rejection() {
    let env = test_setup!();

    Mock::given(method("POST"))
        .and(path("/v2/auth/token"))
        .respond_with(ResponseTemplate::new(403).set_body_string("Authentication failed"))
        .mount(&env.server)
        .await;

    let err = env
        .provider(ApiVersion::V2)
        .authenticate(&tenant())
        .await
        .unwrap_err();
    assert!(
        matches!(err, ProvisionError::Authentication { status: 403, ref body } if body == "Authentication failed"),
        "{}",
        err
    );
}

#[tokio::test]
async fn create_permission_posts_bucket_names() {
    let env = test_setup!();

    Mock::given(method("POST"))
        .and(path("/v2/permissions"))
        .and(header("authorization", "Bearer tok"))
        .and(body_json(json!({
            "name": "pf-abcdefgh",
            "description": "pf-abcdefgh",
            "type": "bucket-names",
            "actions": "all-operations",
            "buckets": ["pf-abcdefgh*"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "id": "P2" })))
        .expect(1)
        .mount(&env.server)
        .await;

    let id = env
        .provider(ApiVersion::V2)
        .create_permission(&AccessToken::new("tok"), &PermissionSpec::for_prefix(&prefix()))
        .await
        .unwrap();
    assert_eq!(id.as_str(), "P2");
}

#[tokio::test]
async fn create_permission_requires_id() {
    let env = test_setup!();

    Mock::given(method("POST"))
        .and(path("/v2/permissions"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .mount(&env.server)
        .await;

    let err = env
        .provider(ApiVersion::V2)
        .create_permission(&AccessToken::new("tok"), &PermissionSpec::for_prefix(&prefix()))
        .await
        .unwrap_err();
    assert!(matches!(err, ProvisionError::MalformedResponse { .. }), "{}", err);
}

#[tokio::test]
async fn create_service_account_reads_camel_case_keys() {
    let env = test_setup!();

    Mock::given(method("POST"))
        .and(path("/v2/service-accounts"))
        .and(header("authorization", "Bearer tok"))
        .and(body_json(json!({
            "name": "pf-abcdefgh",
            "description": "Service account for pf-abcdefgh",
            "permissions": ["P2"]
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "sa-1",
            "accessKey": "AK",
            "secret": "SK"
        })))
        .expect(1)
        .mount(&env.server)
        .await;

    let credential = env
        .provider(ApiVersion::V2)
        .create_service_account(
            &AccessToken::new("tok"),
            &ServiceAccountSpec::for_prefix(&prefix()),
            &PermissionId::new("P2"),
        )
        .await
        .unwrap();

    assert_eq!(credential.access_key(), "AK");
    assert_eq!(credential.access_secret(), "SK");
}

#[tokio::test]
async fn create_service_account_failure_carries_status() {
    let env = test_setup!();

    Mock::given(method("POST"))
        .and(path("/v2/service-accounts"))
        .respond_with(ResponseTemplate::new(400).set_body_string("permission not found"))
        .mount(&env.server)
        .await;

    let err = env
        .provider(ApiVersion::V2)
        .create_service_account(
            &AccessToken::new("tok"),
            &ServiceAccountSpec::for_prefix(&prefix()),
            &PermissionId::new("missing"),
        )
        .await
        .unwrap_err();

    assert_eq!(err.status(), Some(400));
    assert!(err.to_string().contains("permission not found"));
}
