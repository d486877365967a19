//! Integration tests for provider error translation and throttle retries.

mod common;

use common::{FixtureRds, dispatcher, request};
use rds_mcp_server::ErrorKind;
use rds_mcp_server::models::Operation;
use serde_json::json;
use std::sync::Arc;

fn get_cluster() -> rds_mcp_server::models::ToolRequest {
    request(
        Operation::GetDbCluster,
        json!({ "db_cluster_identifier": "prod-db-1" }),
    )
}

#[tokio::test]
async fn test_provider_codes_map_to_taxonomy() {
    let cases = [
        ("DBClusterNotFoundFault", ErrorKind::ResourceNotFound),
        ("DBInstanceNotFound", ErrorKind::ResourceNotFound),
        ("DBClusterAlreadyExistsFault", ErrorKind::ResourceAlreadyExists),
        ("DBParameterGroupAlreadyExists", ErrorKind::ResourceAlreadyExists),
        ("InvalidParameterCombination", ErrorKind::ProviderRejected),
        ("InvalidDBClusterStateFault", ErrorKind::ProviderRejected),
        ("StorageQuotaExceeded", ErrorKind::ProviderRejected),
        ("AccessDenied", ErrorKind::ProviderRejected),
        ("ExpiredToken", ErrorKind::CredentialsUnavailable),
        ("SignatureDoesNotMatch", ErrorKind::CredentialsUnavailable),
        ("SomethingNobodyHasSeen", ErrorKind::Unknown),
    ];

    for (code, expected) in cases {
        let api = Arc::new(
            FixtureRds::new()
                .with_cluster("prod-db-1", "available")
                .failing_with(code, "provider said no"),
        );
        let dispatcher = dispatcher(api.clone(), true);

        let envelope = dispatcher.dispatch(get_cluster()).await.unwrap_err();

        assert_eq!(envelope.kind, expected, "code {}", code);
        assert_eq!(envelope.provider_code.as_deref(), Some(code));
        assert!(envelope.message.contains("provider said no"));
        assert!(!envelope.retryable, "code {}", code);
        assert_eq!(api.execute_calls(), 1, "code {} must not be retried", code);
    }
}

#[tokio::test]
async fn test_throttling_is_retried_until_success() {
    let api = Arc::new(
        FixtureRds::new()
            .with_cluster("prod-db-1", "available")
            .throttle_next(2),
    );
    let dispatcher = dispatcher(api.clone(), true);

    let result = dispatcher.dispatch(get_cluster()).await.unwrap();

    assert_eq!(result.data["cluster_id"], "prod-db-1");
    assert_eq!(api.execute_calls(), 3);
}

#[tokio::test]
async fn test_throttling_exhausts_retries() {
    let api = Arc::new(
        FixtureRds::new()
            .with_cluster("prod-db-1", "available")
            .throttle_next(10),
    );
    let dispatcher = dispatcher(api.clone(), true);

    let envelope = dispatcher.dispatch(get_cluster()).await.unwrap_err();

    assert_eq!(envelope.kind, ErrorKind::ProviderThrottled);
    assert_eq!(envelope.provider_code.as_deref(), Some("ThrottlingException"));
    assert!(envelope.retryable);
    assert!(envelope.suggestion.is_some());
    assert_eq!(api.execute_calls(), 4);
}

#[tokio::test]
async fn test_missing_resource_reports_not_found() {
    let api = Arc::new(FixtureRds::new());
    let dispatcher = dispatcher(api.clone(), true);

    let envelope = dispatcher
        .dispatch(request(
            Operation::GetDbInstance,
            json!({ "db_instance_identifier": "db-404" }),
        ))
        .await
        .unwrap_err();

    assert_eq!(envelope.kind, ErrorKind::ResourceNotFound);
    assert_eq!(envelope.provider_code.as_deref(), Some("DBInstanceNotFound"));
    assert!(envelope.message.contains("db-404"));
}

#[tokio::test]
async fn test_provider_failure_after_confirmation_consumes_token() {
    let api = Arc::new(FixtureRds::new());
    let dispatcher = dispatcher(api.clone(), false);
    let params = json!({ "db_cluster_identifier": "gone-db", "skip_final_snapshot": true });

    let token = dispatcher
        .dispatch(request(Operation::DeleteDbCluster, params.clone()))
        .await
        .unwrap_err()
        .confirmation
        .unwrap()
        .token;

    let mut confirmed = params.clone();
    confirmed["confirmation_token"] = json!(token);
    let envelope = dispatcher
        .dispatch(request(Operation::DeleteDbCluster, confirmed))
        .await
        .unwrap_err();

    assert_eq!(envelope.kind, ErrorKind::ResourceNotFound);
    assert_eq!(api.execute_calls(), 1);
    assert_eq!(dispatcher.confirmations().count().await, 0);
}
