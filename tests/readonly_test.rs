//! Integration tests for the readonly gate.

mod common;

use common::{FixtureRds, dispatcher, request, valid_params};
use rds_mcp_server::ErrorKind;
use rds_mcp_server::models::Operation;
use serde_json::json;
use std::sync::Arc;

#[tokio::test]
async fn test_readonly_blocks_every_mutating_operation() {
    let api = Arc::new(FixtureRds::new().with_cluster("prod-db-1", "available"));
    let dispatcher = dispatcher(api.clone(), true);

    let mut blocked = 0;
    for operation in Operation::ALL {
        if !operation.descriptor().mutates {
            continue;
        }
        let envelope = dispatcher
            .dispatch(request(operation, valid_params(operation)))
            .await
            .unwrap_err();
        assert_eq!(
            envelope.kind,
            ErrorKind::ReadonlyViolation,
            "{} should be blocked",
            operation
        );
        assert!(envelope.message.contains(operation.name()));
        assert!(envelope.suggestion.is_some());
        assert!(envelope.confirmation.is_none());
        blocked += 1;
    }

    assert_eq!(blocked, 19);
    assert_eq!(api.calls(), 0);
    assert_eq!(dispatcher.confirmations().count().await, 0);
}

#[tokio::test]
async fn test_readonly_ignores_confirmation_token() {
    let api = Arc::new(FixtureRds::new().with_cluster("prod-db-1", "available"));
    let dispatcher = dispatcher(api.clone(), true);

    let envelope = dispatcher
        .dispatch(request(
            Operation::DeleteDbCluster,
            json!({
                "db_cluster_identifier": "prod-db-1",
                "skip_final_snapshot": true,
                "confirmation_token": "cfm_anything",
            }),
        ))
        .await
        .unwrap_err();

    assert_eq!(envelope.kind, ErrorKind::ReadonlyViolation);
    assert_eq!(api.calls(), 0);
    assert!(api.cluster("prod-db-1").is_some());
}

#[tokio::test]
async fn test_readonly_allows_reads() {
    let api = Arc::new(
        FixtureRds::new()
            .with_cluster("prod-db-1", "available")
            .with_instances(3),
    );
    let dispatcher = dispatcher(api.clone(), true);

    for operation in Operation::ALL {
        if operation.descriptor().mutates {
            continue;
        }
        let result = dispatcher
            .dispatch(request(operation, valid_params(operation)))
            .await;
        assert!(result.is_ok(), "{} should be allowed: {:?}", operation, result.err());
    }
    assert_eq!(api.executed().len(), 2);
}

#[tokio::test]
async fn test_validation_runs_before_readonly_check() {
    let api = Arc::new(FixtureRds::new());
    let dispatcher = dispatcher(api.clone(), true);

    let envelope = dispatcher
        .dispatch(request(
            Operation::DeleteDbCluster,
            json!({ "db_cluster_identifier": "1-bad-id", "skip_final_snapshot": true }),
        ))
        .await
        .unwrap_err();

    assert_eq!(envelope.kind, ErrorKind::InvalidIdentifier);
    assert_eq!(api.calls(), 0);
}
