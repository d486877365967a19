//! End-to-end scenarios through the dispatcher against the in-memory provider.

mod common;

use common::{FixtureRds, dispatcher, request};
use rds_mcp_server::ErrorKind;
use rds_mcp_server::models::Operation;
use serde_json::{Value, json};
use std::sync::Arc;

/// Run a mutating call through the full confirm-then-execute round trip.
async fn confirmed(
    dispatcher: &rds_mcp_server::Dispatcher,
    operation: Operation,
    params: Value,
) -> Result<rds_mcp_server::models::ToolResult, rds_mcp_server::ErrorEnvelope> {
    let envelope = dispatcher
        .dispatch(request(operation, params.clone()))
        .await
        .unwrap_err();
    assert_eq!(envelope.kind, ErrorKind::ConfirmationRequired);
    let token = envelope.confirmation.unwrap().token;

    let mut params = params;
    params["confirmation_token"] = json!(token);
    dispatcher.dispatch(request(operation, params)).await
}

#[tokio::test]
async fn test_delete_cluster_round_trip() {
    let api = Arc::new(FixtureRds::new().with_cluster("prod-db-1", "available"));
    let dispatcher = dispatcher(api.clone(), false);
    let params = json!({ "db_cluster_identifier": "prod-db-1" });

    let first = dispatcher
        .dispatch(request(Operation::DeleteDbCluster, params.clone()))
        .await
        .unwrap_err();
    assert_eq!(first.kind, ErrorKind::ConfirmationRequired);
    let token = first.confirmation.unwrap().token;
    assert_eq!(api.calls(), 0);

    let mut with_token = params.clone();
    with_token["confirmation_token"] = json!(token);
    let result = dispatcher
        .dispatch(request(Operation::DeleteDbCluster, with_token.clone()))
        .await
        .unwrap();
    assert!(result.success);
    assert_eq!(result.operation, "DeleteDBCluster");
    let (_, executed) = api.executed().pop().unwrap();
    assert_eq!(executed.get_bool("skip_final_snapshot"), Some(false));
    assert!(!executed.contains("final_db_snapshot_identifier"));
    assert_eq!(
        result.message.as_deref(),
        Some("DB cluster prod-db-1 deletion initiated")
    );
    assert_eq!(result.data["status"], "deleting");
    assert_eq!(result.truncated, None);
    assert_eq!(api.execute_calls(), 1);
    assert!(api.cluster("prod-db-1").is_none());

    let third = dispatcher
        .dispatch(request(Operation::DeleteDbCluster, with_token))
        .await
        .unwrap_err();
    assert_eq!(third.kind, ErrorKind::ConfirmationRequired);
    assert_eq!(api.execute_calls(), 1);
}

#[tokio::test]
async fn test_describe_instances_with_small_cap() {
    let api = Arc::new(FixtureRds::new().with_instances(5));
    let dispatcher = dispatcher(api.clone(), true);

    let result = dispatcher
        .dispatch(request(Operation::DescribeDbInstances, json!({ "max_items": 2 })))
        .await
        .unwrap();

    assert!(result.success);
    assert_eq!(result.items().len(), 2);
    assert_eq!(result.data["count"], 2);
    assert_eq!(result.truncated, Some(true));
    assert_eq!(result.items()[0]["resource_uri"], "aws-rds://db-instance/db-000");
}

#[tokio::test]
async fn test_cluster_lifecycle() {
    let api = Arc::new(FixtureRds::new());
    let dispatcher = dispatcher(api.clone(), false);

    let created = confirmed(
        &dispatcher,
        Operation::CreateDbCluster,
        json!({
            "db_cluster_identifier": "Orders-DB",
            "engine": "aurora-postgresql",
            "master_username": "admin",
            "tags": { "team": "payments" },
        }),
    )
    .await
    .unwrap();
    assert_eq!(created.data["cluster_id"], "orders-db");
    assert_eq!(created.data["status"], "creating");

    // Defaults are applied before the provider sees the request.
    let (_, params) = api.executed().pop().unwrap();
    assert_eq!(params.get_bool("manage_master_user_password"), Some(true));
    assert!(!params.contains("confirmation_token"));

    let duplicate = confirmed(
        &dispatcher,
        Operation::CreateDbCluster,
        json!({
            "db_cluster_identifier": "orders-db",
            "engine": "aurora-postgresql",
            "master_username": "admin",
        }),
    )
    .await
    .unwrap_err();
    assert_eq!(duplicate.kind, ErrorKind::ResourceAlreadyExists);

    let fetched = dispatcher
        .dispatch(request(
            Operation::GetDbCluster,
            json!({ "db_cluster_identifier": "orders-db" }),
        ))
        .await
        .unwrap();
    assert_eq!(fetched.data["engine"], "aurora-postgresql");

    let stopped = confirmed(
        &dispatcher,
        Operation::ChangeDbClusterStatus,
        json!({ "db_cluster_identifier": "orders-db", "action": "stop" }),
    )
    .await
    .unwrap();
    assert_eq!(stopped.data["status"], "stopping");

    let listed = dispatcher
        .dispatch(request(Operation::ListDbClusters, json!({})))
        .await
        .unwrap();
    assert_eq!(listed.items().len(), 1);
    assert_eq!(listed.truncated, Some(false));

    confirmed(
        &dispatcher,
        Operation::DeleteDbCluster,
        json!({
            "db_cluster_identifier": "orders-db",
            "final_db_snapshot_identifier": "orders-db-final",
        }),
    )
    .await
    .unwrap();

    let gone = dispatcher
        .dispatch(request(
            Operation::GetDbCluster,
            json!({ "db_cluster_identifier": "orders-db" }),
        ))
        .await
        .unwrap_err();
    assert_eq!(gone.kind, ErrorKind::ResourceNotFound);
    assert_eq!(dispatcher.confirmations().count().await, 0);
}
