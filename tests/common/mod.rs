//! Shared fixtures for integration tests.
//!
//! `FixtureRds` is an in-memory stand-in for the RDS control plane: it keeps
//! clusters and instances in insertion order, counts every adapter call and
//! can be scripted to throttle or fail. Every instance carries one automated
//! snapshot and one automated backup; every cluster carries one automated
//! backup.

#![allow(dead_code)]

use async_trait::async_trait;
use rds_mcp_server::error::{ProviderError, RdsError, RdsResult};
use rds_mcp_server::models::resource::{cluster_backups_uri, instance_backups_uri};
use rds_mcp_server::models::{
    AutomatedBackupDocument, ClusterDocument, DbSnapshotDocument, InstanceDocument, Operation,
    Params, ToolRequest,
};
use rds_mcp_server::rds::{Page, PageWindow, RdsApi};
use rds_mcp_server::tools::{DispatchSettings, Dispatcher, RetryPolicy};
use serde_json::{Value, json};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

#[derive(Default)]
pub struct FixtureRds {
    clusters: Mutex<Vec<ClusterDocument>>,
    instances: Mutex<Vec<InstanceDocument>>,
    /// Number of upcoming calls that fail with a throttling error
    throttles: AtomicUsize,
    /// Provider failure returned by every `execute` call
    failure: Mutex<Option<(String, String)>>,
    /// Overrides the page size requested by the dispatcher
    page_size: Option<usize>,
    execute_calls: AtomicUsize,
    page_calls: AtomicUsize,
    executed: Mutex<Vec<(Operation, Params)>>,
}

impl FixtureRds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cluster(self, cluster_id: &str, status: &str) -> Self {
        self.clusters
            .lock()
            .unwrap()
            .push(ClusterDocument::new(cluster_id, status, "aurora-postgresql"));
        self
    }

    /// Add `count` available instances named `db-000`, `db-001`, ...
    pub fn with_instances(self, count: usize) -> Self {
        {
            let mut instances = self.instances.lock().unwrap();
            for index in 0..count {
                let mut doc =
                    InstanceDocument::new(format!("db-{:03}", index), "available", "postgres");
                doc.instance_class = Some("db.r6g.large".to_string());
                instances.push(doc);
            }
        }
        self
    }

    pub fn with_page_size(mut self, page_size: usize) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Fail every `execute` call with the given provider error code.
    pub fn failing_with(self, code: &str, message: &str) -> Self {
        *self.failure.lock().unwrap() = Some((code.to_string(), message.to_string()));
        self
    }

    /// Throttle the next `count` calls of either kind.
    pub fn throttle_next(self, count: usize) -> Self {
        self.throttles.store(count, Ordering::SeqCst);
        self
    }

    pub fn execute_calls(&self) -> usize {
        self.execute_calls.load(Ordering::SeqCst)
    }

    pub fn page_calls(&self) -> usize {
        self.page_calls.load(Ordering::SeqCst)
    }

    /// Total adapter calls of any kind.
    pub fn calls(&self) -> usize {
        self.execute_calls() + self.page_calls()
    }

    /// Operations and parameters that reached the provider successfully.
    pub fn executed(&self) -> Vec<(Operation, Params)> {
        self.executed.lock().unwrap().clone()
    }

    pub fn cluster(&self, cluster_id: &str) -> Option<ClusterDocument> {
        self.clusters
            .lock()
            .unwrap()
            .iter()
            .find(|c| c.cluster_id == cluster_id)
            .cloned()
    }

    fn take_throttle(&self) -> RdsResult<()> {
        let throttled = self
            .throttles
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if throttled {
            return Err(ProviderError::service("ThrottlingException", "Rate exceeded").into());
        }
        Ok(())
    }

    fn scripted_failure(&self) -> Option<RdsError> {
        self.failure
            .lock()
            .unwrap()
            .clone()
            .map(|(code, message)| ProviderError::service(code, message).into())
    }

    fn update_cluster(&self, params: &Params, status: &str) -> RdsResult<Value> {
        let id = params.get_str("db_cluster_identifier").unwrap_or_default();
        let mut clusters = self.clusters.lock().unwrap();
        let Some(cluster) = clusters.iter_mut().find(|c| c.cluster_id == id) else {
            return Err(cluster_not_found(id));
        };
        cluster.status = status.to_string();
        Ok(to_value(&*cluster))
    }

    fn instance_items(&self, params: &Params) -> Vec<Value> {
        self.instances_matching(params).iter().map(to_value).collect()
    }

    fn instance_snapshot_items(&self, params: &Params) -> Vec<Value> {
        let type_filter = params.get_str("snapshot_type");
        if type_filter.is_some_and(|t| t != "automated") {
            return Vec::new();
        }
        self.instances_matching(params)
            .into_iter()
            .map(|instance| {
                to_value(&DbSnapshotDocument {
                    snapshot_id: format!("rds:{}-2024-01-01-00-00", instance.instance_id),
                    resource_uri: instance_backups_uri(&instance.instance_id),
                    instance_id: instance.instance_id,
                    status: "available".to_string(),
                    snapshot_type: Some("automated".to_string()),
                    ..DbSnapshotDocument::default()
                })
            })
            .collect()
    }

    fn instance_backup_items(&self, params: &Params) -> Vec<Value> {
        self.instances_matching(params)
            .into_iter()
            .map(|instance| {
                to_value(&AutomatedBackupDocument {
                    backup_id: format!(
                        "arn:aws:rds:us-east-1:123456789012:auto-backup:{}",
                        instance.instance_id
                    ),
                    resource_uri: instance_backups_uri(&instance.instance_id),
                    instance_id: Some(instance.instance_id),
                    status: "active".to_string(),
                    ..AutomatedBackupDocument::default()
                })
            })
            .collect()
    }

    fn cluster_backup_items(&self, params: &Params) -> Vec<Value> {
        let filter = params.get_str("db_cluster_identifier");
        self.clusters
            .lock()
            .unwrap()
            .iter()
            .filter(|c| filter.is_none_or(|id| c.cluster_id == id))
            .map(|cluster| {
                to_value(&AutomatedBackupDocument {
                    backup_id: format!(
                        "arn:aws:rds:us-east-1:123456789012:cluster-auto-backup:{}",
                        cluster.cluster_id
                    ),
                    resource_uri: cluster_backups_uri(&cluster.cluster_id),
                    cluster_id: Some(cluster.cluster_id.clone()),
                    status: "retained".to_string(),
                    ..AutomatedBackupDocument::default()
                })
            })
            .collect()
    }

    fn instances_matching(&self, params: &Params) -> Vec<InstanceDocument> {
        let filter = params.get_str("db_instance_identifier");
        self.instances
            .lock()
            .unwrap()
            .iter()
            .filter(|i| filter.is_none_or(|id| i.instance_id == id))
            .cloned()
            .collect()
    }

    fn cluster_items(&self, params: &Params) -> Vec<Value> {
        let filter = params.get_str("db_cluster_identifier");
        self.clusters
            .lock()
            .unwrap()
            .iter()
            .filter(|c| filter.is_none_or(|id| c.cluster_id == id))
            .map(to_value)
            .collect()
    }
}

fn to_value<T: serde::Serialize>(doc: &T) -> Value {
    serde_json::to_value(doc).unwrap()
}

fn cluster_not_found(id: &str) -> RdsError {
    ProviderError::service(
        "DBClusterNotFoundFault",
        format!("DBCluster {} not found.", id),
    )
    .into()
}

fn instance_not_found(id: &str) -> RdsError {
    ProviderError::service(
        "DBInstanceNotFound",
        format!("DBInstance {} not found.", id),
    )
    .into()
}

#[async_trait]
impl RdsApi for FixtureRds {
    async fn execute(&self, operation: Operation, params: &Params) -> RdsResult<Value> {
        self.execute_calls.fetch_add(1, Ordering::SeqCst);
        self.take_throttle()?;
        if let Some(err) = self.scripted_failure() {
            return Err(err);
        }
        self.executed
            .lock()
            .unwrap()
            .push((operation, params.clone()));

        match operation {
            Operation::CreateDbCluster => {
                let id = params.get_str("db_cluster_identifier").unwrap_or_default();
                let mut clusters = self.clusters.lock().unwrap();
                if clusters.iter().any(|c| c.cluster_id == id) {
                    return Err(ProviderError::service(
                        "DBClusterAlreadyExistsFault",
                        "DB Cluster already exists",
                    )
                    .into());
                }
                let engine = params.get_str("engine").unwrap_or_default();
                let doc = ClusterDocument::new(id, "creating", engine);
                clusters.push(doc.clone());
                Ok(to_value(&doc))
            }
            Operation::DeleteDbCluster => {
                let id = params.get_str("db_cluster_identifier").unwrap_or_default();
                let mut clusters = self.clusters.lock().unwrap();
                let Some(index) = clusters.iter().position(|c| c.cluster_id == id) else {
                    return Err(cluster_not_found(id));
                };
                let mut doc = clusters.remove(index);
                doc.status = "deleting".to_string();
                Ok(to_value(&doc))
            }
            Operation::ChangeDbClusterStatus => {
                let status = match params.get_str("action") {
                    Some("start") => "starting",
                    Some("stop") => "stopping",
                    _ => "rebooting",
                };
                self.update_cluster(params, status)
            }
            Operation::FailoverDbCluster => self.update_cluster(params, "failing-over"),
            Operation::GetDbCluster => {
                let id = params.get_str("db_cluster_identifier").unwrap_or_default();
                self.cluster(id)
                    .map(|doc| to_value(&doc))
                    .ok_or_else(|| cluster_not_found(id))
            }
            Operation::DeleteDbInstance | Operation::GetDbInstance => {
                let id = params.get_str("db_instance_identifier").unwrap_or_default();
                let mut instances = self.instances.lock().unwrap();
                let Some(index) = instances.iter().position(|i| i.instance_id == id) else {
                    return Err(instance_not_found(id));
                };
                if operation == Operation::GetDbInstance {
                    return Ok(to_value(&instances[index]));
                }
                let mut doc = instances.remove(index);
                doc.status = "deleting".to_string();
                Ok(to_value(&doc))
            }
            _ => Ok(json!({ "operation": operation.name(), "params": params })),
        }
    }

    async fn fetch_page(
        &self,
        operation: Operation,
        params: &Params,
        window: &PageWindow,
    ) -> RdsResult<Page> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        self.take_throttle()?;

        let items = match operation {
            Operation::DescribeDbInstances | Operation::ListDbInstances => {
                self.instance_items(params)
            }
            Operation::DescribeDbClusters | Operation::ListDbClusters => {
                self.cluster_items(params)
            }
            Operation::DescribeDbSnapshots => self.instance_snapshot_items(params),
            Operation::DescribeDbInstanceAutomatedBackups => self.instance_backup_items(params),
            Operation::DescribeDbClusterAutomatedBackups => self.cluster_backup_items(params),
            _ => Vec::new(),
        };

        let start = window
            .marker
            .as_deref()
            .and_then(|marker| marker.parse::<usize>().ok())
            .unwrap_or(0)
            .min(items.len());
        let size = self
            .page_size
            .unwrap_or_else(|| usize::try_from(window.page_size).unwrap_or(1));
        let end = (start + size).min(items.len());

        Ok(Page {
            items: items[start..end].to_vec(),
            next_marker: (end < items.len()).then(|| end.to_string()),
        })
    }
}

/// Settings with a fast retry policy so throttle tests stay quick.
pub fn settings(readonly: bool) -> DispatchSettings {
    DispatchSettings {
        readonly,
        retry: RetryPolicy {
            max_retries: 3,
            base_delay: Duration::from_millis(1),
        },
        ..DispatchSettings::default()
    }
}

pub fn dispatcher(api: Arc<FixtureRds>, readonly: bool) -> Dispatcher {
    Dispatcher::new(api, settings(readonly))
}

pub fn dispatcher_with(api: Arc<FixtureRds>, settings: DispatchSettings) -> Dispatcher {
    Dispatcher::new(api, settings)
}

pub fn request(operation: Operation, params: Value) -> ToolRequest {
    ToolRequest::new(operation, Params::from_value(params).unwrap())
}

/// A parameter set that passes validation for the given operation.
pub fn valid_params(operation: Operation) -> Value {
    match operation {
        Operation::CreateDbCluster => json!({
            "db_cluster_identifier": "new-cluster",
            "engine": "aurora-postgresql",
            "master_username": "admin",
        }),
        Operation::ModifyDbCluster => json!({
            "db_cluster_identifier": "prod-db-1",
            "backup_retention_period": 7,
        }),
        Operation::DeleteDbCluster => json!({
            "db_cluster_identifier": "prod-db-1",
            "skip_final_snapshot": true,
        }),
        Operation::ChangeDbClusterStatus => json!({
            "db_cluster_identifier": "prod-db-1",
            "action": "stop",
        }),
        Operation::FailoverDbCluster => json!({ "db_cluster_identifier": "prod-db-1" }),
        Operation::CreateDbClusterSnapshot => json!({
            "db_cluster_snapshot_identifier": "prod-db-1-snap",
            "db_cluster_identifier": "prod-db-1",
        }),
        Operation::DeleteDbClusterSnapshot => json!({
            "db_cluster_snapshot_identifier": "prod-db-1-snap",
        }),
        Operation::RestoreDbClusterFromSnapshot => json!({
            "db_cluster_identifier": "restored-db",
            "snapshot_identifier": "prod-db-1-snap",
            "engine": "aurora-postgresql",
        }),
        Operation::RestoreDbClusterToPointInTime => json!({
            "db_cluster_identifier": "restored-db",
            "source_db_cluster_identifier": "prod-db-1",
            "use_latest_restorable_time": true,
        }),
        Operation::CreateDbInstance => json!({
            "db_instance_identifier": "db-new",
            "db_instance_class": "db.r6g.large",
            "engine": "postgres",
        }),
        Operation::ModifyDbInstance => json!({
            "db_instance_identifier": "db-000",
            "db_instance_class": "db.r6g.xlarge",
        }),
        Operation::DeleteDbInstance => json!({
            "db_instance_identifier": "db-000",
            "skip_final_snapshot": true,
        }),
        Operation::ChangeDbInstanceStatus => json!({
            "db_instance_identifier": "db-000",
            "action": "reboot",
        }),
        Operation::CreateDbClusterParameterGroup => json!({
            "db_cluster_parameter_group_name": "custom-cluster-params",
            "db_parameter_group_family": "aurora-postgresql15",
            "description": "Custom cluster parameters",
        }),
        Operation::CreateDbInstanceParameterGroup => json!({
            "db_parameter_group_name": "custom-params",
            "db_parameter_group_family": "postgres15",
            "description": "Custom parameters",
        }),
        Operation::ModifyDbClusterParameterGroup => json!({
            "db_cluster_parameter_group_name": "custom-cluster-params",
            "parameters": [{ "name": "log_min_duration_statement", "value": "500" }],
        }),
        Operation::ModifyDbInstanceParameterGroup => json!({
            "db_parameter_group_name": "custom-params",
            "parameters": [
                { "name": "max_connections", "value": "200", "apply_method": "pending-reboot" }
            ],
        }),
        Operation::ResetDbClusterParameterGroup => json!({
            "db_cluster_parameter_group_name": "custom-cluster-params",
            "reset_all_parameters": true,
        }),
        Operation::ResetDbInstanceParameterGroup => json!({
            "db_parameter_group_name": "custom-params",
            "parameters": [{ "name": "max_connections" }],
        }),
        Operation::DescribeDbClusterParameters => json!({
            "db_cluster_parameter_group_name": "custom-cluster-params",
        }),
        Operation::DescribeDbInstanceParameters => json!({
            "db_parameter_group_name": "custom-params",
        }),
        Operation::GetDbCluster => json!({ "db_cluster_identifier": "prod-db-1" }),
        Operation::GetDbInstance => json!({ "db_instance_identifier": "db-000" }),
        _ => json!({}),
    }
}
