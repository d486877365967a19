//! Resource documents.
//!
//! Stable, provider-independent shapes returned to callers. The AWS adapter
//! converts SDK outputs into these; test fixtures build them directly.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const CLUSTER_URI_PREFIX: &str = "aws-rds://db-cluster";
pub const INSTANCE_URI_PREFIX: &str = "aws-rds://db-instance";

pub fn cluster_uri(cluster_id: &str) -> String {
    format!("{}/{}", CLUSTER_URI_PREFIX, cluster_id)
}

pub fn instance_uri(instance_id: &str) -> String {
    format!("{}/{}", INSTANCE_URI_PREFIX, instance_id)
}

pub fn cluster_backups_uri(cluster_id: &str) -> String {
    format!("{}/backups", cluster_uri(cluster_id))
}

pub fn instance_backups_uri(instance_id: &str) -> String {
    format!("{}/backups", instance_uri(instance_id))
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterMember {
    pub instance_id: String,
    pub is_writer: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub promotion_tier: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterDocument {
    pub cluster_id: String,
    pub status: String,
    pub engine: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reader_endpoint: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<i32>,
    pub multi_az: bool,
    /// Days
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_retention: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_backup_window: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_maintenance_window: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_time: Option<DateTime<Utc>>,
    pub members: Vec<ClusterMember>,
    pub vpc_security_groups: Vec<String>,
    pub tags: BTreeMap<String, String>,
    pub resource_uri: String,
}

impl ClusterDocument {
    /// Create a document with the required fields set.
    pub fn new(
        cluster_id: impl Into<String>,
        status: impl Into<String>,
        engine: impl Into<String>,
    ) -> Self {
        let cluster_id = cluster_id.into();
        Self {
            resource_uri: cluster_uri(&cluster_id),
            cluster_id,
            status: status.into(),
            engine: engine.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    pub address: String,
    pub port: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hosted_zone_id: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InstanceDocument {
    pub instance_id: String,
    pub status: String,
    pub engine: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_class: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<Endpoint>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability_zone: Option<String>,
    pub multi_az: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_type: Option<String>,
    /// GiB
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allocated_storage: Option<i32>,
    pub publicly_accessible: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub db_cluster: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub resource_id: Option<String>,
    pub vpc_security_groups: Vec<String>,
    pub tags: BTreeMap<String, String>,
    pub resource_uri: String,
}

impl InstanceDocument {
    /// Create a document with the required fields set.
    pub fn new(
        instance_id: impl Into<String>,
        status: impl Into<String>,
        engine: impl Into<String>,
    ) -> Self {
        let instance_id = instance_id.into();
        Self {
            resource_uri: instance_uri(&instance_id),
            instance_id,
            status: status.into(),
            engine: engine.into(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClusterSnapshotDocument {
    pub snapshot_id: String,
    pub cluster_id: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent_progress: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_time: Option<DateTime<Utc>>,
    pub tags: BTreeMap<String, String>,
}

/// Manual or automated snapshot of a single DB instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DbSnapshotDocument {
    pub snapshot_id: String,
    pub instance_id: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vpc_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent_progress: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_time: Option<DateTime<Utc>>,
    pub tags: BTreeMap<String, String>,
    pub resource_uri: String,
}

/// Retained automated backup of a cluster or an instance. Exactly one of
/// `cluster_id` and `instance_id` is set.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AutomatedBackupDocument {
    /// ARN of the automated backup
    pub backup_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cluster_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub engine_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub earliest_restorable_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub latest_restorable_time: Option<DateTime<Utc>>,
    /// Days
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backup_retention: Option<i32>,
    pub resource_uri: String,
}

/// Cluster and instance parameter groups share this shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterGroupDocument {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,
    pub tags: BTreeMap<String, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterDocument {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// "static" or "dynamic"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apply_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub apply_method: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allowed_values: Option<String>,
    pub is_modifiable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Outcome of a parameter group modify or reset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterGroupChangeDocument {
    pub name: String,
    pub parameters_changed: usize,
    pub reset_all: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cluster_document_uri() {
        let doc = ClusterDocument::new("prod-db-1", "available", "aurora-postgresql");
        assert_eq!(doc.resource_uri, "aws-rds://db-cluster/prod-db-1");
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["cluster_id"], "prod-db-1");
        assert!(json.get("endpoint").is_none());
    }

    #[test]
    fn test_backup_uris() {
        assert_eq!(cluster_backups_uri("prod-db-1"), "aws-rds://db-cluster/prod-db-1/backups");
        assert_eq!(instance_backups_uri("db-1"), "aws-rds://db-instance/db-1/backups");
    }

    #[test]
    fn test_instance_document_uri() {
        let doc = InstanceDocument::new("db-1", "available", "mysql");
        assert_eq!(doc.resource_uri, "aws-rds://db-instance/db-1");
    }
}
