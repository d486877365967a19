//! Typed tool inputs.
//!
//! These structs exist to publish a JSON schema per tool. They are serialized
//! straight back into `Params` and validated by the dispatcher against the
//! operation table, which stays the single source of truth for defaults and
//! cross-field rules.

use crate::error::{RdsError, RdsResult};
use crate::models::{ParameterChange, Params};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Convert a typed input into dispatcher parameters.
pub fn to_params<T: Serialize>(input: &T) -> RdsResult<Params> {
    let value = serde_json::to_value(input)
        .map_err(|e| RdsError::internal(format!("Failed to serialize tool input: {}", e)))?;
    Params::from_value(value)
        .ok_or_else(|| RdsError::internal("Tool input did not serialize to an object"))
}

// ============================================================================
// Clusters
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateDbClusterInput {
    /// Cluster identifier: starts with a letter, letters/digits/hyphens, max 63 characters
    pub db_cluster_identifier: String,
    /// Database engine, e.g. "aurora-mysql" or "aurora-postgresql"
    pub engine: String,
    /// Master user name
    pub master_username: String,
    /// Let RDS manage the master password in Secrets Manager. Default: true
    #[serde(default)]
    pub manage_master_user_password: Option<bool>,
    /// Name of the initial database
    #[serde(default)]
    pub database_name: Option<String>,
    #[serde(default)]
    pub vpc_security_group_ids: Option<Vec<String>>,
    #[serde(default)]
    pub db_subnet_group_name: Option<String>,
    #[serde(default)]
    pub availability_zones: Option<Vec<String>>,
    /// Days to keep automated backups (1-35)
    #[serde(default)]
    pub backup_retention_period: Option<i64>,
    /// Port (1150-65535)
    #[serde(default)]
    pub port: Option<i64>,
    #[serde(default)]
    pub engine_version: Option<String>,
    #[serde(default)]
    pub db_cluster_parameter_group_name: Option<String>,
    #[serde(default)]
    pub storage_encrypted: Option<bool>,
    #[serde(default)]
    pub deletion_protection: Option<bool>,
    /// Resource tags as key/value pairs
    #[serde(default)]
    pub tags: Option<BTreeMap<String, String>>,
    /// Token from a previous confirmation request. Omit on the first call.
    #[serde(default)]
    pub confirmation_token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ModifyDbClusterInput {
    pub db_cluster_identifier: String,
    /// Apply now instead of in the next maintenance window. Default: false
    #[serde(default)]
    pub apply_immediately: Option<bool>,
    /// Days to keep automated backups (1-35)
    #[serde(default)]
    pub backup_retention_period: Option<i64>,
    #[serde(default)]
    pub db_cluster_parameter_group_name: Option<String>,
    #[serde(default)]
    pub vpc_security_group_ids: Option<Vec<String>>,
    /// Port (1150-65535)
    #[serde(default)]
    pub port: Option<i64>,
    #[serde(default)]
    pub manage_master_user_password: Option<bool>,
    #[serde(default)]
    pub engine_version: Option<String>,
    #[serde(default)]
    pub allow_major_version_upgrade: Option<bool>,
    /// Daily backup window, e.g. "03:00-04:00"
    #[serde(default)]
    pub preferred_backup_window: Option<String>,
    /// Weekly maintenance window, e.g. "sun:05:00-sun:06:00"
    #[serde(default)]
    pub preferred_maintenance_window: Option<String>,
    #[serde(default)]
    pub deletion_protection: Option<bool>,
    /// Token from a previous confirmation request. Omit on the first call.
    #[serde(default)]
    pub confirmation_token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct DeleteDbClusterInput {
    pub db_cluster_identifier: String,
    /// Skip the final snapshot. Default: false
    #[serde(default)]
    pub skip_final_snapshot: Option<bool>,
    /// Name of the final snapshot taken before deletion
    #[serde(default)]
    pub final_db_snapshot_identifier: Option<String>,
    /// Token from a previous confirmation request. Omit on the first call.
    #[serde(default)]
    pub confirmation_token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ChangeDbClusterStatusInput {
    pub db_cluster_identifier: String,
    /// One of "start", "stop", "reboot"
    pub action: String,
    /// Token from a previous confirmation request. Omit on the first call.
    #[serde(default)]
    pub confirmation_token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct FailoverDbClusterInput {
    pub db_cluster_identifier: String,
    /// Reader instance to promote. RDS picks one when omitted.
    #[serde(default)]
    pub target_db_instance_identifier: Option<String>,
    /// Token from a previous confirmation request. Omit on the first call.
    #[serde(default)]
    pub confirmation_token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct DescribeDbClustersInput {
    /// Restrict to one cluster
    #[serde(default)]
    pub db_cluster_identifier: Option<String>,
    /// Maximum items to return; can only lower the server's limit
    #[serde(default)]
    pub max_items: Option<i64>,
}

// ============================================================================
// Snapshots and restores
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateDbClusterSnapshotInput {
    /// Snapshot identifier, max 255 characters
    pub db_cluster_snapshot_identifier: String,
    /// Cluster to snapshot
    pub db_cluster_identifier: String,
    #[serde(default)]
    pub tags: Option<BTreeMap<String, String>>,
    /// Token from a previous confirmation request. Omit on the first call.
    #[serde(default)]
    pub confirmation_token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct DeleteDbClusterSnapshotInput {
    pub db_cluster_snapshot_identifier: String,
    /// Token from a previous confirmation request. Omit on the first call.
    #[serde(default)]
    pub confirmation_token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RestoreDbClusterFromSnapshotInput {
    /// Identifier of the new cluster
    pub db_cluster_identifier: String,
    /// Cluster snapshot to restore from, by name or ARN
    pub snapshot_identifier: String,
    pub engine: String,
    #[serde(default)]
    pub engine_version: Option<String>,
    #[serde(default)]
    pub vpc_security_group_ids: Option<Vec<String>>,
    #[serde(default)]
    pub db_subnet_group_name: Option<String>,
    #[serde(default)]
    pub availability_zones: Option<Vec<String>>,
    #[serde(default)]
    pub port: Option<i64>,
    #[serde(default)]
    pub tags: Option<BTreeMap<String, String>>,
    /// Token from a previous confirmation request. Omit on the first call.
    #[serde(default)]
    pub confirmation_token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RestoreDbClusterToPointInTimeInput {
    /// Identifier of the new cluster
    pub db_cluster_identifier: String,
    /// Cluster whose backups are used
    pub source_db_cluster_identifier: String,
    /// RFC 3339 timestamp, e.g. "2024-05-01T12:00:00Z". Exclusive with use_latest_restorable_time
    #[serde(default)]
    pub restore_to_time: Option<String>,
    #[serde(default)]
    pub use_latest_restorable_time: Option<bool>,
    #[serde(default)]
    pub port: Option<i64>,
    #[serde(default)]
    pub db_subnet_group_name: Option<String>,
    #[serde(default)]
    pub vpc_security_group_ids: Option<Vec<String>>,
    #[serde(default)]
    pub tags: Option<BTreeMap<String, String>>,
    /// Token from a previous confirmation request. Omit on the first call.
    #[serde(default)]
    pub confirmation_token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct DescribeDbClusterSnapshotsInput {
    #[serde(default)]
    pub db_cluster_identifier: Option<String>,
    #[serde(default)]
    pub db_cluster_snapshot_identifier: Option<String>,
    /// "automated", "manual", "shared", "public" or "awsbackup"
    #[serde(default)]
    pub snapshot_type: Option<String>,
    /// Maximum items to return; can only lower the server's limit
    #[serde(default)]
    pub max_items: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct DescribeDbClusterAutomatedBackupsInput {
    /// Restrict to backups of one cluster, including deleted clusters
    #[serde(default)]
    pub db_cluster_identifier: Option<String>,
    #[serde(default)]
    pub db_cluster_resource_id: Option<String>,
    /// Maximum items to return; can only lower the server's limit
    #[serde(default)]
    pub max_items: Option<i64>,
}

// ============================================================================
// Instances
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateDbInstanceInput {
    /// Instance identifier: starts with a letter, letters/digits/hyphens, max 63 characters
    pub db_instance_identifier: String,
    /// Instance class, e.g. "db.r6g.large"
    pub db_instance_class: String,
    pub engine: String,
    /// Storage in GiB. Not used for Aurora cluster members.
    #[serde(default)]
    pub allocated_storage: Option<i64>,
    #[serde(default)]
    pub master_username: Option<String>,
    /// Explicit password. Requires manage_master_user_password to be false.
    #[serde(default)]
    pub master_user_password: Option<String>,
    /// Default: true
    #[serde(default)]
    pub manage_master_user_password: Option<bool>,
    #[serde(default)]
    pub db_name: Option<String>,
    /// Cluster to join
    #[serde(default)]
    pub db_cluster_identifier: Option<String>,
    #[serde(default)]
    pub vpc_security_group_ids: Option<Vec<String>>,
    #[serde(default)]
    pub availability_zone: Option<String>,
    #[serde(default)]
    pub db_subnet_group_name: Option<String>,
    /// Default: false
    #[serde(default)]
    pub multi_az: Option<bool>,
    #[serde(default)]
    pub engine_version: Option<String>,
    #[serde(default)]
    pub storage_type: Option<String>,
    #[serde(default)]
    pub storage_encrypted: Option<bool>,
    #[serde(default)]
    pub port: Option<i64>,
    #[serde(default)]
    pub publicly_accessible: Option<bool>,
    /// Days to keep automated backups (0-35)
    #[serde(default)]
    pub backup_retention_period: Option<i64>,
    #[serde(default)]
    pub db_parameter_group_name: Option<String>,
    #[serde(default)]
    pub tags: Option<BTreeMap<String, String>>,
    /// Token from a previous confirmation request. Omit on the first call.
    #[serde(default)]
    pub confirmation_token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ModifyDbInstanceInput {
    pub db_instance_identifier: String,
    /// Apply now instead of in the next maintenance window. Default: false
    #[serde(default)]
    pub apply_immediately: Option<bool>,
    #[serde(default)]
    pub allocated_storage: Option<i64>,
    #[serde(default)]
    pub db_instance_class: Option<String>,
    #[serde(default)]
    pub storage_type: Option<String>,
    /// Days to keep automated backups (0-35)
    #[serde(default)]
    pub backup_retention_period: Option<i64>,
    #[serde(default)]
    pub preferred_backup_window: Option<String>,
    #[serde(default)]
    pub preferred_maintenance_window: Option<String>,
    #[serde(default)]
    pub multi_az: Option<bool>,
    #[serde(default)]
    pub engine_version: Option<String>,
    #[serde(default)]
    pub allow_major_version_upgrade: Option<bool>,
    #[serde(default)]
    pub auto_minor_version_upgrade: Option<bool>,
    #[serde(default)]
    pub publicly_accessible: Option<bool>,
    #[serde(default)]
    pub vpc_security_group_ids: Option<Vec<String>>,
    #[serde(default)]
    pub db_parameter_group_name: Option<String>,
    #[serde(default)]
    pub manage_master_user_password: Option<bool>,
    #[serde(default)]
    pub deletion_protection: Option<bool>,
    /// Token from a previous confirmation request. Omit on the first call.
    #[serde(default)]
    pub confirmation_token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct DeleteDbInstanceInput {
    pub db_instance_identifier: String,
    /// Skip the final snapshot. Default: false
    #[serde(default)]
    pub skip_final_snapshot: Option<bool>,
    #[serde(default)]
    pub final_db_snapshot_identifier: Option<String>,
    #[serde(default)]
    pub delete_automated_backups: Option<bool>,
    /// Token from a previous confirmation request. Omit on the first call.
    #[serde(default)]
    pub confirmation_token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ChangeDbInstanceStatusInput {
    pub db_instance_identifier: String,
    /// One of "start", "stop", "reboot"
    pub action: String,
    /// Fail over to the standby while rebooting. Only valid with "reboot".
    #[serde(default)]
    pub force_failover: Option<bool>,
    /// Token from a previous confirmation request. Omit on the first call.
    #[serde(default)]
    pub confirmation_token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct DescribeDbInstancesInput {
    /// Restrict to one instance
    #[serde(default)]
    pub db_instance_identifier: Option<String>,
    /// Maximum items to return; can only lower the server's limit
    #[serde(default)]
    pub max_items: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct DescribeDbSnapshotsInput {
    #[serde(default)]
    pub db_instance_identifier: Option<String>,
    /// Snapshot name; automated snapshots are prefixed with "rds:"
    #[serde(default)]
    pub db_snapshot_identifier: Option<String>,
    /// "automated", "manual", "shared", "public" or "awsbackup"
    #[serde(default)]
    pub snapshot_type: Option<String>,
    /// Maximum items to return; can only lower the server's limit
    #[serde(default)]
    pub max_items: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct DescribeDbInstanceAutomatedBackupsInput {
    #[serde(default)]
    pub db_instance_identifier: Option<String>,
    #[serde(default)]
    pub dbi_resource_id: Option<String>,
    /// Maximum items to return; can only lower the server's limit
    #[serde(default)]
    pub max_items: Option<i64>,
}

// ============================================================================
// Parameter groups
// ============================================================================

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateDbClusterParameterGroupInput {
    pub db_cluster_parameter_group_name: String,
    /// Parameter group family, e.g. "aurora-postgresql15"
    pub db_parameter_group_family: String,
    pub description: String,
    #[serde(default)]
    pub tags: Option<BTreeMap<String, String>>,
    /// Token from a previous confirmation request. Omit on the first call.
    #[serde(default)]
    pub confirmation_token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct CreateDbInstanceParameterGroupInput {
    pub db_parameter_group_name: String,
    /// Parameter group family, e.g. "mysql8.0"
    pub db_parameter_group_family: String,
    pub description: String,
    #[serde(default)]
    pub tags: Option<BTreeMap<String, String>>,
    /// Token from a previous confirmation request. Omit on the first call.
    #[serde(default)]
    pub confirmation_token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ModifyDbClusterParameterGroupInput {
    pub db_cluster_parameter_group_name: String,
    /// 1 to 20 parameter changes
    pub parameters: Vec<ParameterChange>,
    /// Token from a previous confirmation request. Omit on the first call.
    #[serde(default)]
    pub confirmation_token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ModifyDbInstanceParameterGroupInput {
    pub db_parameter_group_name: String,
    /// 1 to 20 parameter changes
    pub parameters: Vec<ParameterChange>,
    /// Token from a previous confirmation request. Omit on the first call.
    #[serde(default)]
    pub confirmation_token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ResetDbClusterParameterGroupInput {
    pub db_cluster_parameter_group_name: String,
    /// Reset every parameter. Exclusive with parameters. Default: false
    #[serde(default)]
    pub reset_all_parameters: Option<bool>,
    /// Parameters to reset to their defaults
    #[serde(default)]
    pub parameters: Option<Vec<ParameterChange>>,
    /// Token from a previous confirmation request. Omit on the first call.
    #[serde(default)]
    pub confirmation_token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ResetDbInstanceParameterGroupInput {
    pub db_parameter_group_name: String,
    /// Reset every parameter. Exclusive with parameters. Default: false
    #[serde(default)]
    pub reset_all_parameters: Option<bool>,
    /// Parameters to reset to their defaults
    #[serde(default)]
    pub parameters: Option<Vec<ParameterChange>>,
    /// Token from a previous confirmation request. Omit on the first call.
    #[serde(default)]
    pub confirmation_token: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct DescribeDbClusterParameterGroupsInput {
    #[serde(default)]
    pub db_cluster_parameter_group_name: Option<String>,
    #[serde(default)]
    pub max_items: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct DescribeDbInstanceParameterGroupsInput {
    #[serde(default)]
    pub db_parameter_group_name: Option<String>,
    #[serde(default)]
    pub max_items: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct DescribeDbClusterParametersInput {
    pub db_cluster_parameter_group_name: String,
    /// "user", "engine-default" or "system"
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub max_items: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct DescribeDbInstanceParametersInput {
    pub db_parameter_group_name: String,
    /// "user", "engine-default" or "system"
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub max_items: Option<i64>,
}

// ============================================================================
// Resource views
// ============================================================================

/// Input for ListDBClusters and ListDBInstances.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct ListInput {
    #[serde(default)]
    pub max_items: Option<i64>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GetDbClusterInput {
    pub db_cluster_identifier: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct GetDbInstanceInput {
    pub db_instance_identifier: String,
}
