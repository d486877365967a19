//! The operation table.
//!
//! Every tool the server exposes is described once here: its parameters, its
//! safety classification and the messages shown to the caller. The dispatcher
//! runs one generic routine driven entirely by these descriptors.

use super::Params;
use crate::error::{RdsError, RdsResult};
use crate::tools::identifier::ResourceKind;
use serde::Serialize;
use serde_json::Value;

/// Name of the parameter carrying a confirmation token.
pub const CONFIRMATION_TOKEN_PARAM: &str = "confirmation_token";

/// Name of the per-call cap accepted by list operations.
pub const MAX_ITEMS_PARAM: &str = "max_items";

/// Upper bound RDS accepts for parameter changes in a single modify or reset.
pub const MAX_PARAMETER_CHANGES: usize = 20;

/// Closed set of tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    CreateDbCluster,
    ModifyDbCluster,
    DeleteDbCluster,
    ChangeDbClusterStatus,
    FailoverDbCluster,
    DescribeDbClusters,
    CreateDbClusterSnapshot,
    DeleteDbClusterSnapshot,
    RestoreDbClusterFromSnapshot,
    RestoreDbClusterToPointInTime,
    DescribeDbClusterSnapshots,
    DescribeDbClusterAutomatedBackups,
    CreateDbInstance,
    ModifyDbInstance,
    DeleteDbInstance,
    ChangeDbInstanceStatus,
    DescribeDbInstances,
    DescribeDbSnapshots,
    DescribeDbInstanceAutomatedBackups,
    CreateDbClusterParameterGroup,
    CreateDbInstanceParameterGroup,
    ModifyDbClusterParameterGroup,
    ModifyDbInstanceParameterGroup,
    ResetDbClusterParameterGroup,
    ResetDbInstanceParameterGroup,
    DescribeDbClusterParameterGroups,
    DescribeDbInstanceParameterGroups,
    DescribeDbClusterParameters,
    DescribeDbInstanceParameters,
    ListDbClusters,
    GetDbCluster,
    ListDbInstances,
    GetDbInstance,
}

impl Operation {
    /// Every operation, in table order.
    pub const ALL: [Operation; 33] = [
        Operation::CreateDbCluster,
        Operation::ModifyDbCluster,
        Operation::DeleteDbCluster,
        Operation::ChangeDbClusterStatus,
        Operation::FailoverDbCluster,
        Operation::DescribeDbClusters,
        Operation::CreateDbClusterSnapshot,
        Operation::DeleteDbClusterSnapshot,
        Operation::RestoreDbClusterFromSnapshot,
        Operation::RestoreDbClusterToPointInTime,
        Operation::DescribeDbClusterSnapshots,
        Operation::DescribeDbClusterAutomatedBackups,
        Operation::CreateDbInstance,
        Operation::ModifyDbInstance,
        Operation::DeleteDbInstance,
        Operation::ChangeDbInstanceStatus,
        Operation::DescribeDbInstances,
        Operation::DescribeDbSnapshots,
        Operation::DescribeDbInstanceAutomatedBackups,
        Operation::CreateDbClusterParameterGroup,
        Operation::CreateDbInstanceParameterGroup,
        Operation::ModifyDbClusterParameterGroup,
        Operation::ModifyDbInstanceParameterGroup,
        Operation::ResetDbClusterParameterGroup,
        Operation::ResetDbInstanceParameterGroup,
        Operation::DescribeDbClusterParameterGroups,
        Operation::DescribeDbInstanceParameterGroups,
        Operation::DescribeDbClusterParameters,
        Operation::DescribeDbInstanceParameters,
        Operation::ListDbClusters,
        Operation::GetDbCluster,
        Operation::ListDbInstances,
        Operation::GetDbInstance,
    ];

    /// Static metadata for this operation.
    pub fn descriptor(&self) -> &'static OperationDescriptor {
        &DESCRIPTORS[*self as usize]
    }

    /// Tool name as exposed over MCP, e.g. "DeleteDBCluster".
    pub fn name(&self) -> &'static str {
        self.descriptor().name
    }

    /// Look up an operation by tool name.
    pub fn from_name(name: &str) -> Option<Operation> {
        Self::ALL.into_iter().find(|op| op.name() == name)
    }
}

impl std::fmt::Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

impl Serialize for Operation {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Declared type of a tool parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    String,
    Integer,
    Boolean,
    StringList,
    /// Object of string keys to string values
    Tags,
    /// Array of `{name, value?, apply_method?}`
    Parameters,
    /// RFC 3339 string
    Timestamp,
}

impl ParamType {
    pub fn name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::StringList => "array of strings",
            Self::Tags => "object of string values",
            Self::Parameters => "array of parameter objects",
            Self::Timestamp => "RFC 3339 timestamp",
        }
    }

    /// Whether `value` is a well-formed instance of this type.
    pub fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.is_i64(),
            Self::Boolean => value.is_boolean(),
            Self::StringList => value
                .as_array()
                .is_some_and(|items| items.iter().all(Value::is_string)),
            Self::Tags => value
                .as_object()
                .is_some_and(|map| map.values().all(Value::is_string)),
            Self::Parameters => {
                serde_json::from_value::<Vec<super::ParameterChange>>(value.clone()).is_ok()
            }
            Self::Timestamp => value
                .as_str()
                .is_some_and(|s| super::request::parse_timestamp(s).is_some()),
        }
    }
}

/// Default applied when an optional parameter is omitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamDefault {
    Bool(bool),
    Int(i64),
}

impl ParamDefault {
    pub fn to_value(self) -> Value {
        match self {
            Self::Bool(b) => Value::Bool(b),
            Self::Int(i) => Value::from(i),
        }
    }
}

/// One declared parameter of an operation.
#[derive(Debug, Clone, Copy)]
pub struct ParamSpec {
    pub name: &'static str,
    pub ty: ParamType,
    pub required: bool,
    pub default: Option<ParamDefault>,
    /// Set when the value names an RDS resource and must pass identifier rules.
    pub identifier: Option<ResourceKind>,
}

const fn required(name: &'static str, ty: ParamType) -> ParamSpec {
    ParamSpec {
        name,
        ty,
        required: true,
        default: None,
        identifier: None,
    }
}

const fn optional(name: &'static str, ty: ParamType) -> ParamSpec {
    ParamSpec {
        name,
        ty,
        required: false,
        default: None,
        identifier: None,
    }
}

const fn defaulted(name: &'static str, default: ParamDefault) -> ParamSpec {
    let ty = match default {
        ParamDefault::Bool(_) => ParamType::Boolean,
        ParamDefault::Int(_) => ParamType::Integer,
    };
    ParamSpec {
        name,
        ty,
        required: false,
        default: Some(default),
        identifier: None,
    }
}

const fn id(name: &'static str, kind: ResourceKind) -> ParamSpec {
    ParamSpec {
        name,
        ty: ParamType::String,
        required: true,
        default: None,
        identifier: Some(kind),
    }
}

const fn optional_id(name: &'static str, kind: ResourceKind) -> ParamSpec {
    ParamSpec {
        name,
        ty: ParamType::String,
        required: false,
        default: None,
        identifier: Some(kind),
    }
}

/// Risk classification shown in confirmation challenges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        }
    }
}

/// Expected consequences of a mutating operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Impact {
    pub risk: RiskLevel,
    pub downtime: &'static str,
    pub data_loss: &'static str,
    pub reversible: bool,
    pub estimated_time: &'static str,
}

/// Where an operation's impact comes from.
#[derive(Debug, Clone, Copy)]
pub enum ImpactSource {
    None,
    Fixed(Impact),
    /// Chosen by the value of the `action` parameter.
    ByAction(&'static [(&'static str, Impact)]),
}

/// Cross-field validation hook.
pub type Validator = fn(&Params) -> RdsResult<()>;

/// Static metadata for one tool.
#[derive(Debug)]
pub struct OperationDescriptor {
    pub operation: Operation,
    pub name: &'static str,
    pub mutates: bool,
    pub requires_confirmation: bool,
    pub list: bool,
    pub params: &'static [ParamSpec],
    /// Parameter naming the resource acted upon; keys confirmation challenges.
    pub primary_identifier: Option<&'static str>,
    /// Human action label; `{action}` is replaced by the `action` parameter.
    pub action: &'static str,
    pub impact: ImpactSource,
    pub validate: Option<Validator>,
    /// `{id}` and `{action}` are substituted.
    pub success_message: &'static str,
}

impl OperationDescriptor {
    pub fn param(&self, name: &str) -> Option<&'static ParamSpec> {
        self.params.iter().find(|p| p.name == name)
    }

    /// Impact record for a validated parameter set.
    pub fn impact(&self, params: &Params) -> Option<Impact> {
        match self.impact {
            ImpactSource::None => None,
            ImpactSource::Fixed(impact) => Some(impact),
            ImpactSource::ByAction(table) => {
                let action = params.get_str("action")?;
                table
                    .iter()
                    .find(|(name, _)| *name == action)
                    .map(|(_, impact)| *impact)
            }
        }
    }

    /// The action label with the `action` parameter substituted.
    pub fn action_label(&self, params: &Params) -> String {
        self.action
            .replace("{action}", params.get_str("action").unwrap_or_default())
    }

    /// The success message for a validated parameter set.
    pub fn render_success(&self, params: &Params) -> String {
        let id = self
            .primary_identifier
            .and_then(|name| params.get_str(name))
            .unwrap_or_default();
        self.success_message
            .replace("{id}", id)
            .replace("{action}", params.get_str("action").unwrap_or_default())
    }
}

// ============================================================================
// Impacts
// ============================================================================

const IMPACT_CREATE: Impact = Impact {
    risk: RiskLevel::Low,
    downtime: "None",
    data_loss: "None",
    reversible: true,
    estimated_time: "5-20 minutes",
};

const IMPACT_MODIFY_CLUSTER: Impact = Impact {
    risk: RiskLevel::High,
    downtime: "Depends on modifications",
    data_loss: "None",
    reversible: true,
    estimated_time: "Varies",
};

const IMPACT_DELETE_CLUSTER: Impact = Impact {
    risk: RiskLevel::Critical,
    downtime: "Permanent",
    data_loss: "All data will be lost unless final snapshot is taken",
    reversible: false,
    estimated_time: "5-10 minutes",
};

const IMPACT_FAILOVER: Impact = Impact {
    risk: RiskLevel::High,
    downtime: "30-60 seconds",
    data_loss: "None",
    reversible: false,
    estimated_time: "1-2 minutes",
};

const CLUSTER_STATUS_IMPACTS: &[(&str, Impact)] = &[
    (
        "start",
        Impact {
            risk: RiskLevel::Low,
            downtime: "None",
            data_loss: "None",
            reversible: true,
            estimated_time: "5-10 minutes",
        },
    ),
    (
        "stop",
        Impact {
            risk: RiskLevel::High,
            downtime: "Until cluster is restarted",
            data_loss: "None",
            reversible: true,
            estimated_time: "5-10 minutes",
        },
    ),
    (
        "reboot",
        Impact {
            risk: RiskLevel::High,
            downtime: "2-5 minutes",
            data_loss: "None",
            reversible: false,
            estimated_time: "2-5 minutes",
        },
    ),
];

const IMPACT_CREATE_SNAPSHOT: Impact = Impact {
    risk: RiskLevel::Low,
    downtime: "None",
    data_loss: "None",
    reversible: true,
    estimated_time: "Depends on cluster size",
};

const IMPACT_DELETE_SNAPSHOT: Impact = Impact {
    risk: RiskLevel::High,
    downtime: "None",
    data_loss: "The snapshot and its backup data are permanently removed",
    reversible: false,
    estimated_time: "1-5 minutes",
};

const IMPACT_RESTORE: Impact = Impact {
    risk: RiskLevel::Medium,
    downtime: "None",
    data_loss: "None",
    reversible: true,
    estimated_time: "10-30 minutes",
};

const IMPACT_MODIFY_INSTANCE: Impact = Impact {
    risk: RiskLevel::High,
    downtime: "Depends on modifications",
    data_loss: "None",
    reversible: true,
    estimated_time: "Varies",
};

const IMPACT_DELETE_INSTANCE: Impact = Impact {
    risk: RiskLevel::Critical,
    downtime: "Permanent",
    data_loss: "All data will be lost unless final snapshot is taken",
    reversible: false,
    estimated_time: "3-5 minutes",
};

const INSTANCE_STATUS_IMPACTS: &[(&str, Impact)] = &[
    (
        "start",
        Impact {
            risk: RiskLevel::Low,
            downtime: "None",
            data_loss: "None",
            reversible: true,
            estimated_time: "3-5 minutes",
        },
    ),
    (
        "stop",
        Impact {
            risk: RiskLevel::High,
            downtime: "Until instance is restarted",
            data_loss: "None",
            reversible: true,
            estimated_time: "1-3 minutes",
        },
    ),
    (
        "reboot",
        Impact {
            risk: RiskLevel::High,
            downtime: "1-3 minutes",
            data_loss: "None",
            reversible: false,
            estimated_time: "1-3 minutes",
        },
    ),
];

const IMPACT_CREATE_PARAMETER_GROUP: Impact = Impact {
    risk: RiskLevel::Low,
    downtime: "None",
    data_loss: "None",
    reversible: true,
    estimated_time: "Seconds",
};

const IMPACT_MODIFY_PARAMETER_GROUP: Impact = Impact {
    risk: RiskLevel::Medium,
    downtime: "Reboot required for static parameters",
    data_loss: "None",
    reversible: true,
    estimated_time: "Seconds, plus reboot for pending-reboot changes",
};

const IMPACT_RESET_PARAMETER_GROUP: Impact = Impact {
    risk: RiskLevel::High,
    downtime: "Reboot required for static parameters",
    data_loss: "Custom parameter values are discarded",
    reversible: false,
    estimated_time: "Seconds, plus reboot for pending-reboot changes",
};

// ============================================================================
// Cross-field validation
// ============================================================================

const STATUS_ACTIONS: &[&str] = &["start", "stop", "reboot"];
const APPLY_METHODS: &[&str] = &["immediate", "pending-reboot"];

fn validate_status_action(params: &Params) -> RdsResult<()> {
    let action = params.get_str("action").unwrap_or_default();
    if !STATUS_ACTIONS.contains(&action) {
        return Err(RdsError::invalid_parameter(format!(
            "action must be one of start, stop, reboot; got '{}'",
            action
        )));
    }
    Ok(())
}

fn validate_instance_status(params: &Params) -> RdsResult<()> {
    validate_status_action(params)?;
    if params.contains("force_failover") && params.get_str("action") != Some("reboot") {
        return Err(RdsError::invalid_parameter(
            "force_failover is only valid with action 'reboot'",
        ));
    }
    Ok(())
}

/// Skipping the final snapshot while naming one is contradictory. Naming
/// neither is left to RDS, which decides whether a final snapshot is needed.
fn validate_final_snapshot(params: &Params) -> RdsResult<()> {
    if params.flag("skip_final_snapshot") && params.contains("final_db_snapshot_identifier") {
        return Err(RdsError::invalid_parameter(
            "final_db_snapshot_identifier must not be set when skip_final_snapshot is true",
        ));
    }
    Ok(())
}

fn validate_backup_retention(params: &Params, min: i64) -> RdsResult<()> {
    if let Some(days) = params.get_i64("backup_retention_period") {
        if !(min..=35).contains(&days) {
            return Err(RdsError::invalid_parameter(format!(
                "backup_retention_period must be between {} and 35 days, got {}",
                min, days
            )));
        }
    }
    Ok(())
}

fn validate_port(params: &Params) -> RdsResult<()> {
    if let Some(port) = params.get_i64("port") {
        if !(1150..=65535).contains(&port) {
            return Err(RdsError::invalid_parameter(format!(
                "port must be between 1150 and 65535, got {}",
                port
            )));
        }
    }
    Ok(())
}

/// At least one field besides the identifier and scheduling flags must change.
fn require_modification(params: &Params, identifier: &str) -> RdsResult<()> {
    let changes = params
        .names()
        .filter(|name| {
            !matches!(
                name.as_str(),
                "apply_immediately" | CONFIRMATION_TOKEN_PARAM
            ) && name.as_str() != identifier
        })
        .count();
    if changes == 0 {
        return Err(RdsError::invalid_parameter(
            "No modifications specified; provide at least one attribute to change",
        ));
    }
    Ok(())
}

fn validate_create_cluster(params: &Params) -> RdsResult<()> {
    validate_backup_retention(params, 1)?;
    validate_port(params)
}

fn validate_modify_cluster(params: &Params) -> RdsResult<()> {
    require_modification(params, "db_cluster_identifier")?;
    validate_backup_retention(params, 1)?;
    validate_port(params)
}

fn validate_pitr(params: &Params) -> RdsResult<()> {
    let latest = params.flag("use_latest_restorable_time");
    let has_time = params.contains("restore_to_time");
    match (latest, has_time) {
        (false, false) => Err(RdsError::invalid_parameter(
            "Either restore_to_time or use_latest_restorable_time must be provided",
        )),
        (true, true) => Err(RdsError::invalid_parameter(
            "restore_to_time and use_latest_restorable_time are mutually exclusive",
        )),
        _ => validate_port(params),
    }
}

fn validate_create_instance(params: &Params) -> RdsResult<()> {
    if params.contains("master_user_password") && params.flag("manage_master_user_password") {
        return Err(RdsError::invalid_parameter(
            "master_user_password cannot be set when manage_master_user_password is true",
        ));
    }
    if let Some(storage) = params.get_i64("allocated_storage") {
        if storage <= 0 {
            return Err(RdsError::invalid_parameter(
                "allocated_storage must be greater than 0",
            ));
        }
    }
    validate_backup_retention(params, 0)?;
    validate_port(params)
}

fn validate_modify_instance(params: &Params) -> RdsResult<()> {
    require_modification(params, "db_instance_identifier")?;
    if let Some(storage) = params.get_i64("allocated_storage") {
        if storage <= 0 {
            return Err(RdsError::invalid_parameter(
                "allocated_storage must be greater than 0",
            ));
        }
    }
    validate_backup_retention(params, 0)
}

fn validate_apply_methods(params: &Params) -> RdsResult<()> {
    for change in params.get_parameters("parameters").unwrap_or_default() {
        if let Some(method) = change.apply_method.as_deref() {
            if !APPLY_METHODS.contains(&method) {
                return Err(RdsError::invalid_parameter(format!(
                    "apply_method for '{}' must be 'immediate' or 'pending-reboot', got '{}'",
                    change.name, method
                )));
            }
        }
    }
    Ok(())
}

fn validate_modify_parameters(params: &Params) -> RdsResult<()> {
    let changes = params.get_parameters("parameters").unwrap_or_default();
    if changes.is_empty() {
        return Err(RdsError::invalid_parameter(
            "parameters must contain at least one change",
        ));
    }
    if changes.len() > MAX_PARAMETER_CHANGES {
        return Err(RdsError::invalid_parameter(format!(
            "At most {} parameters can be modified per call, got {}",
            MAX_PARAMETER_CHANGES,
            changes.len()
        )));
    }
    if let Some(change) = changes.iter().find(|c| c.value.is_none()) {
        return Err(RdsError::invalid_parameter(format!(
            "Parameter '{}' is missing a value",
            change.name
        )));
    }
    validate_apply_methods(params)
}

fn validate_reset_parameters(params: &Params) -> RdsResult<()> {
    let reset_all = params.flag("reset_all_parameters");
    let changes = params.get_parameters("parameters").unwrap_or_default();
    if reset_all && !changes.is_empty() {
        return Err(RdsError::invalid_parameter(
            "parameters must not be set when reset_all_parameters is true",
        ));
    }
    if !reset_all && changes.is_empty() {
        return Err(RdsError::invalid_parameter(
            "Provide parameters to reset, or set reset_all_parameters to true",
        ));
    }
    if changes.len() > MAX_PARAMETER_CHANGES {
        return Err(RdsError::invalid_parameter(format!(
            "At most {} parameters can be reset per call, got {}",
            MAX_PARAMETER_CHANGES,
            changes.len()
        )));
    }
    validate_apply_methods(params)
}

fn validate_list(params: &Params) -> RdsResult<()> {
    if let Some(max_items) = params.get_i64(MAX_ITEMS_PARAM) {
        if max_items < 1 {
            return Err(RdsError::invalid_parameter(format!(
                "max_items must be at least 1, got {}",
                max_items
            )));
        }
    }
    Ok(())
}

// ============================================================================
// Parameter specs
// ============================================================================

use ParamType::{Boolean, Integer, Parameters, StringList, Tags, Timestamp};
use ResourceKind::{Cluster, ClusterSnapshot, Instance, ParameterGroup, SnapshotSource};

const STRING: ParamType = ParamType::String;

const CREATE_DB_CLUSTER_PARAMS: &[ParamSpec] = &[
    id("db_cluster_identifier", Cluster),
    required("engine", STRING),
    required("master_username", STRING),
    defaulted("manage_master_user_password", ParamDefault::Bool(true)),
    optional("database_name", STRING),
    optional("vpc_security_group_ids", StringList),
    optional("db_subnet_group_name", STRING),
    optional("availability_zones", StringList),
    optional("backup_retention_period", Integer),
    optional("port", Integer),
    optional("engine_version", STRING),
    optional_id("db_cluster_parameter_group_name", ParameterGroup),
    optional("storage_encrypted", Boolean),
    optional("deletion_protection", Boolean),
    optional("tags", Tags),
];

const MODIFY_DB_CLUSTER_PARAMS: &[ParamSpec] = &[
    id("db_cluster_identifier", Cluster),
    defaulted("apply_immediately", ParamDefault::Bool(false)),
    optional("backup_retention_period", Integer),
    optional_id("db_cluster_parameter_group_name", ParameterGroup),
    optional("vpc_security_group_ids", StringList),
    optional("port", Integer),
    optional("manage_master_user_password", Boolean),
    optional("engine_version", STRING),
    optional("allow_major_version_upgrade", Boolean),
    optional("preferred_backup_window", STRING),
    optional("preferred_maintenance_window", STRING),
    optional("deletion_protection", Boolean),
];

const DELETE_DB_CLUSTER_PARAMS: &[ParamSpec] = &[
    id("db_cluster_identifier", Cluster),
    defaulted("skip_final_snapshot", ParamDefault::Bool(false)),
    optional_id("final_db_snapshot_identifier", ClusterSnapshot),
];

const CHANGE_DB_CLUSTER_STATUS_PARAMS: &[ParamSpec] = &[
    id("db_cluster_identifier", Cluster),
    required("action", STRING),
];

const FAILOVER_DB_CLUSTER_PARAMS: &[ParamSpec] = &[
    id("db_cluster_identifier", Cluster),
    optional_id("target_db_instance_identifier", Instance),
];

const DESCRIBE_DB_CLUSTERS_PARAMS: &[ParamSpec] = &[
    optional_id("db_cluster_identifier", Cluster),
    optional(MAX_ITEMS_PARAM, Integer),
];

const CREATE_DB_CLUSTER_SNAPSHOT_PARAMS: &[ParamSpec] = &[
    id("db_cluster_snapshot_identifier", ClusterSnapshot),
    id("db_cluster_identifier", Cluster),
    optional("tags", Tags),
];

const DELETE_DB_CLUSTER_SNAPSHOT_PARAMS: &[ParamSpec] =
    &[id("db_cluster_snapshot_identifier", ClusterSnapshot)];

const RESTORE_FROM_SNAPSHOT_PARAMS: &[ParamSpec] = &[
    id("db_cluster_identifier", Cluster),
    id("snapshot_identifier", SnapshotSource),
    required("engine", STRING),
    optional("engine_version", STRING),
    optional("vpc_security_group_ids", StringList),
    optional("db_subnet_group_name", STRING),
    optional("availability_zones", StringList),
    optional("port", Integer),
    optional("tags", Tags),
];

const RESTORE_TO_POINT_IN_TIME_PARAMS: &[ParamSpec] = &[
    id("db_cluster_identifier", Cluster),
    id("source_db_cluster_identifier", Cluster),
    optional("restore_to_time", Timestamp),
    optional("use_latest_restorable_time", Boolean),
    optional("port", Integer),
    optional("db_subnet_group_name", STRING),
    optional("vpc_security_group_ids", StringList),
    optional("tags", Tags),
];

const DESCRIBE_DB_CLUSTER_SNAPSHOTS_PARAMS: &[ParamSpec] = &[
    optional_id("db_cluster_identifier", Cluster),
    optional_id("db_cluster_snapshot_identifier", ClusterSnapshot),
    optional("snapshot_type", STRING),
    optional(MAX_ITEMS_PARAM, Integer),
];

const DESCRIBE_DB_CLUSTER_AUTOMATED_BACKUPS_PARAMS: &[ParamSpec] = &[
    optional_id("db_cluster_identifier", Cluster),
    optional("db_cluster_resource_id", STRING),
    optional(MAX_ITEMS_PARAM, Integer),
];

const CREATE_DB_INSTANCE_PARAMS: &[ParamSpec] = &[
    id("db_instance_identifier", Instance),
    required("db_instance_class", STRING),
    required("engine", STRING),
    optional("allocated_storage", Integer),
    optional("master_username", STRING),
    optional("master_user_password", STRING),
    defaulted("manage_master_user_password", ParamDefault::Bool(true)),
    optional("db_name", STRING),
    optional_id("db_cluster_identifier", Cluster),
    optional("vpc_security_group_ids", StringList),
    optional("availability_zone", STRING),
    optional("db_subnet_group_name", STRING),
    defaulted("multi_az", ParamDefault::Bool(false)),
    optional("engine_version", STRING),
    optional("storage_type", STRING),
    optional("storage_encrypted", Boolean),
    optional("port", Integer),
    optional("publicly_accessible", Boolean),
    optional("backup_retention_period", Integer),
    optional_id("db_parameter_group_name", ParameterGroup),
    optional("tags", Tags),
];

const MODIFY_DB_INSTANCE_PARAMS: &[ParamSpec] = &[
    id("db_instance_identifier", Instance),
    defaulted("apply_immediately", ParamDefault::Bool(false)),
    optional("allocated_storage", Integer),
    optional("db_instance_class", STRING),
    optional("storage_type", STRING),
    optional("backup_retention_period", Integer),
    optional("preferred_backup_window", STRING),
    optional("preferred_maintenance_window", STRING),
    optional("multi_az", Boolean),
    optional("engine_version", STRING),
    optional("allow_major_version_upgrade", Boolean),
    optional("auto_minor_version_upgrade", Boolean),
    optional("publicly_accessible", Boolean),
    optional("vpc_security_group_ids", StringList),
    optional_id("db_parameter_group_name", ParameterGroup),
    optional("manage_master_user_password", Boolean),
    optional("deletion_protection", Boolean),
];

const DELETE_DB_INSTANCE_PARAMS: &[ParamSpec] = &[
    id("db_instance_identifier", Instance),
    defaulted("skip_final_snapshot", ParamDefault::Bool(false)),
    optional_id("final_db_snapshot_identifier", ClusterSnapshot),
    optional("delete_automated_backups", Boolean),
];

const CHANGE_DB_INSTANCE_STATUS_PARAMS: &[ParamSpec] = &[
    id("db_instance_identifier", Instance),
    required("action", STRING),
    optional("force_failover", Boolean),
];

const DESCRIBE_DB_INSTANCES_PARAMS: &[ParamSpec] = &[
    optional_id("db_instance_identifier", Instance),
    optional(MAX_ITEMS_PARAM, Integer),
];

// Automated instance snapshots are named `rds:<instance>-<timestamp>`, so the
// snapshot filter is not held to identifier rules.
const DESCRIBE_DB_SNAPSHOTS_PARAMS: &[ParamSpec] = &[
    optional_id("db_instance_identifier", Instance),
    optional("db_snapshot_identifier", STRING),
    optional("snapshot_type", STRING),
    optional(MAX_ITEMS_PARAM, Integer),
];

const DESCRIBE_DB_INSTANCE_AUTOMATED_BACKUPS_PARAMS: &[ParamSpec] = &[
    optional_id("db_instance_identifier", Instance),
    optional("dbi_resource_id", STRING),
    optional(MAX_ITEMS_PARAM, Integer),
];

const CREATE_CLUSTER_PARAMETER_GROUP_PARAMS: &[ParamSpec] = &[
    id("db_cluster_parameter_group_name", ParameterGroup),
    required("db_parameter_group_family", STRING),
    required("description", STRING),
    optional("tags", Tags),
];

const CREATE_INSTANCE_PARAMETER_GROUP_PARAMS: &[ParamSpec] = &[
    id("db_parameter_group_name", ParameterGroup),
    required("db_parameter_group_family", STRING),
    required("description", STRING),
    optional("tags", Tags),
];

const MODIFY_CLUSTER_PARAMETER_GROUP_PARAMS: &[ParamSpec] = &[
    id("db_cluster_parameter_group_name", ParameterGroup),
    required("parameters", Parameters),
];

const MODIFY_INSTANCE_PARAMETER_GROUP_PARAMS: &[ParamSpec] = &[
    id("db_parameter_group_name", ParameterGroup),
    required("parameters", Parameters),
];

const RESET_CLUSTER_PARAMETER_GROUP_PARAMS: &[ParamSpec] = &[
    id("db_cluster_parameter_group_name", ParameterGroup),
    defaulted("reset_all_parameters", ParamDefault::Bool(false)),
    optional("parameters", Parameters),
];

const RESET_INSTANCE_PARAMETER_GROUP_PARAMS: &[ParamSpec] = &[
    id("db_parameter_group_name", ParameterGroup),
    defaulted("reset_all_parameters", ParamDefault::Bool(false)),
    optional("parameters", Parameters),
];

const DESCRIBE_CLUSTER_PARAMETER_GROUPS_PARAMS: &[ParamSpec] = &[
    optional_id("db_cluster_parameter_group_name", ParameterGroup),
    optional(MAX_ITEMS_PARAM, Integer),
];

const DESCRIBE_INSTANCE_PARAMETER_GROUPS_PARAMS: &[ParamSpec] = &[
    optional_id("db_parameter_group_name", ParameterGroup),
    optional(MAX_ITEMS_PARAM, Integer),
];

const DESCRIBE_CLUSTER_PARAMETERS_PARAMS: &[ParamSpec] = &[
    id("db_cluster_parameter_group_name", ParameterGroup),
    optional("source", STRING),
    optional(MAX_ITEMS_PARAM, Integer),
];

const DESCRIBE_INSTANCE_PARAMETERS_PARAMS: &[ParamSpec] = &[
    id("db_parameter_group_name", ParameterGroup),
    optional("source", STRING),
    optional(MAX_ITEMS_PARAM, Integer),
];

const LIST_PARAMS: &[ParamSpec] = &[optional(MAX_ITEMS_PARAM, Integer)];

const GET_DB_CLUSTER_PARAMS: &[ParamSpec] = &[id("db_cluster_identifier", Cluster)];

const GET_DB_INSTANCE_PARAMS: &[ParamSpec] = &[id("db_instance_identifier", Instance)];

// ============================================================================
// Descriptor table
// ============================================================================

const fn mutation(
    operation: Operation,
    name: &'static str,
    params: &'static [ParamSpec],
    primary_identifier: &'static str,
    action: &'static str,
    impact: ImpactSource,
    validate: Option<Validator>,
    success_message: &'static str,
) -> OperationDescriptor {
    OperationDescriptor {
        operation,
        name,
        mutates: true,
        requires_confirmation: true,
        list: false,
        params,
        primary_identifier: Some(primary_identifier),
        action,
        impact,
        validate,
        success_message,
    }
}

const fn listing(
    operation: Operation,
    name: &'static str,
    params: &'static [ParamSpec],
    action: &'static str,
    success_message: &'static str,
) -> OperationDescriptor {
    OperationDescriptor {
        operation,
        name,
        mutates: false,
        requires_confirmation: false,
        list: true,
        params,
        primary_identifier: None,
        action,
        impact: ImpactSource::None,
        validate: Some(validate_list),
        success_message,
    }
}

const fn lookup(
    operation: Operation,
    name: &'static str,
    params: &'static [ParamSpec],
    primary_identifier: &'static str,
    action: &'static str,
    success_message: &'static str,
) -> OperationDescriptor {
    OperationDescriptor {
        operation,
        name,
        mutates: false,
        requires_confirmation: false,
        list: false,
        params,
        primary_identifier: Some(primary_identifier),
        action,
        impact: ImpactSource::None,
        validate: None,
        success_message,
    }
}

/// Indexed by `Operation as usize`; order must match the enum.
static DESCRIPTORS: [OperationDescriptor; 33] = [
    mutation(
        Operation::CreateDbCluster,
        "CreateDBCluster",
        CREATE_DB_CLUSTER_PARAMS,
        "db_cluster_identifier",
        "create DB cluster",
        ImpactSource::Fixed(IMPACT_CREATE),
        Some(validate_create_cluster),
        "DB cluster {id} creation initiated",
    ),
    mutation(
        Operation::ModifyDbCluster,
        "ModifyDBCluster",
        MODIFY_DB_CLUSTER_PARAMS,
        "db_cluster_identifier",
        "modify DB cluster",
        ImpactSource::Fixed(IMPACT_MODIFY_CLUSTER),
        Some(validate_modify_cluster),
        "DB cluster {id} modification initiated",
    ),
    mutation(
        Operation::DeleteDbCluster,
        "DeleteDBCluster",
        DELETE_DB_CLUSTER_PARAMS,
        "db_cluster_identifier",
        "delete DB cluster",
        ImpactSource::Fixed(IMPACT_DELETE_CLUSTER),
        Some(validate_final_snapshot),
        "DB cluster {id} deletion initiated",
    ),
    mutation(
        Operation::ChangeDbClusterStatus,
        "ChangeDBClusterStatus",
        CHANGE_DB_CLUSTER_STATUS_PARAMS,
        "db_cluster_identifier",
        "{action} DB cluster",
        ImpactSource::ByAction(CLUSTER_STATUS_IMPACTS),
        Some(validate_status_action),
        "DB cluster {id} {action} initiated",
    ),
    mutation(
        Operation::FailoverDbCluster,
        "FailoverDBCluster",
        FAILOVER_DB_CLUSTER_PARAMS,
        "db_cluster_identifier",
        "fail over DB cluster",
        ImpactSource::Fixed(IMPACT_FAILOVER),
        None,
        "DB cluster {id} failover initiated",
    ),
    listing(
        Operation::DescribeDbClusters,
        "DescribeDBClusters",
        DESCRIBE_DB_CLUSTERS_PARAMS,
        "describe DB clusters",
        "Retrieved DB clusters",
    ),
    mutation(
        Operation::CreateDbClusterSnapshot,
        "CreateDBClusterSnapshot",
        CREATE_DB_CLUSTER_SNAPSHOT_PARAMS,
        "db_cluster_snapshot_identifier",
        "create DB cluster snapshot",
        ImpactSource::Fixed(IMPACT_CREATE_SNAPSHOT),
        None,
        "DB cluster snapshot {id} creation initiated",
    ),
    mutation(
        Operation::DeleteDbClusterSnapshot,
        "DeleteDBClusterSnapshot",
        DELETE_DB_CLUSTER_SNAPSHOT_PARAMS,
        "db_cluster_snapshot_identifier",
        "delete DB cluster snapshot",
        ImpactSource::Fixed(IMPACT_DELETE_SNAPSHOT),
        None,
        "DB cluster snapshot {id} deletion initiated",
    ),
    mutation(
        Operation::RestoreDbClusterFromSnapshot,
        "RestoreDBClusterFromSnapshot",
        RESTORE_FROM_SNAPSHOT_PARAMS,
        "db_cluster_identifier",
        "restore DB cluster from snapshot",
        ImpactSource::Fixed(IMPACT_RESTORE),
        Some(validate_port),
        "DB cluster {id} restore from snapshot initiated",
    ),
    mutation(
        Operation::RestoreDbClusterToPointInTime,
        "RestoreDBClusterToPointInTime",
        RESTORE_TO_POINT_IN_TIME_PARAMS,
        "db_cluster_identifier",
        "restore DB cluster to point in time",
        ImpactSource::Fixed(IMPACT_RESTORE),
        Some(validate_pitr),
        "DB cluster {id} point-in-time restore initiated",
    ),
    listing(
        Operation::DescribeDbClusterSnapshots,
        "DescribeDBClusterSnapshots",
        DESCRIBE_DB_CLUSTER_SNAPSHOTS_PARAMS,
        "describe DB cluster snapshots",
        "Retrieved DB cluster snapshots",
    ),
    listing(
        Operation::DescribeDbClusterAutomatedBackups,
        "DescribeDBClusterAutomatedBackups",
        DESCRIBE_DB_CLUSTER_AUTOMATED_BACKUPS_PARAMS,
        "describe DB cluster automated backups",
        "Retrieved DB cluster automated backups",
    ),
    mutation(
        Operation::CreateDbInstance,
        "CreateDBInstance",
        CREATE_DB_INSTANCE_PARAMS,
        "db_instance_identifier",
        "create DB instance",
        ImpactSource::Fixed(IMPACT_CREATE),
        Some(validate_create_instance),
        "DB instance {id} creation initiated",
    ),
    mutation(
        Operation::ModifyDbInstance,
        "ModifyDBInstance",
        MODIFY_DB_INSTANCE_PARAMS,
        "db_instance_identifier",
        "modify DB instance",
        ImpactSource::Fixed(IMPACT_MODIFY_INSTANCE),
        Some(validate_modify_instance),
        "DB instance {id} modification initiated",
    ),
    mutation(
        Operation::DeleteDbInstance,
        "DeleteDBInstance",
        DELETE_DB_INSTANCE_PARAMS,
        "db_instance_identifier",
        "delete DB instance",
        ImpactSource::Fixed(IMPACT_DELETE_INSTANCE),
        Some(validate_final_snapshot),
        "DB instance {id} deletion initiated",
    ),
    mutation(
        Operation::ChangeDbInstanceStatus,
        "ChangeDBInstanceStatus",
        CHANGE_DB_INSTANCE_STATUS_PARAMS,
        "db_instance_identifier",
        "{action} DB instance",
        ImpactSource::ByAction(INSTANCE_STATUS_IMPACTS),
        Some(validate_instance_status),
        "DB instance {id} {action} initiated",
    ),
    listing(
        Operation::DescribeDbInstances,
        "DescribeDBInstances",
        DESCRIBE_DB_INSTANCES_PARAMS,
        "describe DB instances",
        "Retrieved DB instances",
    ),
    listing(
        Operation::DescribeDbSnapshots,
        "DescribeDBSnapshots",
        DESCRIBE_DB_SNAPSHOTS_PARAMS,
        "describe DB snapshots",
        "Retrieved DB snapshots",
    ),
    listing(
        Operation::DescribeDbInstanceAutomatedBackups,
        "DescribeDBInstanceAutomatedBackups",
        DESCRIBE_DB_INSTANCE_AUTOMATED_BACKUPS_PARAMS,
        "describe DB instance automated backups",
        "Retrieved DB instance automated backups",
    ),
    mutation(
        Operation::CreateDbClusterParameterGroup,
        "CreateDBClusterParameterGroup",
        CREATE_CLUSTER_PARAMETER_GROUP_PARAMS,
        "db_cluster_parameter_group_name",
        "create DB cluster parameter group",
        ImpactSource::Fixed(IMPACT_CREATE_PARAMETER_GROUP),
        None,
        "DB cluster parameter group {id} created",
    ),
    mutation(
        Operation::CreateDbInstanceParameterGroup,
        "CreateDBInstanceParameterGroup",
        CREATE_INSTANCE_PARAMETER_GROUP_PARAMS,
        "db_parameter_group_name",
        "create DB parameter group",
        ImpactSource::Fixed(IMPACT_CREATE_PARAMETER_GROUP),
        None,
        "DB parameter group {id} created",
    ),
    mutation(
        Operation::ModifyDbClusterParameterGroup,
        "ModifyDBClusterParameterGroup",
        MODIFY_CLUSTER_PARAMETER_GROUP_PARAMS,
        "db_cluster_parameter_group_name",
        "modify DB cluster parameter group",
        ImpactSource::Fixed(IMPACT_MODIFY_PARAMETER_GROUP),
        Some(validate_modify_parameters),
        "DB cluster parameter group {id} modified",
    ),
    mutation(
        Operation::ModifyDbInstanceParameterGroup,
        "ModifyDBInstanceParameterGroup",
        MODIFY_INSTANCE_PARAMETER_GROUP_PARAMS,
        "db_parameter_group_name",
        "modify DB parameter group",
        ImpactSource::Fixed(IMPACT_MODIFY_PARAMETER_GROUP),
        Some(validate_modify_parameters),
        "DB parameter group {id} modified",
    ),
    mutation(
        Operation::ResetDbClusterParameterGroup,
        "ResetDBClusterParameterGroup",
        RESET_CLUSTER_PARAMETER_GROUP_PARAMS,
        "db_cluster_parameter_group_name",
        "reset DB cluster parameter group",
        ImpactSource::Fixed(IMPACT_RESET_PARAMETER_GROUP),
        Some(validate_reset_parameters),
        "DB cluster parameter group {id} reset",
    ),
    mutation(
        Operation::ResetDbInstanceParameterGroup,
        "ResetDBInstanceParameterGroup",
        RESET_INSTANCE_PARAMETER_GROUP_PARAMS,
        "db_parameter_group_name",
        "reset DB parameter group",
        ImpactSource::Fixed(IMPACT_RESET_PARAMETER_GROUP),
        Some(validate_reset_parameters),
        "DB parameter group {id} reset",
    ),
    listing(
        Operation::DescribeDbClusterParameterGroups,
        "DescribeDBClusterParameterGroups",
        DESCRIBE_CLUSTER_PARAMETER_GROUPS_PARAMS,
        "describe DB cluster parameter groups",
        "Retrieved DB cluster parameter groups",
    ),
    listing(
        Operation::DescribeDbInstanceParameterGroups,
        "DescribeDBInstanceParameterGroups",
        DESCRIBE_INSTANCE_PARAMETER_GROUPS_PARAMS,
        "describe DB parameter groups",
        "Retrieved DB parameter groups",
    ),
    listing(
        Operation::DescribeDbClusterParameters,
        "DescribeDBClusterParameters",
        DESCRIBE_CLUSTER_PARAMETERS_PARAMS,
        "describe DB cluster parameters",
        "Retrieved DB cluster parameters",
    ),
    listing(
        Operation::DescribeDbInstanceParameters,
        "DescribeDBInstanceParameters",
        DESCRIBE_INSTANCE_PARAMETERS_PARAMS,
        "describe DB parameters",
        "Retrieved DB parameters",
    ),
    listing(
        Operation::ListDbClusters,
        "ListDBClusters",
        LIST_PARAMS,
        "list DB clusters",
        "Retrieved DB clusters",
    ),
    lookup(
        Operation::GetDbCluster,
        "GetDBCluster",
        GET_DB_CLUSTER_PARAMS,
        "db_cluster_identifier",
        "get DB cluster",
        "Retrieved DB cluster {id}",
    ),
    listing(
        Operation::ListDbInstances,
        "ListDBInstances",
        LIST_PARAMS,
        "list DB instances",
        "Retrieved DB instances",
    ),
    lookup(
        Operation::GetDbInstance,
        "GetDBInstance",
        GET_DB_INSTANCE_PARAMS,
        "db_instance_identifier",
        "get DB instance",
        "Retrieved DB instance {id}",
    ),
];
