//! Resource identifier validation.
//!
//! RDS identifiers are validated and normalized before any other gate runs, so
//! the readonly check, the confirmation key and the provider call all see the
//! same canonical value.

use crate::error::{RdsError, RdsResult};
use serde::Serialize;

/// Kind of RDS resource an identifier names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Cluster,
    Instance,
    ClusterSnapshot,
    /// Snapshot to restore from: a snapshot name or a cluster snapshot ARN.
    SnapshotSource,
    ParameterGroup,
}

impl ResourceKind {
    /// Maximum identifier length accepted by RDS for this kind.
    pub fn max_len(&self) -> usize {
        match self {
            Self::Cluster | Self::Instance => 63,
            Self::ClusterSnapshot | Self::SnapshotSource | Self::ParameterGroup => 255,
        }
    }

    /// Default parameter groups are named like `default.aurora-mysql8.0`.
    fn allows_dot(&self) -> bool {
        matches!(self, Self::ParameterGroup)
    }

    /// Human readable label for messages.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Cluster => "DB cluster",
            Self::Instance => "DB instance",
            Self::ClusterSnapshot | Self::SnapshotSource => "DB cluster snapshot",
            Self::ParameterGroup => "parameter group",
        }
    }
}

/// Validate an identifier and return its normalized form.
///
/// Normalization trims surrounding whitespace and lowercases ASCII letters.
///
/// # Examples
///
/// ```
/// use rds_mcp_server::tools::identifier::{validate_identifier, ResourceKind};
///
/// let id = validate_identifier("db_cluster_identifier", " My-Test-Cluster-01 ", ResourceKind::Cluster).unwrap();
/// assert_eq!(id, "my-test-cluster-01");
///
/// assert!(validate_identifier("db_cluster_identifier", "1cluster", ResourceKind::Cluster).is_err());
/// assert!(validate_identifier("db_cluster_identifier", "my--cluster", ResourceKind::Cluster).is_err());
/// ```
pub fn validate_identifier(param: &str, raw: &str, kind: ResourceKind) -> RdsResult<String> {
    let normalized = raw.trim().to_ascii_lowercase();
    if kind == ResourceKind::SnapshotSource && normalized.starts_with("arn:") {
        return validate_snapshot_arn(param, &normalized);
    }
    let fail = |reason: String| Err(RdsError::invalid_identifier(param, reason));

    let Some(first) = normalized.chars().next() else {
        return fail(format!("{} identifier must not be empty", kind.label()));
    };

    if normalized.chars().count() > kind.max_len() {
        return fail(format!(
            "{} identifier must be at most {} characters",
            kind.label(),
            kind.max_len()
        ));
    }

    if !first.is_ascii_alphabetic() {
        return fail(format!(
            "{} identifier must begin with a letter, got '{}'",
            kind.label(),
            first
        ));
    }

    if let Some(bad) = normalized
        .chars()
        .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || (kind.allows_dot() && *c == '.')))
    {
        let allowed = if kind.allows_dot() {
            "letters, digits, hyphens and periods"
        } else {
            "letters, digits and hyphens"
        };
        return fail(format!(
            "{} identifier may only contain {}, found '{}'",
            kind.label(),
            allowed,
            bad
        ));
    }

    if normalized.contains("--") {
        return fail(format!(
            "{} identifier must not contain two consecutive hyphens",
            kind.label()
        ));
    }

    if normalized.ends_with('-') {
        return fail(format!(
            "{} identifier must not end with a hyphen",
            kind.label()
        ));
    }

    Ok(normalized)
}

/// Shared and cross-account snapshots are addressed as
/// `arn:<partition>:rds:<region>:<account>:cluster-snapshot:<name>`.
fn validate_snapshot_arn(param: &str, arn: &str) -> RdsResult<String> {
    let fail = |reason: &str| Err(RdsError::invalid_identifier(param, reason));
    let parts: Vec<&str> = arn.splitn(7, ':').collect();
    let [_, partition, service, region, account, resource, name] = parts.as_slice() else {
        return fail("snapshot ARN must have the form arn:<partition>:rds:<region>:<account>:cluster-snapshot:<name>");
    };

    if partition.is_empty() || region.is_empty() {
        return fail("snapshot ARN must name a partition and a region");
    }
    if *service != "rds" || *resource != "cluster-snapshot" {
        return fail("snapshot ARN must reference an RDS cluster snapshot");
    }
    if account.len() != 12 || !account.chars().all(|c| c.is_ascii_digit()) {
        return fail("snapshot ARN account must be 12 digits");
    }

    validate_identifier(param, name, ResourceKind::ClusterSnapshot)?;
    Ok(arn.to_string())
}
