//! Conversion of AWS SDK output types into resource documents.

use crate::models::{
    AutomatedBackupDocument, ClusterDocument, ClusterMember, ClusterSnapshotDocument,
    DbSnapshotDocument, Endpoint, InstanceDocument, ParameterDocument, ParameterGroupDocument,
};
use crate::models::resource::{
    cluster_backups_uri, cluster_uri, instance_backups_uri, instance_uri,
};
use aws_sdk_rds::primitives::DateTime as SdkDateTime;
use aws_sdk_rds::types::{
    DbCluster, DbClusterAutomatedBackup, DbClusterParameterGroup, DbClusterSnapshot, DbInstance,
    DbInstanceAutomatedBackup, DbParameterGroup, DbSnapshot, Parameter, RestoreWindow, Tag,
    VpcSecurityGroupMembership,
};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

/// Convert a smithy timestamp to chrono.
pub fn timestamp(value: Option<&SdkDateTime>) -> Option<DateTime<Utc>> {
    let value = value?;
    DateTime::from_timestamp(value.secs(), value.subsec_nanos())
}

/// Convert a chrono timestamp to smithy.
pub fn sdk_timestamp(value: DateTime<Utc>) -> SdkDateTime {
    SdkDateTime::from_secs_and_nanos(value.timestamp(), value.timestamp_subsec_nanos())
}

fn tags(list: &[Tag]) -> BTreeMap<String, String> {
    list.iter()
        .filter_map(|tag| {
            Some((
                tag.key()?.to_string(),
                tag.value().unwrap_or_default().to_string(),
            ))
        })
        .collect()
}

fn security_groups(list: &[VpcSecurityGroupMembership]) -> Vec<String> {
    list.iter()
        .filter_map(|group| group.vpc_security_group_id().map(str::to_string))
        .collect()
}

fn owned(value: Option<&str>) -> String {
    value.unwrap_or_default().to_string()
}

pub fn cluster(cluster: &DbCluster) -> ClusterDocument {
    let cluster_id = owned(cluster.db_cluster_identifier());
    ClusterDocument {
        resource_uri: cluster_uri(&cluster_id),
        cluster_id,
        status: owned(cluster.status()),
        engine: owned(cluster.engine()),
        engine_version: cluster.engine_version().map(str::to_string),
        endpoint: cluster.endpoint().map(str::to_string),
        reader_endpoint: cluster.reader_endpoint().map(str::to_string),
        port: cluster.port(),
        multi_az: cluster.multi_az().unwrap_or(false),
        backup_retention: cluster.backup_retention_period(),
        preferred_backup_window: cluster.preferred_backup_window().map(str::to_string),
        preferred_maintenance_window: cluster.preferred_maintenance_window().map(str::to_string),
        created_time: timestamp(cluster.cluster_create_time()),
        members: cluster
            .db_cluster_members()
            .iter()
            .map(|member| ClusterMember {
                instance_id: owned(member.db_instance_identifier()),
                is_writer: member.is_cluster_writer().unwrap_or(false),
                promotion_tier: member.promotion_tier(),
            })
            .collect(),
        vpc_security_groups: security_groups(cluster.vpc_security_groups()),
        tags: tags(cluster.tag_list()),
    }
}

pub fn instance(instance: &DbInstance) -> InstanceDocument {
    let instance_id = owned(instance.db_instance_identifier());
    InstanceDocument {
        resource_uri: instance_uri(&instance_id),
        instance_id,
        status: owned(instance.db_instance_status()),
        engine: owned(instance.engine()),
        engine_version: instance.engine_version().map(str::to_string),
        instance_class: instance.db_instance_class().map(str::to_string),
        endpoint: instance.endpoint().map(|endpoint| Endpoint {
            address: owned(endpoint.address()),
            port: endpoint.port().unwrap_or_default(),
            hosted_zone_id: endpoint.hosted_zone_id().map(str::to_string),
        }),
        availability_zone: instance.availability_zone().map(str::to_string),
        multi_az: instance.multi_az().unwrap_or(false),
        storage_type: instance.storage_type().map(str::to_string),
        allocated_storage: instance.allocated_storage(),
        publicly_accessible: instance.publicly_accessible().unwrap_or(false),
        db_cluster: instance.db_cluster_identifier().map(str::to_string),
        created_time: timestamp(instance.instance_create_time()),
        resource_id: instance.dbi_resource_id().map(str::to_string),
        vpc_security_groups: security_groups(instance.vpc_security_groups()),
        tags: tags(instance.tag_list()),
    }
}

pub fn cluster_snapshot(snapshot: &DbClusterSnapshot) -> ClusterSnapshotDocument {
    ClusterSnapshotDocument {
        snapshot_id: owned(snapshot.db_cluster_snapshot_identifier()),
        cluster_id: owned(snapshot.db_cluster_identifier()),
        status: owned(snapshot.status()),
        snapshot_type: snapshot.snapshot_type().map(str::to_string),
        engine: snapshot.engine().map(str::to_string),
        engine_version: snapshot.engine_version().map(str::to_string),
        percent_progress: snapshot.percent_progress(),
        created_time: timestamp(snapshot.snapshot_create_time()),
        tags: tags(snapshot.tag_list()),
    }
}

pub fn db_snapshot(snapshot: &DbSnapshot) -> DbSnapshotDocument {
    let instance_id = owned(snapshot.db_instance_identifier());
    DbSnapshotDocument {
        snapshot_id: owned(snapshot.db_snapshot_identifier()),
        resource_uri: instance_backups_uri(&instance_id),
        instance_id,
        status: owned(snapshot.status()),
        snapshot_type: snapshot.snapshot_type().map(str::to_string),
        engine: snapshot.engine().map(str::to_string),
        engine_version: snapshot.engine_version().map(str::to_string),
        port: snapshot.port(),
        vpc_id: snapshot.vpc_id().map(str::to_string),
        percent_progress: snapshot.percent_progress(),
        created_time: timestamp(snapshot.snapshot_create_time()),
        tags: tags(snapshot.tag_list()),
    }
}

fn restore_window(
    window: Option<&RestoreWindow>,
) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
    match window {
        Some(window) => (
            timestamp(window.earliest_time()),
            timestamp(window.latest_time()),
        ),
        None => (None, None),
    }
}

pub fn cluster_automated_backup(backup: &DbClusterAutomatedBackup) -> AutomatedBackupDocument {
    let cluster_id = owned(backup.db_cluster_identifier());
    let (earliest, latest) = restore_window(backup.restore_window());
    AutomatedBackupDocument {
        backup_id: owned(backup.db_cluster_automated_backups_arn()),
        resource_uri: cluster_backups_uri(&cluster_id),
        cluster_id: Some(cluster_id),
        instance_id: None,
        status: owned(backup.status()),
        engine: backup.engine().map(str::to_string),
        engine_version: backup.engine_version().map(str::to_string),
        earliest_restorable_time: earliest,
        latest_restorable_time: latest,
        backup_retention: backup.backup_retention_period(),
    }
}

pub fn instance_automated_backup(backup: &DbInstanceAutomatedBackup) -> AutomatedBackupDocument {
    let instance_id = owned(backup.db_instance_identifier());
    let (earliest, latest) = restore_window(backup.restore_window());
    AutomatedBackupDocument {
        backup_id: owned(backup.db_instance_automated_backups_arn()),
        resource_uri: instance_backups_uri(&instance_id),
        cluster_id: None,
        instance_id: Some(instance_id),
        status: owned(backup.status()),
        engine: backup.engine().map(str::to_string),
        engine_version: backup.engine_version().map(str::to_string),
        earliest_restorable_time: earliest,
        latest_restorable_time: latest,
        backup_retention: backup.backup_retention_period(),
    }
}

pub fn cluster_parameter_group(group: &DbClusterParameterGroup) -> ParameterGroupDocument {
    ParameterGroupDocument {
        name: owned(group.db_cluster_parameter_group_name()),
        family: group.db_parameter_group_family().map(str::to_string),
        description: group.description().map(str::to_string),
        arn: group.db_cluster_parameter_group_arn().map(str::to_string),
        tags: BTreeMap::new(),
    }
}

pub fn instance_parameter_group(group: &DbParameterGroup) -> ParameterGroupDocument {
    ParameterGroupDocument {
        name: owned(group.db_parameter_group_name()),
        family: group.db_parameter_group_family().map(str::to_string),
        description: group.description().map(str::to_string),
        arn: group.db_parameter_group_arn().map(str::to_string),
        tags: BTreeMap::new(),
    }
}

pub fn parameter(parameter: &Parameter) -> ParameterDocument {
    ParameterDocument {
        name: owned(parameter.parameter_name()),
        value: parameter.parameter_value().map(str::to_string),
        description: parameter.description().map(str::to_string),
        apply_type: parameter.apply_type().map(str::to_string),
        apply_method: parameter.apply_method().map(|m| m.as_str().to_string()),
        data_type: parameter.data_type().map(str::to_string),
        allowed_values: parameter.allowed_values().map(str::to_string),
        is_modifiable: parameter.is_modifiable().unwrap_or(false),
        source: parameter.source().map(str::to_string),
    }
}
