//! `RdsApi` backed by the AWS SDK.
//!
//! Maps snake_case tool parameters onto the SDK fluent builders and shapes the
//! outputs into resource documents. SDK failures are converted into
//! `ProviderError` and translated by the single table in `crate::error`.

use super::adapter::{Page, PageWindow, RdsApi};
use super::shape;
use crate::error::{ProviderError, RdsError, RdsResult};
use crate::models::{Operation, ParameterGroupChangeDocument, Params};
use async_trait::async_trait;
use aws_config::retry::RetryConfig;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_rds::Client;
use aws_sdk_rds::config::ProvideCredentials;
use aws_sdk_rds::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_rds::types::{ApplyMethod, Parameter, Tag};
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, info};

/// Tag naming the server version that created a resource.
pub const VERSION_TAG_KEY: &str = "mcp_server_version";

/// Tag naming the creator of a resource.
pub const CREATED_BY_TAG_KEY: &str = "created_by";
pub const CREATED_BY_TAG_VALUE: &str = "rds-mcp-server";

/// Tags applied to every resource this server creates or restores. Caller
/// supplied tags with the same keys are overridden.
pub fn server_tags(params: &Params) -> Vec<(String, String)> {
    let mut tags: Vec<(String, String)> = params
        .get_tags("tags")
        .unwrap_or_default()
        .into_iter()
        .filter(|(key, _)| key != VERSION_TAG_KEY && key != CREATED_BY_TAG_KEY)
        .collect();
    tags.push((
        VERSION_TAG_KEY.to_string(),
        env!("CARGO_PKG_VERSION").to_string(),
    ));
    tags.push((
        CREATED_BY_TAG_KEY.to_string(),
        CREATED_BY_TAG_VALUE.to_string(),
    ));
    tags
}

fn sdk_tags(params: &Params) -> Option<Vec<Tag>> {
    Some(
        server_tags(params)
            .into_iter()
            .map(|(key, value)| Tag::builder().key(key).value(value).build())
            .collect(),
    )
}

fn sdk_parameters(params: &Params) -> Option<Vec<Parameter>> {
    let changes = params.get_parameters("parameters")?;
    Some(
        changes
            .into_iter()
            .map(|change| {
                Parameter::builder()
                    .parameter_name(change.name)
                    .set_parameter_value(change.value)
                    .set_apply_method(change.apply_method.as_deref().map(ApplyMethod::from))
                    .build()
            })
            .collect(),
    )
}

/// Convert an SDK failure into a raw provider error.
///
/// Service errors keep the provider's error code. Failures that produced no
/// service response get a synthetic code, or are reported as credential
/// failures when the SDK could not resolve an identity.
pub fn provider_error<E, R>(err: SdkError<E, R>) -> ProviderError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug,
{
    if let SdkError::ServiceError(service) = &err {
        let inner = service.err();
        let code = inner.code().unwrap_or("Unknown").to_string();
        let message = inner
            .message()
            .map(str::to_string)
            .unwrap_or_else(|| DisplayErrorContext(inner).to_string());
        return ProviderError::service(code, message);
    }

    let synthetic = match &err {
        SdkError::ConstructionFailure(_) => "ConstructionFailure",
        SdkError::TimeoutError(_) => "TimeoutError",
        SdkError::DispatchFailure(_) => "DispatchFailure",
        SdkError::ResponseError(_) => "ResponseError",
        _ => "Unknown",
    };
    let message = DisplayErrorContext(&err).to_string();
    let lowered = message.to_ascii_lowercase();
    if lowered.contains("credential") || lowered.contains("identity") {
        ProviderError::credentials(message)
    } else {
        ProviderError::transport(synthetic, message)
    }
}

fn sdk_failure<E, R>(err: SdkError<E, R>) -> RdsError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
    R: std::fmt::Debug,
{
    RdsError::from(provider_error(err))
}

fn required(params: &Params, name: &str) -> RdsResult<String> {
    params
        .get_string(name)
        .ok_or_else(|| RdsError::invalid_parameter(format!("Missing required parameter: {}", name)))
}

fn document<T: Serialize>(doc: T) -> RdsResult<Value> {
    serde_json::to_value(doc)
        .map_err(|e| RdsError::internal(format!("Failed to serialize document: {}", e)))
}

fn missing(what: &str) -> RdsError {
    RdsError::internal(format!("RDS response did not include {}", what))
}

fn to_values<T, D: Serialize>(items: &[T], shape: impl Fn(&T) -> D) -> RdsResult<Vec<Value>> {
    items.iter().map(|item| document(shape(item))).collect()
}

#[derive(Clone)]
pub struct AwsRdsClient {
    client: Client,
}

impl AwsRdsClient {
    /// Build a client from the standard AWS provider chain.
    ///
    /// The SDK's own retry layer is disabled; throttling is retried by the
    /// dispatcher instead.
    pub async fn connect(
        region: &str,
        profile: Option<&str>,
        endpoint_url: Option<&str>,
    ) -> RdsResult<Self> {
        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(region.to_string()))
            .retry_config(RetryConfig::disabled());
        if let Some(profile) = profile {
            loader = loader.profile_name(profile);
        }
        if let Some(endpoint) = endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }
        let shared_config = loader.load().await;

        let provider = shared_config.credentials_provider().ok_or_else(|| {
            RdsError::credentials_unavailable("No AWS credentials provider could be configured")
        })?;
        provider.provide_credentials().await.map_err(|e| {
            RdsError::credentials_unavailable(format!(
                "AWS credentials could not be resolved: {}",
                DisplayErrorContext(&e)
            ))
        })?;

        info!(
            region = %region,
            profile = profile.unwrap_or("default"),
            custom_endpoint = endpoint_url.is_some(),
            "AWS RDS client configured"
        );

        Ok(Self {
            client: Client::new(&shared_config),
        })
    }

    // ========================================================================
    // Clusters
    // ========================================================================

    async fn create_db_cluster(&self, p: &Params) -> RdsResult<Value> {
        let output = self
            .client
            .create_db_cluster()
            .db_cluster_identifier(required(p, "db_cluster_identifier")?)
            .engine(required(p, "engine")?)
            .master_username(required(p, "master_username")?)
            .set_manage_master_user_password(p.get_bool("manage_master_user_password"))
            .set_database_name(p.get_string("database_name"))
            .set_vpc_security_group_ids(p.get_string_list("vpc_security_group_ids"))
            .set_db_subnet_group_name(p.get_string("db_subnet_group_name"))
            .set_availability_zones(p.get_string_list("availability_zones"))
            .set_backup_retention_period(p.get_i32("backup_retention_period"))
            .set_port(p.get_i32("port"))
            .set_engine_version(p.get_string("engine_version"))
            .set_db_cluster_parameter_group_name(p.get_string("db_cluster_parameter_group_name"))
            .set_storage_encrypted(p.get_bool("storage_encrypted"))
            .set_deletion_protection(p.get_bool("deletion_protection"))
            .set_tags(sdk_tags(p))
            .send()
            .await
            .map_err(sdk_failure)?;
        let cluster = output.db_cluster().ok_or_else(|| missing("DBCluster"))?;
        document(shape::cluster(cluster))
    }

    async fn modify_db_cluster(&self, p: &Params) -> RdsResult<Value> {
        let output = self
            .client
            .modify_db_cluster()
            .db_cluster_identifier(required(p, "db_cluster_identifier")?)
            .set_apply_immediately(p.get_bool("apply_immediately"))
            .set_backup_retention_period(p.get_i32("backup_retention_period"))
            .set_db_cluster_parameter_group_name(p.get_string("db_cluster_parameter_group_name"))
            .set_vpc_security_group_ids(p.get_string_list("vpc_security_group_ids"))
            .set_port(p.get_i32("port"))
            .set_manage_master_user_password(p.get_bool("manage_master_user_password"))
            .set_engine_version(p.get_string("engine_version"))
            .set_allow_major_version_upgrade(p.get_bool("allow_major_version_upgrade"))
            .set_preferred_backup_window(p.get_string("preferred_backup_window"))
            .set_preferred_maintenance_window(p.get_string("preferred_maintenance_window"))
            .set_deletion_protection(p.get_bool("deletion_protection"))
            .send()
            .await
            .map_err(sdk_failure)?;
        let cluster = output.db_cluster().ok_or_else(|| missing("DBCluster"))?;
        document(shape::cluster(cluster))
    }

    async fn delete_db_cluster(&self, p: &Params) -> RdsResult<Value> {
        let output = self
            .client
            .delete_db_cluster()
            .db_cluster_identifier(required(p, "db_cluster_identifier")?)
            .skip_final_snapshot(p.flag("skip_final_snapshot"))
            .set_final_db_snapshot_identifier(p.get_string("final_db_snapshot_identifier"))
            .send()
            .await
            .map_err(sdk_failure)?;
        let cluster = output.db_cluster().ok_or_else(|| missing("DBCluster"))?;
        document(shape::cluster(cluster))
    }

    async fn change_db_cluster_status(&self, p: &Params) -> RdsResult<Value> {
        let id = required(p, "db_cluster_identifier")?;
        let cluster = match required(p, "action")?.as_str() {
            "start" => self
                .client
                .start_db_cluster()
                .db_cluster_identifier(id)
                .send()
                .await
                .map_err(sdk_failure)?
                .db_cluster()
                .map(shape::cluster),
            "stop" => self
                .client
                .stop_db_cluster()
                .db_cluster_identifier(id)
                .send()
                .await
                .map_err(sdk_failure)?
                .db_cluster()
                .map(shape::cluster),
            "reboot" => self
                .client
                .reboot_db_cluster()
                .db_cluster_identifier(id)
                .send()
                .await
                .map_err(sdk_failure)?
                .db_cluster()
                .map(shape::cluster),
            other => {
                return Err(RdsError::invalid_parameter(format!(
                    "Unsupported action '{}'",
                    other
                )));
            }
        };
        document(cluster.ok_or_else(|| missing("DBCluster"))?)
    }

    async fn failover_db_cluster(&self, p: &Params) -> RdsResult<Value> {
        let output = self
            .client
            .failover_db_cluster()
            .db_cluster_identifier(required(p, "db_cluster_identifier")?)
            .set_target_db_instance_identifier(p.get_string("target_db_instance_identifier"))
            .send()
            .await
            .map_err(sdk_failure)?;
        let cluster = output.db_cluster().ok_or_else(|| missing("DBCluster"))?;
        document(shape::cluster(cluster))
    }

    async fn get_db_cluster(&self, p: &Params) -> RdsResult<Value> {
        let id = required(p, "db_cluster_identifier")?;
        let output = self
            .client
            .describe_db_clusters()
            .db_cluster_identifier(id.clone())
            .send()
            .await
            .map_err(sdk_failure)?;
        let cluster = output
            .db_clusters()
            .first()
            .ok_or_else(|| RdsError::not_found(format!("DB cluster '{}' not found", id)))?;
        document(shape::cluster(cluster))
    }

    // ========================================================================
    // Snapshots and restores
    // ========================================================================

    async fn create_db_cluster_snapshot(&self, p: &Params) -> RdsResult<Value> {
        let output = self
            .client
            .create_db_cluster_snapshot()
            .db_cluster_snapshot_identifier(required(p, "db_cluster_snapshot_identifier")?)
            .db_cluster_identifier(required(p, "db_cluster_identifier")?)
            .set_tags(sdk_tags(p))
            .send()
            .await
            .map_err(sdk_failure)?;
        let snapshot = output
            .db_cluster_snapshot()
            .ok_or_else(|| missing("DBClusterSnapshot"))?;
        document(shape::cluster_snapshot(snapshot))
    }

    async fn delete_db_cluster_snapshot(&self, p: &Params) -> RdsResult<Value> {
        let output = self
            .client
            .delete_db_cluster_snapshot()
            .db_cluster_snapshot_identifier(required(p, "db_cluster_snapshot_identifier")?)
            .send()
            .await
            .map_err(sdk_failure)?;
        let snapshot = output
            .db_cluster_snapshot()
            .ok_or_else(|| missing("DBClusterSnapshot"))?;
        document(shape::cluster_snapshot(snapshot))
    }

    async fn restore_from_snapshot(&self, p: &Params) -> RdsResult<Value> {
        let output = self
            .client
            .restore_db_cluster_from_snapshot()
            .db_cluster_identifier(required(p, "db_cluster_identifier")?)
            .snapshot_identifier(required(p, "snapshot_identifier")?)
            .engine(required(p, "engine")?)
            .set_engine_version(p.get_string("engine_version"))
            .set_vpc_security_group_ids(p.get_string_list("vpc_security_group_ids"))
            .set_db_subnet_group_name(p.get_string("db_subnet_group_name"))
            .set_availability_zones(p.get_string_list("availability_zones"))
            .set_port(p.get_i32("port"))
            .set_tags(sdk_tags(p))
            .send()
            .await
            .map_err(sdk_failure)?;
        let cluster = output.db_cluster().ok_or_else(|| missing("DBCluster"))?;
        document(shape::cluster(cluster))
    }

    async fn restore_to_point_in_time(&self, p: &Params) -> RdsResult<Value> {
        let output = self
            .client
            .restore_db_cluster_to_point_in_time()
            .db_cluster_identifier(required(p, "db_cluster_identifier")?)
            .source_db_cluster_identifier(required(p, "source_db_cluster_identifier")?)
            .set_restore_to_time(p.get_timestamp("restore_to_time").map(shape::sdk_timestamp))
            .set_use_latest_restorable_time(p.get_bool("use_latest_restorable_time"))
            .set_port(p.get_i32("port"))
            .set_db_subnet_group_name(p.get_string("db_subnet_group_name"))
            .set_vpc_security_group_ids(p.get_string_list("vpc_security_group_ids"))
            .set_tags(sdk_tags(p))
            .send()
            .await
            .map_err(sdk_failure)?;
        let cluster = output.db_cluster().ok_or_else(|| missing("DBCluster"))?;
        document(shape::cluster(cluster))
    }

    // ========================================================================
    // Instances
    // ========================================================================

    async fn create_db_instance(&self, p: &Params) -> RdsResult<Value> {
        let output = self
            .client
            .create_db_instance()
            .db_instance_identifier(required(p, "db_instance_identifier")?)
            .db_instance_class(required(p, "db_instance_class")?)
            .engine(required(p, "engine")?)
            .set_allocated_storage(p.get_i32("allocated_storage"))
            .set_master_username(p.get_string("master_username"))
            .set_master_user_password(p.get_string("master_user_password"))
            .set_manage_master_user_password(p.get_bool("manage_master_user_password"))
            .set_db_name(p.get_string("db_name"))
            .set_db_cluster_identifier(p.get_string("db_cluster_identifier"))
            .set_vpc_security_group_ids(p.get_string_list("vpc_security_group_ids"))
            .set_availability_zone(p.get_string("availability_zone"))
            .set_db_subnet_group_name(p.get_string("db_subnet_group_name"))
            .set_multi_az(p.get_bool("multi_az"))
            .set_engine_version(p.get_string("engine_version"))
            .set_storage_type(p.get_string("storage_type"))
            .set_storage_encrypted(p.get_bool("storage_encrypted"))
            .set_port(p.get_i32("port"))
            .set_publicly_accessible(p.get_bool("publicly_accessible"))
            .set_backup_retention_period(p.get_i32("backup_retention_period"))
            .set_db_parameter_group_name(p.get_string("db_parameter_group_name"))
            .set_tags(sdk_tags(p))
            .send()
            .await
            .map_err(sdk_failure)?;
        let instance = output.db_instance().ok_or_else(|| missing("DBInstance"))?;
        document(shape::instance(instance))
    }

    async fn modify_db_instance(&self, p: &Params) -> RdsResult<Value> {
        let output = self
            .client
            .modify_db_instance()
            .db_instance_identifier(required(p, "db_instance_identifier")?)
            .set_apply_immediately(p.get_bool("apply_immediately"))
            .set_allocated_storage(p.get_i32("allocated_storage"))
            .set_db_instance_class(p.get_string("db_instance_class"))
            .set_storage_type(p.get_string("storage_type"))
            .set_backup_retention_period(p.get_i32("backup_retention_period"))
            .set_preferred_backup_window(p.get_string("preferred_backup_window"))
            .set_preferred_maintenance_window(p.get_string("preferred_maintenance_window"))
            .set_multi_az(p.get_bool("multi_az"))
            .set_engine_version(p.get_string("engine_version"))
            .set_allow_major_version_upgrade(p.get_bool("allow_major_version_upgrade"))
            .set_auto_minor_version_upgrade(p.get_bool("auto_minor_version_upgrade"))
            .set_publicly_accessible(p.get_bool("publicly_accessible"))
            .set_vpc_security_group_ids(p.get_string_list("vpc_security_group_ids"))
            .set_db_parameter_group_name(p.get_string("db_parameter_group_name"))
            .set_manage_master_user_password(p.get_bool("manage_master_user_password"))
            .set_deletion_protection(p.get_bool("deletion_protection"))
            .send()
            .await
            .map_err(sdk_failure)?;
        let instance = output.db_instance().ok_or_else(|| missing("DBInstance"))?;
        document(shape::instance(instance))
    }

    async fn delete_db_instance(&self, p: &Params) -> RdsResult<Value> {
        let output = self
            .client
            .delete_db_instance()
            .db_instance_identifier(required(p, "db_instance_identifier")?)
            .skip_final_snapshot(p.flag("skip_final_snapshot"))
            .set_final_db_snapshot_identifier(p.get_string("final_db_snapshot_identifier"))
            .set_delete_automated_backups(p.get_bool("delete_automated_backups"))
            .send()
            .await
            .map_err(sdk_failure)?;
        let instance = output.db_instance().ok_or_else(|| missing("DBInstance"))?;
        document(shape::instance(instance))
    }

    async fn change_db_instance_status(&self, p: &Params) -> RdsResult<Value> {
        let id = required(p, "db_instance_identifier")?;
        let instance = match required(p, "action")?.as_str() {
            "start" => self
                .client
                .start_db_instance()
                .db_instance_identifier(id)
                .send()
                .await
                .map_err(sdk_failure)?
                .db_instance()
                .map(shape::instance),
            "stop" => self
                .client
                .stop_db_instance()
                .db_instance_identifier(id)
                .send()
                .await
                .map_err(sdk_failure)?
                .db_instance()
                .map(shape::instance),
            "reboot" => self
                .client
                .reboot_db_instance()
                .db_instance_identifier(id)
                .set_force_failover(p.get_bool("force_failover"))
                .send()
                .await
                .map_err(sdk_failure)?
                .db_instance()
                .map(shape::instance),
            other => {
                return Err(RdsError::invalid_parameter(format!(
                    "Unsupported action '{}'",
                    other
                )));
            }
        };
        document(instance.ok_or_else(|| missing("DBInstance"))?)
    }

    async fn get_db_instance(&self, p: &Params) -> RdsResult<Value> {
        let id = required(p, "db_instance_identifier")?;
        let output = self
            .client
            .describe_db_instances()
            .db_instance_identifier(id.clone())
            .send()
            .await
            .map_err(sdk_failure)?;
        let instance = output
            .db_instances()
            .first()
            .ok_or_else(|| RdsError::not_found(format!("DB instance '{}' not found", id)))?;
        document(shape::instance(instance))
    }

    // ========================================================================
    // Parameter groups
    // ========================================================================

    async fn create_cluster_parameter_group(&self, p: &Params) -> RdsResult<Value> {
        let output = self
            .client
            .create_db_cluster_parameter_group()
            .db_cluster_parameter_group_name(required(p, "db_cluster_parameter_group_name")?)
            .db_parameter_group_family(required(p, "db_parameter_group_family")?)
            .description(required(p, "description")?)
            .set_tags(sdk_tags(p))
            .send()
            .await
            .map_err(sdk_failure)?;
        let group = output
            .db_cluster_parameter_group()
            .ok_or_else(|| missing("DBClusterParameterGroup"))?;
        let mut doc = shape::cluster_parameter_group(group);
        doc.tags = server_tags(p).into_iter().collect();
        document(doc)
    }

    async fn create_instance_parameter_group(&self, p: &Params) -> RdsResult<Value> {
        let output = self
            .client
            .create_db_parameter_group()
            .db_parameter_group_name(required(p, "db_parameter_group_name")?)
            .db_parameter_group_family(required(p, "db_parameter_group_family")?)
            .description(required(p, "description")?)
            .set_tags(sdk_tags(p))
            .send()
            .await
            .map_err(sdk_failure)?;
        let group = output
            .db_parameter_group()
            .ok_or_else(|| missing("DBParameterGroup"))?;
        let mut doc = shape::instance_parameter_group(group);
        doc.tags = server_tags(p).into_iter().collect();
        document(doc)
    }

    async fn modify_cluster_parameter_group(&self, p: &Params) -> RdsResult<Value> {
        let parameters = sdk_parameters(p);
        let changed = parameters.as_ref().map_or(0, Vec::len);
        let output = self
            .client
            .modify_db_cluster_parameter_group()
            .db_cluster_parameter_group_name(required(p, "db_cluster_parameter_group_name")?)
            .set_parameters(parameters)
            .send()
            .await
            .map_err(sdk_failure)?;
        document(ParameterGroupChangeDocument {
            name: output
                .db_cluster_parameter_group_name()
                .unwrap_or_default()
                .to_string(),
            parameters_changed: changed,
            reset_all: false,
        })
    }

    async fn modify_instance_parameter_group(&self, p: &Params) -> RdsResult<Value> {
        let parameters = sdk_parameters(p);
        let changed = parameters.as_ref().map_or(0, Vec::len);
        let output = self
            .client
            .modify_db_parameter_group()
            .db_parameter_group_name(required(p, "db_parameter_group_name")?)
            .set_parameters(parameters)
            .send()
            .await
            .map_err(sdk_failure)?;
        document(ParameterGroupChangeDocument {
            name: output
                .db_parameter_group_name()
                .unwrap_or_default()
                .to_string(),
            parameters_changed: changed,
            reset_all: false,
        })
    }

    async fn reset_cluster_parameter_group(&self, p: &Params) -> RdsResult<Value> {
        let parameters = sdk_parameters(p);
        let changed = parameters.as_ref().map_or(0, Vec::len);
        let reset_all = p.flag("reset_all_parameters");
        let output = self
            .client
            .reset_db_cluster_parameter_group()
            .db_cluster_parameter_group_name(required(p, "db_cluster_parameter_group_name")?)
            .reset_all_parameters(reset_all)
            .set_parameters(parameters)
            .send()
            .await
            .map_err(sdk_failure)?;
        document(ParameterGroupChangeDocument {
            name: output
                .db_cluster_parameter_group_name()
                .unwrap_or_default()
                .to_string(),
            parameters_changed: changed,
            reset_all,
        })
    }

    async fn reset_instance_parameter_group(&self, p: &Params) -> RdsResult<Value> {
        let parameters = sdk_parameters(p);
        let changed = parameters.as_ref().map_or(0, Vec::len);
        let reset_all = p.flag("reset_all_parameters");
        let output = self
            .client
            .reset_db_parameter_group()
            .db_parameter_group_name(required(p, "db_parameter_group_name")?)
            .reset_all_parameters(reset_all)
            .set_parameters(parameters)
            .send()
            .await
            .map_err(sdk_failure)?;
        document(ParameterGroupChangeDocument {
            name: output
                .db_parameter_group_name()
                .unwrap_or_default()
                .to_string(),
            parameters_changed: changed,
            reset_all,
        })
    }
}

#[async_trait]
impl RdsApi for AwsRdsClient {
    async fn execute(&self, operation: Operation, params: &Params) -> RdsResult<Value> {
        debug!(operation = %operation, "Calling RDS");
        match operation {
            Operation::CreateDbCluster => self.create_db_cluster(params).await,
            Operation::ModifyDbCluster => self.modify_db_cluster(params).await,
            Operation::DeleteDbCluster => self.delete_db_cluster(params).await,
            Operation::ChangeDbClusterStatus => self.change_db_cluster_status(params).await,
            Operation::FailoverDbCluster => self.failover_db_cluster(params).await,
            Operation::GetDbCluster => self.get_db_cluster(params).await,
            Operation::CreateDbClusterSnapshot => self.create_db_cluster_snapshot(params).await,
            Operation::DeleteDbClusterSnapshot => self.delete_db_cluster_snapshot(params).await,
            Operation::RestoreDbClusterFromSnapshot => self.restore_from_snapshot(params).await,
            Operation::RestoreDbClusterToPointInTime => {
                self.restore_to_point_in_time(params).await
            }
            Operation::CreateDbInstance => self.create_db_instance(params).await,
            Operation::ModifyDbInstance => self.modify_db_instance(params).await,
            Operation::DeleteDbInstance => self.delete_db_instance(params).await,
            Operation::ChangeDbInstanceStatus => self.change_db_instance_status(params).await,
            Operation::GetDbInstance => self.get_db_instance(params).await,
            Operation::CreateDbClusterParameterGroup => {
                self.create_cluster_parameter_group(params).await
            }
            Operation::CreateDbInstanceParameterGroup => {
                self.create_instance_parameter_group(params).await
            }
            Operation::ModifyDbClusterParameterGroup => {
                self.modify_cluster_parameter_group(params).await
            }
            Operation::ModifyDbInstanceParameterGroup => {
                self.modify_instance_parameter_group(params).await
            }
            Operation::ResetDbClusterParameterGroup => {
                self.reset_cluster_parameter_group(params).await
            }
            Operation::ResetDbInstanceParameterGroup => {
                self.reset_instance_parameter_group(params).await
            }
            Operation::DescribeDbClusters
            | Operation::DescribeDbClusterSnapshots
            | Operation::DescribeDbClusterAutomatedBackups
            | Operation::DescribeDbInstances
            | Operation::DescribeDbSnapshots
            | Operation::DescribeDbInstanceAutomatedBackups
            | Operation::DescribeDbClusterParameterGroups
            | Operation::DescribeDbInstanceParameterGroups
            | Operation::DescribeDbClusterParameters
            | Operation::DescribeDbInstanceParameters
            | Operation::ListDbClusters
            | Operation::ListDbInstances => Err(RdsError::internal(format!(
                "{} is a list operation",
                operation
            ))),
        }
    }

    async fn fetch_page(
        &self,
        operation: Operation,
        p: &Params,
        window: &PageWindow,
    ) -> RdsResult<Page> {
        debug!(
            operation = %operation,
            returned = window.returned,
            page_size = window.page_size,
            "Fetching RDS page"
        );
        let marker = window.marker.clone();
        let max_records = Some(window.page_size);

        match operation {
            Operation::DescribeDbClusters | Operation::ListDbClusters => {
                let output = self
                    .client
                    .describe_db_clusters()
                    .set_db_cluster_identifier(p.get_string("db_cluster_identifier"))
                    .set_max_records(max_records)
                    .set_marker(marker)
                    .send()
                    .await
                    .map_err(sdk_failure)?;
                Ok(Page {
                    items: to_values(output.db_clusters(), shape::cluster)?,
                    next_marker: output.marker().map(str::to_string),
                })
            }
            Operation::DescribeDbClusterSnapshots => {
                let output = self
                    .client
                    .describe_db_cluster_snapshots()
                    .set_db_cluster_identifier(p.get_string("db_cluster_identifier"))
                    .set_db_cluster_snapshot_identifier(
                        p.get_string("db_cluster_snapshot_identifier"),
                    )
                    .set_snapshot_type(p.get_string("snapshot_type"))
                    .set_max_records(max_records)
                    .set_marker(marker)
                    .send()
                    .await
                    .map_err(sdk_failure)?;
                Ok(Page {
                    items: to_values(output.db_cluster_snapshots(), shape::cluster_snapshot)?,
                    next_marker: output.marker().map(str::to_string),
                })
            }
            Operation::DescribeDbClusterAutomatedBackups => {
                let output = self
                    .client
                    .describe_db_cluster_automated_backups()
                    .set_db_cluster_identifier(p.get_string("db_cluster_identifier"))
                    .set_db_cluster_resource_id(p.get_string("db_cluster_resource_id"))
                    .set_max_records(max_records)
                    .set_marker(marker)
                    .send()
                    .await
                    .map_err(sdk_failure)?;
                Ok(Page {
                    items: to_values(
                        output.db_cluster_automated_backups(),
                        shape::cluster_automated_backup,
                    )?,
                    next_marker: output.marker().map(str::to_string),
                })
            }
            Operation::DescribeDbSnapshots => {
                let output = self
                    .client
                    .describe_db_snapshots()
                    .set_db_instance_identifier(p.get_string("db_instance_identifier"))
                    .set_db_snapshot_identifier(p.get_string("db_snapshot_identifier"))
                    .set_snapshot_type(p.get_string("snapshot_type"))
                    .set_max_records(max_records)
                    .set_marker(marker)
                    .send()
                    .await
                    .map_err(sdk_failure)?;
                Ok(Page {
                    items: to_values(output.db_snapshots(), shape::db_snapshot)?,
                    next_marker: output.marker().map(str::to_string),
                })
            }
            Operation::DescribeDbInstanceAutomatedBackups => {
                let output = self
                    .client
                    .describe_db_instance_automated_backups()
                    .set_db_instance_identifier(p.get_string("db_instance_identifier"))
                    .set_dbi_resource_id(p.get_string("dbi_resource_id"))
                    .set_max_records(max_records)
                    .set_marker(marker)
                    .send()
                    .await
                    .map_err(sdk_failure)?;
                Ok(Page {
                    items: to_values(
                        output.db_instance_automated_backups(),
                        shape::instance_automated_backup,
                    )?,
                    next_marker: output.marker().map(str::to_string),
                })
            }
            Operation::DescribeDbInstances | Operation::ListDbInstances => {
                let output = self
                    .client
                    .describe_db_instances()
                    .set_db_instance_identifier(p.get_string("db_instance_identifier"))
                    .set_max_records(max_records)
                    .set_marker(marker)
                    .send()
                    .await
                    .map_err(sdk_failure)?;
                Ok(Page {
                    items: to_values(output.db_instances(), shape::instance)?,
                    next_marker: output.marker().map(str::to_string),
                })
            }
            Operation::DescribeDbClusterParameterGroups => {
                let output = self
                    .client
                    .describe_db_cluster_parameter_groups()
                    .set_db_cluster_parameter_group_name(
                        p.get_string("db_cluster_parameter_group_name"),
                    )
                    .set_max_records(max_records)
                    .set_marker(marker)
                    .send()
                    .await
                    .map_err(sdk_failure)?;
                Ok(Page {
                    items: to_values(
                        output.db_cluster_parameter_groups(),
                        shape::cluster_parameter_group,
                    )?,
                    next_marker: output.marker().map(str::to_string),
                })
            }
            Operation::DescribeDbInstanceParameterGroups => {
                let output = self
                    .client
                    .describe_db_parameter_groups()
                    .set_db_parameter_group_name(p.get_string("db_parameter_group_name"))
                    .set_max_records(max_records)
                    .set_marker(marker)
                    .send()
                    .await
                    .map_err(sdk_failure)?;
                Ok(Page {
                    items: to_values(output.db_parameter_groups(), shape::instance_parameter_group)?,
                    next_marker: output.marker().map(str::to_string),
                })
            }
            Operation::DescribeDbClusterParameters => {
                let output = self
                    .client
                    .describe_db_cluster_parameters()
                    .db_cluster_parameter_group_name(required(p, "db_cluster_parameter_group_name")?)
                    .set_source(p.get_string("source"))
                    .set_max_records(max_records)
                    .set_marker(marker)
                    .send()
                    .await
                    .map_err(sdk_failure)?;
                Ok(Page {
                    items: to_values(output.parameters(), shape::parameter)?,
                    next_marker: output.marker().map(str::to_string),
                })
            }
            Operation::DescribeDbInstanceParameters => {
                let output = self
                    .client
                    .describe_db_parameters()
                    .db_parameter_group_name(required(p, "db_parameter_group_name")?)
                    .set_source(p.get_string("source"))
                    .set_max_records(max_records)
                    .set_marker(marker)
                    .send()
                    .await
                    .map_err(sdk_failure)?;
                Ok(Page {
                    items: to_values(output.parameters(), shape::parameter)?,
                    next_marker: output.marker().map(str::to_string),
                })
            }
            other => Err(RdsError::internal(format!(
                "{} is not a list operation",
                other
            ))),
        }
    }
}
