//! MCP service implementation using rmcp.
//!
//! This module defines the RdsService struct with all RDS tools exposed via
//! the MCP protocol using the rmcp framework's macros. Each tool method only
//! carries its typed input schema and forwards to the dispatcher. Dispatcher
//! failures come back as tool results flagged as errors whose content is the
//! JSON error envelope.

use crate::models::{Operation, ToolRequest};
use crate::tools::Dispatcher;
use crate::tools::inputs::*;
use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::tool::ToolRouter,
    handler::server::wrapper::Parameters,
    model::{
        CallToolResult, Content, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo,
    },
    tool, tool_handler, tool_router,
};
use serde::Serialize;
use std::sync::Arc;

#[derive(Clone)]
pub struct RdsService {
    /// Shared dispatcher for all tool calls
    dispatcher: Arc<Dispatcher>,
    /// Tool router for MCP tool dispatch (auto-generated)
    tool_router: ToolRouter<Self>,
}

impl RdsService {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self {
            dispatcher,
            tool_router: Self::tool_router(),
        }
    }

    /// Forward a typed input to the dispatcher and wrap the outcome.
    async fn call<T: Serialize>(
        &self,
        operation: Operation,
        input: &T,
    ) -> Result<CallToolResult, McpError> {
        let params = to_params(input)?;
        match self
            .dispatcher
            .dispatch(ToolRequest::new(operation, params))
            .await
        {
            Ok(result) => Ok(CallToolResult::success(vec![Content::json(result)?])),
            Err(envelope) => Ok(CallToolResult::error(vec![Content::json(envelope)?])),
        }
    }
}

#[tool_router]
impl RdsService {
    // ------------------------------------------------------------------------
    // Clusters
    // ------------------------------------------------------------------------

    #[tool(
        name = "CreateDBCluster",
        description = "Create an Aurora DB cluster.\nRequires confirmation: the first call returns a confirmation_token; call again with identical parameters plus the token to execute.\nThe master password is managed by RDS unless manage_master_user_password is false."
    )]
    async fn create_db_cluster(
        &self,
        Parameters(input): Parameters<CreateDbClusterInput>,
    ) -> Result<CallToolResult, McpError> {
        self.call(Operation::CreateDbCluster, &input).await
    }

    #[tool(
        name = "ModifyDBCluster",
        description = "Modify an Aurora DB cluster.\nRequires confirmation. At least one setting besides apply_immediately must be given.\nChanges apply in the next maintenance window unless apply_immediately is true."
    )]
    async fn modify_db_cluster(
        &self,
        Parameters(input): Parameters<ModifyDbClusterInput>,
    ) -> Result<CallToolResult, McpError> {
        self.call(Operation::ModifyDbCluster, &input).await
    }

    #[tool(
        name = "DeleteDBCluster",
        description = "Delete an Aurora DB cluster. IRREVERSIBLE.\nRequires confirmation. Provide final_db_snapshot_identifier, or set skip_final_snapshot to true to delete without a snapshot."
    )]
    async fn delete_db_cluster(
        &self,
        Parameters(input): Parameters<DeleteDbClusterInput>,
    ) -> Result<CallToolResult, McpError> {
        self.call(Operation::DeleteDbCluster, &input).await
    }

    #[tool(
        name = "ChangeDBClusterStatus",
        description = "Start, stop or reboot an Aurora DB cluster.\nRequires confirmation. action is one of \"start\", \"stop\", \"reboot\"."
    )]
    async fn change_db_cluster_status(
        &self,
        Parameters(input): Parameters<ChangeDbClusterStatusInput>,
    ) -> Result<CallToolResult, McpError> {
        self.call(Operation::ChangeDbClusterStatus, &input).await
    }

    #[tool(
        name = "FailoverDBCluster",
        description = "Force a failover of an Aurora DB cluster, promoting a reader to writer.\nRequires confirmation. Expect 30-60 seconds of write unavailability."
    )]
    async fn failover_db_cluster(
        &self,
        Parameters(input): Parameters<FailoverDbClusterInput>,
    ) -> Result<CallToolResult, McpError> {
        self.call(Operation::FailoverDbCluster, &input).await
    }

    #[tool(
        name = "DescribeDBClusters",
        description = "Describe DB clusters, optionally restricted to one identifier.\nResults are capped; truncated is true when more clusters exist."
    )]
    async fn describe_db_clusters(
        &self,
        Parameters(input): Parameters<DescribeDbClustersInput>,
    ) -> Result<CallToolResult, McpError> {
        self.call(Operation::DescribeDbClusters, &input).await
    }

    // ------------------------------------------------------------------------
    // Snapshots and restores
    // ------------------------------------------------------------------------

    #[tool(
        name = "CreateDBClusterSnapshot",
        description = "Create a manual snapshot of a DB cluster.\nRequires confirmation."
    )]
    async fn create_db_cluster_snapshot(
        &self,
        Parameters(input): Parameters<CreateDbClusterSnapshotInput>,
    ) -> Result<CallToolResult, McpError> {
        self.call(Operation::CreateDbClusterSnapshot, &input).await
    }

    #[tool(
        name = "DeleteDBClusterSnapshot",
        description = "Delete a manual DB cluster snapshot. IRREVERSIBLE.\nRequires confirmation."
    )]
    async fn delete_db_cluster_snapshot(
        &self,
        Parameters(input): Parameters<DeleteDbClusterSnapshotInput>,
    ) -> Result<CallToolResult, McpError> {
        self.call(Operation::DeleteDbClusterSnapshot, &input).await
    }

    #[tool(
        name = "RestoreDBClusterFromSnapshot",
        description = "Create a new DB cluster from a cluster snapshot.\nRequires confirmation. The new cluster has no instances until CreateDBInstance is called with its identifier."
    )]
    async fn restore_db_cluster_from_snapshot(
        &self,
        Parameters(input): Parameters<RestoreDbClusterFromSnapshotInput>,
    ) -> Result<CallToolResult, McpError> {
        self.call(Operation::RestoreDbClusterFromSnapshot, &input)
            .await
    }

    #[tool(
        name = "RestoreDBClusterToPointInTime",
        description = "Create a new DB cluster from a source cluster's backups at a point in time.\nRequires confirmation. Give exactly one of restore_to_time (RFC 3339) or use_latest_restorable_time."
    )]
    async fn restore_db_cluster_to_point_in_time(
        &self,
        Parameters(input): Parameters<RestoreDbClusterToPointInTimeInput>,
    ) -> Result<CallToolResult, McpError> {
        self.call(Operation::RestoreDbClusterToPointInTime, &input)
            .await
    }

    #[tool(
        name = "DescribeDBClusterSnapshots",
        description = "Describe DB cluster snapshots, filtered by cluster, snapshot identifier or snapshot type."
    )]
    async fn describe_db_cluster_snapshots(
        &self,
        Parameters(input): Parameters<DescribeDbClusterSnapshotsInput>,
    ) -> Result<CallToolResult, McpError> {
        self.call(Operation::DescribeDbClusterSnapshots, &input).await
    }

    #[tool(
        name = "DescribeDBClusterAutomatedBackups",
        description = "Describe retained automated backups of DB clusters, including clusters that were deleted.\nEach backup reports its restorable time window."
    )]
    async fn describe_db_cluster_automated_backups(
        &self,
        Parameters(input): Parameters<DescribeDbClusterAutomatedBackupsInput>,
    ) -> Result<CallToolResult, McpError> {
        self.call(Operation::DescribeDbClusterAutomatedBackups, &input)
            .await
    }

    // ------------------------------------------------------------------------
    // Instances
    // ------------------------------------------------------------------------

    #[tool(
        name = "CreateDBInstance",
        description = "Create a DB instance, standalone or as a member of an Aurora cluster (db_cluster_identifier).\nRequires confirmation."
    )]
    async fn create_db_instance(
        &self,
        Parameters(input): Parameters<CreateDbInstanceInput>,
    ) -> Result<CallToolResult, McpError> {
        self.call(Operation::CreateDbInstance, &input).await
    }

    #[tool(
        name = "ModifyDBInstance",
        description = "Modify a DB instance.\nRequires confirmation. At least one setting besides apply_immediately must be given."
    )]
    async fn modify_db_instance(
        &self,
        Parameters(input): Parameters<ModifyDbInstanceInput>,
    ) -> Result<CallToolResult, McpError> {
        self.call(Operation::ModifyDbInstance, &input).await
    }

    #[tool(
        name = "DeleteDBInstance",
        description = "Delete a DB instance. IRREVERSIBLE.\nRequires confirmation. Provide final_db_snapshot_identifier, or set skip_final_snapshot to true."
    )]
    async fn delete_db_instance(
        &self,
        Parameters(input): Parameters<DeleteDbInstanceInput>,
    ) -> Result<CallToolResult, McpError> {
        self.call(Operation::DeleteDbInstance, &input).await
    }

    #[tool(
        name = "ChangeDBInstanceStatus",
        description = "Start, stop or reboot a DB instance.\nRequires confirmation. force_failover is only valid with action \"reboot\"."
    )]
    async fn change_db_instance_status(
        &self,
        Parameters(input): Parameters<ChangeDbInstanceStatusInput>,
    ) -> Result<CallToolResult, McpError> {
        self.call(Operation::ChangeDbInstanceStatus, &input).await
    }

    #[tool(
        name = "DescribeDBInstances",
        description = "Describe DB instances, optionally restricted to one identifier.\nResults are capped; truncated is true when more instances exist."
    )]
    async fn describe_db_instances(
        &self,
        Parameters(input): Parameters<DescribeDbInstancesInput>,
    ) -> Result<CallToolResult, McpError> {
        self.call(Operation::DescribeDbInstances, &input).await
    }

    #[tool(
        name = "DescribeDBSnapshots",
        description = "Describe manual and automated snapshots of DB instances, filtered by instance, snapshot identifier or snapshot type."
    )]
    async fn describe_db_snapshots(
        &self,
        Parameters(input): Parameters<DescribeDbSnapshotsInput>,
    ) -> Result<CallToolResult, McpError> {
        self.call(Operation::DescribeDbSnapshots, &input).await
    }

    #[tool(
        name = "DescribeDBInstanceAutomatedBackups",
        description = "Describe automated backups of DB instances, including backups retained after the instance was deleted."
    )]
    async fn describe_db_instance_automated_backups(
        &self,
        Parameters(input): Parameters<DescribeDbInstanceAutomatedBackupsInput>,
    ) -> Result<CallToolResult, McpError> {
        self.call(Operation::DescribeDbInstanceAutomatedBackups, &input)
            .await
    }

    // ------------------------------------------------------------------------
    // Parameter groups
    // ------------------------------------------------------------------------

    #[tool(
        name = "CreateDBClusterParameterGroup",
        description = "Create a DB cluster parameter group.\nRequires confirmation."
    )]
    async fn create_db_cluster_parameter_group(
        &self,
        Parameters(input): Parameters<CreateDbClusterParameterGroupInput>,
    ) -> Result<CallToolResult, McpError> {
        self.call(Operation::CreateDbClusterParameterGroup, &input)
            .await
    }

    #[tool(
        name = "CreateDBInstanceParameterGroup",
        description = "Create a DB instance parameter group.\nRequires confirmation."
    )]
    async fn create_db_instance_parameter_group(
        &self,
        Parameters(input): Parameters<CreateDbInstanceParameterGroupInput>,
    ) -> Result<CallToolResult, McpError> {
        self.call(Operation::CreateDbInstanceParameterGroup, &input)
            .await
    }

    #[tool(
        name = "ModifyDBClusterParameterGroup",
        description = "Change up to 20 parameters of a DB cluster parameter group.\nRequires confirmation. apply_method is \"immediate\" or \"pending-reboot\"."
    )]
    async fn modify_db_cluster_parameter_group(
        &self,
        Parameters(input): Parameters<ModifyDbClusterParameterGroupInput>,
    ) -> Result<CallToolResult, McpError> {
        self.call(Operation::ModifyDbClusterParameterGroup, &input)
            .await
    }

    #[tool(
        name = "ModifyDBInstanceParameterGroup",
        description = "Change up to 20 parameters of a DB instance parameter group.\nRequires confirmation. apply_method is \"immediate\" or \"pending-reboot\"."
    )]
    async fn modify_db_instance_parameter_group(
        &self,
        Parameters(input): Parameters<ModifyDbInstanceParameterGroupInput>,
    ) -> Result<CallToolResult, McpError> {
        self.call(Operation::ModifyDbInstanceParameterGroup, &input)
            .await
    }

    #[tool(
        name = "ResetDBClusterParameterGroup",
        description = "Reset parameters of a DB cluster parameter group to engine defaults.\nRequires confirmation. Give reset_all_parameters or a parameters list, not both."
    )]
    async fn reset_db_cluster_parameter_group(
        &self,
        Parameters(input): Parameters<ResetDbClusterParameterGroupInput>,
    ) -> Result<CallToolResult, McpError> {
        self.call(Operation::ResetDbClusterParameterGroup, &input)
            .await
    }

    #[tool(
        name = "ResetDBInstanceParameterGroup",
        description = "Reset parameters of a DB instance parameter group to engine defaults.\nRequires confirmation. Give reset_all_parameters or a parameters list, not both."
    )]
    async fn reset_db_instance_parameter_group(
        &self,
        Parameters(input): Parameters<ResetDbInstanceParameterGroupInput>,
    ) -> Result<CallToolResult, McpError> {
        self.call(Operation::ResetDbInstanceParameterGroup, &input)
            .await
    }

    #[tool(
        name = "DescribeDBClusterParameterGroups",
        description = "Describe DB cluster parameter groups."
    )]
    async fn describe_db_cluster_parameter_groups(
        &self,
        Parameters(input): Parameters<DescribeDbClusterParameterGroupsInput>,
    ) -> Result<CallToolResult, McpError> {
        self.call(Operation::DescribeDbClusterParameterGroups, &input)
            .await
    }

    #[tool(
        name = "DescribeDBInstanceParameterGroups",
        description = "Describe DB instance parameter groups."
    )]
    async fn describe_db_instance_parameter_groups(
        &self,
        Parameters(input): Parameters<DescribeDbInstanceParameterGroupsInput>,
    ) -> Result<CallToolResult, McpError> {
        self.call(Operation::DescribeDbInstanceParameterGroups, &input)
            .await
    }

    #[tool(
        name = "DescribeDBClusterParameters",
        description = "List the parameters of a DB cluster parameter group.\nsource filters by \"user\", \"engine-default\" or \"system\"."
    )]
    async fn describe_db_cluster_parameters(
        &self,
        Parameters(input): Parameters<DescribeDbClusterParametersInput>,
    ) -> Result<CallToolResult, McpError> {
        self.call(Operation::DescribeDbClusterParameters, &input).await
    }

    #[tool(
        name = "DescribeDBInstanceParameters",
        description = "List the parameters of a DB instance parameter group.\nsource filters by \"user\", \"engine-default\" or \"system\"."
    )]
    async fn describe_db_instance_parameters(
        &self,
        Parameters(input): Parameters<DescribeDbInstanceParametersInput>,
    ) -> Result<CallToolResult, McpError> {
        self.call(Operation::DescribeDbInstanceParameters, &input)
            .await
    }

    // ------------------------------------------------------------------------
    // Resource views
    // ------------------------------------------------------------------------

    #[tool(
        name = "ListDBClusters",
        description = "List all DB clusters in the configured region.\nEach item carries a resource_uri of the form aws-rds://db-cluster/{id}."
    )]
    async fn list_db_clusters(
        &self,
        Parameters(input): Parameters<ListInput>,
    ) -> Result<CallToolResult, McpError> {
        self.call(Operation::ListDbClusters, &input).await
    }

    #[tool(
        name = "GetDBCluster",
        description = "Get one DB cluster by identifier (resource aws-rds://db-cluster/{id})."
    )]
    async fn get_db_cluster(
        &self,
        Parameters(input): Parameters<GetDbClusterInput>,
    ) -> Result<CallToolResult, McpError> {
        self.call(Operation::GetDbCluster, &input).await
    }

    #[tool(
        name = "ListDBInstances",
        description = "List all DB instances in the configured region.\nEach item carries a resource_uri of the form aws-rds://db-instance/{id}."
    )]
    async fn list_db_instances(
        &self,
        Parameters(input): Parameters<ListInput>,
    ) -> Result<CallToolResult, McpError> {
        self.call(Operation::ListDbInstances, &input).await
    }

    #[tool(
        name = "GetDBInstance",
        description = "Get one DB instance by identifier (resource aws-rds://db-instance/{id})."
    )]
    async fn get_db_instance(
        &self,
        Parameters(input): Parameters<GetDbInstanceInput>,
    ) -> Result<CallToolResult, McpError> {
        self.call(Operation::GetDbInstance, &input).await
    }
}

#[tool_handler]
impl ServerHandler for RdsService {
    fn get_info(&self) -> ServerInfo {
        let mode = if self.dispatcher.is_readonly() {
            "The server is in READONLY mode: Describe, List and Get tools work; every \
             mutating tool fails with ReadonlyViolation."
        } else {
            "The server is in read-write mode: mutating tools are available behind \
             confirmation."
        };

        ServerInfo {
            protocol_version: ProtocolVersion::V_2025_03_26,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation {
                name: "rds-mcp-server".to_owned(),
                title: Some("RDS MCP Server".to_owned()),
                version: env!("CARGO_PKG_VERSION").to_owned(),
                icons: None,
                website_url: None,
            },
            instructions: Some(format!(
                "Amazon RDS management tools for Aurora clusters, DB instances, \
                 parameter groups, snapshots and automated backups.\n\
                 \n\
                 {mode}\n\
                 \n\
                 ## Confirmation workflow\n\
                 1. Call a mutating tool without `confirmation_token`\n\
                 2. The result is an error of kind ConfirmationRequired carrying a \
                 `confirmation` object with a token, a warning and an impact summary\n\
                 3. Show the warning to the user, then call the same tool again with \
                 identical parameters plus `confirmation_token`\n\
                 \n\
                 Tokens are single use and expire. Changing any parameter invalidates \
                 the token.\n\
                 \n\
                 ## Errors\n\
                 Failures return a JSON envelope with `kind`, `message`, `retryable` \
                 and, when available, `provider_code` and `suggestion`.\n\
                 \n\
                 ## Lists\n\
                 List results contain `items` and `count`; `truncated` is true when \
                 more items exist than were returned. Pass `max_items` to lower the cap."
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{RdsError, RdsResult};
    use crate::models::Params;
    use crate::rds::{Page, PageWindow, RdsApi};
    use crate::tools::DispatchSettings;
    use async_trait::async_trait;
    use serde_json::Value;

    struct Offline;

    #[async_trait]
    impl RdsApi for Offline {
        async fn execute(&self, _: Operation, _: &Params) -> RdsResult<Value> {
            Err(RdsError::credentials_unavailable("offline"))
        }

        async fn fetch_page(&self, _: Operation, _: &Params, _: &PageWindow) -> RdsResult<Page> {
            Ok(Page::default())
        }
    }

    fn create_test_service(readonly: bool) -> RdsService {
        let settings = DispatchSettings {
            readonly,
            ..Default::default()
        };
        RdsService::new(Arc::new(Dispatcher::new(Arc::new(Offline), settings)))
    }

    #[test]
    fn test_server_info() {
        let service = create_test_service(true);
        let info = service.get_info();
        assert_eq!(info.server_info.name, "rds-mcp-server");
        assert!(info.capabilities.tools.is_some());
        assert!(info.instructions.unwrap().contains("READONLY"));
    }

    #[test]
    fn test_server_info_read_write() {
        let service = create_test_service(false);
        let instructions = service.get_info().instructions.unwrap();
        assert!(instructions.contains("read-write"));
    }

    #[test]
    fn test_every_operation_has_a_tool() {
        let tools = RdsService::tool_router().list_all();
        assert_eq!(tools.len(), Operation::ALL.len());
        for operation in Operation::ALL {
            assert!(
                tools.iter().any(|tool| tool.name == operation.name()),
                "no tool named {}",
                operation
            );
        }
    }

    #[tokio::test]
    async fn test_envelope_returned_as_tool_error() {
        let service = create_test_service(true);
        let result = service
            .call(
                Operation::DeleteDbCluster,
                &DeleteDbClusterInput {
                    db_cluster_identifier: "prod-db-1".to_string(),
                    skip_final_snapshot: Some(true),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(result.is_error, Some(true));
    }
}
