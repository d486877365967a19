//! Data models for the RDS MCP Server.
//!
//! This module re-exports all model types used throughout the application.

pub mod operation;
pub mod request;
pub mod resource;

// Re-export commonly used types
pub use operation::{
    CONFIRMATION_TOKEN_PARAM, Impact, ImpactSource, MAX_ITEMS_PARAM, Operation,
    OperationDescriptor, ParamDefault, ParamSpec, ParamType, RiskLevel,
};
pub use request::{ParameterChange, Params, ToolRequest, ToolResult};
pub use resource::{
    AutomatedBackupDocument, ClusterDocument, ClusterMember, ClusterSnapshotDocument,
    DbSnapshotDocument, Endpoint, InstanceDocument, ParameterDocument,
    ParameterGroupChangeDocument, ParameterGroupDocument,
};
