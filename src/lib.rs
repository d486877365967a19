//! RDS MCP Server Library
//!
//! This library provides MCP (Model Context Protocol) tools for AI assistants
//! to manage Amazon RDS clusters and instances behind a readonly gate and
//! explicit confirmation for every mutating operation.

pub mod auth;
pub mod config;
pub mod error;
pub mod mcp;
pub mod models;
pub mod rds;
pub mod tools;
pub mod transport;

pub use config::Config;
pub use error::{ErrorEnvelope, ErrorKind, RdsError, RdsResult};
pub use mcp::RdsService;
pub use tools::Dispatcher;
