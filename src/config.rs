//! Configuration handling for the RDS MCP Server.
//!
//! This module provides configuration management via CLI arguments and environment variables.

use crate::rds::confirmation::{
    DEFAULT_CONFIRMATION_TTL_SECS, DEFAULT_TOKEN_BYTES, MAX_TOKEN_BYTES, MIN_TOKEN_BYTES,
};
use crate::tools::dispatcher::{
    DEFAULT_MAX_ITEMS, DEFAULT_THROTTLE_BACKOFF_MS, DEFAULT_THROTTLE_RETRIES, DispatchSettings,
    RetryPolicy,
};
use clap::{Parser, ValueEnum};
use std::time::Duration;
use url::Url;

pub const DEFAULT_REGION: &str = "us-east-1";
pub const DEFAULT_HTTP_HOST: &str = "127.0.0.1";
pub const DEFAULT_HTTP_PORT: u16 = 8080;
pub const DEFAULT_MCP_ENDPOINT: &str = "/";

/// Transport mode for the MCP server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum TransportMode {
    /// Standard input/output (for CLI integration)
    #[default]
    Stdio,
    /// Streamable HTTP (for web clients)
    Http,
}

impl std::fmt::Display for TransportMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Stdio => write!(f, "stdio"),
            Self::Http => write!(f, "http"),
        }
    }
}

/// Configuration for the RDS MCP Server.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "rds-mcp-server",
    about = "MCP server for Amazon RDS management - lets AI assistants operate RDS clusters and instances",
    version,
    author
)]
pub struct Config {
    /// AWS region for all RDS calls
    #[arg(long, default_value = DEFAULT_REGION, env = "AWS_REGION")]
    pub region: String,

    /// AWS shared config profile. Uses the default provider chain when omitted.
    #[arg(long, env = "AWS_PROFILE")]
    pub profile: Option<String>,

    /// Refuse every mutating operation. Pass `--readonly false` to allow writes.
    #[arg(
        long,
        default_value_t = true,
        action = clap::ArgAction::Set,
        env = "RDS_MCP_READONLY"
    )]
    pub readonly: bool,

    /// Maximum items returned by a list operation
    #[arg(long, default_value_t = DEFAULT_MAX_ITEMS, env = "RDS_MCP_MAX_ITEMS")]
    pub max_items: usize,

    /// Lifetime of a confirmation token in seconds
    #[arg(
        long,
        default_value_t = DEFAULT_CONFIRMATION_TTL_SECS,
        env = "RDS_MCP_CONFIRMATION_TTL"
    )]
    pub confirmation_ttl: u64,

    /// Random bytes per confirmation token (16-64)
    #[arg(
        long,
        default_value_t = DEFAULT_TOKEN_BYTES,
        env = "RDS_MCP_CONFIRMATION_TOKEN_BYTES"
    )]
    pub confirmation_token_bytes: usize,

    /// Retries after a throttling error
    #[arg(
        long,
        default_value_t = DEFAULT_THROTTLE_RETRIES,
        env = "RDS_MCP_THROTTLE_RETRIES"
    )]
    pub throttle_retries: u32,

    /// Delay before the first throttle retry in milliseconds; doubles on each retry
    #[arg(
        long,
        default_value_t = DEFAULT_THROTTLE_BACKOFF_MS,
        env = "RDS_MCP_THROTTLE_BACKOFF_MS"
    )]
    pub throttle_backoff_ms: u64,

    /// Custom RDS endpoint URL (e.g. a local emulator)
    #[arg(long, value_name = "URL", env = "RDS_MCP_ENDPOINT_URL")]
    pub endpoint_url: Option<String>,

    /// Transport mode (stdio or http)
    #[arg(
        short,
        long,
        value_enum,
        default_value = "stdio",
        env = "MCP_TRANSPORT"
    )]
    pub transport: TransportMode,

    /// HTTP host to bind to (only used with http transport)
    #[arg(
        long,
        default_value = DEFAULT_HTTP_HOST,
        env = "MCP_HTTP_HOST"
    )]
    pub http_host: String,

    /// HTTP port to bind to (only used with http transport)
    #[arg(
        long,
        default_value_t = DEFAULT_HTTP_PORT,
        env = "MCP_HTTP_PORT"
    )]
    pub http_port: u16,

    /// MCP endpoint path (only used with http transport)
    #[arg(
        long,
        default_value = DEFAULT_MCP_ENDPOINT,
        env = "MCP_ENDPOINT"
    )]
    pub mcp_endpoint: String,

    /// Authentication tokens for HTTP transport.
    /// Can be specified multiple times or as comma-separated values.
    /// When set, all HTTP requests must include a valid Bearer token.
    #[arg(
        long = "auth-token",
        value_name = "TOKEN",
        env = "MCP_AUTH_TOKENS",
        value_delimiter = ','
    )]
    pub auth_tokens: Vec<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", env = "MCP_LOG_LEVEL")]
    pub log_level: String,

    /// Enable JSON logging format
    #[arg(long, env = "MCP_JSON_LOGS")]
    pub json_logs: bool,
}

impl Config {
    /// Parse configuration from command line arguments.
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Create a default configuration (useful for testing).
    pub fn default_config() -> Self {
        Self {
            region: DEFAULT_REGION.to_string(),
            profile: None,
            readonly: true,
            max_items: DEFAULT_MAX_ITEMS,
            confirmation_ttl: DEFAULT_CONFIRMATION_TTL_SECS,
            confirmation_token_bytes: DEFAULT_TOKEN_BYTES,
            throttle_retries: DEFAULT_THROTTLE_RETRIES,
            throttle_backoff_ms: DEFAULT_THROTTLE_BACKOFF_MS,
            endpoint_url: None,
            transport: TransportMode::Stdio,
            http_host: DEFAULT_HTTP_HOST.to_string(),
            http_port: DEFAULT_HTTP_PORT,
            mcp_endpoint: DEFAULT_MCP_ENDPOINT.to_string(),
            auth_tokens: Vec::new(),
            log_level: "info".to_string(),
            json_logs: false,
        }
    }

    /// Reject values the server cannot run with.
    pub fn validate(&self) -> Result<(), String> {
        if self.region.trim().is_empty() {
            return Err("region must not be empty".to_string());
        }
        if self.max_items == 0 {
            return Err("max_items must be greater than 0".to_string());
        }
        if self.confirmation_ttl == 0 {
            return Err("confirmation_ttl must be greater than 0".to_string());
        }
        if !(MIN_TOKEN_BYTES..=MAX_TOKEN_BYTES).contains(&self.confirmation_token_bytes) {
            return Err(format!(
                "confirmation_token_bytes must be between {} and {}",
                MIN_TOKEN_BYTES, MAX_TOKEN_BYTES
            ));
        }
        if let Some(endpoint) = &self.endpoint_url {
            let url = Url::parse(endpoint).map_err(|e| format!("Invalid endpoint URL: {e}"))?;
            if !matches!(url.scheme(), "http" | "https") {
                return Err(format!(
                    "Endpoint URL must use http or https, got '{}'",
                    url.scheme()
                ));
            }
        }
        if !self.mcp_endpoint.starts_with('/') {
            return Err("mcp_endpoint must start with '/'".to_string());
        }
        Ok(())
    }

    /// Settings injected into the dispatcher.
    pub fn settings(&self) -> DispatchSettings {
        DispatchSettings {
            readonly: self.readonly,
            max_items: self.max_items,
            confirmation_ttl: self.confirmation_ttl_duration(),
            token_bytes: self.confirmation_token_bytes,
            retry: RetryPolicy {
                max_retries: self.throttle_retries,
                base_delay: Duration::from_millis(self.throttle_backoff_ms),
            },
        }
    }

    /// Get the confirmation TTL as a Duration.
    pub fn confirmation_ttl_duration(&self) -> Duration {
        Duration::from_secs(self.confirmation_ttl)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::default_config()
    }
}
