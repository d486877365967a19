//! RDS MCP Server - Main entry point.
//!
//! This server provides MCP (Model Context Protocol) tools for AI assistants
//! to manage Amazon RDS clusters, instances, parameter groups and snapshots.

use clap::Parser;
use rds_mcp_server::auth::AuthConfig;
use rds_mcp_server::config::{Config, TransportMode};
use rds_mcp_server::rds::{AwsRdsClient, ConfirmationGate};
use rds_mcp_server::tools::Dispatcher;
use rds_mcp_server::transport::{HttpTransport, StdioTransport, Transport};
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Initialize the tracing subscriber for logging.
///
/// Logs always go to stderr; stdout belongs to the stdio transport.
fn init_tracing(config: &Config) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        subscriber
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_writer(std::io::stderr),
            )
            .init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Parse configuration from command line and environment
    let config = Config::parse();

    init_tracing(&config);

    if let Err(e) = config.validate() {
        error!(error = %e, "Invalid configuration");
        return Err(e.into());
    }

    info!(
        transport = %config.transport,
        region = %config.region,
        readonly = config.readonly,
        max_items = config.max_items,
        "Starting RDS MCP Server v{}",
        env!("CARGO_PKG_VERSION")
    );
    if !config.readonly {
        warn!("Readonly mode is OFF: mutating tools are enabled behind confirmation");
    }

    let client = AwsRdsClient::connect(
        &config.region,
        config.profile.as_deref(),
        config.endpoint_url.as_deref(),
    )
    .await?;

    let dispatcher = Arc::new(Dispatcher::new(Arc::new(client), config.settings()));

    // Start the sweep for stale confirmation challenges
    ConfirmationGate::start_cleanup_task(dispatcher.confirmations());

    let result = match config.transport {
        TransportMode::Stdio => {
            info!("Using stdio transport");
            let transport = StdioTransport::new(dispatcher);
            transport.run().await
        }
        TransportMode::Http => {
            let auth = AuthConfig::from_tokens(&config.auth_tokens)?;
            info!(
                host = %config.http_host,
                port = config.http_port,
                endpoint = %config.mcp_endpoint,
                auth_tokens = auth.token_count(),
                "Using HTTP transport"
            );
            if !auth.is_enabled() {
                warn!("HTTP transport running without authentication");
            }
            let transport = HttpTransport::new(
                dispatcher,
                auth,
                &config.http_host,
                config.http_port,
                &config.mcp_endpoint,
            );
            transport.run().await
        }
    };

    if let Err(e) = result {
        error!(error = %e, "Server error");
        return Err(e.into());
    }

    info!("Server shutdown complete");
    Ok(())
}
