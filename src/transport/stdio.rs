//! Stdio transport for the MCP server.
//!
//! This transport uses standard input/output for communication,
//! which is the standard mode for CLI-based MCP integrations.

use super::wait_for_signal;
use crate::error::{RdsError, RdsResult};
use crate::mcp::RdsService;
use crate::tools::Dispatcher;
use crate::transport::Transport;
use rmcp::{ServiceExt, transport::stdio};
use std::sync::Arc;
use tracing::{info, warn};

/// Stdio transport implementation.
///
/// Reads JSON-RPC messages from stdin and writes responses to stdout. Logs go
/// to stderr so they never interleave with protocol traffic.
pub struct StdioTransport {
    dispatcher: Arc<Dispatcher>,
}

impl StdioTransport {
    pub fn new(dispatcher: Arc<Dispatcher>) -> Self {
        Self { dispatcher }
    }
}

impl Transport for StdioTransport {
    async fn run(&self) -> RdsResult<()> {
        info!("Starting MCP server with stdio transport");

        let service = RdsService::new(self.dispatcher.clone());
        let running_service = service.serve(stdio()).await.map_err(|e| {
            RdsError::internal(format!("Failed to start stdio transport: {}", e))
        })?;

        let shutdown_requested = tokio::select! {
            result = running_service.waiting() => {
                match result {
                    Ok(_quit_reason) => info!("Stdio transport completed normally"),
                    Err(e) => {
                        warn!(error = %e, "Stdio transport error");
                        return Err(RdsError::internal(format!("Stdio transport error: {}", e)));
                    }
                }
                false
            }
            _ = wait_for_signal() => {
                info!("Shutdown signal received (send again to force exit)");
                true
            }
        };

        if shutdown_requested {
            tokio::spawn(async {
                wait_for_signal().await;
                warn!("Received second signal, forcing immediate exit");
                std::process::exit(1);
            });

            let outstanding = self.dispatcher.confirmations().count().await;
            info!(outstanding, "Discarding outstanding confirmation challenges");

            // A blocking stdin read cannot be interrupted from select!.
            info!("Exiting process");
            std::process::exit(0);
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "stdio"
    }
}
