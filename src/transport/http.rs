//! HTTP transport with Streamable HTTP support for the MCP server.
//!
//! This transport uses HTTP with SSE streaming responses, optionally guarded
//! by bearer token authentication.

use super::wait_for_signal;
use crate::auth::{AuthConfig, auth_middleware};
use crate::error::{RdsError, RdsResult};
use crate::mcp::RdsService;
use crate::tools::Dispatcher;
use crate::transport::Transport;
use rmcp::transport::streamable_http_server::{
    StreamableHttpService, session::local::LocalSessionManager,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{error, info, warn};

/// Time allowed for open SSE streams to drain after a shutdown signal.
const GRACEFUL_TIMEOUT: Duration = Duration::from_secs(30);

/// HTTP transport implementation with Streamable HTTP support.
pub struct HttpTransport {
    dispatcher: Arc<Dispatcher>,
    auth: Arc<AuthConfig>,
    host: String,
    port: u16,
    /// MCP endpoint path
    endpoint: String,
}

impl HttpTransport {
    pub fn new(
        dispatcher: Arc<Dispatcher>,
        auth: AuthConfig,
        host: impl Into<String>,
        port: u16,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            dispatcher,
            auth: Arc::new(auth),
            host: host.into(),
            port,
            endpoint: endpoint.into(),
        }
    }

    /// Get the bind address.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the MCP endpoint path.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn router(&self) -> axum::Router {
        let dispatcher = self.dispatcher.clone();
        let service = StreamableHttpService::new(
            move || Ok(RdsService::new(dispatcher.clone())),
            LocalSessionManager::default().into(),
            Default::default(),
        );

        // nest_service does not accept "/", so the root endpoint uses a fallback.
        let app = if self.endpoint == "/" {
            axum::Router::new().fallback_service(service)
        } else {
            axum::Router::new().nest_service(&self.endpoint, service)
        };

        app.layer(axum::middleware::from_fn_with_state(
            self.auth.clone(),
            auth_middleware,
        ))
    }
}

impl Transport for HttpTransport {
    async fn run(&self) -> RdsResult<()> {
        let bind_addr = self.bind_addr();
        info!(
            auth_enabled = self.auth.is_enabled(),
            "Starting MCP server with HTTP transport on {}", bind_addr
        );

        let app = self.router();

        let listener = TcpListener::bind(&bind_addr).await.map_err(|e| {
            RdsError::internal(format!("Failed to bind to {}: {}", bind_addr, e))
        })?;

        info!(endpoint = %self.endpoint, "MCP endpoint ready");

        let shutdown_notify = Arc::new(tokio::sync::Notify::new());
        let shutdown_notify_clone = shutdown_notify.clone();
        let shutdown_signal = async move {
            wait_for_signal().await;
            shutdown_notify_clone.notify_one();
        };

        let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal);

        // SSE streams can keep the server alive, so bound the drain time.
        tokio::select! {
            result = server => {
                match result {
                    Ok(()) => info!("HTTP server stopped"),
                    Err(e) => {
                        error!(error = %e, "HTTP server error");
                        return Err(RdsError::internal(format!("HTTP server error: {}", e)));
                    }
                }
            }
            _ = async {
                shutdown_notify.notified().await;
                info!(
                    timeout_secs = GRACEFUL_TIMEOUT.as_secs(),
                    "Waiting for connections to close (send signal again to force exit)..."
                );
                tokio::select! {
                    _ = tokio::time::sleep(GRACEFUL_TIMEOUT) => {
                        warn!("Graceful shutdown timeout, forcing exit");
                    }
                    _ = wait_for_signal() => {
                        warn!("Received second signal, forcing immediate exit");
                    }
                }
            } => {}
        }

        let outstanding = self.dispatcher.confirmations().count().await;
        info!(outstanding, "Discarding outstanding confirmation challenges");

        Ok(())
    }

    fn name(&self) -> &'static str {
        "http"
    }
}
