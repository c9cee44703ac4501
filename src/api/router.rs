//! API router configuration.

use std::future::IntoFuture;

use axum::{
    routing::{get, post},
    Router,
};
use tokio::net::TcpListener;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::info;

use super::handlers::{
    connect, events, health, launch_app, pairing_code, send_key, send_text, status, AppState,
};
use crate::error::RemoteError;

/// Create the API router for the given state.
pub fn create_router(state: AppState) -> Router {
    let api = Router::new()
        .route("/status", get(status))
        .route("/connect", post(connect))
        .route("/pairing_code", post(pairing_code))
        .route("/send_key", post(send_key))
        .route("/send_text", post(send_text))
        .route("/launch_app", post(launch_app))
        .route("/events", get(events));

    Router::new()
        .route("/health", get(health))
        .nest("/api", api)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Server configuration.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host address to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// Drain in-flight requests on Ctrl-C instead of stopping at once.
    pub graceful_shutdown: bool,
}

impl ServerConfig {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            graceful_shutdown: true,
        }
    }

    pub fn without_graceful_shutdown(mut self) -> Self {
        self.graceful_shutdown = false;
        self
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new("0.0.0.0", 7503)
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Start the API server and run until Ctrl-C.
pub async fn serve(config: ServerConfig, state: AppState) -> crate::Result<()> {
    let addr = config.bind_address();
    let router = create_router(state);

    let listener = TcpListener::bind(&addr).await.map_err(RemoteError::Io)?;
    info!("Starting droidtv-remote API server on {}", addr);

    let server = axum::serve(listener, router);
    let result = if config.graceful_shutdown {
        server.with_graceful_shutdown(shutdown_signal()).await
    } else {
        tokio::select! {
            result = server.into_future() => result,
            _ = shutdown_signal() => Ok(()),
        }
    };
    result.map_err(|e| RemoteError::Io(std::io::Error::other(e.to_string())))?;

    info!("API server stopped");
    Ok(())
}
