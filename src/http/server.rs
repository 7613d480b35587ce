//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the stream controller
//! - Wire up middleware (tracing, request ID, timeout, panic catching)
//! - Freeze the handler registry and stream settings for request handling
//! - Bind server to listener with graceful shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::{routing::any, Router};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    catch_panic::CatchPanicLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::{ServiceConfig, StreamConfig};
use crate::handler::HandlerRegistry;
use crate::http::controller::handle_stream;
use crate::stream::DuplexMode;

/// Stream settings resolved once at startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSettings {
    pub mode: DuplexMode,
    pub max_frame_size: u32,
    pub channel_capacity: usize,
}

impl From<&StreamConfig> for StreamSettings {
    fn from(config: &StreamConfig) -> Self {
        Self {
            mode: DuplexMode::from_full_duplex(config.full_duplex),
            max_frame_size: config.max_frame_size,
            channel_capacity: config.channel_capacity,
        }
    }
}

/// Application state injected into the controller.
#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<HandlerRegistry>,
    pub settings: StreamSettings,
    pub mount_path: Arc<str>,
}

/// HTTP server for stream requests.
pub struct HttpServer {
    router: Router,
    config: ServiceConfig,
}

impl HttpServer {
    /// Create a new HTTP server serving the given handlers.
    pub fn new(config: ServiceConfig, registry: HandlerRegistry) -> Self {
        let settings = StreamSettings::from(&config.stream);
        if settings.mode == DuplexMode::Full {
            tracing::warn!("full duplex is enabled (experimental)");
        }

        tracing::info!(
            mount_path = %config.mount_path,
            handlers = ?registry.paths(),
            mode = ?settings.mode,
            "Stream handlers registered"
        );

        let state = AppState {
            registry: Arc::new(registry),
            settings,
            mount_path: Arc::from(config.mount_path.as_str()),
        };

        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServiceConfig, state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(handle_stream))
            .route("/", any(handle_stream))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs)))
            .layer(CatchPanicLayer::new())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// A clone of the configured router, for in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Run the server until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            mount_path = %self.config.mount_path,
            "HTTP server starting"
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }
}
