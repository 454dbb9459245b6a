//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router serving `GET /metrics`
//! - Wire up middleware (tracing, request timeout)
//! - Encode the service collector output plus self-metrics as Prometheus text
//! - Stop on the shutdown signal

use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;
use prometheus::{Encoder, Registry, TextEncoder};
use tokio::net::TcpListener;
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::ListenerConfig;
use crate::lifecycle::ShutdownSignal;
use crate::observability::metrics;

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    /// Registry holding the service collector.
    pub registry: Arc<Registry>,
    /// Renders the exporter's own metrics, when enabled.
    pub self_metrics: Option<PrometheusHandle>,
}

/// HTTP server exposing the metrics endpoint.
pub struct MetricsServer {
    router: Router,
}

impl MetricsServer {
    /// Create a new server over the given state.
    pub fn new(config: &ListenerConfig, state: AppState) -> Self {
        Self {
            router: Self::build_router(config, state),
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ListenerConfig, state: AppState) -> Router {
        Router::new()
            .route("/metrics", get(metrics_handler))
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
            .layer(TraceLayer::new_for_http())
    }

    /// The router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve until the shutdown signal fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: ShutdownSignal,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "Metrics server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                shutdown.recv().await;
                tracing::info!("Metrics server received shutdown signal");
            })
            .await?;

        tracing::info!("Metrics server stopped");
        Ok(())
    }
}

/// Render all current observations in the text exposition format.
async fn metrics_handler(State(state): State<AppState>) -> Response {
    let start = Instant::now();
    let encoder = TextEncoder::new();

    let mut body = String::new();
    if let Err(e) = encoder.encode_utf8(&state.registry.gather(), &mut body) {
        tracing::error!(error = %e, "Failed to encode metrics");
        return (StatusCode::INTERNAL_SERVER_ERROR, "failed to encode metrics").into_response();
    }

    if let Some(handle) = &state.self_metrics {
        body.push_str(&handle.render());
    }

    metrics::record_scrape(start);
    ([(header::CONTENT_TYPE, encoder.format_type().to_string())], body).into_response()
}
