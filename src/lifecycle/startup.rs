//! Startup orchestration.
//!
//! # Responsibilities
//! - Initialize subsystems in dependency order
//! - Gate serving on the first full list of services
//! - Bind the listener last (traffic only when ready)
//!
//! # Design Decisions
//! - Fail fast: any startup error is fatal
//! - The sync wait is bounded; expiry is a hard failure, not a retry

use std::sync::Arc;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusHandle;
use prometheus::Registry;
use thiserror::Error;
use tokio::net::TcpListener;

use crate::cache::{Mirror, Reflector, ServiceSource};
use crate::collector::ServiceCollector;
use crate::config::ExporterConfig;
use crate::error::ExporterError;
use crate::http::{AppState, MetricsServer};
use crate::lifecycle::{signals, Shutdown};
use crate::observability::metrics;
use crate::remote::{self, KubeServiceSource};

/// Startup failures that are not configuration or client errors.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("timed out after {0:?} waiting for service cache to sync")]
    SyncTimeout(Duration),
}

/// Wait until the mirror has applied its first full list, or fail.
pub async fn wait_for_sync(mirror: &Mirror, timeout: Duration) -> Result<(), StartupError> {
    tokio::time::timeout(timeout, mirror.wait_ready())
        .await
        .map_err(|_| StartupError::SyncTimeout(timeout))
}

/// Everything needed to serve, once the mirror is in sync.
pub struct Exporter {
    pub mirror: Arc<Mirror>,
    pub server: MetricsServer,
}

/// Start the reflector over `source`, wait for the initial sync, and build the server.
///
/// On sync timeout the reflector is stopped before the error is returned.
pub async fn start<S>(
    config: &ExporterConfig,
    source: S,
    shutdown: &Shutdown,
    self_metrics: Option<PrometheusHandle>,
) -> Result<Exporter, ExporterError>
where
    S: ServiceSource + 'static,
{
    let mirror = Arc::new(Mirror::new());

    let reflector = Reflector::new(source, mirror.clone(), config.sync.clone());
    tokio::spawn(reflector.run(shutdown.subscribe()));

    let timeout = Duration::from_secs(config.sync.initial_sync_timeout_secs);
    if let Err(e) = wait_for_sync(&mirror, timeout).await {
        tracing::error!(error = %e, "Initial service sync failed");
        shutdown.trigger();
        return Err(e.into());
    }
    tracing::info!(entities = mirror.snapshot().len(), "Service cache synced");

    let registry = Registry::new();
    registry.register(Box::new(ServiceCollector::new(mirror.clone())?))?;

    let state = AppState {
        registry: Arc::new(registry),
        self_metrics,
    };
    let server = MetricsServer::new(&config.listener, state);

    Ok(Exporter { mirror, server })
}

/// Run the exporter process end to end.
pub async fn run(config: ExporterConfig) -> Result<(), ExporterError> {
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        use_local = config.kube.use_local,
        bind_address = %config.listener.bind_address,
        "service-info-exporter starting"
    );

    let self_metrics = if config.observability.self_metrics {
        Some(metrics::install_recorder()?)
    } else {
        None
    };

    let client = remote::connect(&config.kube).await?;
    let source = KubeServiceSource::new(client, config.sync.watch_timeout_secs);

    let shutdown = Shutdown::new();
    let exporter = start(&config, source, &shutdown, self_metrics).await?;

    let listener = TcpListener::bind(&config.listener.bind_address)
        .await
        .map_err(ExporterError::Bind)?;

    let server_shutdown = shutdown.subscribe();
    let server = tokio::spawn(exporter.server.run(listener, server_shutdown));

    signals::wait_for_signal().await;
    shutdown.trigger();

    match server.await {
        Ok(result) => result.map_err(ExporterError::Serve)?,
        Err(e) => tracing::error!(error = %e, "Metrics server task failed"),
    }

    tracing::info!("Shutdown complete");
    Ok(())
}
