//! Top-level error type.

use thiserror::Error;

use crate::config::ConfigError;
use crate::lifecycle::StartupError;
use crate::remote::ClientError;

/// Anything that stops the exporter from starting or serving.
#[derive(Debug, Error)]
pub enum ExporterError {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("kubernetes client error: {0}")]
    Client(#[from] ClientError),

    #[error(transparent)]
    Startup(#[from] StartupError),

    #[error("metrics registry error: {0}")]
    Registry(#[from] prometheus::Error),

    #[error("failed to install metrics recorder: {0}")]
    Recorder(#[from] metrics_exporter_prometheus::BuildError),

    #[error("failed to bind metrics listener: {0}")]
    Bind(#[source] std::io::Error),

    #[error("metrics server error: {0}")]
    Serve(#[source] std::io::Error),
}
