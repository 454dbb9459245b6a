//! Command-line arguments.

use std::path::PathBuf;

use clap::Parser;

use crate::config::loader::{finalize, load_config, ConfigError};
use crate::config::schema::ExporterConfig;

/// Prometheus exporter for Kubernetes LoadBalancer services.
#[derive(Debug, Parser)]
#[command(name = "service-info-exporter", version)]
#[command(
    about = "Exposes kube_service_info_extended for LoadBalancer services",
    long_about = None
)]
pub struct Cli {
    /// Optional TOML configuration file.
    #[arg(short, long, env = "EXPORTER_CONFIG")]
    pub config: Option<PathBuf>,

    /// (optional) absolute path to the kubeconfig file, used when USE_LOCAL is set.
    #[arg(long, env = "KUBECONFIG_PATH")]
    pub kubeconfig: Option<PathBuf>,

    /// Connect from outside the cluster (same as setting USE_LOCAL).
    #[arg(long)]
    pub use_local: bool,

    /// Metrics listener address.
    #[arg(long)]
    pub bind_address: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(long, env = "LOG_LEVEL")]
    pub log_level: Option<String>,
}

impl Cli {
    /// Merge defaults, config file, environment and flags, then validate.
    pub fn into_config(self) -> Result<ExporterConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => ExporterConfig::default(),
        };
        config.apply_env(|key| std::env::var(key).ok());
        self.apply(&mut config);
        finalize(config)
    }

    fn apply(self, config: &mut ExporterConfig) {
        if self.use_local {
            config.kube.use_local = true;
        }
        if let Some(path) = self.kubeconfig {
            config.kube.kubeconfig = Some(path);
        }
        if let Some(addr) = self.bind_address {
            config.listener.bind_address = addr;
        }
        if let Some(level) = self.log_level {
            config.observability.log_level = level;
        }
    }
}
