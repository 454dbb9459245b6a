//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the exporter.
//! All types derive Serde traits for deserialization from config files.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Root configuration for the exporter.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ExporterConfig {
    /// Metrics listener settings.
    pub listener: ListenerConfig,

    /// How to reach the Kubernetes API server.
    pub kube: KubeConfig,

    /// Mirror synchronization settings.
    pub sync: SyncConfig,

    /// Logging and self-metrics settings.
    pub observability: ObservabilityConfig,
}

impl ExporterConfig {
    /// Overlay environment toggles on top of file/default values.
    ///
    /// `USE_LOCAL` set to any non-empty value selects out-of-cluster mode.
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(value) = lookup("USE_LOCAL") {
            self.kube.use_local = !value.is_empty();
        }
        if let Some(addr) = lookup("BIND_ADDRESS").filter(|v| !v.is_empty()) {
            self.listener.bind_address = addr;
        }
    }
}

/// Listener configuration for the `/metrics` endpoint.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    pub bind_address: String,

    /// Per-request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8080".to_string(),
            request_timeout_secs: 10,
        }
    }
}

/// Kubernetes connection configuration.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct KubeConfig {
    /// Connect from outside the cluster using a kubeconfig file.
    pub use_local: bool,

    /// Kubeconfig path; defaults to `$HOME/.kube/config`.
    pub kubeconfig: Option<PathBuf>,
}

impl KubeConfig {
    /// Path of the kubeconfig to load in out-of-cluster mode.
    pub fn kubeconfig_path(&self) -> Option<PathBuf> {
        self.kubeconfig.clone().or_else(|| {
            std::env::var_os("HOME")
                .filter(|home| !home.is_empty())
                .map(|home| PathBuf::from(home).join(".kube").join("config"))
        })
    }
}

/// Mirror synchronization configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SyncConfig {
    /// How long startup waits for the first full list before failing.
    pub initial_sync_timeout_secs: u64,

    /// Periodic full re-list interval in seconds (0 disables).
    pub resync_period_secs: u64,

    /// Server-side watch timeout in seconds.
    pub watch_timeout_secs: u32,

    /// Base delay for re-list retry backoff in milliseconds.
    pub relist_base_delay_ms: u64,

    /// Maximum delay for re-list retry backoff in milliseconds.
    pub relist_max_delay_ms: u64,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            initial_sync_timeout_secs: 30,
            resync_period_secs: 300,
            watch_timeout_secs: 290,
            relist_base_delay_ms: 500,
            relist_max_delay_ms: 30_000,
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log line format.
    pub log_format: LogFormat,

    /// Append the exporter's own operational metrics to `/metrics`.
    pub self_metrics: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            self_metrics: true,
        }
    }
}
