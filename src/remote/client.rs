//! Kubernetes client construction.

use kube::config::{InClusterError, KubeConfigOptions, Kubeconfig, KubeconfigError};
use kube::Client;
use thiserror::Error;

use crate::config::KubeConfig;

/// Errors building the API client. All of them are fatal at startup.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("in-cluster configuration unavailable: {0}")]
    InCluster(#[from] InClusterError),

    #[error("failed to load kubeconfig: {0}")]
    Kubeconfig(#[from] KubeconfigError),

    #[error("no kubeconfig path given and HOME is not set")]
    NoKubeconfigPath,

    #[error("failed to build client: {0}")]
    Build(#[from] kube::Error),
}

/// Connect to the API server.
///
/// Out-of-cluster (`use_local`) reads the kubeconfig's current context;
/// otherwise the pod's service account is used.
pub async fn connect(config: &KubeConfig) -> Result<Client, ClientError> {
    let client_config = if config.use_local {
        let path = config.kubeconfig_path().ok_or(ClientError::NoKubeconfigPath)?;
        tracing::info!(kubeconfig = %path.display(), "Using out-of-cluster configuration");
        let kubeconfig = Kubeconfig::read_from(&path)?;
        kube::Config::from_custom_kubeconfig(kubeconfig, &KubeConfigOptions::default()).await?
    } else {
        tracing::info!("Using in-cluster configuration");
        kube::Config::incluster()?
    };

    tracing::info!(cluster_url = %client_config.cluster_url, "Kubernetes client configured");
    Ok(Client::try_from(client_config)?)
}
