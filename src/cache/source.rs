//! Remote change-stream capability.
//!
//! The reflector only ever talks to the remote system through
//! [`ServiceSource`], so tests can drive it with a synthetic stream.

use async_trait::async_trait;
use futures_util::stream::BoxStream;
use thiserror::Error;

use crate::cache::entity::ServiceEntity;

/// Boxed error from a source implementation.
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Kind of change carried by a watch notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeKind {
    Added,
    Modified,
    Deleted,
}

impl ChangeKind {
    /// Lowercase name, used as a metric label.
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Added => "added",
            ChangeKind::Modified => "modified",
            ChangeKind::Deleted => "deleted",
        }
    }
}

/// One notification from the watch stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub kind: ChangeKind,
    pub entity: ServiceEntity,
}

impl ChangeEvent {
    pub fn new(kind: ChangeKind, entity: ServiceEntity) -> Self {
        Self { kind, entity }
    }
}

/// Result of a full list.
#[derive(Debug, Clone, Default)]
pub struct ServiceList {
    pub items: Vec<ServiceEntity>,
    /// Version to resume watching from.
    pub resource_version: String,
}

/// Errors surfaced by a [`ServiceSource`].
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("list failed: {0}")]
    List(#[source] BoxError),

    #[error("watch failed: {0}")]
    Watch(#[source] BoxError),

    /// The requested resource version is no longer available (HTTP 410).
    #[error("resource version expired: {0}")]
    Gone(String),
}

/// Change notifications, ending whenever the remote side closes the watch.
pub type ChangeStream = BoxStream<'static, Result<ChangeEvent, SourceError>>;

/// `{List, Watch}` over the remote service collection.
#[async_trait]
pub trait ServiceSource: Send + Sync {
    /// Full list of every current service.
    async fn list(&self) -> Result<ServiceList, SourceError>;

    /// Stream of changes after `resource_version`.
    async fn watch(&self, resource_version: &str) -> Result<ChangeStream, SourceError>;
}
