//! Local mirror of the remote service collection.
//!
//! # Responsibilities
//! - Store the latest state of every observed, not-yet-deleted service
//! - Publish immutable point-in-time snapshots to concurrent readers
//! - Track whether an initial full list has been applied
//!
//! # Design Decisions
//! - Single writer (the reflector), any number of readers
//! - Writes build the next map and swap it in atomically; readers never lock
//! - Updates replace the stored entity wholesale (last write wins)
//! - Keys are shared `Arc<str>` so copying the map never copies strings;
//!   a backlog of watch events is applied in one swap via [`Mirror::apply_all`]

use std::collections::BTreeMap;
use std::sync::Arc;

use arc_swap::ArcSwap;
use tokio::sync::watch;

use crate::cache::entity::ServiceEntity;
use crate::cache::source::{ChangeEvent, ChangeKind};
use crate::observability::metrics;

/// Immutable view of the mirror at one instant.
#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    entities: BTreeMap<Arc<str>, Arc<ServiceEntity>>,
}

impl Snapshot {
    fn apply(&mut self, kind: ChangeKind, entity: Arc<ServiceEntity>) {
        match kind {
            ChangeKind::Added | ChangeKind::Modified => {
                self.entities.insert(Arc::from(entity.uid.as_str()), entity);
            }
            ChangeKind::Deleted => {
                self.entities.remove(entity.uid.as_str());
            }
        }
    }

    /// Iterate over every mirrored entity, ordered by uid.
    pub fn iter(&self) -> impl Iterator<Item = &ServiceEntity> {
        self.entities.values().map(Arc::as_ref)
    }

    pub fn get(&self, uid: &str) -> Option<&ServiceEntity> {
        self.entities.get(uid).map(Arc::as_ref)
    }

    pub fn contains(&self, uid: &str) -> bool {
        self.entities.contains_key(uid)
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

/// Thread-safe store of mirrored services.
///
/// Shared by `Arc` between the reflector (writer) and the collector (reader).
pub struct Mirror {
    current: ArcSwap<Snapshot>,
    synced: watch::Sender<bool>,
}

impl Mirror {
    /// Create an empty, not-yet-synced mirror.
    pub fn new() -> Self {
        let (synced, _) = watch::channel(false);
        Self {
            current: ArcSwap::from_pointee(Snapshot::default()),
            synced,
        }
    }

    /// Current contents. Cheap: one atomic load plus a refcount bump.
    pub fn snapshot(&self) -> Arc<Snapshot> {
        self.current.load_full()
    }

    /// Whether a full list has been applied at least once.
    pub fn is_ready(&self) -> bool {
        *self.synced.borrow()
    }

    /// Resolve once the mirror is ready.
    pub async fn wait_ready(&self) {
        let mut rx = self.synced.subscribe();
        // The sender lives in `self`, so the channel cannot close while we wait.
        let _ = rx.wait_for(|ready| *ready).await;
    }

    /// Apply one incremental change.
    pub fn apply(&self, kind: ChangeKind, entity: ServiceEntity) {
        let entity = Arc::new(entity);
        self.current.rcu(|current| {
            let mut next = Snapshot::clone(current);
            next.apply(kind, Arc::clone(&entity));
            next
        });

        metrics::record_mirror_size(self.current.load().len());
    }

    /// Apply a run of changes in order, publishing a single new snapshot.
    pub fn apply_all(&self, events: Vec<ChangeEvent>) {
        if events.is_empty() {
            return;
        }
        let events: Vec<_> = events
            .into_iter()
            .map(|event| (event.kind, Arc::new(event.entity)))
            .collect();

        self.current.rcu(|current| {
            let mut next = Snapshot::clone(current);
            for (kind, entity) in &events {
                next.apply(*kind, Arc::clone(entity));
            }
            next
        });

        metrics::record_mirror_size(self.current.load().len());
    }

    /// Replace the whole mirror with the result of a full list and mark it synced.
    ///
    /// Anything not present in `items` is pruned.
    pub fn replace_all(&self, items: Vec<ServiceEntity>) {
        let entities: BTreeMap<Arc<str>, Arc<ServiceEntity>> = items
            .into_iter()
            .map(|entity| (Arc::from(entity.uid.as_str()), Arc::new(entity)))
            .collect();
        let len = entities.len();

        self.current.store(Arc::new(Snapshot { entities }));
        self.synced.send_replace(true);
        metrics::record_mirror_size(len);
    }
}

impl Default for Mirror {
    fn default() -> Self {
        Self::new()
    }
}
