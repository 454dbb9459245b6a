//! Shared utilities for integration tests: an in-memory cluster that speaks
//! the `ServiceSource` protocol.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::{self, StreamExt};
use tokio::sync::mpsc;

use service_info_exporter::cache::{
    ChangeEvent, ChangeKind, ChangeStream, IngressPoint, ServiceEntity, ServiceList, ServiceSource,
    ServiceType, SourceError,
};
use service_info_exporter::config::{ExporterConfig, SyncConfig};

type Sender = mpsc::UnboundedSender<Result<ChangeEvent, SourceError>>;

#[derive(Default)]
struct State {
    services: BTreeMap<String, ServiceEntity>,
    version: u64,
    /// Every emitted change, for replay to watches that start behind.
    log: Vec<(u64, ChangeEvent)>,
    active: Option<Sender>,
}

#[derive(Default)]
struct Inner {
    state: Mutex<State>,
    failing_lists: AtomicUsize,
    lists_blocked: AtomicBool,
    watch_mode: Mutex<WatchMode>,
    list_calls: AtomicUsize,
    watch_calls: AtomicUsize,
}

/// How `watch` calls behave.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WatchMode {
    /// Replay missed events, then stream live changes.
    #[default]
    Normal,
    /// Every watch call fails outright (e.g. missing `watch` permission).
    Reject,
    /// Every watch opens and immediately ends (e.g. a proxy closing idle streams).
    CloseImmediately,
}

/// Handle used by tests to mutate the fake remote collection.
#[derive(Clone, Default)]
pub struct FakeCluster {
    inner: Arc<Inner>,
}

impl FakeCluster {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_services(services: Vec<ServiceEntity>) -> Self {
        let cluster = Self::new();
        {
            let mut state = cluster.inner.state.lock().unwrap();
            for svc in services {
                state.services.insert(svc.uid.clone(), svc);
            }
            state.version = 1;
        }
        cluster
    }

    /// A source reading this cluster.
    pub fn source(&self) -> FakeSource {
        FakeSource {
            inner: self.inner.clone(),
        }
    }

    /// Create or replace a service and notify the current watch.
    pub fn upsert(&self, svc: ServiceEntity) {
        let mut state = self.inner.state.lock().unwrap();
        let kind = if state.services.contains_key(&svc.uid) {
            ChangeKind::Modified
        } else {
            ChangeKind::Added
        };
        state.services.insert(svc.uid.clone(), svc.clone());
        emit(&mut state, ChangeEvent::new(kind, svc));
    }

    /// Delete a service and notify the current watch.
    pub fn delete(&self, uid: &str) {
        let mut state = self.inner.state.lock().unwrap();
        if let Some(svc) = state.services.remove(uid) {
            emit(&mut state, ChangeEvent::new(ChangeKind::Deleted, svc));
        }
    }

    /// Change remote state without any watcher ever hearing about it.
    pub fn upsert_silently(&self, svc: ServiceEntity) {
        let mut state = self.inner.state.lock().unwrap();
        state.services.insert(svc.uid.clone(), svc);
        state.version += 1;
    }

    pub fn delete_silently(&self, uid: &str) {
        let mut state = self.inner.state.lock().unwrap();
        state.services.remove(uid);
        state.version += 1;
    }

    /// Close the current watch stream.
    pub fn disconnect(&self) {
        self.inner.state.lock().unwrap().active.take();
    }

    /// Deliver an error on the current watch stream.
    pub fn inject_watch_error(&self, error: SourceError) {
        let state = self.inner.state.lock().unwrap();
        if let Some(tx) = &state.active {
            let _ = tx.send(Err(error));
        }
    }

    /// Make the next `n` list calls fail.
    pub fn fail_next_lists(&self, n: usize) {
        self.inner.failing_lists.store(n, Ordering::SeqCst);
    }

    /// Make every list call hang (API server unreachable).
    pub fn block_lists(&self) {
        self.inner.lists_blocked.store(true, Ordering::SeqCst);
    }

    pub fn set_watch_mode(&self, mode: WatchMode) {
        *self.inner.watch_mode.lock().unwrap() = mode;
    }

    pub fn list_calls(&self) -> usize {
        self.inner.list_calls.load(Ordering::SeqCst)
    }

    pub fn watch_calls(&self) -> usize {
        self.inner.watch_calls.load(Ordering::SeqCst)
    }

    /// Whether a watch is currently open.
    pub fn is_watching(&self) -> bool {
        self.inner
            .state
            .lock()
            .unwrap()
            .active
            .as_ref()
            .is_some_and(|tx| !tx.is_closed())
    }

    /// Current remote truth, ordered by uid.
    pub fn services(&self) -> Vec<ServiceEntity> {
        self.inner.state.lock().unwrap().services.values().cloned().collect()
    }
}

fn emit(state: &mut State, event: ChangeEvent) {
    state.version += 1;
    let version = state.version;
    state.log.push((version, event.clone()));
    if let Some(tx) = &state.active {
        let _ = tx.send(Ok(event));
    }
}

/// `ServiceSource` over a [`FakeCluster`].
pub struct FakeSource {
    inner: Arc<Inner>,
}

#[async_trait]
impl ServiceSource for FakeSource {
    async fn list(&self) -> Result<ServiceList, SourceError> {
        self.inner.list_calls.fetch_add(1, Ordering::SeqCst);

        if self.inner.lists_blocked.load(Ordering::SeqCst) {
            std::future::pending::<()>().await;
        }

        let failing = self.inner.failing_lists.load(Ordering::SeqCst);
        if failing > 0 {
            self.inner.failing_lists.store(failing - 1, Ordering::SeqCst);
            return Err(SourceError::List("connection refused".into()));
        }

        let state = self.inner.state.lock().unwrap();
        Ok(ServiceList {
            items: state.services.values().cloned().collect(),
            resource_version: state.version.to_string(),
        })
    }

    async fn watch(&self, resource_version: &str) -> Result<ChangeStream, SourceError> {
        self.inner.watch_calls.fetch_add(1, Ordering::SeqCst);
        match *self.inner.watch_mode.lock().unwrap() {
            WatchMode::Normal => {}
            WatchMode::Reject => return Err(SourceError::Watch("forbidden: watch services".into())),
            WatchMode::CloseImmediately => return Ok(stream::empty().boxed()),
        }

        let from: u64 = resource_version
            .parse()
            .map_err(|_| SourceError::Gone(resource_version.to_string()))?;

        let (tx, mut rx) = mpsc::unbounded_channel();
        {
            let mut state = self.inner.state.lock().unwrap();
            for (version, event) in &state.log {
                if *version > from {
                    let _ = tx.send(Ok(event.clone()));
                }
            }
            state.active = Some(tx);
        }

        Ok(stream::poll_fn(move |cx| rx.poll_recv(cx)).boxed())
    }
}

/// A `LoadBalancer` service in `namespace` with the given ingress IPs.
pub fn load_balancer(uid: &str, name: &str, namespace: &str, ips: &[&str]) -> ServiceEntity {
    ServiceEntity::new(
        uid,
        name,
        namespace,
        ServiceType::LoadBalancer,
        ips.iter().map(|ip| IngressPoint::ip(*ip)).collect(),
    )
}

pub fn cluster_ip(uid: &str, name: &str, namespace: &str) -> ServiceEntity {
    ServiceEntity::new(uid, name, namespace, ServiceType::ClusterIP, Vec::new())
}

/// Sync settings with short timings for tests.
pub fn fast_sync() -> SyncConfig {
    SyncConfig {
        initial_sync_timeout_secs: 2,
        resync_period_secs: 0,
        watch_timeout_secs: 60,
        relist_base_delay_ms: 10,
        relist_max_delay_ms: 50,
    }
}

pub fn test_config() -> ExporterConfig {
    let mut config = ExporterConfig::default();
    config.sync = fast_sync();
    config.observability.self_metrics = false;
    config
}

/// Poll `condition` until it holds, panicking after two seconds.
pub async fn eventually<F>(what: &str, condition: F)
where
    F: Fn() -> bool,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(2);
    while !condition() {
        if tokio::time::Instant::now() >= deadline {
            panic!("timed out waiting for: {what}");
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}
