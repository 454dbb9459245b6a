//! List + watch synchronization loop.
//!
//! # Responsibilities
//! - Populate the mirror from a full list, then follow the watch stream
//! - Re-list whenever the stream ends or errors, pruning anything deleted
//!   while we were not watching
//! - Re-list periodically as a guard against silently missed events
//! - Retry failed lists with exponential backoff
//! - Back off before re-listing when watches keep failing
//!
//! # Design Decisions
//! - A stream interruption is never fatal; the loop runs until shutdown
//! - Every watch starts from the resource version of the list just applied
//! - A watch counts as healthy once it delivers an event or stays open for
//!   [`HEALTHY_WATCH_UPTIME`]; anything shorter is a failure and delays the next list
//! - No in-flight draining on shutdown: the mirror is disposable

use std::sync::Arc;
use std::time::Duration;

use futures_util::StreamExt;
use tokio::time::{self, Instant};

use crate::cache::mirror::Mirror;
use crate::cache::source::{ServiceSource, SourceError};
use crate::config::SyncConfig;
use crate::lifecycle::ShutdownSignal;
use crate::observability::metrics;
use crate::resilience::backoff::calculate_backoff;

/// A watch open at least this long is healthy even if nothing changed.
pub const HEALTHY_WATCH_UPTIME: Duration = Duration::from_secs(5);

/// Events applied to the mirror in one swap when the stream has a backlog.
const MAX_BATCH: usize = 256;

/// Why the reflector is performing a full list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelistReason {
    Initial,
    StreamEnded,
    WatchError,
    Expired,
    Periodic,
}

impl RelistReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            RelistReason::Initial => "initial",
            RelistReason::StreamEnded => "stream_ended",
            RelistReason::WatchError => "watch_error",
            RelistReason::Expired => "expired",
            RelistReason::Periodic => "periodic",
        }
    }
}

/// Keeps a [`Mirror`] in sync with a [`ServiceSource`].
pub struct Reflector<S> {
    source: S,
    mirror: Arc<Mirror>,
    config: SyncConfig,
}

impl<S: ServiceSource> Reflector<S> {
    pub fn new(source: S, mirror: Arc<Mirror>, config: SyncConfig) -> Self {
        Self {
            source,
            mirror,
            config,
        }
    }

    /// Run until the shutdown signal fires.
    pub async fn run(self, mut shutdown: ShutdownSignal) {
        tracing::info!(
            resync_period_secs = self.config.resync_period_secs,
            "Service reflector starting"
        );

        let mut reason = RelistReason::Initial;
        let mut watch_failures: u32 = 0;
        loop {
            tokio::select! {
                biased;
                _ = shutdown.recv() => {
                    tracing::info!("Service reflector received shutdown signal, exiting loop");
                    break;
                }
                next = self.list_and_watch(reason, &mut watch_failures) => {
                    reason = next;
                }
            }
        }
    }

    /// One cycle: wait out any watch backoff, full list, then watch until the
    /// stream stops being usable.
    async fn list_and_watch(&self, reason: RelistReason, watch_failures: &mut u32) -> RelistReason {
        if *watch_failures > 0 {
            let delay = calculate_backoff(
                *watch_failures,
                self.config.relist_base_delay_ms,
                self.config.relist_max_delay_ms,
            );
            tracing::warn!(
                failures = *watch_failures,
                delay = ?delay,
                reason = reason.as_str(),
                "Watch keeps failing, delaying re-list"
            );
            time::sleep(delay).await;
        }

        let resource_version = self.relist(reason).await;
        let outcome = self.watch_from(&resource_version).await;

        if outcome.healthy || outcome.reason == RelistReason::Periodic {
            *watch_failures = 0;
        } else {
            *watch_failures = watch_failures.saturating_add(1);
        }
        outcome.reason
    }

    /// List until it succeeds and apply the result. Returns the list's resource version.
    async fn relist(&self, reason: RelistReason) -> String {
        metrics::record_relist(reason.as_str());

        let mut attempt: u32 = 0;
        loop {
            match self.source.list().await {
                Ok(list) => {
                    let count = list.items.len();
                    self.mirror.replace_all(list.items);
                    tracing::info!(
                        reason = reason.as_str(),
                        entities = count,
                        resource_version = %list.resource_version,
                        "Mirror re-listed"
                    );
                    return list.resource_version;
                }
                Err(e) => {
                    attempt = attempt.saturating_add(1);
                    metrics::record_list_failure();
                    let delay = calculate_backoff(
                        attempt,
                        self.config.relist_base_delay_ms,
                        self.config.relist_max_delay_ms,
                    );
                    tracing::warn!(
                        attempt,
                        delay = ?delay,
                        error = %e,
                        "Service list failed, retrying"
                    );
                    time::sleep(delay).await;
                }
            }
        }
    }

    /// Apply watch events until the stream ends, errors, or the resync period elapses.
    async fn watch_from(&self, resource_version: &str) -> WatchOutcome {
        let opened = Instant::now();
        let mut stream = match self.source.watch(resource_version).await {
            Ok(stream) => stream.ready_chunks(MAX_BATCH),
            Err(e) => {
                tracing::warn!(resource_version, error = %e, "Failed to start watch");
                return WatchOutcome::failed(reason_for(&e));
            }
        };

        tracing::debug!(resource_version, "Watching services");

        let resync = self.resync_deadline();
        tokio::pin!(resync);

        let mut delivered = false;
        let reason = loop {
            tokio::select! {
                _ = &mut resync => {
                    tracing::debug!("Resync period elapsed");
                    break RelistReason::Periodic;
                }
                batch = stream.next() => {
                    let Some(batch) = batch else {
                        tracing::info!("Watch stream ended, re-listing");
                        break RelistReason::StreamEnded;
                    };

                    let mut events = Vec::with_capacity(batch.len());
                    let mut failure = None;
                    for item in batch {
                        match item {
                            Ok(event) => events.push(event),
                            Err(e) => {
                                failure = Some(e);
                                break;
                            }
                        }
                    }

                    if !events.is_empty() {
                        delivered = true;
                        for event in &events {
                            tracing::debug!(
                                kind = event.kind.as_str(),
                                uid = %event.entity.uid,
                                namespace = %event.entity.namespace,
                                name = %event.entity.name,
                                "Applying change"
                            );
                            metrics::record_watch_event(event.kind.as_str());
                        }
                        self.mirror.apply_all(events);
                    }

                    if let Some(e) = failure {
                        tracing::warn!(error = %e, "Watch stream error, re-listing");
                        break reason_for(&e);
                    }
                }
            }
        };

        WatchOutcome {
            reason,
            healthy: delivered || opened.elapsed() >= HEALTHY_WATCH_UPTIME,
        }
    }

    async fn resync_deadline(&self) {
        match self.config.resync_period_secs {
            0 => std::future::pending().await,
            secs => time::sleep_until(Instant::now() + Duration::from_secs(secs)).await,
        }
    }
}

/// How one watch ended.
struct WatchOutcome {
    reason: RelistReason,
    healthy: bool,
}

impl WatchOutcome {
    fn failed(reason: RelistReason) -> Self {
        Self {
            reason,
            healthy: false,
        }
    }
}

fn reason_for(error: &SourceError) -> RelistReason {
    match error {
        SourceError::Gone(_) => RelistReason::Expired,
        _ => RelistReason::WatchError,
    }
}
