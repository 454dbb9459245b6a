//! Operational self-metrics.
//!
//! # Responsibilities
//! - Count watch events, re-lists and list failures
//! - Track mirror size and scrape latency
//! - Render everything recorded through the `metrics` facade
//!
//! # Metrics
//! - `service_exporter_watch_events_total` (counter): events applied, by kind
//! - `service_exporter_relists_total` (counter): full lists, by reason
//! - `service_exporter_list_failures_total` (counter): failed list calls
//! - `service_exporter_mirror_entities` (gauge): services currently mirrored
//! - `service_exporter_scrape_duration_seconds` (histogram): `/metrics` render time
//!
//! # Design Decisions
//! - Recording is a no-op until a recorder is installed (tests run without one)
//! - Rendered after the service collector output on the same endpoint

use std::time::Instant;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};

/// Install the global Prometheus recorder and return a handle for rendering.
pub fn install_recorder() -> Result<PrometheusHandle, BuildError> {
    PrometheusBuilder::new().install_recorder()
}

pub fn record_watch_event(kind: &'static str) {
    metrics::counter!("service_exporter_watch_events_total", "kind" => kind).increment(1);
}

pub fn record_relist(reason: &'static str) {
    metrics::counter!("service_exporter_relists_total", "reason" => reason).increment(1);
}

pub fn record_list_failure() {
    metrics::counter!("service_exporter_list_failures_total").increment(1);
}

pub fn record_mirror_size(entities: usize) {
    metrics::gauge!("service_exporter_mirror_entities").set(entities as f64);
}

pub fn record_scrape(start: Instant) {
    metrics::histogram!("service_exporter_scrape_duration_seconds")
        .record(start.elapsed().as_secs_f64());
}
