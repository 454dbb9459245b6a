//! Metrics extractor.
//!
//! # Data Flow
//! ```text
//! GET /metrics
//!     → Registry::gather()
//!     → ServiceCollector::collect()
//!         → Mirror::snapshot() (no network I/O)
//!         → observations() (filter + derive)
//!     → TextEncoder
//! ```
//!
//! # Design Decisions
//! - Recomputed from scratch on every pull; nothing accumulates
//! - Unqualifying services are skipped, never reported as errors

pub mod service;

pub use service::{
    observations, Observation, ServiceCollector, METRIC_HELP, METRIC_LABELS, METRIC_NAME,
};
