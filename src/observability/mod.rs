//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (counters, gauges, histograms about the exporter itself)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → /metrics (Prometheus scrape, after the service collector output)
//! ```

pub mod logging;
pub mod metrics;
