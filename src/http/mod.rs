//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, tracing, timeout)
//!     → GET /metrics
//!     → prometheus Registry (service collector) + self-metrics handle
//!     → text exposition response
//! ```

pub mod server;

pub use server::{AppState, MetricsServer};
