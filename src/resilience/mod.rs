//! Resilience helpers.
//!
//! # Data Flow
//! ```text
//! Remote list fails:
//!     → backoff.rs (exponential delay with jitter)
//!     → reflector retries the list
//! ```
//!
//! # Design Decisions
//! - Remote failures after startup are retried forever, never fatal
//! - Jitter keeps several exporter replicas from retrying in lockstep

pub mod backoff;
