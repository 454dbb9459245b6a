//! Entity cache synchronizer.
//!
//! # Data Flow
//! ```text
//! ServiceSource (source.rs)
//!     list()  → full collection + resource version
//!     watch() → Added / Modified / Deleted stream
//!         → reflector.rs (list, watch, re-list on interruption)
//!         → mirror.rs (atomic snapshot swap)
//!         → Snapshot read by the metrics collector on each scrape
//! ```
//!
//! # Design Decisions
//! - The mirror is the only shared mutable state
//! - Readers never wait on the network or on the writer
//! - Readiness flips once, after the first successful full list

pub mod entity;
pub mod mirror;
pub mod reflector;
pub mod source;

pub use entity::{IngressPoint, ServiceEntity, ServiceType};
pub use mirror::{Mirror, Snapshot};
pub use reflector::{Reflector, RelistReason};
pub use source::{ChangeEvent, ChangeKind, ChangeStream, ServiceList, ServiceSource, SourceError};
