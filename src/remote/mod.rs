//! Kubernetes API integration.
//!
//! # Responsibilities
//! - Build a client from in-cluster or kubeconfig credentials (client.rs)
//! - Expose `Service` list/watch as a `ServiceSource` (source.rs)
//!
//! # Design Decisions
//! - Read-only: only `list` and `watch` verbs are ever issued
//! - All namespaces, no field or label selectors

pub mod client;
pub mod source;

pub use client::{connect, ClientError};
pub use source::KubeServiceSource;
