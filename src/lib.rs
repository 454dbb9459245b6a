//! Kubernetes Service Info Exporter Library
//!
//! Mirrors every `Service` in the cluster through a list + watch reflector
//! and, on each Prometheus scrape, reports `kube_service_info_extended` for
//! the `LoadBalancer` services that already have an ingress address.
//!
//! ```text
//!   API server ──list/watch──▶ remote::KubeServiceSource
//!                                   │
//!                                   ▼
//!                           cache::Reflector ──apply──▶ cache::Mirror
//!                                                            │ snapshot
//!                                                            ▼
//!   Prometheus ──GET /metrics──▶ http::MetricsServer ──▶ collector::ServiceCollector
//! ```

// Core
pub mod cache;
pub mod collector;

// Integration
pub mod http;
pub mod remote;

// Cross-cutting concerns
pub mod config;
pub mod error;
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use cache::{Mirror, Reflector, ServiceSource};
pub use collector::ServiceCollector;
pub use config::ExporterConfig;
pub use error::ExporterError;
pub use lifecycle::Shutdown;
