//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! defaults (schema.rs)
//!     → optional TOML file (loader.rs)
//!     → environment toggles (USE_LOCAL, BIND_ADDRESS)
//!     → command-line flags (cli.rs)
//!     → validation.rs (semantic checks)
//!     → ExporterConfig (validated, immutable)
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; no hot reload
//! - All fields have defaults to allow running with no config file
//! - Validation separates syntactic (serde) from semantic checks

pub mod cli;
pub mod loader;
pub mod schema;
pub mod validation;

pub use cli::Cli;
pub use loader::ConfigError;
pub use schema::{
    ExporterConfig, KubeConfig, ListenerConfig, LogFormat, ObservabilityConfig, SyncConfig,
};
