//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, backoff bounds ordered)
//! - Check that addresses and levels parse
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ExporterConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;

use crate::config::schema::ExporterConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check an [`ExporterConfig`] for semantic errors.
pub fn validate_config(config: &ExporterConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = config.listener.bind_address.parse::<SocketAddr>() {
        errors.push(ValidationError::new(
            "listener.bind_address",
            format!("'{}' is not a socket address: {}", config.listener.bind_address, e),
        ));
    }
    if config.listener.request_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "listener.request_timeout_secs",
            "must be greater than 0",
        ));
    }

    let sync = &config.sync;
    if sync.initial_sync_timeout_secs == 0 {
        errors.push(ValidationError::new(
            "sync.initial_sync_timeout_secs",
            "must be greater than 0",
        ));
    }
    if sync.watch_timeout_secs == 0 || sync.watch_timeout_secs >= 295 {
        errors.push(ValidationError::new(
            "sync.watch_timeout_secs",
            "must be between 1 and 294 (API server limit)",
        ));
    }
    if sync.relist_base_delay_ms == 0 {
        errors.push(ValidationError::new("sync.relist_base_delay_ms", "must be greater than 0"));
    }
    if sync.relist_base_delay_ms > sync.relist_max_delay_ms {
        errors.push(ValidationError::new(
            "sync.relist_max_delay_ms",
            format!(
                "must be at least relist_base_delay_ms ({} > {})",
                sync.relist_base_delay_ms, sync.relist_max_delay_ms
            ),
        ));
    }

    if tracing::Level::from_str(&config.observability.log_level).is_err() {
        errors.push(ValidationError::new(
            "observability.log_level",
            format!("unknown level '{}'", config.observability.log_level),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
