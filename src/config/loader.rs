//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ExporterConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load configuration from a TOML file without validating it.
///
/// Callers layer env/CLI overrides on top and validate the merged result.
pub fn load_config(path: &Path) -> Result<ExporterConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    Ok(toml::from_str(&content)?)
}

/// Validate a fully merged configuration.
pub fn finalize(config: ExporterConfig) -> Result<ExporterConfig, ConfigError> {
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_load_config_from_file() {
        let path = std::env::temp_dir()
            .join(format!("exporter-config-{}.toml", std::process::id()));
        fs::write(
            &path,
            concat!(
                "[listener]\nbind_address = \"127.0.0.1:9100\"\n\n",
                "[sync]\ninitial_sync_timeout_secs = 5\n",
            ),
        )
        .unwrap();

        let config = load_config(&path).unwrap();
        assert_eq!(config.listener.bind_address, "127.0.0.1:9100");
        assert_eq!(config.sync.initial_sync_timeout_secs, 5);

        fs::remove_file(&path).unwrap_or_default();
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_config(Path::new("/nonexistent/exporter.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn test_finalize_reports_validation_errors() {
        let mut config = ExporterConfig::default();
        config.listener.request_timeout_secs = 0;

        let err = finalize(config).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Validation failed: listener.request_timeout_secs: must be greater than 0"
        );
    }
}
