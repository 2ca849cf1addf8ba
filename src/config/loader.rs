//! Configuration loading from disk.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::AppConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading and component resolution.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join(.0))]
    Validation(Vec<ValidationError>),

    /// A `[apirouter]` key names nothing in the registry.
    #[error("unknown {kind} {name:?}")]
    UnknownComponent { kind: &'static str, name: String },
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Load and validate configuration from a TOML file.
pub fn load_config(path: &Path) -> Result<AppConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Parse and validate configuration from TOML text.
pub fn parse_config(content: &str) -> Result<AppConfig, ConfigError> {
    let config: AppConfig = toml::from_str(content)?;
    validate_config(&config).map_err(ConfigError::Validation)?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.server.bind_address, "127.0.0.1:8000");
        assert_eq!(config.apirouter.default_response_class, None);
    }

    #[test]
    fn test_parse_sections() {
        let config = parse_config(
            r#"
            [server]
            bind_address = "0.0.0.0:9000"
            max_body_bytes = 1024

            [observability]
            log_level = "debug"

            [apirouter]
            default_response_class = "text"
            "#,
        )
        .unwrap();
        assert_eq!(config.server.bind_address, "0.0.0.0:9000");
        assert_eq!(config.server.max_body_bytes, 1024);
        assert_eq!(config.server.request_timeout_secs, 30);
        assert_eq!(config.observability.log_level, "debug");
        assert_eq!(config.apirouter.default_response_class.as_deref(), Some("text"));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let err = parse_config("[server]\nrequest_timeout_secs = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 1));
        assert_eq!(
            err.to_string(),
            "Validation failed: server.request_timeout_secs must be greater than zero"
        );
    }

    #[test]
    fn test_syntax_error() {
        assert!(matches!(parse_config("[server"), Err(ConfigError::Parse(_))));
    }
}
