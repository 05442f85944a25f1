//! Error types for buildtier

use std::io;
use thiserror::Error;

/// Result type alias for buildtier operations
pub type Result<T> = std::result::Result<T, BuildTierError>;

/// Main error type for buildtier
#[derive(Error, Debug)]
pub enum BuildTierError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Configuration error (bad tier counts, unreadable or malformed config)
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A build number that is not dotted-numeric
    #[error("Invalid build number: {0:?}")]
    InvalidBuildNumber(String),

    /// Parse error (CSV, HTML, TOML)
    #[error("Parse error: {0}")]
    Parse(String),

    /// A required column is absent from a CSV header
    #[error("Missing column {column:?} in {source_name}")]
    MissingColumn { column: String, source_name: String },

    /// Internal consistency fault between catalog, tiers and inventory
    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Network error while fetching release pages
    #[cfg(feature = "fetch")]
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl From<toml::de::Error> for BuildTierError {
    fn from(err: toml::de::Error) -> Self {
        BuildTierError::Configuration(format!("TOML parse error: {}", err))
    }
}

impl From<regex::Error> for BuildTierError {
    fn from(err: regex::Error) -> Self {
        BuildTierError::Parse(format!("bad pattern: {}", err))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_configuration() {
        let err = BuildTierError::Configuration("current_build_count must be >= 0".to_string());
        assert_eq!(
            err.to_string(),
            "Configuration error: current_build_count must be >= 0"
        );
    }

    #[test]
    fn test_error_display_invalid_build_number() {
        let err = BuildTierError::InvalidBuildNumber("19045.x".to_string());
        assert_eq!(err.to_string(), "Invalid build number: \"19045.x\"");
    }

    #[test]
    fn test_error_display_missing_column() {
        let err = BuildTierError::MissingColumn {
            column: "OS Build".to_string(),
            source_name: "syncro-data.csv".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Missing column \"OS Build\" in syncro-data.csv"
        );
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "file missing");
        let err: BuildTierError = io_err.into();
        assert!(err.to_string().contains("file missing"));
    }

    #[test]
    fn test_error_from_json() {
        let json_err = serde_json::from_str::<serde_json::Value>("{ invalid json }}}").unwrap_err();
        let err: BuildTierError = json_err.into();
        assert!(err.to_string().contains("JSON error"));
    }

    #[test]
    fn test_error_from_toml_is_configuration() {
        let toml_err = toml::from_str::<toml::Value>("current_build_count = ").unwrap_err();
        let err: BuildTierError = toml_err.into();
        match err {
            BuildTierError::Configuration(msg) => assert!(msg.starts_with("TOML parse error")),
            other => panic!("Expected Configuration, got {:?}", other),
        }
    }

    #[test]
    fn test_error_other() {
        let err = BuildTierError::Other("misc error".to_string());
        assert_eq!(err.to_string(), "misc error");
    }
}
