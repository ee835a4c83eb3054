//! Error types
//!
//! Failures are narrow: import validation, export serialization and
//! configuration loading. Store operations never fail; without a current
//! model they are silent no-ops.

use std::path::PathBuf;

/// Why an import was rejected. The `Display` text is the inline message
/// shown to the user.
#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    /// The input is not parseable JSON
    #[error("Invalid JSON format")]
    InvalidJson(#[source] serde_json::Error),

    /// Parsed, but `name`/`version` are absent or a record is malformed
    #[error("Invalid model format: missing required fields")]
    MissingRequiredFields {
        /// What exactly was wrong, for logs
        detail: String,
    },
}

impl ImportError {
    pub(crate) fn missing(detail: impl Into<String>) -> Self {
        ImportError::MissingRequiredFields {
            detail: detail.into(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum InterchangeError {
    #[error("failed to serialize model: {0}")]
    Serialize(#[from] serde_json::Error),
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {path}: {source}")]
    Yaml {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid value {value:?} for {key}")]
    InvalidValue { key: String, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_messages_are_user_facing() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        assert_eq!(ImportError::InvalidJson(err).to_string(), "Invalid JSON format");
        assert_eq!(
            ImportError::missing("name").to_string(),
            "Invalid model format: missing required fields"
        );
    }

    #[test]
    fn test_config_error_names_key() {
        let err = ConfigError::InvalidValue {
            key: "THREAT_ORACLE_ID_STRATEGY".into(),
            value: "random".into(),
        };
        assert_eq!(
            err.to_string(),
            "invalid value \"random\" for THREAT_ORACLE_ID_STRATEGY"
        );
    }
}
