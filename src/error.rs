//! Unified error handling for the configuration subsystem.

use std::path::PathBuf;
use thiserror::Error;

use crate::capacity::CapacityError;

/// Errors produced while loading or querying configuration properties.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read properties file: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed property line {line} in {}", .path.display())]
    MalformedLine { path: PathBuf, line: usize },

    #[error("missing required property '{0}'")]
    MissingRequiredProperty(String),

    #[error("invalid value '{value}' for property '{key}': expected {expected}")]
    InvalidPropertyValue {
        key: String,
        value: String,
        expected: &'static str,
    },

    #[error("config is not mutable, set 'mutable-config' to 'true' to allow runtime overrides")]
    NotMutable,

    /// Startup-critical value could not be resolved. Callers are expected to
    /// abort startup when they see this.
    #[error("{0}")]
    Fatal(String),

    #[error(transparent)]
    Capacity(#[from] CapacityError),
}

impl ConfigError {
    /// Get a static error code string for log labeling.
    #[inline]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Io(_) => "io",
            Self::MalformedLine { .. } => "malformed_line",
            Self::MissingRequiredProperty(_) => "missing_required_property",
            Self::InvalidPropertyValue { .. } => "invalid_property_value",
            Self::NotMutable => "not_mutable",
            Self::Fatal(_) => "fatal",
            Self::Capacity(_) => "capacity",
        }
    }
}
