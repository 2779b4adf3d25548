//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while loading or validating `folio.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error when reading `{0}`")]
    Io(PathBuf, #[source] std::io::Error),

    #[error("config file parsing error")]
    Toml(#[from] toml::de::Error),

    #[error("`{field}` has invalid value `{value}`")]
    InvalidValue { field: &'static str, value: String },

    #[error("output `{0}` is produced by more than one generator")]
    DuplicateTarget(PathBuf),

    #[error("config validation error: {0}")]
    Validation(String),
}

impl ConfigError {
    pub fn invalid(field: &'static str, value: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            value: value.into(),
        }
    }
}
