//! Configuration error types
//!
//! All configuration errors are fatal: a process must not start with a
//! half-understood configuration.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::document::DocumentError;

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid config JSON in {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid config: {0}")]
    Invalid(String),

    #[error("Invalid path '{path}' in config")]
    Path {
        path: String,
        #[source]
        source: DocumentError,
    },
}

impl ConfigError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        ConfigError::Invalid(msg.into())
    }

    pub fn code(&self) -> &'static str {
        "STASH_CONFIG_ERROR"
    }
}
