//! Error taxonomy for the abstraction pipeline
//!
//! Configuration mistakes fail fast before any computation starts; the only
//! runtime failure is writing the output artifact.

use crate::config::ConfigError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while building or exporting an abstraction
#[derive(Error, Debug)]
pub enum AbstractionError {
    /// Invalid grid, plant, action set, preset or transition invariant
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Configuration file could not be read or parsed
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Writing the model-checker artifact failed
    #[error("Failed to write {}: {source}", path.display())]
    Serialization {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl AbstractionError {
    /// Shorthand for a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        AbstractionError::Configuration(msg.into())
    }
}

/// Result type for abstraction operations
pub type Result<T> = std::result::Result<T, AbstractionError>;
