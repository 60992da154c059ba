//! Error types for fleetwatch.
//!
//! The simulation and metrics code is infallible; everything here belongs to
//! the ambient layers around it (configuration, output, the monitor loop).

use std::path::PathBuf;
use thiserror::Error;

use crate::monitor::MonitorError;

/// The main error type for fleetwatch operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    /// The configuration file does not exist.
    #[error("configuration file not found: {path}")]
    ConfigNotFound {
        /// Path that was looked up.
        path: PathBuf,
    },

    // === Monitor Errors ===
    /// The fleet monitor failed.
    #[error(transparent)]
    Monitor(#[from] MonitorError),

    // === I/O Errors ===
    /// Writing dashboard output failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    // === Serialization Errors ===
    /// JSON serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for fleetwatch operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a configuration validation error.
    #[must_use]
    pub fn invalid_config(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }
}
