//! Error types for bloodbank.
//!
//! This module defines the error type shared by the record store, the
//! configuration layer and the terminal front end. Relay failures have their
//! own type in [`crate::notify`] because the gateway never lets them escape.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for bloodbank operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Storage Errors ===
    /// Failed to read or write a table file.
    #[error("failed to access table {path}: {source}")]
    TableIo {
        /// Path to the table file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A table file could not be encoded or decoded as CSV.
    #[error("malformed table {path}: {source}")]
    TableFormat {
        /// Path to the table file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: csv::Error,
    },

    /// Failed to create the data directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A value read from a table or a form is not a known blood group.
    #[error("unknown blood group: {0}")]
    UnknownBloodGroup(String),

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

    // === Front-end Errors ===
    /// An interactive prompt failed (e.g. the terminal went away).
    #[error("prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),
}

/// A specialized Result type for bloodbank operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a configuration validation error.
    #[must_use]
    pub fn config_validation(message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            message: message.into(),
        }
    }
}
