//! Unified error handling for hwid
//!
//! This crate provides a single error type used across all hwid components.
//! Expected outcomes of routine validation (segment count mismatch, bad
//! checksum) are plain `bool`s and never surface here.

use std::io;
use std::path::PathBuf;

/// Result type alias using HwidError
pub type Result<T> = std::result::Result<T, HwidError>;

/// Unified error type for all hwid operations
#[derive(thiserror::Error, Debug)]
pub enum HwidError {
    // ============================================================================
    // Argument Errors
    // ============================================================================
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    // ============================================================================
    // Characteristic Collection Errors
    // ============================================================================
    #[error("Characteristic collection failed in {source_name}: {reason}")]
    CollectionFailure {
        source_name: String,
        reason: String,
    },

    // ============================================================================
    // I/O and File System Errors
    // ============================================================================
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read file {path}: {source}")]
    FileRead {
        path: PathBuf,
        source: io::Error,
    },

    #[error("Failed to write file {path}: {source}")]
    FileWrite {
        path: PathBuf,
        source: io::Error,
    },

    // ============================================================================
    // Configuration Errors
    // ============================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to parse JSON: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("Invalid configuration value for {field}: {reason}")]
    InvalidConfig {
        field: String,
        reason: String,
    },

    // ============================================================================
    // Generic Errors
    // ============================================================================
    #[error("{0}")]
    Generic(String),
}

impl HwidError {
    /// Create an invalid argument error
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// Create a collection failure for the named source
    pub fn collection(source_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CollectionFailure {
            source_name: source_name.into(),
            reason: reason.into(),
        }
    }

    /// Create a config error from a string
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create an invalid config value error
    pub fn invalid_config(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Whether the caller may retry the failed operation.
    ///
    /// Collection and I/O failures depend on the machine state at call time;
    /// argument and configuration errors will fail the same way again.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::CollectionFailure { .. }
                | Self::Io(_)
                | Self::FileRead { .. }
                | Self::FileWrite { .. }
        )
    }
}

// Allow converting from String to HwidError
impl From<String> for HwidError {
    fn from(s: String) -> Self {
        Self::Generic(s)
    }
}

// Allow converting from &str to HwidError
impl From<&str> for HwidError {
    fn from(s: &str) -> Self {
        Self::Generic(s.to_string())
    }
}
