//! Error type definitions for the EPG reconciliation tool
//!
//! The reconciliation engine itself never fails: unmatched channels and empty
//! inputs are policy outcomes, not errors. Everything here belongs to the
//! collaborators around it (configuration, import loaders, the broadcast
//! store) which are allowed to fail per file.

use thiserror::Error;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Filesystem errors while reading or writing inputs
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Broadcast store (de)serialization failures
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration file could not be parsed
    #[error("Config parse error: {0}")]
    TomlDe(#[from] toml::de::Error),

    /// Configuration defaults could not be rendered
    #[error("Config render error: {0}")]
    TomlSer(#[from] toml::ser::Error),

    /// Source handling errors (import files)
    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Validation errors
    #[error("Validation error: {message}")]
    Validation { message: String },
}

/// Import source specific errors
#[derive(Error, Debug)]
pub enum SourceError {
    /// Parsing errors for source data
    #[error("Parse error: {source_type} - {message}")]
    ParseError {
        source_type: String,
        message: String,
    },

    /// A timestamp attribute could not be interpreted
    #[error("Invalid timestamp '{value}': {message}")]
    InvalidTimestamp { value: String, message: String },
}

/// Convenience methods for creating common error types
impl AppError {
    /// Create a validation error with a custom message
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn configuration<S: Into<String>>(message: S) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create an XMLTV parse error
    pub fn source_error<S: Into<String>>(message: S) -> Self {
        Self::Source(SourceError::xmltv(message))
    }
}

impl SourceError {
    pub fn xmltv<S: Into<String>>(message: S) -> Self {
        Self::ParseError {
            source_type: "xmltv".to_string(),
            message: message.into(),
        }
    }

    pub fn invalid_timestamp<V: Into<String>, M: Into<String>>(value: V, message: M) -> Self {
        Self::InvalidTimestamp {
            value: value.into(),
            message: message.into(),
        }
    }
}
