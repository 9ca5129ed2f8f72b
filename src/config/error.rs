//! Configuration error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Port value is outside valid range (1-65535).
    #[error("invalid port '{value}': must be between 1 and 65535")]
    InvalidPort { value: String },

    /// Port string could not be parsed as a number.
    #[error("failed to parse port '{value}': {source}")]
    PortParseError {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    /// Bind address string could not be parsed.
    #[error("failed to parse bind address '{value}': {source}")]
    InvalidBindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },

    /// A numeric variable could not be parsed.
    #[error("failed to parse {name}='{value}': {source}")]
    NumberParseError {
        name: &'static str,
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    /// A variable holds a value outside its accepted set (booleans, enums).
    #[error("invalid value for {name}: '{value}' (expected {expected})")]
    InvalidValue {
        name: &'static str,
        value: String,
        expected: &'static str,
    },

    /// A required environment variable was not set.
    #[error("missing required environment variable: {name}")]
    MissingEnvVar { name: &'static str },

    /// Individually valid settings that do not work together.
    #[error("inconsistent configuration: {reason}")]
    Inconsistent { reason: String },

    /// Path exists but is not a directory (when a directory was expected).
    #[error("path is not a directory: {path}")]
    NotADirectory { path: PathBuf },
}

/// A rerank backend name other than `cohere` or `lexical`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown rerank backend '{value}'")]
pub struct UnknownRerankBackend {
    pub value: String,
}
