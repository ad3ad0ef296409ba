//! Error types for cache configuration
//!
//! Geometry queries never produce errors of their own: a failing calculator's
//! error is handed back to the caller untouched. The variants here cover the
//! fallible parts around the cache, namely building and loading configuration.

use thiserror::Error;

/// Main error type for the geometry cache
#[derive(Error, Debug)]
pub enum GeometryCacheError {
    /// Configuration rejected by validation
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Environment override that could not be parsed
    #[error("Invalid value {value:?} for {key}: {reason}")]
    EnvVar {
        key: String,
        value: String,
        reason: String,
    },
}

/// Result type alias for cache configuration
pub type Result<T> = std::result::Result<T, GeometryCacheError>;
