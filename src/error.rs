//! Error types for hookmeter.
//!
//! Almost every failure in this pipeline is swallowed close to where it
//! occurs, because telemetry must never fail the host's lifecycle hook.
//! These types exist for the few seams that do propagate internally (and for
//! the standalone `transfer` invocation, which reports its own outcome).

use thiserror::Error;

use crate::config::ConfigError;
use crate::uploader::UploadError;

/// Errors that can occur during hookmeter operations.
#[derive(Error, Debug)]
pub enum HookError {
    /// Configuration-related error.
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// File system I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing or serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Upload delivery error.
    #[error("upload error: {0}")]
    Upload(#[from] UploadError),
}

/// A specialized `Result` type for hookmeter operations.
pub type Result<T> = std::result::Result<T, HookError>;
