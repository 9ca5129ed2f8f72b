use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StorageError {
    #[error("invalid object key '{key}'")]
    InvalidKey { key: String },

    #[error("object not found: {key}")]
    NotFound { key: String },

    #[error("storage root unavailable: {path}")]
    RootUnavailable { path: PathBuf },

    #[error("I/O error on '{key}': {reason}")]
    Io { key: String, reason: String },

    #[error("serialization failed: {reason}")]
    Serialization { reason: String },
}
