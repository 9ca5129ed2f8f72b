use thiserror::Error;

use crate::retry::{Transient, is_transient_status};

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding request failed: {reason}")]
    RequestFailed { reason: String },

    #[error("embedding service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid embedding response: {reason}")]
    InvalidResponse { reason: String },

    #[error("embedding count mismatch: expected {expected}, got {actual}")]
    CountMismatch { expected: usize, actual: usize },

    #[error("invalid embedding configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("embedding provider unavailable: {reason}")]
    Unavailable { reason: String },
}

impl Transient for EmbeddingError {
    fn is_transient(&self) -> bool {
        match self {
            EmbeddingError::RequestFailed { .. } | EmbeddingError::Unavailable { .. } => true,
            EmbeddingError::Status { status, .. } => is_transient_status(*status),
            EmbeddingError::InvalidResponse { .. }
            | EmbeddingError::CountMismatch { .. }
            | EmbeddingError::InvalidConfig { .. } => false,
        }
    }
}

impl From<reqwest::Error> for EmbeddingError {
    fn from(err: reqwest::Error) -> Self {
        EmbeddingError::RequestFailed {
            reason: err.to_string(),
        }
    }
}
