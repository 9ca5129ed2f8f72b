use thiserror::Error;

use crate::retry::{Transient, is_transient_status};

#[derive(Debug, Error)]
pub enum RerankerError {
    #[error("rerank request failed: {reason}")]
    RequestFailed { reason: String },

    #[error("rerank service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid rerank response: {reason}")]
    InvalidResponse { reason: String },

    #[error("invalid reranker configuration: {reason}")]
    InvalidConfig { reason: String },

    #[error("reranker not available: {reason}")]
    NotAvailable { reason: String },
}

impl Transient for RerankerError {
    fn is_transient(&self) -> bool {
        match self {
            RerankerError::RequestFailed { .. } => true,
            RerankerError::Status { status, .. } => is_transient_status(*status),
            RerankerError::InvalidResponse { .. }
            | RerankerError::InvalidConfig { .. }
            | RerankerError::NotAvailable { .. } => false,
        }
    }
}

impl From<reqwest::Error> for RerankerError {
    fn from(err: reqwest::Error) -> Self {
        RerankerError::RequestFailed {
            reason: err.to_string(),
        }
    }
}
