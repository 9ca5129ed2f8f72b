use thiserror::Error;

use crate::retry::{Transient, is_transient_status};

#[derive(Debug, Error)]
pub enum TranslateError {
    #[error("translation request failed: {reason}")]
    RequestFailed { reason: String },

    #[error("translation service returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid translation response: {reason}")]
    InvalidResponse { reason: String },

    #[error("translation unavailable: {reason}")]
    Unavailable { reason: String },
}

impl Transient for TranslateError {
    fn is_transient(&self) -> bool {
        match self {
            TranslateError::RequestFailed { .. } | TranslateError::Unavailable { .. } => true,
            TranslateError::Status { status, .. } => is_transient_status(*status),
            TranslateError::InvalidResponse { .. } => false,
        }
    }
}

impl From<reqwest::Error> for TranslateError {
    fn from(err: reqwest::Error) -> Self {
        TranslateError::RequestFailed {
            reason: err.to_string(),
        }
    }
}
