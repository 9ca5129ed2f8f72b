use std::time::Duration;

use thiserror::Error;

use super::OcrJobStatus;
use crate::retry::Transient;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("failed to submit OCR job for '{locator}': {reason}")]
    SubmitFailed { locator: String, reason: String },

    #[error("failed to poll OCR job {job_id}: {reason}")]
    PollFailed { job_id: String, reason: String },

    #[error("OCR job {job_id} ended with status {status:?}")]
    JobFailed { job_id: String, status: OcrJobStatus },

    #[error("OCR job {job_id} timed out after {waited:?}")]
    Timeout { job_id: String, waited: Duration },

    #[error("failed to build OCR client: {reason}")]
    ClientSetup { reason: String },
}

impl OcrError {
    /// Job id for manual follow-up, when one was assigned.
    pub fn job_id(&self) -> Option<&str> {
        match self {
            OcrError::SubmitFailed { .. } | OcrError::ClientSetup { .. } => None,
            OcrError::PollFailed { job_id, .. }
            | OcrError::JobFailed { job_id, .. }
            | OcrError::Timeout { job_id, .. } => Some(job_id),
        }
    }
}

impl Transient for OcrError {
    fn is_transient(&self) -> bool {
        matches!(self, OcrError::PollFailed { .. })
    }
}
