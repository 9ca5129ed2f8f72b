use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScoringError {
    #[error("invalid citation '{value}': {reason}")]
    InvalidCitation { value: String, reason: String },
}
