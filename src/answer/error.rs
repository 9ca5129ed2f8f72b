use thiserror::Error;

#[derive(Debug, Error)]
pub enum AnswerError {
    #[error("query is empty")]
    EmptyQuery,

    #[error("invalid ask request: {reason}")]
    InvalidRequest { reason: String },

    #[error("answer generation failed: {reason}")]
    Generation { reason: String },
}
