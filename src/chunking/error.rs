use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ChunkingError {
    #[error("invalid chunking configuration: {reason}")]
    InvalidConfig { reason: String },
}
