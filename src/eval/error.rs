use std::path::PathBuf;

use thiserror::Error;

use crate::retrieval::RetrievalError;
use crate::scoring::ScoringError;

#[derive(Debug, Error)]
pub enum EvalError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("golden set line {line}: {reason}")]
    InvalidGolden { line: usize, reason: String },

    #[error("question {index} has invalid expected citations: {source}")]
    InvalidCitations {
        index: usize,
        #[source]
        source: ScoringError,
    },

    #[error("invalid baseline report: {reason}")]
    InvalidBaseline { reason: String },

    #[error("question {index} failed: {source}")]
    Retrieval {
        index: usize,
        #[source]
        source: RetrievalError,
    },
}
