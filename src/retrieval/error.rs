use thiserror::Error;

use crate::embedding::{EmbeddingError, PivotError};
use crate::vectordb::VectorDbError;

#[derive(Debug, Error)]
pub enum RetrievalError {
    #[error("query is empty")]
    EmptyQuery,

    #[error("invalid retrieval parameters: {reason}")]
    InvalidParams { reason: String },

    #[error("query pivot failed: {0}")]
    Pivot(#[from] PivotError),

    #[error("query embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("vector search failed: {0}")]
    VectorDb(#[from] VectorDbError),
}
