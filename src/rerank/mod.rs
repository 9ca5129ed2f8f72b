//! Cross-encoder reranking collaborators.
//!
//! A [`RerankProvider`] returns hits in relevance order. Failures are plain
//! `Err` values; deciding what to do about them is the caller's job (see
//! [`crate::retrieval`]).

pub mod cohere;
pub mod error;
pub mod lexical;
#[cfg(any(test, feature = "mock"))]
mod mock;


pub use cohere::{CohereReranker, CohereRerankerConfig, DEFAULT_COHERE_RERANK_MODEL};
pub use error::RerankerError;
pub use lexical::LexicalReranker;
#[cfg(any(test, feature = "mock"))]
pub use mock::{FailingReranker, ScriptedReranker};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One reranked document: its index in the submitted list and its score.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RerankHit {
    pub index: usize,
    pub relevance_score: f32,
}

#[async_trait]
pub trait RerankProvider: Send + Sync {
    /// Returns at most `top_n` hits, most relevant first.
    async fn rerank(
        &self,
        query: &str,
        documents: &[String],
        top_n: usize,
    ) -> Result<Vec<RerankHit>, RerankerError>;
}
