use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::{RerankHit, RerankProvider, RerankerError};

/// Always fails; exercises the similarity-order fallback.
#[derive(Debug, Default)]
pub struct FailingReranker {
    calls: AtomicUsize,
}

impl FailingReranker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RerankProvider for FailingReranker {
    async fn rerank(
        &self,
        _query: &str,
        _documents: &[String],
        _top_n: usize,
    ) -> Result<Vec<RerankHit>, RerankerError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(RerankerError::NotAvailable {
            reason: "mock reranker is offline".to_string(),
        })
    }
}

/// Returns a fixed list of hits regardless of input, truncated to `top_n`.
#[derive(Debug, Clone, Default)]
pub struct ScriptedReranker {
    hits: Vec<RerankHit>,
}

impl ScriptedReranker {
    pub fn new(hits: Vec<RerankHit>) -> Self {
        Self { hits }
    }

    /// Reverses submission order with descending scores.
    pub fn reversing(len: usize) -> Self {
        let hits = (0..len)
            .rev()
            .enumerate()
            .map(|(rank, index)| RerankHit {
                index,
                relevance_score: 1.0 - rank as f32 * 0.1,
            })
            .collect();
        Self { hits }
    }
}

#[async_trait]
impl RerankProvider for ScriptedReranker {
    async fn rerank(
        &self,
        _query: &str,
        _documents: &[String],
        top_n: usize,
    ) -> Result<Vec<RerankHit>, RerankerError> {
        Ok(self.hits.iter().copied().take(top_n).collect())
    }
}
