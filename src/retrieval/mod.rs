//! Over-fetch, rerank and fall back.
//!
//! ```text
//! query ─► pivot ─► embed(Query) ─► index.query(over_fetch_k | k)
//!                                        │
//!                     rerank enabled & non-empty?
//!                      │ no                 │ yes
//!                      ▼                    ▼
//!                 first k          provider.rerank(top_n)
//!                                   │ Ok         │ Err
//!                                   ▼            ▼
//!                          reorder by hits   first top_n, no scores
//! ```

pub mod error;


pub use error::RetrievalError;

use std::collections::HashSet;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::constants::{DEFAULT_OVER_FETCH_K, DEFAULT_RERANK_TOP_N, DEFAULT_RETRIEVAL_K};
use crate::embedding::{EmbeddingPivot, EmbeddingProvider, ModelCapability, embed_query};
use crate::lang::{Language, LanguageIdentifier, WhatlangIdentifier};
use crate::rerank::{RerankHit, RerankProvider};
use crate::retry::RetryPolicy;
use crate::vectordb::VectorIndex;
pub use crate::vectordb::{Match, MatchMetadata};

/// A retrieval result. `rerank_score` is `None` when reranking was disabled
/// or the reranker failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RerankedMatch {
    #[serde(flatten)]
    pub matched: Match,
    pub rerank_score: Option<f32>,
}

impl RerankedMatch {
    pub fn unscored(matched: Match) -> Self {
        Self {
            matched,
            rerank_score: None,
        }
    }

    pub fn segment_id(&self) -> &str {
        &self.matched.segment_id
    }

    pub fn metadata(&self) -> &MatchMetadata {
        &self.matched.metadata
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetrievalParams {
    pub k: usize,
    pub rerank_enabled: bool,
    pub over_fetch_k: usize,
    pub rerank_top_n: usize,
}

impl Default for RetrievalParams {
    fn default() -> Self {
        Self {
            k: DEFAULT_RETRIEVAL_K,
            rerank_enabled: true,
            over_fetch_k: DEFAULT_OVER_FETCH_K,
            rerank_top_n: DEFAULT_RERANK_TOP_N,
        }
    }
}

impl RetrievalParams {
    pub fn with_k(mut self, k: usize) -> Self {
        self.k = k;
        self
    }

    pub fn without_rerank(mut self) -> Self {
        self.rerank_enabled = false;
        self
    }

    /// How many candidates to request from the index.
    pub fn fetch_count(&self) -> usize {
        if self.rerank_enabled {
            self.over_fetch_k
        } else {
            self.k
        }
    }

    pub fn validate(&self) -> Result<(), RetrievalError> {
        if self.fetch_count() == 0 {
            return Err(RetrievalError::InvalidParams {
                reason: "fetch count must be at least 1".to_string(),
            });
        }
        if self.rerank_enabled && self.rerank_top_n == 0 {
            return Err(RetrievalError::InvalidParams {
                reason: "rerank_top_n must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Clone)]
pub struct RetrievalFusion {
    embedder: Arc<dyn EmbeddingProvider>,
    index: Arc<dyn VectorIndex>,
    reranker: Arc<dyn RerankProvider>,
    pivot: EmbeddingPivot,
    identifier: Arc<dyn LanguageIdentifier>,
    capability: ModelCapability,
    retry: RetryPolicy,
}

impl std::fmt::Debug for RetrievalFusion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetrievalFusion")
            .field("capability", &self.capability)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

impl RetrievalFusion {
    pub fn new(
        embedder: Arc<dyn EmbeddingProvider>,
        index: Arc<dyn VectorIndex>,
        reranker: Arc<dyn RerankProvider>,
        pivot: EmbeddingPivot,
    ) -> Self {
        Self {
            embedder,
            index,
            reranker,
            pivot,
            identifier: Arc::new(WhatlangIdentifier),
            capability: ModelCapability::default(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_capability(mut self, capability: ModelCapability) -> Self {
        self.capability = capability;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_identifier(mut self, identifier: Arc<dyn LanguageIdentifier>) -> Self {
        self.identifier = identifier;
        self
    }

    pub fn detect_language(&self, text: &str) -> Language {
        self.identifier.detect(text)
    }

    /// Detects the query language, then retrieves.
    pub async fn retrieve(
        &self,
        query: &str,
        params: &RetrievalParams,
    ) -> Result<Vec<RerankedMatch>, RetrievalError> {
        let language = self.detect_language(query);
        self.retrieve_with_language(query, language, params).await
    }

    #[instrument(
        skip(self, query, language),
        fields(query_len = query.len(), language = %language)
    )]
    pub async fn retrieve_with_language(
        &self,
        query: &str,
        language: Language,
        params: &RetrievalParams,
    ) -> Result<Vec<RerankedMatch>, RetrievalError> {
        if query.trim().is_empty() {
            return Err(RetrievalError::EmptyQuery);
        }
        params.validate()?;

        let pivoted = self
            .pivot
            .prepare_one(query, language, self.capability)
            .await?;
        let vector = embed_query(self.embedder.as_ref(), &pivoted, &self.retry).await?;
        let candidates = self.index.query(vector, params.fetch_count()).await?;

        debug!(
            candidates = candidates.len(),
            fetch_count = params.fetch_count(),
            "Fetched candidates"
        );

        Ok(self.fuse(query, candidates, params).await)
    }

    /// Rerank step over already-fetched candidates. Never fails: a reranker
    /// error degrades to similarity order.
    pub async fn fuse(
        &self,
        query: &str,
        candidates: Vec<Match>,
        params: &RetrievalParams,
    ) -> Vec<RerankedMatch> {
        if !params.rerank_enabled {
            return candidates
                .into_iter()
                .take(params.k)
                .map(RerankedMatch::unscored)
                .collect();
        }

        if candidates.is_empty() {
            return Vec::new();
        }

        let documents: Vec<String> = candidates
            .iter()
            .map(|c| c.metadata.text.clone())
            .collect();

        match self
            .reranker
            .rerank(query, &documents, params.rerank_top_n)
            .await
        {
            Ok(hits) => apply_rerank(candidates, hits, params.rerank_top_n),
            Err(err) => {
                warn!(
                    error = %err,
                    candidates = candidates.len(),
                    top_n = params.rerank_top_n,
                    "Rerank failed, falling back to similarity order"
                );
                candidates
                    .into_iter()
                    .take(params.rerank_top_n)
                    .map(RerankedMatch::unscored)
                    .collect()
            }
        }
    }
}

/// Reorders `candidates` by `hits` in provider order, attaching scores.
/// Out-of-range and repeated indices are skipped.
pub fn apply_rerank(
    candidates: Vec<Match>,
    hits: Vec<RerankHit>,
    top_n: usize,
) -> Vec<RerankedMatch> {
    let total = candidates.len();
    let mut slots: Vec<Option<Match>> = candidates.into_iter().map(Some).collect();
    let mut seen = HashSet::new();
    let mut reranked = Vec::with_capacity(top_n.min(total));

    for hit in hits {
        if reranked.len() >= top_n {
            break;
        }
        if !seen.insert(hit.index) {
            warn!(index = hit.index, "Duplicate rerank index skipped");
            continue;
        }
        match slots.get_mut(hit.index).and_then(Option::take) {
            Some(matched) => reranked.push(RerankedMatch {
                matched,
                rerank_score: Some(hit.relevance_score),
            }),
            None => warn!(
                index = hit.index,
                candidates = total,
                "Rerank index out of range skipped"
            ),
        }
    }

    reranked
}
