//! Embedding generation.
//!
//! - [`EmbeddingProvider`] is the batch-size-limited provider contract.
//! - [`embed_batched`] splits large inputs into sequential sub-batches and
//!   reassembles the vectors in input order.
//! - [`pivot`] decides which texts must be translated before embedding.

pub mod cohere;
mod error;
#[cfg(any(test, feature = "mock"))]
mod mock;
pub mod pivot;

#[cfg(test)]
mod tests;

pub use cohere::{CohereEmbedder, CohereEmbedderConfig, DEFAULT_COHERE_EMBED_MODEL};
pub use error::EmbeddingError;
#[cfg(any(test, feature = "mock"))]
pub use mock::HashEmbedder;
pub use pivot::{EmbeddingPivot, PivotError};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::retry::{RetryPolicy, with_retry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmbedMode {
    Query,
    Document,
}

impl EmbedMode {
    /// Cohere `input_type` value.
    pub fn input_type(&self) -> &'static str {
        match self {
            EmbedMode::Query => "search_query",
            EmbedMode::Document => "search_document",
        }
    }
}

/// Declared language support of the embedding model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelCapability {
    #[default]
    Multilingual,
    Monolingual,
}

impl ModelCapability {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "multilingual" => Some(ModelCapability::Multilingual),
            "monolingual" => Some(ModelCapability::Monolingual),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ModelCapability::Multilingual => "multilingual",
            ModelCapability::Monolingual => "monolingual",
        }
    }
}

#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Embeds at most [`max_batch_size`](Self::max_batch_size) texts, one vector per text.
    async fn embed(&self, texts: &[String], mode: EmbedMode)
    -> Result<Vec<Vec<f32>>, EmbeddingError>;

    fn max_batch_size(&self) -> usize;

    fn dimension(&self) -> usize;
}

/// Embeds `texts` in sub-batches of at most `provider.max_batch_size()`,
/// retrying each sub-batch under `retry`. Output order matches input order.
#[instrument(skip(provider, texts, retry), fields(text_count = texts.len()))]
pub async fn embed_batched(
    provider: &dyn EmbeddingProvider,
    texts: &[String],
    mode: EmbedMode,
    retry: &RetryPolicy,
) -> Result<Vec<Vec<f32>>, EmbeddingError> {
    let batch_size = provider.max_batch_size();
    if batch_size == 0 {
        return Err(EmbeddingError::InvalidConfig {
            reason: "max_batch_size must be at least 1".to_string(),
        });
    }

    let mut vectors = Vec::with_capacity(texts.len());
    for (batch_index, batch) in texts.chunks(batch_size).enumerate() {
        let embedded = with_retry(retry, "embed", || provider.embed(batch, mode)).await?;
        if embedded.len() != batch.len() {
            return Err(EmbeddingError::CountMismatch {
                expected: batch.len(),
                actual: embedded.len(),
            });
        }

        debug!(batch_index = batch_index, batch_len = batch.len(), "Embedded batch");
        vectors.extend(embedded);
    }

    Ok(vectors)
}

/// Embeds a single query string.
pub async fn embed_query(
    provider: &dyn EmbeddingProvider,
    query: &str,
    retry: &RetryPolicy,
) -> Result<Vec<f32>, EmbeddingError> {
    let texts = [query.to_string()];
    embed_batched(provider, &texts, EmbedMode::Query, retry)
        .await?
        .pop()
        .ok_or(EmbeddingError::CountMismatch {
            expected: 1,
            actual: 0,
        })
}
