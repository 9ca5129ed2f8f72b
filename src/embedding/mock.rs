use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{EmbedMode, EmbeddingError, EmbeddingProvider};
use crate::hashing::hash_feature;

/// Deterministic bag-of-words embedder: each lowercased token is hashed into a
/// signed slot, then the vector is L2-normalized. Texts sharing words are
/// cosine-similar, which is enough to drive retrieval in tests.
#[derive(Debug)]
pub struct HashEmbedder {
    dimension: usize,
    batch_size: usize,
    fail_remaining: AtomicUsize,
    batches: Mutex<Vec<usize>>,
}

impl HashEmbedder {
    pub fn new(dimension: usize) -> Self {
        Self {
            dimension: dimension.max(1),
            batch_size: 96,
            fail_remaining: AtomicUsize::new(0),
            batches: Mutex::new(Vec::new()),
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    /// The next `n` calls fail with a transient error.
    pub fn fail_next(self, n: usize) -> Self {
        self.fail_remaining.store(n, Ordering::SeqCst);
        self
    }

    /// Sizes of the batches received so far, in call order.
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batches.lock().clone()
    }

    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0f32; self.dimension];
        let lowered = text.to_lowercase();
        for token in lowered
            .split(|c: char| !c.is_alphanumeric())
            .filter(|t| !t.is_empty())
        {
            let hash = hash_feature("hash-embedder", token);
            let slot = (hash % self.dimension as u64) as usize;
            let sign = if (hash >> 63) == 0 { 1.0 } else { -1.0 };
            vector[slot] += sign;
        }

        let norm = vector.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > 0.0 {
            vector.iter_mut().for_each(|v| *v /= norm);
        }
        vector
    }
}

impl Default for HashEmbedder {
    fn default() -> Self {
        Self::new(64)
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbedder {
    async fn embed(
        &self,
        texts: &[String],
        _mode: EmbedMode,
    ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let failing = self
            .fail_remaining
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if failing {
            return Err(EmbeddingError::Unavailable {
                reason: "mock embedder scheduled failure".to_string(),
            });
        }

        self.batches.lock().push(texts.len());
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }

    fn max_batch_size(&self) -> usize {
        self.batch_size
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
