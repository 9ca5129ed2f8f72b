//! Connect-on-first-use wrapper around [`QdrantIndex`].

use async_trait::async_trait;
use tokio::sync::OnceCell;

use super::client::{QdrantIndex, QdrantIndexConfig};
use super::error::VectorDbError;
use super::model::{IndexPoint, Match};
use super::VectorIndex;

/// Concurrent first callers race on one initialization; later callers reuse
/// the connected index. A failed connection is retried by the next caller.
#[derive(Debug)]
pub struct LazyQdrantIndex {
    config: QdrantIndexConfig,
    index: OnceCell<QdrantIndex>,
}

impl LazyQdrantIndex {
    pub fn new(config: QdrantIndexConfig) -> Self {
        Self {
            config,
            index: OnceCell::new(),
        }
    }

    pub fn is_connected(&self) -> bool {
        self.index.initialized()
    }

    pub async fn get(&self) -> Result<&QdrantIndex, VectorDbError> {
        self.index
            .get_or_try_init(|| QdrantIndex::connect(&self.config))
            .await
    }
}

#[async_trait]
impl VectorIndex for LazyQdrantIndex {
    async fn upsert(&self, points: Vec<IndexPoint>) -> Result<(), VectorDbError> {
        self.get().await?.upsert(points).await
    }

    async fn query(&self, vector: Vec<f32>, top_k: usize) -> Result<Vec<Match>, VectorDbError> {
        self.get().await?.query(vector, top_k).await
    }
}
