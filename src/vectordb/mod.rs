//! Vector index integration (Qdrant).
//!
//! Search hits are normalized into [`Match`] here, at the adapter boundary;
//! nothing downstream sees Qdrant payload types.

pub mod client;
pub mod error;
pub mod lazy;
#[cfg(any(test, feature = "mock"))]
pub mod mock;
pub mod model;


pub use client::{QdrantClient, QdrantIndex, QdrantIndexConfig};
pub use error::VectorDbError;
pub use lazy::LazyQdrantIndex;
#[cfg(any(test, feature = "mock"))]
pub use mock::{MockVectorIndex, cosine_similarity};
pub use model::{IndexPoint, Match, MatchMetadata, truncate_chars};

use async_trait::async_trait;

pub use crate::constants::DEFAULT_COLLECTION_NAME;

pub const DEFAULT_VECTOR_SIZE: u64 = crate::constants::DEFAULT_VECTOR_SIZE_U64;

#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Inserts or replaces points keyed by segment id.
    async fn upsert(&self, points: Vec<IndexPoint>) -> Result<(), VectorDbError>;

    /// Returns up to `top_k` matches, most similar first.
    async fn query(&self, vector: Vec<f32>, top_k: usize) -> Result<Vec<Match>, VectorDbError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WriteConsistency {
    /// Wait for the operation to be fully indexed and searchable.
    /// Maps to `wait=true`.
    #[default]
    Strong,
    /// Return immediately after the server acknowledges receipt.
    /// Maps to `wait=false`.
    Eventual,
}

impl From<WriteConsistency> for bool {
    fn from(c: WriteConsistency) -> bool {
        matches!(c, WriteConsistency::Strong)
    }
}
