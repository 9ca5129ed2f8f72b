use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use super::{IndexPoint, Match, VectorDbError, VectorIndex};

const MOCK_COLLECTION: &str = "mock";

/// In-memory [`VectorIndex`] with brute-force cosine search. Points keep their
/// first insertion position, so equal scores come back in insertion order.
#[derive(Debug, Default)]
pub struct MockVectorIndex {
    dimension: Option<usize>,
    points: RwLock<Vec<IndexPoint>>,
    fail_queries: AtomicBool,
}

impl MockVectorIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_dimension(dimension: usize) -> Self {
        Self {
            dimension: Some(dimension),
            ..Self::default()
        }
    }

    pub fn point_count(&self) -> usize {
        self.points.read().len()
    }

    pub fn get(&self, segment_id: &str) -> Option<IndexPoint> {
        self.points
            .read()
            .iter()
            .find(|p| p.segment_id == segment_id)
            .cloned()
    }

    pub fn segment_ids(&self) -> Vec<String> {
        self.points
            .read()
            .iter()
            .map(|p| p.segment_id.clone())
            .collect()
    }

    /// Makes every subsequent query fail.
    pub fn set_fail_queries(&self, fail: bool) {
        self.fail_queries.store(fail, Ordering::SeqCst);
    }

    fn check_dimension(&self, actual: usize) -> Result<(), VectorDbError> {
        match self.dimension {
            Some(expected) if expected != actual => {
                Err(VectorDbError::InvalidDimension { expected, actual })
            }
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl VectorIndex for MockVectorIndex {
    async fn upsert(&self, points: Vec<IndexPoint>) -> Result<(), VectorDbError> {
        for point in &points {
            self.check_dimension(point.vector.len())?;
        }

        let mut stored = self.points.write();
        for point in points {
            match stored.iter_mut().find(|p| p.segment_id == point.segment_id) {
                Some(existing) => *existing = point,
                None => stored.push(point),
            }
        }
        Ok(())
    }

    async fn query(&self, vector: Vec<f32>, top_k: usize) -> Result<Vec<Match>, VectorDbError> {
        if self.fail_queries.load(Ordering::SeqCst) {
            return Err(VectorDbError::SearchFailed {
                collection: MOCK_COLLECTION.to_string(),
                message: "mock index configured to fail".to_string(),
            });
        }
        self.check_dimension(vector.len())?;

        let mut matches: Vec<Match> = self
            .points
            .read()
            .iter()
            .map(|p| Match {
                segment_id: p.segment_id.clone(),
                similarity_score: cosine_similarity(&vector, &p.vector),
                metadata: p.metadata.clone(),
            })
            .collect();

        matches.sort_by(|a, b| {
            b.similarity_score
                .partial_cmp(&a.similarity_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        matches.truncate(top_k);
        Ok(matches)
    }
}

pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot_product / (norm_a * norm_b)
    }
}
