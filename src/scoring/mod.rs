//! Offline citation evaluation.
//!
//! Citation quality is scored per example as set precision/recall over
//! `(doc_id, page)` pairs, then macro-averaged so examples with many
//! citations don't dominate. Rerank scores attached to results are summarized
//! separately to compare reranked runs against a similarity-only baseline.

pub mod error;
pub mod scorer;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::ScoringError;
pub use scorer::{
    aggregate, compare_metrics, f1_score, metric_delta, rerank_score_distribution, score,
};
pub use types::{
    Citation, CitationMetrics, CitationScore, CitationSet, EvalExample, MetricDelta,
    RerankScoreDistribution, RerankScoreStats,
};
