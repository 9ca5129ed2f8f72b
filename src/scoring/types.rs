use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::error::ScoringError;

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
/// A page-level citation.
pub struct Citation {
    pub doc_id: String,
    pub page: u32,
}

impl Citation {
    pub fn new(doc_id: impl Into<String>, page: u32) -> Self {
        Self {
            doc_id: doc_id.into(),
            page,
        }
    }
}

impl fmt::Display for Citation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.doc_id, self.page)
    }
}

impl FromStr for Citation {
    type Err = ScoringError;

    /// Parses `doc-id:page`. The doc id may itself contain `:`.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let invalid = |reason: &str| ScoringError::InvalidCitation {
            value: trimmed.to_string(),
            reason: reason.to_string(),
        };

        let (doc_id, page) = trimmed
            .rsplit_once(':')
            .ok_or_else(|| invalid("expected doc_id:page"))?;
        let doc_id = doc_id.trim();
        if doc_id.is_empty() {
            return Err(invalid("empty doc_id"));
        }
        let page = page
            .trim()
            .parse::<u32>()
            .map_err(|e| invalid(&e.to_string()))?;

        Ok(Citation::new(doc_id, page))
    }
}

/// Set of citations compared by value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CitationSet(BTreeSet<Citation>);

impl CitationSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a comma-separated `doc:page,doc:page` list. Blank entries are ignored.
    pub fn parse(value: &str) -> Result<Self, ScoringError> {
        value
            .split(',')
            .filter(|part| !part.trim().is_empty())
            .map(|part| part.parse::<Citation>())
            .collect()
    }

    /// Builds a set from returned `(doc_id, page)` pairs, skipping entries
    /// with an empty doc id or page 0.
    pub fn from_returned<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<String>,
    {
        pairs
            .into_iter()
            .map(|(doc_id, page)| Citation::new(doc_id, page))
            .filter(|c| !c.doc_id.is_empty() && c.page > 0)
            .collect()
    }

    pub fn insert(&mut self, citation: Citation) -> bool {
        self.0.insert(citation)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, citation: &Citation) -> bool {
        self.0.contains(citation)
    }

    pub fn intersection_len(&self, other: &CitationSet) -> usize {
        self.0.intersection(&other.0).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Citation> {
        self.0.iter()
    }
}

impl FromIterator<Citation> for CitationSet {
    fn from_iter<T: IntoIterator<Item = Citation>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CitationScore {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

/// One evaluation example: gold citations vs. what the system returned.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvalExample {
    pub expected: CitationSet,
    pub returned: CitationSet,
}

impl EvalExample {
    pub fn new(expected: CitationSet, returned: CitationSet) -> Self {
        Self { expected, returned }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
/// Macro-averaged citation metrics.
pub struct CitationMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    /// Examples that contributed to the averages.
    pub examples_scored: usize,
}

impl CitationMetrics {
    /// `(name, value)` pairs in report order.
    pub fn named(&self) -> [(&'static str, f64); 3] {
        [
            ("citation_precision", self.precision),
            ("citation_recall", self.recall),
            ("citation_f1", self.f1),
        ]
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RerankScoreStats {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub median: f64,
    pub q1: f64,
    pub q3: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
/// Distribution of present rerank scores. `NoScores` is reported explicitly
/// rather than as zeroed statistics.
pub enum RerankScoreDistribution {
    NoScores,
    Scores(RerankScoreStats),
}

impl RerankScoreDistribution {
    pub fn stats(&self) -> Option<&RerankScoreStats> {
        match self {
            RerankScoreDistribution::Scores(stats) => Some(stats),
            RerankScoreDistribution::NoScores => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
/// Baseline-vs-candidate comparison of one metric.
pub struct MetricDelta {
    pub metric: String,
    pub baseline: f64,
    pub candidate: f64,
    pub absolute_diff: f64,
    /// Percent change relative to the baseline; infinite when the baseline is
    /// zero and the candidate improved, zero when both are zero.
    pub relative_improvement_pct: f64,
    pub better: bool,
}
