//! Golden-set evaluation of retrieval citations.
//!
//! A golden set is JSON Lines, one question per line:
//!
//! ```text
//! {"question": "How did health spending change?", "expected_citations": "doc:2", "lang": "en"}
//! ```
//!
//! Each question is retrieved, its `(doc_id, page)` pairs are scored against
//! `expected_citations`, and the run is summarized as an [`EvalReport`].
//! Questions without expected citations still run (their rerank scores
//! count) but are left out of the citation averages.

pub mod error;


pub use error::EvalError;

use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::lang::Language;
use crate::retrieval::{RerankedMatch, RetrievalFusion, RetrievalParams};
use crate::scoring::{
    CitationMetrics, CitationScore, CitationSet, EvalExample, MetricDelta,
    RerankScoreDistribution, ScoringError, aggregate, compare_metrics, rerank_score_distribution,
    score,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoldenExample {
    pub question: String,
    /// `doc:page,doc:page`. Blank means unlabeled.
    #[serde(default)]
    pub expected_citations: String,
    /// Skips language detection when set.
    #[serde(default)]
    pub lang: Option<String>,
}

/// Parses a JSON Lines golden set. Blank lines are skipped.
pub fn parse_golden_set(text: &str) -> Result<Vec<GoldenExample>, EvalError> {
    let mut examples = Vec::new();
    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let example: GoldenExample =
            serde_json::from_str(line).map_err(|e| EvalError::InvalidGolden {
                line: i + 1,
                reason: e.to_string(),
            })?;
        if example.question.trim().is_empty() {
            return Err(EvalError::InvalidGolden {
                line: i + 1,
                reason: "question is empty".to_string(),
            });
        }
        CitationSet::parse(&example.expected_citations).map_err(|e| {
            EvalError::InvalidGolden {
                line: i + 1,
                reason: e.to_string(),
            }
        })?;
        examples.push(example);
    }
    Ok(examples)
}

pub async fn load_golden_set(path: &Path) -> Result<Vec<GoldenExample>, EvalError> {
    let text = tokio::fs::read_to_string(path)
        .await
        .map_err(|source| EvalError::Io {
            path: path.to_path_buf(),
            source,
        })?;
    parse_golden_set(&text)
}

/// Reads a report written by an earlier `govdoc eval` run.
pub async fn load_report(path: &Path) -> Result<EvalReport, EvalError> {
    let bytes = tokio::fs::read(path).await.map_err(|source| EvalError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_slice(&bytes).map_err(|e| EvalError::InvalidBaseline {
        reason: e.to_string(),
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionResult {
    pub question: String,
    pub expected: CitationSet,
    pub returned: CitationSet,
    /// `None` for unlabeled questions.
    pub score: Option<CitationScore>,
    /// One entry per retrieved segment, in rank order.
    pub rerank_scores: Vec<Option<f32>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalReport {
    pub num_examples: usize,
    pub k: usize,
    pub rerank_enabled: bool,
    pub citation_metrics: CitationMetrics,
    pub reranker_metrics: RerankScoreDistribution,
    /// Not read back: an infinite improvement serializes as `null`.
    #[serde(default, skip_deserializing, skip_serializing_if = "Option::is_none")]
    pub comparison: Option<Vec<MetricDelta>>,
    pub results: Vec<QuestionResult>,
}

impl EvalReport {
    /// Diffs this run's citation metrics against `baseline`.
    pub fn with_baseline(mut self, baseline: &EvalReport) -> Self {
        self.comparison = Some(compare_metrics(
            &baseline.citation_metrics,
            &self.citation_metrics,
        ));
        self
    }
}

/// Runs a golden set through retrieval.
#[derive(Debug, Clone)]
pub struct EvalRunner {
    retrieval: RetrievalFusion,
    params: RetrievalParams,
}

impl EvalRunner {
    pub fn new(retrieval: RetrievalFusion, params: RetrievalParams) -> Self {
        Self { retrieval, params }
    }

    #[instrument(skip(self, golden), fields(examples = golden.len(), k = self.params.k))]
    pub async fn run(&self, golden: &[GoldenExample]) -> Result<EvalReport, EvalError> {
        let mut results = Vec::with_capacity(golden.len());

        for (index, example) in golden.iter().enumerate() {
            let matches = match example.lang.as_deref() {
                Some(code) => {
                    self.retrieval
                        .retrieve_with_language(
                            &example.question,
                            Language::from_code(code),
                            &self.params,
                        )
                        .await
                }
                None => self.retrieval.retrieve(&example.question, &self.params).await,
            }
            .map_err(|source| EvalError::Retrieval { index, source })?;

            let result = question_result(example, &matches)
                .map_err(|source| EvalError::InvalidCitations { index, source })?;
            debug!(
                index = index,
                returned = result.returned.len(),
                expected = result.expected.len(),
                "Scored question"
            );
            results.push(result);
        }

        let report = summarize(&results, &self.params);
        info!(
            examples = report.num_examples,
            precision = report.citation_metrics.precision,
            recall = report.citation_metrics.recall,
            "Evaluation completed"
        );
        Ok(report)
    }
}

fn question_result(
    example: &GoldenExample,
    matches: &[RerankedMatch],
) -> Result<QuestionResult, ScoringError> {
    let expected = CitationSet::parse(&example.expected_citations)?;
    let returned = CitationSet::from_returned(
        matches
            .iter()
            .map(|m| (m.metadata().doc_id.clone(), m.metadata().page)),
    );
    let citation_score = (!expected.is_empty()).then(|| score(&expected, &returned));

    Ok(QuestionResult {
        question: example.question.clone(),
        expected,
        returned,
        score: citation_score,
        rerank_scores: matches.iter().map(|m| m.rerank_score).collect(),
    })
}

/// Builds the report from per-question results.
pub fn summarize(results: &[QuestionResult], params: &RetrievalParams) -> EvalReport {
    let examples: Vec<EvalExample> = results
        .iter()
        .filter(|r| !r.expected.is_empty())
        .map(|r| EvalExample::new(r.expected.clone(), r.returned.clone()))
        .collect();

    EvalReport {
        num_examples: results.len(),
        k: params.k,
        rerank_enabled: params.rerank_enabled,
        citation_metrics: aggregate(&examples),
        reranker_metrics: rerank_score_distribution(
            results.iter().map(|r| r.rerank_scores.iter().copied()),
        ),
        comparison: None,
        results: results.to_vec(),
    }
}
