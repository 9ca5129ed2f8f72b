//! Local term-overlap reranker.
//!
//! A no-network stand-in for the hosted reranker, for offline runs and
//! tests. It has no semantic signal: paraphrases and cross-language matches
//! score near zero, so production deployments should use the Cohere backend.

use std::collections::HashSet;

use async_trait::async_trait;
use tracing::debug;

use super::{RerankHit, RerankProvider, RerankerError};

const STOP_WORDS: &[&str] = &[
    // English
    "a", "an", "the", "is", "are", "was", "were", "be", "been", "being", "have", "has", "had",
    "do", "does", "did", "will", "would", "could", "should", "may", "might", "must", "can", "to",
    "of", "in", "for", "on", "with", "at", "by", "from", "as", "into", "through", "during",
    "before", "after", "between", "under", "then", "here", "there", "when", "where", "why", "how",
    "all", "each", "more", "most", "other", "some", "such", "no", "nor", "not", "only", "so",
    "than", "too", "very", "just", "and", "but", "if", "or", "because", "while", "what", "which",
    "who", "whom", "this", "that", "these", "those", "am", "it", "its",
    // French
    "le", "la", "les", "un", "une", "des", "du", "de", "et", "ou", "est", "sont", "dans", "par",
    "pour", "sur", "avec", "que", "qui", "quoi", "quel", "quelle", "quels", "quelles", "ce",
    "cette", "ces", "au", "aux", "en", "il", "elle", "ils", "elles", "ne", "pas", "plus", "se",
    "sa", "son", "ses", "leur", "leurs",
];

/// Scores each document by query-term recall blended with Jaccard overlap,
/// squashed through a sigmoid into `0.0..=1.0`.
///
/// Selected with `GOVDOC_RERANK_BACKEND=lexical`. Not a quality substitute
/// for [`CohereReranker`](super::CohereReranker).
#[derive(Debug)]
pub struct LexicalReranker {
    stop_words: HashSet<&'static str>,
}

impl Default for LexicalReranker {
    fn default() -> Self {
        Self::new()
    }
}

impl LexicalReranker {
    pub fn new() -> Self {
        Self {
            stop_words: STOP_WORDS.iter().copied().collect(),
        }
    }

    fn terms(&self, text: &str) -> HashSet<String> {
        text.to_lowercase()
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty() && !self.stop_words.contains(w))
            .map(str::to_string)
            .collect()
    }

    pub fn score(&self, query: &str, document: &str) -> f32 {
        let query_terms = self.terms(query);
        let doc_terms = self.terms(document);

        if query_terms.is_empty() {
            let shorter = query.chars().count().min(document.chars().count()) as f32;
            let longer = query.chars().count().max(document.chars().count()).max(1) as f32;
            return (shorter / longer) * 0.3;
        }

        let matches = query_terms.intersection(&doc_terms).count();
        let recall = matches as f32 / query_terms.len() as f32;

        let union = query_terms.union(&doc_terms).count();
        let jaccard = if union > 0 {
            matches as f32 / union as f32
        } else {
            0.0
        };

        let base = 0.6 * recall + 0.4 * jaccard;
        let normalized = 1.0 / (1.0 + (-8.0 * (base - 0.5)).exp());
        normalized.clamp(0.0, 1.0)
    }
}

#[async_trait]
impl RerankProvider for LexicalReranker {
    async fn rerank(
        &self,
        query: &str,
        documents: &[String],
        top_n: usize,
    ) -> Result<Vec<RerankHit>, RerankerError> {
        let mut hits: Vec<RerankHit> = documents
            .iter()
            .enumerate()
            .map(|(index, doc)| RerankHit {
                index,
                relevance_score: self.score(query, doc),
            })
            .collect();

        // Stable: equal scores keep submission order.
        hits.sort_by(|a, b| {
            b.relevance_score
                .partial_cmp(&a.relevance_score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        hits.truncate(top_n);

        debug!(
            documents = documents.len(),
            hits = hits.len(),
            top_score = hits.first().map(|h| h.relevance_score),
            "Lexical rerank complete"
        );

        Ok(hits)
    }
}
