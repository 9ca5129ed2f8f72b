//! Grounded answering over retrieved segments.
//!
//! `ask` retrieves, prompts the generator with `[doc_id:page]`-tagged context,
//! and returns the answer with one citation per context. A retrieval failure
//! yields an empty answer instead of an error.

pub mod error;
mod llm;
#[cfg(any(test, feature = "mock"))]
mod mock;
pub mod prompt;

#[cfg(test)]
mod tests;

pub use error::AnswerError;
pub use llm::{DEFAULT_ANSWER_MODEL, DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE, GenaiAnswerGenerator};
#[cfg(any(test, feature = "mock"))]
pub use mock::{FailingAnswerGenerator, StaticAnswerGenerator};
pub use prompt::{SYSTEM_PROMPT, build_user_prompt};

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

use crate::lang::Language;
use crate::retrieval::{RerankedMatch, RetrievalFusion, RetrievalParams};
use crate::translate::Translator;

#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    async fn complete(&self, system: &str, user: &str) -> Result<String, AnswerError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskRequest {
    pub query: String,
    /// Result count when reranking is disabled.
    #[serde(default)]
    pub k: Option<usize>,
    /// Skips query language detection.
    #[serde(default)]
    pub lang_hint: Option<String>,
}

impl AskRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            k: None,
            lang_hint: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnswerCitation {
    pub doc_id: String,
    pub page: u32,
    pub snippet: String,
    pub rerank_score: Option<f32>,
}

impl From<&RerankedMatch> for AnswerCitation {
    fn from(matched: &RerankedMatch) -> Self {
        let metadata = matched.metadata();
        Self {
            doc_id: metadata.doc_id.clone(),
            page: metadata.page,
            snippet: metadata.text.clone(),
            rerank_score: matched.rerank_score,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AskResponse {
    pub answer: String,
    pub citations: Vec<AnswerCitation>,
}

impl AskResponse {
    pub fn empty() -> Self {
        Self {
            answer: String::new(),
            citations: Vec::new(),
        }
    }
}

#[derive(Clone)]
pub struct AskService {
    retrieval: RetrievalFusion,
    generator: Arc<dyn AnswerGenerator>,
    translator: Arc<dyn Translator>,
    params: RetrievalParams,
}

impl std::fmt::Debug for AskService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AskService")
            .field("retrieval", &self.retrieval)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl AskService {
    pub fn new(
        retrieval: RetrievalFusion,
        generator: Arc<dyn AnswerGenerator>,
        translator: Arc<dyn Translator>,
    ) -> Self {
        Self {
            retrieval,
            generator,
            translator,
            params: RetrievalParams::default(),
        }
    }

    pub fn with_params(mut self, params: RetrievalParams) -> Self {
        self.params = params;
        self
    }

    pub fn params(&self) -> &RetrievalParams {
        &self.params
    }

    #[instrument(skip(self, request), fields(query_len = request.query.len()))]
    pub async fn ask(&self, request: &AskRequest) -> Result<AskResponse, AnswerError> {
        let query = request.query.trim();
        if query.is_empty() {
            return Err(AnswerError::EmptyQuery);
        }

        let mut params = self.params;
        if let Some(k) = request.k {
            if k == 0 {
                return Err(AnswerError::InvalidRequest {
                    reason: "k must be at least 1".to_string(),
                });
            }
            params = params.with_k(k);
        }

        let language = request
            .lang_hint
            .as_deref()
            .filter(|hint| !hint.trim().is_empty())
            .map(Language::from_code)
            .unwrap_or_else(|| self.retrieval.detect_language(query));

        let matches = match self
            .retrieval
            .retrieve_with_language(query, language, &params)
            .await
        {
            Ok(matches) => matches,
            Err(err) => {
                warn!(error = %err, "Retrieval failed, returning empty answer");
                return Ok(AskResponse::empty());
            }
        };

        let user_prompt = build_user_prompt(query, &matches);
        let answer = self.generator.complete(SYSTEM_PROMPT, &user_prompt).await?;
        let answer = self.localize(answer, language).await;

        debug!(contexts = matches.len(), language = %language, "Answered query");

        Ok(AskResponse {
            answer,
            citations: matches.iter().map(AnswerCitation::from).collect(),
        })
    }

    /// Translates the answer into the query language when the model answered in
    /// another one. A translation failure keeps the untranslated answer.
    async fn localize(&self, answer: String, language: Language) -> String {
        if language != Language::French || answer.trim().is_empty() {
            return answer;
        }

        let answer_language = self.retrieval.detect_language(&answer);
        if answer_language == Language::French {
            return answer;
        }

        match self
            .translator
            .translate(&answer, answer_language, Language::French)
            .await
        {
            Ok(translated) => translated,
            Err(err) => {
                warn!(error = %err, "Answer back-translation failed");
                answer
            }
        }
    }
}
