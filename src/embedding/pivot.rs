//! Translate-before-embed decision layer.
//!
//! The stored segment keeps its original language tag; only the text handed
//! to the embedding model is pivoted into [`Language::DEFAULT`].

use std::sync::Arc;

use thiserror::Error;
use tracing::debug;

use super::ModelCapability;
use crate::lang::Language;
use crate::translate::{TranslateError, Translator};

#[derive(Debug, Error)]
pub enum PivotError {
    #[error("invalid pivot input: {reason}")]
    InvalidInput { reason: String },

    #[error("pivot translation failed: {0}")]
    Translation(#[from] TranslateError),
}

#[derive(Clone)]
pub struct EmbeddingPivot {
    translator: Arc<dyn Translator>,
}

impl std::fmt::Debug for EmbeddingPivot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingPivot").finish_non_exhaustive()
    }
}

impl EmbeddingPivot {
    pub fn new(translator: Arc<dyn Translator>) -> Self {
        Self { translator }
    }

    /// Returns one text per input. With a monolingual model, non-default
    /// language texts are translated; everything else passes through.
    pub async fn prepare(
        &self,
        texts: &[String],
        languages: &[Language],
        capability: ModelCapability,
    ) -> Result<Vec<String>, PivotError> {
        if texts.len() != languages.len() {
            return Err(PivotError::InvalidInput {
                reason: format!(
                    "{} texts but {} language tags",
                    texts.len(),
                    languages.len()
                ),
            });
        }

        if capability == ModelCapability::Multilingual {
            return Ok(texts.to_vec());
        }

        let mut prepared = Vec::with_capacity(texts.len());
        let mut translated = 0usize;
        for (text, language) in texts.iter().zip(languages) {
            if language.is_default() {
                prepared.push(text.clone());
            } else {
                prepared.push(
                    self.translator
                        .translate(text, *language, Language::DEFAULT)
                        .await?,
                );
                translated += 1;
            }
        }

        debug!(
            total = texts.len(),
            translated = translated,
            "Pivoted texts for monolingual embedding"
        );

        Ok(prepared)
    }

    pub async fn prepare_one(
        &self,
        text: &str,
        language: Language,
        capability: ModelCapability,
    ) -> Result<String, PivotError> {
        let mut prepared = self
            .prepare(&[text.to_string()], &[language], capability)
            .await?;
        prepared.pop().ok_or(PivotError::InvalidInput {
            reason: "pivot produced no output".to_string(),
        })
    }
}
