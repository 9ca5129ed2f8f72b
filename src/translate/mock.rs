use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::{TranslateError, Translator};
use crate::lang::Language;

/// Prefixes text with `[source->target]` so tests can see that translation ran.
#[derive(Debug, Default)]
pub struct TaggingTranslator {
    calls: AtomicUsize,
}

impl TaggingTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Translator for TaggingTranslator {
    async fn translate(
        &self,
        text: &str,
        source: Language,
        target: Language,
    ) -> Result<String, TranslateError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("[{}->{}] {}", source.code(), target.code(), text))
    }
}

#[derive(Debug, Default)]
pub struct FailingTranslator;

#[async_trait]
impl Translator for FailingTranslator {
    async fn translate(
        &self,
        _text: &str,
        _source: Language,
        _target: Language,
    ) -> Result<String, TranslateError> {
        Err(TranslateError::Unavailable {
            reason: "mock translator is offline".to_string(),
        })
    }
}
