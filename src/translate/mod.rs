//! Text translation collaborators.
//!
//! [`HttpTranslator`] talks to a LibreTranslate-compatible `/translate`
//! endpoint. Mocks live behind `cfg(any(test, feature = "mock"))`.

pub mod error;

#[cfg(any(test, feature = "mock"))]
mod mock;


pub use error::TranslateError;
#[cfg(any(test, feature = "mock"))]
pub use mock::{FailingTranslator, TaggingTranslator};

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};

use crate::lang::Language;
use crate::retry::{RetryPolicy, with_retry};

pub const DEFAULT_TRANSLATE_TIMEOUT: Duration = Duration::from_secs(30);

#[async_trait]
pub trait Translator: Send + Sync {
    async fn translate(
        &self,
        text: &str,
        source: Language,
        target: Language,
    ) -> Result<String, TranslateError>;
}

#[derive(Debug, Serialize)]
struct TranslateRequest<'a> {
    q: &'a str,
    source: &'a str,
    target: &'a str,
    format: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_key: Option<&'a str>,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    #[serde(rename = "translatedText")]
    translated_text: String,
}

#[derive(Debug, Clone)]
pub struct HttpTranslatorConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
    pub retry: RetryPolicy,
}

impl HttpTranslatorConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            timeout: DEFAULT_TRANSLATE_TIMEOUT,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

pub struct HttpTranslator {
    http: HttpClient,
    config: HttpTranslatorConfig,
}

impl std::fmt::Debug for HttpTranslator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTranslator")
            .field("base_url", &self.config.base_url)
            .field("has_api_key", &self.config.api_key.is_some())
            .finish()
    }
}

impl HttpTranslator {
    pub fn new(config: HttpTranslatorConfig) -> Result<Self, TranslateError> {
        let http = HttpClient::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/translate", self.config.base_url.trim_end_matches('/'))
    }

    async fn translate_once(
        &self,
        text: &str,
        source: Language,
        target: Language,
    ) -> Result<String, TranslateError> {
        let body = TranslateRequest {
            q: text,
            source: source.code(),
            target: target.code(),
            format: "text",
            api_key: self.config.api_key.as_deref(),
        };

        let resp = self.http.post(self.endpoint()).json(&body).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(TranslateError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: TranslateResponse =
            resp.json()
                .await
                .map_err(|e| TranslateError::InvalidResponse {
                    reason: e.to_string(),
                })?;

        Ok(parsed.translated_text)
    }
}

#[async_trait]
impl Translator for HttpTranslator {
    #[instrument(skip(self, text), fields(text_len = text.len()))]
    async fn translate(
        &self,
        text: &str,
        source: Language,
        target: Language,
    ) -> Result<String, TranslateError> {
        if source == target || text.trim().is_empty() {
            return Ok(text.to_string());
        }

        let translated = with_retry(&self.config.retry, "translate", || {
            self.translate_once(text, source, target)
        })
        .await?;

        debug!(
            source = %source,
            target = %target,
            translated_len = translated.len(),
            "Translated text"
        );

        Ok(translated)
    }
}

/// Returns text unchanged. Used when no translation endpoint is configured
/// and the embedding model is multilingual.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityTranslator;

#[async_trait]
impl Translator for IdentityTranslator {
    async fn translate(
        &self,
        text: &str,
        _source: Language,
        _target: Language,
    ) -> Result<String, TranslateError> {
        Ok(text.to_string())
    }
}
