//! Cohere `/v1/embed` client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{EmbedMode, EmbeddingError, EmbeddingProvider};
use crate::constants::{DEFAULT_COHERE_BASE_URL, DEFAULT_EMBED_BATCH_SIZE, DEFAULT_EMBEDDING_DIM};

pub const DEFAULT_COHERE_EMBED_MODEL: &str = "embed-multilingual-v3.0";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Clone)]
pub struct CohereEmbedderConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub batch_size: usize,
    pub dimension: usize,
}

impl CohereEmbedderConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_COHERE_EMBED_MODEL.to_string(),
            base_url: DEFAULT_COHERE_BASE_URL.to_string(),
            batch_size: DEFAULT_EMBED_BATCH_SIZE,
            dimension: DEFAULT_EMBEDDING_DIM,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn validate(&self) -> Result<(), EmbeddingError> {
        if self.api_key.trim().is_empty() {
            return Err(EmbeddingError::InvalidConfig {
                reason: "Cohere API key is empty".to_string(),
            });
        }
        if self.batch_size == 0 {
            return Err(EmbeddingError::InvalidConfig {
                reason: "batch_size must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct EmbedRequest<'a> {
    texts: &'a [String],
    model: &'a str,
    input_type: &'static str,
    embedding_types: [&'static str; 1],
}

#[derive(Debug, Deserialize)]
struct EmbedResponse {
    embeddings: EmbeddingsField,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum EmbeddingsField {
    Typed { float: Vec<Vec<f32>> },
    Plain(Vec<Vec<f32>>),
}

impl EmbeddingsField {
    fn into_vectors(self) -> Vec<Vec<f32>> {
        match self {
            EmbeddingsField::Typed { float } => float,
            EmbeddingsField::Plain(vectors) => vectors,
        }
    }
}

pub struct CohereEmbedder {
    http: HttpClient,
    config: CohereEmbedderConfig,
}

impl std::fmt::Debug for CohereEmbedder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CohereEmbedder")
            .field("model", &self.config.model)
            .field("base_url", &self.config.base_url)
            .field("batch_size", &self.config.batch_size)
            .finish()
    }
}

impl CohereEmbedder {
    pub fn new(config: CohereEmbedderConfig) -> Result<Self, EmbeddingError> {
        config.validate()?;
        let http = HttpClient::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &CohereEmbedderConfig {
        &self.config
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/embed", self.config.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl EmbeddingProvider for CohereEmbedder {
    async fn embed(
        &self,
        texts: &[String],
        mode: EmbedMode,
    ) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let body = EmbedRequest {
            texts,
            model: &self.config.model,
            input_type: mode.input_type(),
            embedding_types: ["float"],
        };

        let resp = self
            .http
            .post(self.endpoint())
            .bearer_auth(&self.config.api_key)
            .json(&body)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(EmbeddingError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: EmbedResponse =
            resp.json()
                .await
                .map_err(|e| EmbeddingError::InvalidResponse {
                    reason: e.to_string(),
                })?;
        let vectors = parsed.embeddings.into_vectors();

        debug!(
            model = %self.config.model,
            input_type = mode.input_type(),
            count = vectors.len(),
            "Cohere embed call complete"
        );

        Ok(vectors)
    }

    fn max_batch_size(&self) -> usize {
        self.config.batch_size
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }
}
