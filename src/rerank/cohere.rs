//! Cohere `/v1/rerank` client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{RerankHit, RerankProvider, RerankerError};
use crate::constants::DEFAULT_COHERE_BASE_URL;
use crate::retry::{RetryPolicy, with_retry};

pub const DEFAULT_COHERE_RERANK_MODEL: &str = "rerank-multilingual-v3.0";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct CohereRerankerConfig {
    pub api_key: String,
    pub model: String,
    pub base_url: String,
    pub retry: RetryPolicy,
}

impl CohereRerankerConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            model: DEFAULT_COHERE_RERANK_MODEL.to_string(),
            base_url: DEFAULT_COHERE_BASE_URL.to_string(),
            retry: RetryPolicy::default(),
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
}

#[derive(Debug, Serialize)]
struct RerankRequest<'a> {
    model: &'a str,
    query: &'a str,
    documents: &'a [String],
    top_n: usize,
}

#[derive(Debug, Deserialize)]
struct RerankResponse {
    results: Vec<RerankHit>,
}

pub struct CohereReranker {
    http: HttpClient,
    config: CohereRerankerConfig,
}

impl std::fmt::Debug for CohereReranker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CohereReranker")
            .field("model", &self.config.model)
            .field("base_url", &self.config.base_url)
            .finish()
    }
}

impl CohereReranker {
    pub fn new(config: CohereRerankerConfig) -> Result<Self, RerankerError> {
        if config.api_key.trim().is_empty() {
            return Err(RerankerError::InvalidConfig {
                reason: "Cohere API key is empty".to_string(),
            });
        }
        let http = HttpClient::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { http, config })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/rerank", self.config.base_url.trim_end_matches('/'))
    }

    async fn rerank_once(
        &self,
        query: &str,
        documents: &[String],
        top_n: usize,
    ) -> Result<Vec<RerankHit>, RerankerError> {
        let body = RerankRequest {
            model: &self.config.model,
            query,
            documents,
            top_n,
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
            return Err(RerankerError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: RerankResponse =
            resp.json()
                .await
                .map_err(|e| RerankerError::InvalidResponse {
                    reason: e.to_string(),
                })?;

        Ok(parsed.results)
    }
}

#[async_trait]
impl RerankProvider for CohereReranker {
    async fn rerank(
        &self,
        query: &str,
        documents: &[String],
        top_n: usize,
    ) -> Result<Vec<RerankHit>, RerankerError> {
        if documents.is_empty() || top_n == 0 {
            return Ok(Vec::new());
        }

        let top_n = top_n.min(documents.len());
        let hits = with_retry(&self.config.retry, "rerank", || {
            self.rerank_once(query, documents, top_n)
        })
        .await?;

        debug!(
            model = %self.config.model,
            documents = documents.len(),
            hits = hits.len(),
            top_score = hits.first().map(|h| h.relevance_score),
            "Cohere rerank complete"
        );

        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_empty_api_key() {
        let err = CohereReranker::new(CohereRerankerConfig::new("")).unwrap_err();
        assert!(matches!(err, RerankerError::InvalidConfig { .. }));
    }

    #[test]
    fn test_parses_response() {
        let parsed: RerankResponse = serde_json::from_str(
            r#"{"id":"abc","results":[{"index":2,"relevance_score":0.91},{"index":0,"relevance_score":0.12}],"meta":{}}"#,
        )
        .unwrap();
        assert_eq!(parsed.results.len(), 2);
        assert_eq!(parsed.results[0].index, 2);
        assert!((parsed.results[0].relevance_score - 0.91).abs() < 1e-6);
    }

    #[tokio::test]
    async fn test_empty_documents_short_circuit() {
        let reranker = CohereReranker::new(
            CohereRerankerConfig::new("key").with_base_url("http://127.0.0.1:9"),
        )
        .unwrap();
        let hits = reranker.rerank("query", &[], 5).await.unwrap();
        assert!(hits.is_empty());
    }
}
