//! HTTP client for a job-based OCR service.
//!
//! The service accepts the raw document body at `POST {base}/jobs` and
//! answers `{"job_id": ...}`. `GET {base}/jobs/{job_id}` returns one result
//! page shaped like [`OcrPoll`], with `next_page` passed back as a query
//! parameter to continue.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client as HttpClient;
use serde::Deserialize;
use tracing::{debug, instrument};

use super::{OcrEngine, OcrError, OcrFeature, OcrPoll};
use crate::storage::ObjectStore;

pub const DEFAULT_OCR_TIMEOUT: Duration = Duration::from_secs(60);
pub const DEFAULT_OCR_CONTENT_TYPE: &str = "application/pdf";

#[derive(Debug, Clone)]
pub struct HttpOcrConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
}

impl HttpOcrConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: None,
            timeout: DEFAULT_OCR_TIMEOUT,
        }
    }

    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }
}

#[derive(Debug, Deserialize)]
struct SubmitResponse {
    job_id: String,
}

/// Reads the document from the object store and uploads it for analysis.
pub struct HttpOcrEngine {
    http: HttpClient,
    config: HttpOcrConfig,
    store: Arc<dyn ObjectStore>,
}

impl std::fmt::Debug for HttpOcrEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpOcrEngine")
            .field("base_url", &self.config.base_url)
            .field("has_api_key", &self.config.api_key.is_some())
            .finish_non_exhaustive()
    }
}

impl HttpOcrEngine {
    pub fn new(config: HttpOcrConfig, store: Arc<dyn ObjectStore>) -> Result<Self, OcrError> {
        let http = HttpClient::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| OcrError::ClientSetup {
                reason: e.to_string(),
            })?;
        Ok(Self {
            http,
            config,
            store,
        })
    }

    pub(crate) fn jobs_endpoint(&self) -> String {
        format!("{}/jobs", self.config.base_url.trim_end_matches('/'))
    }

    pub(crate) fn job_endpoint(&self, job_id: &str) -> String {
        format!("{}/{}", self.jobs_endpoint(), job_id)
    }

    fn authorize(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.config.api_key {
            Some(key) => request.bearer_auth(key),
            None => request,
        }
    }
}

/// `tables,forms` for the `features` query parameter.
pub(crate) fn features_param(features: &[OcrFeature]) -> String {
    features
        .iter()
        .map(|feature| match feature {
            OcrFeature::Tables => "tables",
            OcrFeature::Forms => "forms",
        })
        .collect::<Vec<_>>()
        .join(",")
}

#[async_trait]
impl OcrEngine for HttpOcrEngine {
    #[instrument(skip(self, features))]
    async fn submit(&self, locator: &str, features: &[OcrFeature]) -> Result<String, OcrError> {
        let submit_failed = |reason: String| OcrError::SubmitFailed {
            locator: locator.to_string(),
            reason,
        };

        let bytes = self
            .store
            .get(locator)
            .await
            .map_err(|e| submit_failed(e.to_string()))?;
        debug!(bytes = bytes.len(), "Submitting document for OCR");

        let request = self
            .http
            .post(self.jobs_endpoint())
            .query(&[("features", features_param(features))])
            .header(reqwest::header::CONTENT_TYPE, DEFAULT_OCR_CONTENT_TYPE)
            .body(bytes);

        let resp = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| submit_failed(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(submit_failed(format!("status {}: {}", status.as_u16(), body)));
        }

        let parsed: SubmitResponse = resp
            .json()
            .await
            .map_err(|e| submit_failed(format!("invalid response: {e}")))?;
        Ok(parsed.job_id)
    }

    async fn poll(&self, job_id: &str, next_page: Option<&str>) -> Result<OcrPoll, OcrError> {
        let poll_failed = |reason: String| OcrError::PollFailed {
            job_id: job_id.to_string(),
            reason,
        };

        let mut request = self.http.get(self.job_endpoint(job_id));
        if let Some(token) = next_page {
            request = request.query(&[("next_page", token)]);
        }

        let resp = self
            .authorize(request)
            .send()
            .await
            .map_err(|e| poll_failed(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(poll_failed(format!("status {}: {}", status.as_u16(), body)));
        }

        resp.json()
            .await
            .map_err(|e| poll_failed(format!("invalid response: {e}")))
    }
}
