//! Asynchronous OCR job collection.
//!
//! OCR engines run document analysis as a job: submit, then poll until a
//! terminal status. Results arrive paginated; continuation pages are drained
//! back to back, and only a non-terminal status without a continuation token
//! waits for the next poll interval.
//!
//! [`HttpOcrEngine`] is the network client; `ScriptedOcrEngine` replays
//! canned pages in tests.

pub mod error;
mod http;
#[cfg(any(test, feature = "mock"))]
mod mock;

#[cfg(test)]
mod tests;

pub use error::OcrError;
pub use http::{DEFAULT_OCR_CONTENT_TYPE, DEFAULT_OCR_TIMEOUT, HttpOcrConfig, HttpOcrEngine};
#[cfg(any(test, feature = "mock"))]
pub use mock::ScriptedOcrEngine;

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::constants::{DEFAULT_OCR_MAX_WAIT_SECS, DEFAULT_OCR_POLL_SECS};
use crate::document::RawElement;
use crate::retry::{RetryPolicy, with_retry};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OcrFeature {
    Tables,
    Forms,
}

/// Features requested by default: table and form analysis.
pub const DEFAULT_FEATURES: &[OcrFeature] = &[OcrFeature::Tables, OcrFeature::Forms];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OcrJobStatus {
    InProgress,
    Succeeded,
    /// Treated as a failure: a partial block graph would silently drop pages.
    PartialSuccess,
    Failed,
}

/// One page of a poll response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OcrPoll {
    pub status: OcrJobStatus,
    #[serde(default)]
    pub elements: Vec<RawElement>,
    #[serde(default)]
    pub next_page: Option<String>,
}

impl OcrPoll {
    pub fn in_progress() -> Self {
        Self {
            status: OcrJobStatus::InProgress,
            elements: Vec::new(),
            next_page: None,
        }
    }

    pub fn succeeded(elements: Vec<RawElement>) -> Self {
        Self {
            status: OcrJobStatus::Succeeded,
            elements,
            next_page: None,
        }
    }

    pub fn with_next_page(mut self, token: impl Into<String>) -> Self {
        self.next_page = Some(token.into());
        self
    }
}

#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Starts analysis of the object at `locator`, returning the job id.
    async fn submit(&self, locator: &str, features: &[OcrFeature]) -> Result<String, OcrError>;

    /// Fetches one result page. `next_page` continues a paginated response.
    async fn poll(&self, job_id: &str, next_page: Option<&str>) -> Result<OcrPoll, OcrError>;
}

#[derive(Debug, Clone)]
pub struct PollConfig {
    pub interval: Duration,
    pub max_wait: Duration,
    /// Applied to each individual poll request.
    pub retry: RetryPolicy,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(DEFAULT_OCR_POLL_SECS),
            max_wait: Duration::from_secs(DEFAULT_OCR_MAX_WAIT_SECS),
            retry: RetryPolicy::default(),
        }
    }
}

/// Polls `job_id` to completion and returns every element across all pages.
///
/// Waiting is accounted in whole poll intervals; the job times out once the
/// accumulated wait exceeds `max_wait`.
#[instrument(skip(engine, config), fields(interval_ms = config.interval.as_millis() as u64))]
pub async fn collect_job(
    engine: &dyn OcrEngine,
    job_id: &str,
    config: &PollConfig,
) -> Result<Vec<RawElement>, OcrError> {
    let mut elements = Vec::new();
    let mut next_page: Option<String> = None;
    let mut waited = Duration::ZERO;
    let mut responses = 0usize;

    loop {
        let token = next_page.as_deref();
        let poll = with_retry(&config.retry, "ocr_poll", || engine.poll(job_id, token)).await?;
        responses += 1;

        let status = poll.status;
        elements.extend(poll.elements);
        next_page = poll.next_page;

        if next_page.is_some() {
            continue;
        }

        match status {
            OcrJobStatus::Succeeded => {
                info!(
                    job_id = job_id,
                    responses = responses,
                    elements = elements.len(),
                    "OCR job completed"
                );
                return Ok(elements);
            }
            OcrJobStatus::Failed | OcrJobStatus::PartialSuccess => {
                return Err(OcrError::JobFailed {
                    job_id: job_id.to_string(),
                    status,
                });
            }
            OcrJobStatus::InProgress => {
                tokio::time::sleep(config.interval).await;
                waited += config.interval;
                debug!(job_id = job_id, waited_ms = waited.as_millis() as u64, "OCR job pending");
                if waited > config.max_wait {
                    return Err(OcrError::Timeout {
                        job_id: job_id.to_string(),
                        waited,
                    });
                }
            }
        }
    }
}

/// Submits `locator` and collects the finished job.
pub async fn run_job(
    engine: &dyn OcrEngine,
    locator: &str,
    features: &[OcrFeature],
    config: &PollConfig,
) -> Result<(String, Vec<RawElement>), OcrError> {
    let job_id = engine.submit(locator, features).await?;
    info!(job_id = %job_id, locator = locator, "OCR job started");
    let elements = collect_job(engine, &job_id, config).await?;
    Ok((job_id, elements))
}
