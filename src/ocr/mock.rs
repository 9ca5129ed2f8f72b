use std::collections::VecDeque;

use async_trait::async_trait;
use parking_lot::Mutex;

use super::{OcrEngine, OcrError, OcrFeature, OcrPoll};

/// Replays scripted poll responses, then reports `InProgress` forever.
#[derive(Debug, Default)]
pub struct ScriptedOcrEngine {
    job_id: String,
    responses: Mutex<VecDeque<Result<OcrPoll, OcrError>>>,
    tokens: Mutex<Vec<Option<String>>>,
    submitted: Mutex<Vec<String>>,
}

impl ScriptedOcrEngine {
    pub fn new(job_id: impl Into<String>) -> Self {
        Self {
            job_id: job_id.into(),
            ..Self::default()
        }
    }

    pub fn then(self, poll: OcrPoll) -> Self {
        self.responses.lock().push_back(Ok(poll));
        self
    }

    pub fn then_error(self, err: OcrError) -> Self {
        self.responses.lock().push_back(Err(err));
        self
    }

    /// Continuation tokens received by each poll, in call order.
    pub fn poll_tokens(&self) -> Vec<Option<String>> {
        self.tokens.lock().clone()
    }

    pub fn submitted(&self) -> Vec<String> {
        self.submitted.lock().clone()
    }
}

#[async_trait]
impl OcrEngine for ScriptedOcrEngine {
    async fn submit(&self, locator: &str, _features: &[OcrFeature]) -> Result<String, OcrError> {
        self.submitted.lock().push(locator.to_string());
        Ok(self.job_id.clone())
    }

    async fn poll(&self, _job_id: &str, next_page: Option<&str>) -> Result<OcrPoll, OcrError> {
        self.tokens.lock().push(next_page.map(str::to_string));
        self.responses
            .lock()
            .pop_front()
            .unwrap_or_else(|| Ok(OcrPoll::in_progress()))
    }
}
