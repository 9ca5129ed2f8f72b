use async_trait::async_trait;
use parking_lot::Mutex;

use super::{AnswerError, AnswerGenerator};

/// Returns a fixed answer and records every user prompt it receives.
#[derive(Debug, Default)]
pub struct StaticAnswerGenerator {
    answer: String,
    prompts: Mutex<Vec<String>>,
}

impl StaticAnswerGenerator {
    pub fn new(answer: impl Into<String>) -> Self {
        Self {
            answer: answer.into(),
            prompts: Mutex::new(Vec::new()),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl AnswerGenerator for StaticAnswerGenerator {
    async fn complete(&self, _system: &str, user: &str) -> Result<String, AnswerError> {
        self.prompts.lock().push(user.to_string());
        Ok(self.answer.clone())
    }
}

#[derive(Debug, Default)]
pub struct FailingAnswerGenerator;

#[async_trait]
impl AnswerGenerator for FailingAnswerGenerator {
    async fn complete(&self, _system: &str, _user: &str) -> Result<String, AnswerError> {
        Err(AnswerError::Generation {
            reason: "mock generator failure".to_string(),
        })
    }
}
