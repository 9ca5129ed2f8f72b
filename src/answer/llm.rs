use async_trait::async_trait;
use genai::Client;
use genai::chat::{ChatMessage, ChatOptions, ChatRequest};
use tracing::{debug, error};

use super::{AnswerError, AnswerGenerator};

pub const DEFAULT_ANSWER_MODEL: &str = "claude-3-5-haiku-latest";
pub const DEFAULT_TEMPERATURE: f64 = 0.2;
pub const DEFAULT_MAX_TOKENS: u32 = 800;

/// Chat completion through `genai`; the provider is resolved from the model name.
#[derive(Clone)]
pub struct GenaiAnswerGenerator {
    client: Client,
    model: String,
    options: ChatOptions,
}

impl std::fmt::Debug for GenaiAnswerGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenaiAnswerGenerator")
            .field("model", &self.model)
            .finish_non_exhaustive()
    }
}

impl GenaiAnswerGenerator {
    pub fn new(model: impl Into<String>) -> Self {
        Self::with_client(Client::default(), model)
    }

    pub fn with_client(client: Client, model: impl Into<String>) -> Self {
        Self {
            client,
            model: model.into(),
            options: ChatOptions::default()
                .with_temperature(DEFAULT_TEMPERATURE)
                .with_max_tokens(DEFAULT_MAX_TOKENS),
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl AnswerGenerator for GenaiAnswerGenerator {
    async fn complete(&self, system: &str, user: &str) -> Result<String, AnswerError> {
        let request = ChatRequest::new(vec![ChatMessage::user(user)]).with_system(system);

        let response = self
            .client
            .exec_chat(&self.model, request, Some(&self.options))
            .await
            .map_err(|e| {
                error!(model = %self.model, error = %e, "Provider error");
                AnswerError::Generation {
                    reason: e.to_string(),
                }
            })?;

        let text = response.first_text().unwrap_or_default().to_string();
        debug!(model = %self.model, answer_len = text.len(), "Answer generated");
        Ok(text)
    }
}
