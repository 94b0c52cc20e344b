//! OpenAI chat-completions backend.

use crate::error::{AnalysisError, Result};
use crate::llm::LanguageModel;
use async_openai::config::OpenAIConfig;
use async_openai::types::{ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequestArgs};
use async_openai::Client;
use async_trait::async_trait;
use std::time::Duration;

/// Model used when none is configured
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-3.5-turbo-16k";

/// OpenAI chat-completions backend
pub struct OpenAiModel {
    client: Client<OpenAIConfig>,
    model: String,
    label: String,
    timeout: Duration,
}

impl OpenAiModel {
    /// Creates a client for `model` (or [`DEFAULT_OPENAI_MODEL`])
    pub fn new(api_key: &str, model: Option<String>, api_base: Option<&str>, timeout: Duration) -> Self {
        let mut config = OpenAIConfig::new().with_api_key(api_key);
        if let Some(base) = api_base {
            config = config.with_api_base(base);
        }
        let model = model.unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string());

        Self {
            client: Client::with_config(config),
            label: format!("openai:{}", model),
            model,
            timeout,
        }
    }
}

#[async_trait]
impl LanguageModel for OpenAiModel {
    fn name(&self) -> &str {
        &self.label
    }

    async fn invoke(&self, prompt: &str) -> Result<String> {
        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(vec![ChatCompletionRequestUserMessageArgs::default()
                .content(prompt)
                .build()?
                .into()])
            .build()?;

        let response = tokio::time::timeout(self.timeout, self.client.chat().create(request))
            .await
            .map_err(|_| AnalysisError::ModelCall(format!("{} timed out after {:?}", self.label, self.timeout)))??;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| AnalysisError::ModelCall(format!("{} returned an empty response", self.label)))
    }
}
