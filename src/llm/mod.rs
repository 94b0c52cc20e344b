//! Text-generation backends.
//!
//! The pipeline only needs `invoke(prompt) -> text`; everything
//! provider-specific stays behind [`LanguageModel`].

use crate::config::{ApiKeys, ModelConfig, ModelProvider};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

pub mod gemini;
pub mod openai;

pub use gemini::GeminiModel;
pub use openai::OpenAiModel;

/// An opaque text-transformation service
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Human-readable identifier used in logs
    fn name(&self) -> &str;

    /// Sends `prompt` and returns the generated text
    ///
    /// Implementations return [`crate::AnalysisError::ModelCall`] for empty
    /// responses so callers never see a blank report.
    async fn invoke(&self, prompt: &str) -> Result<String>;
}

/// Builds the configured model, failing fast when its API key is missing
pub fn from_config(config: &ModelConfig, keys: &ApiKeys, timeout: Duration) -> Result<Arc<dyn LanguageModel>> {
    let api_key = keys.model_key(config.provider)?;
    let model: Arc<dyn LanguageModel> = match config.provider {
        ModelProvider::OpenAi => Arc::new(OpenAiModel::new(
            api_key,
            config.model.clone(),
            config.api_base.as_deref(),
            timeout,
        )),
        ModelProvider::Gemini => Arc::new(GeminiModel::new(
            api_key,
            config.model.clone(),
            config.api_base.as_deref(),
            timeout,
        )?),
    };
    log::debug!("Using language model {}", model.name());
    Ok(model)
}
