use serde::{Serialize, Deserialize};
use crate::config::ModelProvider;
use crate::error::{AnalysisError, Result};

/// Secrets read from the process environment
///
/// Built fresh for every analysis so that rotated keys take effect without
/// a restart. Values are only checked for presence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ApiKeys {
    /// OpenAI API key (`OPENAI_API_KEY`)
    pub openai_api_key: Option<String>,
    /// Gemini API key (`GENAI_API_KEY`, falling back to `GEMINI_API`)
    pub gemini_api_key: Option<String>,
    /// GitHub token for authenticated requests (`GITHUB_TOKEN`)
    pub github_token: Option<String>,
    /// Shared secret for webhook signatures (`GITHUB_WEBHOOK_SECRET`)
    pub webhook_secret: Option<String>,
}

impl ApiKeys {
    /// Reads all known keys from the environment
    pub fn from_env() -> Self {
        Self {
            openai_api_key: get_env_value("OPENAI_API_KEY"),
            gemini_api_key: get_env_value("GENAI_API_KEY").or_else(|| get_env_value("GEMINI_API")),
            github_token: get_env_value("GITHUB_TOKEN"),
            webhook_secret: get_env_value("GITHUB_WEBHOOK_SECRET"),
        }
    }

    /// Returns the API key for `provider` or a configuration error
    pub fn model_key(&self, provider: ModelProvider) -> Result<&str> {
        let (key, name) = match provider {
            ModelProvider::OpenAi => (&self.openai_api_key, "OPENAI_API_KEY"),
            ModelProvider::Gemini => (&self.gemini_api_key, "GENAI_API_KEY"),
        };
        key.as_deref()
            .ok_or_else(|| AnalysisError::Configuration(format!("{} environment variable not set", name)))
    }
}

/// Reads an environment variable, treating empty values as unset
pub fn get_env_value(key: &str) -> Option<String> {
    let value = std::env::var(key).ok()?;
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}
