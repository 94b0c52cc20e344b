//! Google Gemini backend.

use crate::error::{AnalysisError, Result};
use crate::llm::LanguageModel;
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Model used when none is configured
pub const DEFAULT_GEMINI_MODEL: &str = "gemini-1.5-pro";
const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com";

#[derive(Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: Option<String>,
}

/// Google Gemini `generateContent` backend
pub struct GeminiModel {
    client: Client,
    api_key: String,
    api_base: String,
    model: String,
    label: String,
}

impl GeminiModel {
    /// Creates a client for `model` (or [`DEFAULT_GEMINI_MODEL`])
    pub fn new(api_key: &str, model: Option<String>, api_base: Option<&str>, timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        let model = model.unwrap_or_else(|| DEFAULT_GEMINI_MODEL.to_string());

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            api_base: api_base.unwrap_or(GEMINI_API_BASE).trim_end_matches('/').to_string(),
            label: format!("gemini:{}", model),
            model,
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/v1beta/models/{}:generateContent", self.api_base, self.model)
    }
}

#[async_trait]
impl LanguageModel for GeminiModel {
    fn name(&self) -> &str {
        &self.label
    }

    async fn invoke(&self, prompt: &str) -> Result<String> {
        let body = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let response = self
            .client
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            return Err(AnalysisError::ModelCall(format!(
                "{} request failed: HTTP {} - {}",
                self.label,
                status,
                detail.trim()
            )));
        }

        let parsed: GenerateResponse = response.json().await?;
        let text = parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|candidate| candidate.content)
            .map(|content| {
                content
                    .parts
                    .into_iter()
                    .filter_map(|part| part.text)
                    .collect::<Vec<_>>()
                    .join("")
            })
            .unwrap_or_default();

        if text.trim().is_empty() {
            return Err(AnalysisError::ModelCall(format!("{} returned an empty response", self.label)));
        }
        Ok(text)
    }
}
