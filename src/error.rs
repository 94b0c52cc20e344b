use thiserror::Error;
use std::io;
use async_openai::error::OpenAIError;

/// Custom result type alias for the crate
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Errors that can terminate or degrade a repository analysis
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The repository URL could not be parsed into an owner/name pair
    #[error("Invalid GitHub URL: {0}")]
    InvalidUrl(String),

    /// The language model call failed or returned nothing usable
    #[error("Model call failed: {0}")]
    ModelCall(String),

    /// Missing API key or invalid configuration value
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Webhook payload or signature problems
    #[error("Webhook error: {0}")]
    Webhook(String),

    /// I/O errors
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// HTTP request/response errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing/serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// OpenAI API errors
    #[error("OpenAI error: {0}")]
    OpenAI(#[from] OpenAIError),
}
