//! The ingestion and chunked-summarization pipeline.
//!
//! Locate → walk → fetch → partition → summarize each chunk → consolidate.

use crate::chunking::{partition, Chunk};
use crate::config::{ApiKeys, Config};
use crate::error::{AnalysisError, Result};
use crate::github::{GitHubClient, RepositoryHost, RepositoryRef};
use crate::llm::{self, LanguageModel};
use crate::parallel::retrieve_contents;
use crate::prompts;
use crate::walker::FileTreeWalker;
use log::{info, warn};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// How a run that did not fail ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AnalysisOutcome {
    /// Consolidated report text
    Report(String),
    /// Nothing eligible was visible in the repository
    NoFilesFound,
    /// Files were listed but none of their contents could be retrieved
    NoContentRetrieved,
}

impl AnalysisOutcome {
    /// Returns the report text, if the run produced one
    pub fn report(&self) -> Option<&str> {
        match self {
            Self::Report(text) => Some(text),
            Self::NoFilesFound | Self::NoContentRetrieved => None,
        }
    }
}

impl fmt::Display for AnalysisOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Report(text) => f.write_str(text),
            Self::NoFilesFound => f.write_str(
                "No files found or access denied. Please check your token and repository URL.",
            ),
            Self::NoContentRetrieved => {
                f.write_str("Could not retrieve any file contents. Please check permissions.")
            }
        }
    }
}

/// Runs the pipeline against an injected host and model
pub struct Analyzer {
    host: Arc<dyn RepositoryHost>,
    model: Arc<dyn LanguageModel>,
    config: Config,
}

impl Analyzer {
    /// Creates an analyzer; `config` supplies walk, fetch and chunk limits
    pub fn new(host: Arc<dyn RepositoryHost>, model: Arc<dyn LanguageModel>, config: Config) -> Self {
        Self { host, model, config }
    }

    /// Analyzes the repository at `repo_url`
    ///
    /// Malformed URLs fail before any request is made. An empty tree or an
    /// empty fetch result ends the run without calling the model.
    pub async fn analyze(&self, repo_url: &str) -> Result<AnalysisOutcome> {
        let repo = RepositoryRef::parse(repo_url)?;

        info!("Retrieving files from {}...", repo);
        let files = FileTreeWalker::new(self.host.as_ref(), &self.config.walker)
            .walk(&repo, "")
            .await;
        if files.is_empty() {
            return Ok(AnalysisOutcome::NoFilesFound);
        }

        info!("Found {} files. Fetching contents...", files.len());
        let paths: Vec<String> = files.into_iter().map(|entry| entry.path).collect();
        let contents = retrieve_contents(
            self.host.as_ref(),
            &repo,
            &paths,
            self.config.fetch.max_concurrent_fetches,
        )
        .await;
        if contents.is_empty() {
            return Ok(AnalysisOutcome::NoContentRetrieved);
        }

        let chunks = partition(contents, self.config.chunking.chunk_size);
        info!("Analyzing {} in {} chunks...", repo, chunks.len());

        let mut summaries = Vec::with_capacity(chunks.len());
        for (index, chunk) in chunks.iter().enumerate() {
            info!("Analyzing chunk {} of {}...", index + 1, chunks.len());
            summaries.push(self.summarize_chunk(repo_url, index, chunk).await);
        }

        let report = self.consolidate(repo_url, &summaries).await?;
        info!("Analysis of {} complete", repo);
        Ok(AnalysisOutcome::Report(report))
    }

    /// Reviews one chunk; model failures become an inline placeholder
    pub async fn summarize_chunk(&self, repo_url: &str, index: usize, chunk: &Chunk) -> String {
        let prompt = prompts::chunk_analysis_prompt(
            repo_url,
            chunk,
            self.config.chunking.content_preview_chars,
        );

        match self.model.invoke(&prompt).await {
            Ok(summary) => summary,
            Err(e) => {
                warn!("Chunk {} of {} failed: {}", index + 1, repo_url, e);
                format!("Error analyzing chunk {}: {}", index + 1, e)
            }
        }
    }

    /// Merges chunk summaries into the final report
    ///
    /// This is the one model call whose failure ends the run.
    pub async fn consolidate(&self, repo_url: &str, summaries: &[String]) -> Result<String> {
        let prompt = prompts::consolidation_prompt(repo_url, summaries);
        let report = self.model.invoke(&prompt).await.map_err(|e| match e {
            AnalysisError::ModelCall(_) => e,
            other => AnalysisError::ModelCall(other.to_string()),
        })?;

        if report.trim().is_empty() {
            return Err(AnalysisError::ModelCall("consolidation returned an empty report".into()));
        }
        Ok(report)
    }
}

/// Analyzes `repo_url` using configuration and secrets from the environment
///
/// `token` overrides `GITHUB_TOKEN`. The model API key is read at call time
/// and its absence is reported before any network request.
pub async fn analyze_repository(repo_url: &str, token: Option<String>) -> Result<AnalysisOutcome> {
    let config = Config::load()?.with_env_overrides();
    analyze_repository_with_config(repo_url, token, &config).await
}

/// Same as [`analyze_repository`] with an explicit configuration
pub async fn analyze_repository_with_config(
    repo_url: &str,
    token: Option<String>,
    config: &Config,
) -> Result<AnalysisOutcome> {
    config.validate()?;
    let keys = ApiKeys::from_env();
    let model = llm::from_config(&config.model, &keys, config.fetch.request_timeout)?;
    let host = GitHubClient::new(&config.fetch, token.or(keys.github_token))?;

    Analyzer::new(Arc::new(host), model, config.clone())
        .analyze(repo_url)
        .await
}
