//! Parsing of GitHub repository URLs.

use crate::error::{AnalysisError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use url::Url;

const GITHUB_HOSTS: &[&str] = &["github.com", "www.github.com"];

/// Owner/name pair identifying a GitHub repository
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RepositoryRef {
    /// User or organization that owns the repository
    pub owner: String,
    /// Repository name
    pub name: String,
}

impl RepositoryRef {
    /// Parses `https://github.com/{owner}/{name}[/...]`
    ///
    /// Extra path segments (`/tree/main/src`) are ignored and a trailing
    /// `.git` is stripped. No network access is performed.
    pub fn parse(repo_url: &str) -> Result<Self> {
        let parsed = Url::parse(repo_url.trim())
            .map_err(|_| AnalysisError::InvalidUrl(repo_url.to_string()))?;

        match parsed.host_str() {
            Some(host) if GITHUB_HOSTS.contains(&host) => {}
            _ => return Err(AnalysisError::InvalidUrl(repo_url.to_string())),
        }

        let segments: Vec<&str> = parsed
            .path_segments()
            .map(|segments| segments.filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();

        if segments.len() < 2 {
            return Err(AnalysisError::InvalidUrl(repo_url.to_string()));
        }

        let name = segments[1].strip_suffix(".git").unwrap_or(segments[1]);
        if name.is_empty() {
            return Err(AnalysisError::InvalidUrl(repo_url.to_string()));
        }

        Ok(Self {
            owner: segments[0].to_string(),
            name: name.to_string(),
        })
    }

    /// `owner/name`
    pub fn full_name(&self) -> String {
        format!("{}/{}", self.owner, self.name)
    }

    /// Canonical browser URL of the repository
    pub fn html_url(&self) -> String {
        format!("https://github.com/{}/{}", self.owner, self.name)
    }
}

impl FromStr for RepositoryRef {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for RepositoryRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}
