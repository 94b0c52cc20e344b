//! GitHub webhook handling: signature checks and push-event triage.

use crate::cache::CommitInfo;
use crate::error::{AnalysisError, Result};
use hmac::{Hmac, Mac};
use log::warn;
use serde::Deserialize;
use sha2::Sha256;

/// Header carrying the HMAC-SHA256 of the request body
pub const SIGNATURE_HEADER: &str = "X-Hub-Signature-256";

const SIGNATURE_PREFIX: &str = "sha256=";

type HmacSha256 = Hmac<Sha256>;

/// Computes the `sha256=<hex>` signature GitHub sends for `payload`
pub fn sign(secret: &str, payload: &[u8]) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| AnalysisError::Webhook(format!("invalid signing key: {}", e)))?;
    mac.update(payload);
    Ok(format!("{}{}", SIGNATURE_PREFIX, hex::encode(mac.finalize().into_bytes())))
}

/// Checks `signature` against the HMAC of `payload`
///
/// Without a configured secret every payload is accepted and a warning is
/// logged. Comparison is constant-time.
pub fn verify_signature(secret: Option<&str>, payload: &[u8], signature: &str) -> bool {
    let Some(secret) = secret.filter(|s| !s.is_empty()) else {
        warn!("No webhook secret configured; skipping signature verification");
        return true;
    };

    let Some(expected) = signature
        .strip_prefix(SIGNATURE_PREFIX)
        .and_then(|hex_digest| hex::decode(hex_digest).ok())
    else {
        return false;
    };

    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(payload);
    mac.verify_slice(&expected).is_ok()
}

/// The parts of a GitHub event payload the receiver cares about
#[derive(Debug, Clone, Deserialize)]
pub struct PushEvent {
    /// Pushed ref, e.g. `refs/heads/main`; absent for non-push events
    #[serde(rename = "ref")]
    pub git_ref: Option<String>,
    /// Repository the event belongs to
    pub repository: Option<RepositoryPayload>,
    /// Most recent commit of the push
    pub head_commit: Option<HeadCommit>,
}

/// Repository section of an event payload
#[derive(Debug, Clone, Deserialize)]
pub struct RepositoryPayload {
    /// Browser URL of the repository
    pub html_url: String,
}

/// Head commit section of a push payload
#[derive(Debug, Clone, Deserialize)]
pub struct HeadCommit {
    /// Commit message
    pub message: Option<String>,
    /// Commit author
    pub author: Option<CommitAuthor>,
}

/// Author section of a commit
#[derive(Debug, Clone, Deserialize)]
pub struct CommitAuthor {
    /// Display name
    pub name: Option<String>,
}

/// What the receiver should do with an event
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookAction {
    /// Analyze the repository
    Analyze {
        /// Repository URL
        repo_url: String,
        /// Commit details when the event was a push
        commit: Option<CommitInfo>,
    },
    /// A push to a branch that is not tracked
    IgnoreBranch(String),
    /// No repository in the payload
    Invalid,
}

/// Branch name of a ref such as `refs/heads/release/1.0`
pub fn branch_name(git_ref: &str) -> &str {
    git_ref
        .strip_prefix("refs/heads/")
        .unwrap_or_else(|| git_ref.rsplit('/').next().unwrap_or(git_ref))
}

impl PushEvent {
    /// Parses a raw event body
    pub fn from_payload(payload: &[u8]) -> Result<Self> {
        serde_json::from_slice(payload)
            .map_err(|e| AnalysisError::Webhook(format!("unreadable event payload: {}", e)))
    }

    /// Decides how to handle this event given the tracked `branches`
    pub fn action(&self, branches: &[String]) -> WebhookAction {
        let Some(repository) = &self.repository else {
            return WebhookAction::Invalid;
        };

        let Some(git_ref) = &self.git_ref else {
            return WebhookAction::Analyze {
                repo_url: repository.html_url.clone(),
                commit: None,
            };
        };

        let branch = branch_name(git_ref);
        if !branches.iter().any(|b| b == branch) {
            return WebhookAction::IgnoreBranch(branch.to_string());
        }

        let head = self.head_commit.as_ref();
        let commit = CommitInfo {
            author: head
                .and_then(|c| c.author.as_ref())
                .and_then(|a| a.name.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
            message: head
                .and_then(|c| c.message.clone())
                .unwrap_or_else(|| "No commit message".to_string()),
        };

        WebhookAction::Analyze {
            repo_url: repository.html_url.clone(),
            commit: Some(commit),
        }
    }
}
