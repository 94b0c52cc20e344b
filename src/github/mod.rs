//! GitHub access: URL parsing, the contents API client and the types shared
//! by the rest of the pipeline.

use async_trait::async_trait;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

pub mod client;
pub mod locator;

pub use client::GitHubClient;
pub use locator::RepositoryRef;

/// Outcome of a single request against the hosting API
///
/// Retrieval is fail-open: callers treat `Absent` and `Denied` as "no data"
/// for that path, but the two are kept apart so they can be logged
/// differently.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Fetched<T> {
    /// The resource exists and was decoded
    Found(T),
    /// Missing, failed, timed out, or not decodable
    Absent,
    /// The API refused access (401/403)
    Denied,
}

impl<T> Fetched<T> {
    /// Converts into an `Option`, dropping the reason for absence
    pub fn found(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::Absent | Self::Denied => None,
        }
    }
}

/// Kind of an entry in a contents listing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    /// Regular file
    File,
    /// Directory
    Dir,
    /// Symbolic link
    Symlink,
    /// Git submodule
    Submodule,
    /// Anything the API may add later
    #[serde(other)]
    Other,
}

/// One descriptor returned by `GET /repos/{owner}/{repo}/contents/{path}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentItem {
    /// Entry kind
    #[serde(rename = "type")]
    pub kind: ItemKind,
    /// File or directory name
    pub name: String,
    /// Path from the repository root
    pub path: String,
    /// Size in bytes; zero for directories
    #[serde(default)]
    pub size: u64,
    /// Base64 body, only present when a single file is requested
    #[serde(default)]
    pub content: Option<String>,
}

/// An eligible file discovered by the tree walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileEntry {
    /// Path from the repository root
    pub path: String,
    /// Size reported by the listing
    pub size_bytes: u64,
}

/// Decoded body of a file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum FileContent {
    /// UTF-8 text
    Text(String),
    /// Binary body, represented by its placeholder marker
    Binary(String),
}

impl FileContent {
    /// Builds the placeholder used in prompts for binary files
    pub fn binary(path: &str) -> Self {
        Self::Binary(format!("[Binary file: {}]", path))
    }

    /// Text that goes into a prompt
    pub fn as_str(&self) -> &str {
        match self {
            Self::Text(text) | Self::Binary(text) => text,
        }
    }

    /// Returns true for binary placeholders
    pub fn is_binary(&self) -> bool {
        matches!(self, Self::Binary(_))
    }
}

impl fmt::Display for FileContent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ordered mapping of path to decoded content; insertion order is discovery order
pub type FileContentMap = IndexMap<String, FileContent>;

/// Read access to a hosted repository
///
/// The production implementation is [`GitHubClient`]; tests substitute
/// in-memory hosts. Implementations never return errors: every failure is
/// folded into [`Fetched::Absent`] or [`Fetched::Denied`].
#[async_trait]
pub trait RepositoryHost: Send + Sync {
    /// Lists one directory level; `path` is empty for the root
    async fn list_directory(&self, repo: &RepositoryRef, path: &str) -> Fetched<Vec<ContentItem>>;

    /// Retrieves and decodes the body of one file
    async fn fetch_file(&self, repo: &RepositoryRef, path: &str) -> Fetched<FileContent>;
}
