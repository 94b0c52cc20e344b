#![allow(dead_code)]

use async_trait::async_trait;
use gitagent::api::AnalysisRunner;
use gitagent::config::Config;
use gitagent::error::{AnalysisError, Result};
use gitagent::github::{ContentItem, Fetched, FileContent, ItemKind, RepositoryHost, RepositoryRef};
use gitagent::{AnalysisOutcome, LanguageModel};
use indexmap::IndexMap;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub mod test_helpers {
    use super::*;

    pub fn setup_test_logger() {
        let _ = env_logger::builder()
            .filter_level(log::LevelFilter::Debug)
            .is_test(true)
            .try_init();
    }

    pub fn create_test_config() -> Config {
        Config::default()
    }

    /// Default configuration pointed at a mock API server
    pub fn mock_server_config(api_base: &str) -> Config {
        let mut config = Config::default();
        config.fetch.api_base = api_base.to_string();
        config
    }
}

/// In-memory repository built from file paths
///
/// Directories are derived from the paths. Listings and fetches are counted.
#[derive(Default)]
pub struct FakeHost {
    files: IndexMap<String, (u64, Option<FileContent>)>,
    denied_dirs: HashSet<String>,
    pub list_calls: AtomicUsize,
    pub fetch_calls: AtomicUsize,
}

impl FakeHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a text file whose listed size is its byte length
    pub fn text(mut self, path: &str, body: &str) -> Self {
        self.files.insert(path.to_string(), (body.len() as u64, Some(FileContent::Text(body.to_string()))));
        self
    }

    /// Adds a binary file (fetches return the placeholder)
    pub fn binary(mut self, path: &str, size: u64) -> Self {
        self.files.insert(path.to_string(), (size, Some(FileContent::binary(path))));
        self
    }

    /// Adds a file that is listed but cannot be fetched
    pub fn unreadable(mut self, path: &str, size: u64) -> Self {
        self.files.insert(path.to_string(), (size, None));
        self
    }

    /// Makes listings of `dir` fail with a permission error
    pub fn deny(mut self, dir: &str) -> Self {
        self.denied_dirs.insert(dir.to_string());
        self
    }

    pub fn total_calls(&self) -> usize {
        self.list_calls.load(Ordering::SeqCst) + self.fetch_calls.load(Ordering::SeqCst)
    }

    pub fn fetched(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RepositoryHost for FakeHost {
    async fn list_directory(&self, _repo: &RepositoryRef, path: &str) -> Fetched<Vec<ContentItem>> {
        self.list_calls.fetch_add(1, Ordering::SeqCst);
        if self.denied_dirs.contains(path) {
            return Fetched::Denied;
        }

        let prefix = if path.is_empty() { String::new() } else { format!("{}/", path) };
        let mut seen = HashSet::new();
        let mut items = Vec::new();
        for (file_path, (size, _)) in &self.files {
            let Some(rest) = file_path.strip_prefix(&prefix) else {
                continue;
            };
            let (name, kind, size) = match rest.split_once('/') {
                Some((dir, _)) => (dir, ItemKind::Dir, 0),
                None => (rest, ItemKind::File, *size),
            };
            if !seen.insert(name.to_string()) {
                continue;
            }
            items.push(ContentItem {
                kind,
                name: name.to_string(),
                path: format!("{}{}", prefix, name),
                size,
                content: None,
            });
        }

        if items.is_empty() && !path.is_empty() {
            Fetched::Absent
        } else {
            Fetched::Found(items)
        }
    }

    async fn fetch_file(&self, _repo: &RepositoryRef, path: &str) -> Fetched<FileContent> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        match self.files.get(path) {
            Some((_, Some(content))) => Fetched::Found(content.clone()),
            _ => Fetched::Absent,
        }
    }
}

/// Model that records prompts and answers from a script
///
/// Chunk prompts get `summary N`; the consolidation prompt gets a report
/// that embeds the number of prompts seen so far.
#[derive(Default)]
pub struct ScriptedModel {
    pub prompts: Mutex<Vec<String>>,
    pub fail_chunks: bool,
    pub fail_consolidation: bool,
}

impl ScriptedModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_chunks() -> Self {
        Self { fail_chunks: true, ..Self::default() }
    }

    pub fn failing_consolidation() -> Self {
        Self { fail_consolidation: true, ..Self::default() }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    fn name(&self) -> &str {
        "scripted"
    }

    async fn invoke(&self, prompt: &str) -> Result<String> {
        let count = {
            let mut prompts = self.prompts.lock().unwrap();
            prompts.push(prompt.to_string());
            prompts.len()
        };

        if prompt.starts_with("Combine and summarize") {
            if self.fail_consolidation {
                return Err(AnalysisError::ModelCall("rate limited".into()));
            }
            return Ok(format!("# Consolidated report\n\nBased on {} prompts.", count));
        }

        if self.fail_chunks {
            return Err(AnalysisError::ModelCall("model unavailable".into()));
        }
        Ok(format!("summary {}", count))
    }
}

/// Runner with a fixed answer that counts its invocations
pub struct CannedRunner {
    pub report: Option<String>,
    pub calls: AtomicUsize,
}

impl CannedRunner {
    pub fn reporting(report: &str) -> Self {
        Self { report: Some(report.to_string()), calls: AtomicUsize::new(0) }
    }

    pub fn failing() -> Self {
        Self { report: None, calls: AtomicUsize::new(0) }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AnalysisRunner for CannedRunner {
    async fn run(&self, _repo_url: &str) -> Result<AnalysisOutcome> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.report {
            Some(report) => Ok(AnalysisOutcome::Report(report.clone())),
            None => Err(AnalysisError::ModelCall("consolidation failed".into())),
        }
    }
}
