//! Recursive file discovery over the contents API.

use crate::config::WalkerConfig;
use crate::github::{Fetched, FileEntry, ItemKind, RepositoryHost, RepositoryRef};
use async_recursion::async_recursion;
use log::{debug, info, warn};
use std::collections::HashSet;

/// Lists eligible files of a repository, depth-first in listing order
///
/// Each directory costs one listing request. Failures at any level are
/// logged and contribute zero files; they never abort sibling subtrees.
pub struct FileTreeWalker<'a> {
    host: &'a dyn RepositoryHost,
    config: &'a WalkerConfig,
}

#[derive(Default)]
struct WalkState {
    visited: HashSet<String>,
    files: Vec<FileEntry>,
    limit_reached: bool,
}

impl<'a> FileTreeWalker<'a> {
    /// Creates a walker over `host` using the filters in `config`
    pub fn new(host: &'a dyn RepositoryHost, config: &'a WalkerConfig) -> Self {
        Self { host, config }
    }

    /// Walks from `start` (empty for the repository root)
    ///
    /// An empty result means nothing eligible was visible, including the case
    /// where the root itself could not be listed.
    pub async fn walk(&self, repo: &RepositoryRef, start: &str) -> Vec<FileEntry> {
        let mut state = WalkState::default();
        self.walk_dir(repo, start.trim_matches('/'), 0, &mut state).await;

        if state.limit_reached {
            warn!(
                "Stopped walking {} after {} files (max_files limit)",
                repo, self.config.max_files
            );
        }
        info!("Found {} eligible files in {}", state.files.len(), repo);
        state.files
    }

    #[async_recursion]
    async fn walk_dir(&self, repo: &RepositoryRef, path: &str, depth: usize, state: &mut WalkState) {
        if state.limit_reached {
            return;
        }
        if depth > self.config.max_depth {
            warn!("Skipping {} in {}: deeper than {} levels", path, repo, self.config.max_depth);
            return;
        }
        if !state.visited.insert(path.to_string()) {
            debug!("Already listed {} in {}", path, repo);
            return;
        }

        let items = match self.host.list_directory(repo, path).await {
            Fetched::Found(items) => items,
            Fetched::Absent => {
                warn!("Could not list '{}' in {}; treating it as empty", path, repo);
                return;
            }
            Fetched::Denied => {
                warn!("Access denied listing '{}' in {}; treating it as empty", path, repo);
                return;
            }
        };

        for item in items {
            match item.kind {
                ItemKind::File => {
                    if !self.config.is_eligible(&item.name, item.size) {
                        debug!("Skipping {} ({} bytes)", item.path, item.size);
                        continue;
                    }
                    if state.files.len() >= self.config.max_files {
                        state.limit_reached = true;
                        return;
                    }
                    state.files.push(FileEntry {
                        path: item.path,
                        size_bytes: item.size,
                    });
                }
                ItemKind::Dir => {
                    if state.files.len() >= self.config.max_files {
                        state.limit_reached = true;
                        return;
                    }
                    self.walk_dir(repo, &item.path, depth + 1, state).await;
                    if state.limit_reached {
                        return;
                    }
                }
                ItemKind::Symlink | ItemKind::Submodule | ItemKind::Other => {
                    debug!("Ignoring {:?} entry {}", item.kind, item.path);
                }
            }
        }
    }
}
