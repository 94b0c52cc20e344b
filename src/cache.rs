use crate::config::ConcurrencyPolicy;
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Commit that triggered a webhook analysis
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitInfo {
    /// Commit author name
    pub author: String,
    /// Commit message
    pub message: String,
}

/// The stored result of one analysis
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisRecord {
    /// Repository URL the analysis was requested for
    pub repository: String,
    /// When the analysis finished
    pub timestamp: DateTime<Utc>,
    /// Report text, or the human-readable outcome when no report was produced
    pub result: String,
    /// Commit details for webhook-triggered runs
    #[serde(skip_serializing_if = "Option::is_none")]
    pub commit: Option<CommitInfo>,
    /// Store-wide write sequence number; higher is newer
    pub version: u64,
}

impl AnalysisRecord {
    /// Creates a record stamped with the current time; the store assigns the version
    pub fn new(repository: impl Into<String>, result: impl Into<String>, commit: Option<CommitInfo>) -> Self {
        Self {
            repository: repository.into(),
            timestamp: Utc::now(),
            result: result.into(),
            commit,
            version: 0,
        }
    }
}

/// Analysis results keyed by repository URL
///
/// Cloning is cheap and every clone shares the same records. Writes are
/// last-write-wins; [`ConcurrencyPolicy::Serialized`] additionally ensures
/// only one analysis per key runs at a time through [`ResultStore::run_exclusive`].
#[derive(Debug, Clone)]
pub struct ResultStore {
    records: Arc<RwLock<IndexMap<String, AnalysisRecord>>>,
    key_locks: Arc<Mutex<HashMap<String, Arc<Mutex<()>>>>>,
    next_version: Arc<AtomicU64>,
    policy: ConcurrencyPolicy,
}

impl ResultStore {
    /// Creates an empty store with the given policy
    pub fn new(policy: ConcurrencyPolicy) -> Self {
        Self {
            records: Arc::new(RwLock::new(IndexMap::new())),
            key_locks: Arc::new(Mutex::new(HashMap::new())),
            next_version: Arc::new(AtomicU64::new(1)),
            policy,
        }
    }

    /// Policy this store was created with
    pub fn policy(&self) -> ConcurrencyPolicy {
        self.policy
    }

    /// Retrieves the latest record for `key`
    pub async fn get(&self, key: &str) -> Option<AnalysisRecord> {
        self.records.read().await.get(key).cloned()
    }

    /// All records, in order of first insertion
    pub async fn list(&self) -> Vec<AnalysisRecord> {
        self.records.read().await.values().cloned().collect()
    }

    /// Stores `record` under its repository URL and returns it with its version
    pub async fn insert(&self, mut record: AnalysisRecord) -> AnalysisRecord {
        record.version = self.next_version.fetch_add(1, Ordering::SeqCst);
        let mut records = self.records.write().await;
        records.insert(record.repository.clone(), record.clone());
        record
    }

    /// Returns the number of stored records
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Checks if the store is empty
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Runs `work` for `key` under the store's concurrency policy
    ///
    /// With `Independent` the future runs immediately. With `Serialized` it
    /// waits until no other `run_exclusive` call for the same key is active.
    pub async fn run_exclusive<F, Fut, T>(&self, key: &str, work: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = T>,
    {
        match self.policy {
            ConcurrencyPolicy::Independent => work().await,
            ConcurrencyPolicy::Serialized => {
                let lock = {
                    let mut locks = self.key_locks.lock().await;
                    locks.entry(key.to_string()).or_default().clone()
                };
                let output = {
                    let _guard = lock.lock().await;
                    work().await
                };

                // Only the map and this call still hold the lock: no one is waiting
                let mut locks = self.key_locks.lock().await;
                if Arc::strong_count(&lock) == 2 {
                    locks.remove(key);
                }
                output
            }
        }
    }
}

impl Default for ResultStore {
    fn default() -> Self {
        Self::new(ConcurrencyPolicy::Independent)
    }
}
