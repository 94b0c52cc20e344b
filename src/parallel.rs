use crate::github::{Fetched, FileContentMap, RepositoryHost, RepositoryRef};
use futures::future::join_all;
use log::{debug, info, warn};
use std::future::Future;
use tokio::sync::Semaphore;

/// Runs futures concurrently on the calling task with a concurrency limit
///
/// Futures acquire permits in the order they were supplied and results are
/// returned in that same order, regardless of completion order.
pub struct ParallelProcessor {
    max_concurrent: usize,
    semaphore: Semaphore,
}

impl ParallelProcessor {
    /// Creates a processor that lets at most `max_concurrent` futures run at once
    pub fn new(max_concurrent: usize) -> Self {
        let max_concurrent = max_concurrent.max(1);
        Self {
            max_concurrent,
            semaphore: Semaphore::new(max_concurrent),
        }
    }

    /// Configured concurrency limit
    pub fn max_concurrent(&self) -> usize {
        self.max_concurrent
    }

    /// Drives every task to completion and returns outputs in input order
    pub async fn process<F, T>(&self, tasks: Vec<F>) -> Vec<T>
    where
        F: Future<Output = T>,
    {
        let gated = tasks.into_iter().map(|task| async move {
            // Only fails on a closed semaphore; this one is never closed
            let _permit = self.semaphore.acquire().await.ok();
            task.await
        });
        join_all(gated).await
    }
}

/// Fetches the bodies of `paths` and collects them in discovery order
///
/// Files that come back absent or denied are omitted, so the result may be
/// smaller than `paths`.
pub async fn retrieve_contents(
    host: &dyn RepositoryHost,
    repo: &RepositoryRef,
    paths: &[String],
    max_concurrent: usize,
) -> FileContentMap {
    let processor = ParallelProcessor::new(max_concurrent);
    let tasks: Vec<_> = paths.iter().map(|path| host.fetch_file(repo, path)).collect();
    let results = processor.process(tasks).await;

    let mut contents = FileContentMap::with_capacity(paths.len());
    for (path, fetched) in paths.iter().zip(results) {
        match fetched {
            Fetched::Found(content) => {
                contents.insert(path.clone(), content);
            }
            Fetched::Absent => debug!("No content for {}", path),
            Fetched::Denied => warn!("Access denied for {}", path),
        }
    }

    info!(
        "Retrieved {} of {} file contents from {}",
        contents.len(),
        paths.len(),
        repo
    );
    contents
}
