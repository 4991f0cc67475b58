//! In-memory registry of search jobs.
//!
//! Each entry holds the status record and the latest published result list of
//! one job. Both live under the same lock so a job is never visible with only
//! one of them. Result lists are published as whole `Arc` snapshots; readers
//! clone the `Arc` and never see a list while it is being built.

use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::models::{SearchId, SearchStatus};

struct SearchEntry {
    status: SearchStatus,
    results: Arc<Vec<String>>,
}

#[derive(Default)]
pub struct SearchRegistry {
    entries: RwLock<HashMap<SearchId, SearchEntry>>,
}

impl SearchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a new job as running with no results.
    pub async fn create(&self, id: SearchId, total_queries: usize) {
        let entry = SearchEntry {
            status: SearchStatus::started(total_queries),
            results: Arc::new(Vec::new()),
        };
        self.entries.write().await.insert(id, entry);
    }

    pub async fn get_status(&self, id: &SearchId) -> Option<SearchStatus> {
        self.entries
            .read()
            .await
            .get(id)
            .map(|entry| entry.status.clone())
    }

    pub async fn get_results(&self, id: &SearchId) -> Option<Arc<Vec<String>>> {
        self.entries
            .read()
            .await
            .get(id)
            .map(|entry| entry.results.clone())
    }

    /// Applies `update` to the status of a running job.
    ///
    /// Returns `false` without calling `update` if the job is unknown or
    /// already completed.
    pub async fn update_status<F>(&self, id: &SearchId, update: F) -> bool
    where
        F: FnOnce(&mut SearchStatus),
    {
        let mut entries = self.entries.write().await;
        match entries.get_mut(id) {
            Some(entry) if !entry.status.is_completed() => {
                update(&mut entry.status);
                true
            }
            _ => false,
        }
    }

    /// Replaces the status of a running job.
    pub async fn set_status(&self, id: &SearchId, status: SearchStatus) -> bool {
        self.update_status(id, |current| *current = status).await
    }

    /// Replaces the result list of a running job with `results`.
    pub async fn publish_results(&self, id: &SearchId, results: Vec<String>) -> bool {
        let mut entries = self.entries.write().await;
        match entries.get_mut(id) {
            Some(entry) if !entry.status.is_completed() => {
                entry.results = Arc::new(results);
                true
            }
            _ => false,
        }
    }

    /// Removes every job, running or not. Returns how many were removed.
    pub async fn clear_all(&self) -> usize {
        let mut entries = self.entries.write().await;
        let removed = entries.len();
        entries.clear();
        removed
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}
