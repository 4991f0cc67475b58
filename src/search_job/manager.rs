use std::sync::Arc;

use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tokio_util::task::TaskTracker;
use tracing::info;

use super::models::{SearchId, SearchRequest, SearchStatus};
use super::queries::PRIMARY_QUERY_COUNT;
use super::runner::{JobContext, SearchJob};
use crate::server::metrics;

/// Starts search jobs and answers queries about them.
///
/// Every job runs in its own task with its own cancellation token. Tokens are
/// derived from a per-generation parent: clearing the registry cancels the
/// current generation, so jobs hidden by a clear stop instead of running on
/// unobserved.
pub struct SearchManager {
    context: JobContext,
    tracker: TaskTracker,
    shutdown_token: CancellationToken,
    generation: Mutex<CancellationToken>,
}

impl SearchManager {
    pub fn new(context: JobContext) -> Self {
        let shutdown_token = CancellationToken::new();
        let generation = Mutex::new(shutdown_token.child_token());
        Self {
            context,
            tracker: TaskTracker::new(),
            shutdown_token,
            generation,
        }
    }

    /// Registers a new job and spawns it. Returns without waiting for it.
    pub async fn start(&self, request: SearchRequest) -> SearchId {
        let id = SearchId::new();

        // Held across registration so a concurrent clear cannot cancel a job
        // whose entry it did not remove.
        let generation = self.generation.lock().await;
        self.context
            .registry
            .create(id.clone(), PRIMARY_QUERY_COUNT)
            .await;

        let job = SearchJob::new(
            id.clone(),
            request,
            self.context.clone(),
            generation.child_token(),
        );
        metrics::record_search_started();
        self.tracker.spawn(async move {
            let _running = metrics::RunningSearchGuard::new();
            job.run().await
        });

        id
    }

    pub async fn status(&self, id: &SearchId) -> Option<SearchStatus> {
        self.context.registry.get_status(id).await
    }

    pub async fn results(&self, id: &SearchId) -> Option<Arc<Vec<String>>> {
        self.context.registry.get_results(id).await
    }

    /// Forgets every job and cancels the ones still running.
    pub async fn clear_all(&self) -> usize {
        let mut generation = self.generation.lock().await;
        let previous = std::mem::replace(&mut *generation, self.shutdown_token.child_token());
        previous.cancel();

        let removed = self.context.registry.clear_all().await;
        info!("Cleared {} searches", removed);
        removed
    }

    /// Number of job tasks that have not finished yet.
    pub fn running_jobs(&self) -> usize {
        self.tracker.len()
    }

    /// Cancels all jobs and waits for their tasks to exit.
    pub async fn shutdown(&self) {
        info!("Stopping {} running searches", self.tracker.len());
        self.shutdown_token.cancel();
        self.tracker.close();
        self.tracker.wait().await;
    }
}
