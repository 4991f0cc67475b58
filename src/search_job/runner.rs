//! Execution of a single search job.
//!
//! A job runs the primary queries in order, feeding every raw result through
//! the post URL extractor and publishing the growing result list after each
//! new URL. It ends as soon as the requested number of URLs is reached. If
//! none of the primary queries produced anything, one broader query is tried
//! before the job is finalized.
//!
//! Engine failures never fail the job: they are recorded in the status message
//! and the job moves on to the next query.

use std::sync::Arc;
use std::time::Duration;

use futures::StreamExt;
use rand::Rng;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::models::{SearchId, SearchRequest, SearchStatus};
use super::queries::{broader_query, primary_queries};
use super::registry::SearchRegistry;
use crate::extractor::PostUrlCollector;
use crate::search_engine::{SearchEngine, SearchEngineError};
use crate::server::metrics;

/// Bounds of the random pause taken after each raw result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottleRange {
    pub min: Duration,
    pub max: Duration,
}

impl ThrottleRange {
    pub const fn fixed(duration: Duration) -> Self {
        Self {
            min: duration,
            max: duration,
        }
    }

    /// Draws a pause uniformly from `min..=max` at millisecond resolution.
    pub fn sample(&self) -> Duration {
        let min = self.min.as_millis() as u64;
        let max = self.max.as_millis() as u64;
        if max <= min {
            return self.min;
        }
        Duration::from_millis(rand::rng().random_range(min..=max))
    }
}

impl Default for ThrottleRange {
    fn default() -> Self {
        Self {
            min: Duration::from_secs(1),
            max: Duration::from_secs(3),
        }
    }
}

#[derive(Debug, Clone)]
pub struct RunnerSettings {
    /// Raw results requested from the engine per query, regardless of how
    /// many URLs the caller asked for.
    pub max_candidates_per_query: usize,
    pub throttle: ThrottleRange,
}

impl Default for RunnerSettings {
    fn default() -> Self {
        Self {
            max_candidates_per_query: 10,
            throttle: ThrottleRange::default(),
        }
    }
}

/// Shared dependencies handed to every job.
#[derive(Clone)]
pub struct JobContext {
    pub engine: Arc<dyn SearchEngine>,
    pub registry: Arc<SearchRegistry>,
    pub settings: RunnerSettings,
}

/// How a job ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The requested number of URLs was reached during a primary query.
    TargetReached,
    /// All queries ran; some URLs were found.
    Completed,
    /// All queries ran without finding anything.
    NoResults,
    /// The job was cancelled before finishing.
    Cancelled,
}

impl SearchOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchOutcome::TargetReached => "target_reached",
            SearchOutcome::Completed => "completed",
            SearchOutcome::NoResults => "no_results",
            SearchOutcome::Cancelled => "cancelled",
        }
    }
}

/// Result of running one query.
#[derive(Debug)]
enum QueryOutcome {
    /// The engine ran out of results.
    Exhausted,
    /// The result list reached the requested size.
    TargetReached,
    /// The engine failed; URLs collected before the failure are kept.
    Failed(SearchEngineError),
    Cancelled,
}

pub struct SearchJob {
    id: SearchId,
    request: SearchRequest,
    context: JobContext,
    cancellation_token: CancellationToken,
    collector: PostUrlCollector,
}

impl SearchJob {
    pub fn new(
        id: SearchId,
        request: SearchRequest,
        context: JobContext,
        cancellation_token: CancellationToken,
    ) -> Self {
        Self {
            id,
            request,
            context,
            cancellation_token,
            collector: PostUrlCollector::new(),
        }
    }

    pub async fn run(mut self) -> SearchOutcome {
        info!(
            "Search {} started: keyword={:?}, description={:?}, num_results={}",
            self.id, self.request.keyword, self.request.description, self.request.num_results
        );

        if let Some(outcome) = self.run_primary_queries().await {
            return self.finish(outcome);
        }

        if self.collector.is_empty() && !self.run_broader_query().await {
            return self.finish(SearchOutcome::Cancelled);
        }

        let outcome = self.finalize().await;
        self.finish(outcome)
    }

    /// Runs the primary queries in order.
    ///
    /// Returns `Some` when the job must end right away, either because the
    /// target was reached (the job is then already marked completed) or
    /// because it was cancelled.
    async fn run_primary_queries(&mut self) -> Option<SearchOutcome> {
        let queries = primary_queries(&self.request.keyword, &self.request.description);
        let total = queries.len();

        self.registry()
            .set_status(&self.id, SearchStatus::started(total))
            .await;

        for (index, query) in queries.iter().enumerate() {
            // Progress marks the query about to run, not the ones already done.
            let progress = index as f64 / total as f64 * 100.0;
            self.registry()
                .update_status(&self.id, |status| {
                    status.message = format!("Searching with query: {}", query);
                    status.progress = progress;
                })
                .await;

            match self.run_query(query).await {
                QueryOutcome::Exhausted => {}
                QueryOutcome::TargetReached => {
                    self.registry()
                        .set_status(
                            &self.id,
                            SearchStatus::completed("Search completed successfully"),
                        )
                        .await;
                    return Some(SearchOutcome::TargetReached);
                }
                QueryOutcome::Failed(err) => {
                    warn!("Search {} query {} failed: {}", self.id, index + 1, err);
                    metrics::record_engine_error("primary");
                    self.registry()
                        .update_status(&self.id, |status| {
                            status.message = format!("Error during search: {}", err);
                        })
                        .await;
                }
                QueryOutcome::Cancelled => return Some(SearchOutcome::Cancelled),
            }
        }

        None
    }

    /// Runs the single broader query. Returns `false` if cancelled.
    ///
    /// Reaching the target here only stops the query; the job is finalized
    /// by the caller either way.
    async fn run_broader_query(&mut self) -> bool {
        self.registry()
            .update_status(&self.id, |status| {
                status.message = "Trying broader search...".to_string();
            })
            .await;

        let query = broader_query(&self.request.keyword);
        match self.run_query(&query).await {
            QueryOutcome::Exhausted | QueryOutcome::TargetReached => true,
            QueryOutcome::Failed(err) => {
                warn!("Search {} broader query failed: {}", self.id, err);
                metrics::record_engine_error("fallback");
                self.registry()
                    .update_status(&self.id, |status| {
                        status
                            .message
                            .push_str(&format!(" Error in broader search: {}", err));
                    })
                    .await;
                true
            }
            QueryOutcome::Cancelled => false,
        }
    }

    async fn finalize(&mut self) -> SearchOutcome {
        let (outcome, message) = if self.collector.is_empty() {
            (SearchOutcome::NoResults, "No posts found")
        } else {
            (SearchOutcome::Completed, "Search completed")
        };

        self.registry()
            .publish_results(&self.id, self.collector.urls().to_vec())
            .await;
        self.registry()
            .set_status(&self.id, SearchStatus::completed(message))
            .await;

        outcome
    }

    async fn run_query(&mut self, query: &str) -> QueryOutcome {
        debug!("Search {} running query {:?}", self.id, query);
        let mut results = self
            .context
            .engine
            .search(query, self.context.settings.max_candidates_per_query);

        loop {
            let next = tokio::select! {
                biased;
                _ = self.cancellation_token.cancelled() => return QueryOutcome::Cancelled,
                next = results.next() => next,
            };

            let raw = match next {
                None => return QueryOutcome::Exhausted,
                Some(Err(err)) => return QueryOutcome::Failed(err),
                Some(Ok(raw)) => raw,
            };

            if self.collector.offer(&raw) {
                debug!("Search {} found post URL from {:?}", self.id, raw);
                metrics::record_post_url_found();
                self.registry()
                    .publish_results(&self.id, self.collector.urls().to_vec())
                    .await;

                if self.collector.len() >= self.request.num_results {
                    return QueryOutcome::TargetReached;
                }
            }

            let pause = self.context.settings.throttle.sample();
            tokio::select! {
                biased;
                _ = self.cancellation_token.cancelled() => return QueryOutcome::Cancelled,
                _ = tokio::time::sleep(pause) => {}
            }
        }
    }

    fn registry(&self) -> &SearchRegistry {
        &self.context.registry
    }

    fn finish(&self, outcome: SearchOutcome) -> SearchOutcome {
        info!(
            "Search {} finished ({}) with {} post URLs",
            self.id,
            outcome.as_str(),
            self.collector.len()
        );
        metrics::record_search_finished(outcome.as_str());
        outcome
    }
}
