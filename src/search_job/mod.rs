//! Background search jobs.
//!
//! A search job takes a keyword and an optional description, queries the
//! search engine with a fixed set of templates and collects LinkedIn post URLs
//! from the results. Jobs run in the background; their status and results are
//! polled through the registry while they progress.

mod manager;
mod models;
mod queries;
mod registry;
mod runner;

pub use manager::SearchManager;
pub use models::{InvalidSearchRequest, SearchId, SearchRequest, SearchState, SearchStatus};
pub use queries::{broader_query, primary_queries, PRIMARY_QUERY_COUNT};
pub use registry::SearchRegistry;
pub use runner::{JobContext, RunnerSettings, SearchJob, SearchOutcome, ThrottleRange};
