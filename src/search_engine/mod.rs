//! External web search used by search jobs.
//!
//! A `SearchEngine` turns a query string into a lazy sequence of result URLs.
//! The sequence is finite and single-use; it may fail part way through, in
//! which case the error is the last item yielded.

mod google;

pub use google::{GoogleSearchConfig, GoogleSearchEngine};

use futures::stream::BoxStream;
use thiserror::Error;

/// Errors surfaced by a search engine while producing results.
#[derive(Debug, Error)]
pub enum SearchEngineError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("search engine responded with status {0}")]
    Status(u16),

    #[error("invalid search engine configuration: {0}")]
    Config(String),
}

pub type SearchResultStream = BoxStream<'static, Result<String, SearchEngineError>>;

/// Source of raw search result URLs.
#[cfg_attr(feature = "mock", mockall::automock)]
pub trait SearchEngine: Send + Sync {
    /// Starts a search for `query`, yielding at most `max_results` URLs.
    ///
    /// Nothing is fetched until the returned stream is polled.
    fn search(&self, query: &str, max_results: usize) -> SearchResultStream;
}
