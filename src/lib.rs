//! post-scout library
//!
//! Exposes the search service modules to the binary and the end-to-end tests.

pub mod config;
pub mod extractor;
pub mod search_engine;
pub mod search_job;
pub mod server;

// Re-export commonly used types for convenience
pub use search_engine::{GoogleSearchEngine, SearchEngine};
pub use search_job::SearchManager;
pub use server::{run_server, RequestsLoggingLevel};
