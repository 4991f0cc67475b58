//! Shared constants for end-to-end tests
//!
//! When search fixtures change, update only this file.

// ============================================================================
// Search Fixtures
// ============================================================================

/// Keyword used by most search tests
pub const KEYWORD: &str = "rust";

/// LinkedIn post URLs returned by scripted searches
pub const POST_URL_1: &str = "https://www.linkedin.com/posts/alice_rust-activity-1";
pub const POST_URL_2: &str = "https://www.linkedin.com/posts/bob_rust-activity-2";
pub const POST_URL_3: &str = "https://www.linkedin.com/feed/update/urn:li:activity:3";

/// A result that is not a LinkedIn post
pub const PROFILE_URL: &str = "https://www.linkedin.com/in/carol";

// ============================================================================
// Timeouts
// ============================================================================

/// Maximum time to wait for server to become ready (milliseconds)
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Timeout for individual HTTP requests (seconds)
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Polling interval when waiting for server ready (milliseconds)
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 50;

/// Maximum time to wait for a search to complete (milliseconds)
pub const SEARCH_COMPLETION_TIMEOUT_MS: u64 = 5000;

/// Polling interval when waiting for a search to complete (milliseconds)
pub const SEARCH_POLL_INTERVAL_MS: u64 = 20;
