use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Unique identifier of a search job.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchId(String);

impl SearchId {
    /// Generates a new random UUID v4 based id.
    pub fn new() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SearchId {
    fn default() -> Self {
        Self::new()
    }
}

impl From<String> for SearchId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for SearchId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Lifecycle state of a search job. `Completed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchState {
    InProgress,
    Completed,
}

/// Status record exposed to pollers.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchStatus {
    pub status: SearchState,
    pub message: String,
    /// Percentage in `0.0..=100.0`.
    pub progress: f64,
    /// Number of primary queries; only carried while the search is running.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_queries: Option<usize>,
}

impl SearchStatus {
    pub fn started(total_queries: usize) -> Self {
        Self {
            status: SearchState::InProgress,
            message: "Search started".to_string(),
            progress: 0.0,
            total_queries: Some(total_queries),
        }
    }

    pub fn completed(message: impl Into<String>) -> Self {
        Self {
            status: SearchState::Completed,
            message: message.into(),
            progress: 100.0,
            total_queries: None,
        }
    }

    pub fn is_completed(&self) -> bool {
        self.status == SearchState::Completed
    }
}

/// Parameters of a single search job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchRequest {
    pub keyword: String,
    pub description: String,
    /// Number of qualifying URLs after which the search stops.
    pub num_results: usize,
}

/// Reasons a search request is refused before any job is created.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum InvalidSearchRequest {
    #[error("Keyword is required")]
    MissingKeyword,

    #[error("num_results must be at least 1")]
    ZeroResults,
}

impl SearchRequest {
    /// Validates raw input, filling in `default_num_results` when absent.
    pub fn new(
        keyword: Option<String>,
        description: Option<String>,
        num_results: Option<usize>,
        default_num_results: usize,
    ) -> Result<Self, InvalidSearchRequest> {
        let keyword = keyword.unwrap_or_default();
        if keyword.trim().is_empty() {
            return Err(InvalidSearchRequest::MissingKeyword);
        }

        let num_results = num_results.unwrap_or(default_num_results);
        if num_results == 0 {
            return Err(InvalidSearchRequest::ZeroResults);
        }

        Ok(Self {
            keyword,
            description: description.unwrap_or_default(),
            num_results,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn search_ids_are_unique() {
        assert_ne!(SearchId::new(), SearchId::new());
    }

    #[test]
    fn request_requires_keyword() {
        assert_eq!(
            SearchRequest::new(None, None, None, 10),
            Err(InvalidSearchRequest::MissingKeyword)
        );
        assert_eq!(
            SearchRequest::new(Some("   ".to_string()), None, None, 10),
            Err(InvalidSearchRequest::MissingKeyword)
        );
    }

    #[test]
    fn request_fills_defaults() {
        let request = SearchRequest::new(Some("rust".to_string()), None, None, 10).unwrap();
        assert_eq!(
            request,
            SearchRequest {
                keyword: "rust".to_string(),
                description: String::new(),
                num_results: 10,
            }
        );
    }

    #[test]
    fn request_rejects_zero_results() {
        assert_eq!(
            SearchRequest::new(Some("rust".to_string()), None, Some(0), 10),
            Err(InvalidSearchRequest::ZeroResults)
        );
    }

    #[test]
    fn running_status_serializes_total_queries() {
        let value = serde_json::to_value(SearchStatus::started(3)).unwrap();
        assert_eq!(
            value,
            json!({
                "status": "in_progress",
                "message": "Search started",
                "progress": 0.0,
                "total_queries": 3
            })
        );
    }

    #[test]
    fn completed_status_omits_total_queries() {
        let value = serde_json::to_value(SearchStatus::completed("No posts found")).unwrap();
        assert_eq!(
            value,
            json!({
                "status": "completed",
                "message": "No posts found",
                "progress": 100.0
            })
        );
    }
}
