//! HTTP client for end-to-end tests
//!
//! This module provides a high-level HTTP client that wraps reqwest
//! and provides methods for all search API endpoints.
//!
//! When API routes or request formats change, update only this file.

use super::constants::*;
use reqwest::Response;
use serde_json::{json, Value};
use std::time::Duration;

/// HTTP test client for the search API
pub struct TestClient {
    /// The underlying reqwest client (public for custom requests in tests)
    pub client: reqwest::Client,
    /// The base URL of the test server
    pub base_url: String,
}

#[allow(dead_code)]
impl TestClient {
    pub fn new(base_url: String) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .expect("Failed to build reqwest client");

        Self { client, base_url }
    }

    // ========================================================================
    // Search Endpoints
    // ========================================================================

    /// POST /api/search
    pub async fn start_search(
        &self,
        keyword: &str,
        description: Option<&str>,
        num_results: Option<usize>,
    ) -> Response {
        let mut body = json!({ "keyword": keyword });
        if let Some(description) = description {
            body["description"] = json!(description);
        }
        if let Some(num_results) = num_results {
            body["num_results"] = json!(num_results);
        }
        self.start_search_raw(body).await
    }

    /// POST /api/search with an arbitrary JSON body
    pub async fn start_search_raw(&self, body: Value) -> Response {
        self.client
            .post(format!("{}/api/search", self.base_url))
            .json(&body)
            .send()
            .await
            .expect("Start search request failed")
    }

    /// Starts a search and returns its id, panicking if it was refused
    pub async fn start_search_id(
        &self,
        keyword: &str,
        description: Option<&str>,
        num_results: Option<usize>,
    ) -> String {
        let response = self.start_search(keyword, description, num_results).await;
        assert_eq!(
            response.status(),
            reqwest::StatusCode::OK,
            "Search was not started"
        );
        let body: Value = response.json().await.expect("Invalid start search body");
        body["search_id"]
            .as_str()
            .expect("Missing search_id")
            .to_string()
    }

    /// GET /api/search/{id}/status
    pub async fn get_status(&self, search_id: &str) -> Response {
        self.client
            .get(format!("{}/api/search/{}/status", self.base_url, search_id))
            .send()
            .await
            .expect("Get status request failed")
    }

    /// GET /api/search/{id}/results
    pub async fn get_results(&self, search_id: &str) -> Response {
        self.client
            .get(format!("{}/api/search/{}/results", self.base_url, search_id))
            .send()
            .await
            .expect("Get results request failed")
    }

    /// POST /api/cleanup
    pub async fn cleanup(&self) -> Response {
        self.client
            .post(format!("{}/api/cleanup", self.base_url))
            .send()
            .await
            .expect("Cleanup request failed")
    }

    /// Polls the status endpoint until the search completes
    ///
    /// # Panics
    ///
    /// Panics if the search is unknown or does not complete in time.
    pub async fn wait_for_completion(&self, search_id: &str) -> Value {
        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SEARCH_COMPLETION_TIMEOUT_MS);

        loop {
            let response = self.get_status(search_id).await;
            assert_eq!(response.status(), reqwest::StatusCode::OK);
            let status: Value = response.json().await.expect("Invalid status body");
            if status["status"] == "completed" {
                return status;
            }
            if start.elapsed() > timeout {
                panic!(
                    "Search {} did not complete within {}ms, last status: {}",
                    search_id, SEARCH_COMPLETION_TIMEOUT_MS, status
                );
            }
            tokio::time::sleep(Duration::from_millis(SEARCH_POLL_INTERVAL_MS)).await;
        }
    }
}
