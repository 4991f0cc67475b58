//! Test server lifecycle management
//!
//! This module manages spawning and shutting down test HTTP servers.
//! Each test gets an isolated server with its own search manager, backed by a
//! scripted search engine instead of a real one.

use super::constants::*;
use futures::stream;
use post_scout::search_engine::{SearchEngine, SearchEngineError, SearchResultStream};
use post_scout::search_job::{
    JobContext, RunnerSettings, SearchManager, SearchRegistry, ThrottleRange,
};
use post_scout::server::{make_app, RequestsLoggingLevel, ServerConfig};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;

/// What the scripted engine does for a query
#[allow(dead_code)]
pub enum Script {
    /// Yields these results, then ends
    Results(Vec<&'static str>),
    /// Never yields anything
    Stall,
}

/// Search engine that replays scripted results and records every query.
///
/// Queries without a script yield nothing.
#[derive(Default)]
pub struct ScriptedSearchEngine {
    scripts: HashMap<String, Script>,
    calls: Mutex<Vec<String>>,
}

#[allow(dead_code)]
impl ScriptedSearchEngine {
    pub fn with(mut self, query: impl Into<String>, script: Script) -> Self {
        self.scripts.insert(query.into(), script);
        self
    }

    /// Queries received so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl SearchEngine for ScriptedSearchEngine {
    fn search(&self, query: &str, _max_results: usize) -> SearchResultStream {
        self.calls.lock().unwrap().push(query.to_string());
        match self.scripts.get(query) {
            Some(Script::Results(urls)) => {
                let items: Vec<Result<String, SearchEngineError>> =
                    urls.iter().map(|url| Ok(url.to_string())).collect();
                Box::pin(stream::iter(items))
            }
            Some(Script::Stall) => Box::pin(stream::pending::<Result<String, SearchEngineError>>()),
            None => Box::pin(stream::empty::<Result<String, SearchEngineError>>()),
        }
    }
}

/// Test server instance with an isolated search manager
///
/// When dropped, the server gracefully shuts down.
pub struct TestServer {
    /// Base URL for making requests (e.g., "http://127.0.0.1:12345")
    pub base_url: String,

    /// The port the server is listening on
    #[allow(dead_code)]
    pub port: u16,

    /// The engine behind the server, for inspecting the queries it received
    #[allow(dead_code)]
    pub engine: Arc<ScriptedSearchEngine>,

    _shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
}

impl TestServer {
    /// Spawns a new test server on a random port whose engine finds nothing
    #[allow(dead_code)]
    pub async fn spawn() -> Self {
        Self::spawn_with_engine(ScriptedSearchEngine::default()).await
    }

    /// Spawns a new test server on a random port backed by `engine`
    ///
    /// # Panics
    ///
    /// Panics if the port cannot be bound or the server does not become
    /// ready within the timeout.
    pub async fn spawn_with_engine(engine: ScriptedSearchEngine) -> Self {
        let engine = Arc::new(engine);

        // Bind to random port
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind to random port");

        let port = listener
            .local_addr()
            .expect("Failed to get local address")
            .port();

        let base_url = format!("http://127.0.0.1:{}", port);

        // Create shutdown channel
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let config = ServerConfig {
            port,
            requests_logging_level: RequestsLoggingLevel::None,
            ..Default::default()
        };

        let search_manager = Arc::new(SearchManager::new(JobContext {
            engine: engine.clone(),
            registry: Arc::new(SearchRegistry::new()),
            settings: RunnerSettings {
                max_candidates_per_query: 10,
                throttle: ThrottleRange::fixed(Duration::ZERO), // No pauses in tests
            },
        }));

        let app = make_app(config, search_manager.clone());

        // Spawn server in background task with graceful shutdown
        tokio::spawn(async move {
            axum::serve(listener, app)
                .with_graceful_shutdown(async {
                    shutdown_rx.await.ok();
                })
                .await
                .expect("Server failed");
            search_manager.shutdown().await;
        });

        let server = Self {
            base_url,
            port,
            engine,
            _shutdown_tx: Some(shutdown_tx),
        };

        server.wait_for_ready().await;

        server
    }

    /// Waits for the server to become ready by polling the landing page
    async fn wait_for_ready(&self) {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(100))
            .build()
            .expect("Failed to build reqwest client");

        let start = std::time::Instant::now();
        let timeout = Duration::from_millis(SERVER_READY_TIMEOUT_MS);

        loop {
            if start.elapsed() > timeout {
                panic!(
                    "Server did not become ready within {}ms",
                    SERVER_READY_TIMEOUT_MS
                );
            }

            match client.get(format!("{}/", self.base_url)).send().await {
                Ok(response) if response.status().is_success() => return,
                _ => {
                    tokio::time::sleep(Duration::from_millis(SERVER_READY_POLL_INTERVAL_MS)).await;
                }
            }
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        // Send shutdown signal
        if let Some(tx) = self._shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}
