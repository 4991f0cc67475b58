use anyhow::{Context, Result};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    middleware,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use tower_http::services::ServeDir;
use tracing::info;

use super::{error::ApiError, log_requests, metrics::metrics_handler, state::*, ServerConfig};
use crate::search_job::{SearchId, SearchRequest};

const LANDING_PAGE: &str = include_str!("../../static/index.html");

#[derive(Deserialize, Debug)]
struct StartSearchBody {
    pub keyword: Option<String>,
    pub description: Option<String>,
    pub num_results: Option<usize>,
}

#[derive(Serialize)]
struct StartSearchResponse {
    search_id: SearchId,
    message: &'static str,
}

#[derive(Serialize)]
struct SearchResultsResponse<'a> {
    results: &'a [String],
    count: usize,
}

#[derive(Serialize)]
struct MessageResponse {
    message: &'static str,
}

async fn home() -> impl IntoResponse {
    Html(LANDING_PAGE)
}

async fn start_search(
    State(state): State<ServerState>,
    body: Result<Json<StartSearchBody>, JsonRejection>,
) -> Result<Json<StartSearchResponse>, ApiError> {
    let Json(body) = body.map_err(|rejection| ApiError::MalformedBody(rejection.body_text()))?;
    let request = SearchRequest::new(
        body.keyword,
        body.description,
        body.num_results,
        state.config.default_num_results,
    )?;

    let search_id = state.search_manager.start(request).await;
    info!("Started search {}", search_id);

    Ok(Json(StartSearchResponse {
        search_id,
        message: "Search started",
    }))
}

async fn get_search_status(
    State(search_manager): State<GuardedSearchManager>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let status = search_manager
        .status(&SearchId::from(id))
        .await
        .ok_or(ApiError::SearchNotFound)?;
    Ok(Json(status).into_response())
}

async fn get_search_results(
    State(search_manager): State<GuardedSearchManager>,
    Path(id): Path<String>,
) -> Result<Response, ApiError> {
    let results = search_manager
        .results(&SearchId::from(id))
        .await
        .ok_or(ApiError::SearchNotFound)?;
    Ok(Json(SearchResultsResponse {
        results: &results,
        count: results.len(),
    })
    .into_response())
}

async fn cleanup(State(search_manager): State<GuardedSearchManager>) -> Json<MessageResponse> {
    search_manager.clear_all().await;
    Json(MessageResponse {
        message: "Cleanup completed",
    })
}

pub fn make_app(config: ServerConfig, search_manager: GuardedSearchManager) -> Router {
    let state = ServerState {
        config: config.clone(),
        search_manager,
    };

    let api_routes: Router = Router::new()
        .route("/search", post(start_search))
        .route("/search/{id}/status", get(get_search_status))
        .route("/search/{id}/results", get(get_search_results))
        .route("/cleanup", post(cleanup))
        .with_state(state.clone());

    let home_router: Router = match config.frontend_dir_path {
        Some(frontend_path) => {
            let static_files_service =
                ServeDir::new(frontend_path).append_index_html_on_directories(true);
            Router::new().fallback_service(static_files_service)
        }
        None => Router::new().route("/", get(home)),
    };

    home_router
        .nest("/api", api_routes)
        .layer(middleware::from_fn_with_state(state, log_requests))
}

pub fn make_metrics_app() -> Router {
    Router::new().route("/metrics", get(metrics_handler))
}

/// Serves the API and the metrics endpoint until `shutdown` is cancelled, then
/// stops the running searches.
pub async fn run_server(
    config: ServerConfig,
    search_manager: GuardedSearchManager,
    shutdown: CancellationToken,
) -> Result<()> {
    let listener = TcpListener::bind(format!("127.0.0.1:{}", config.port))
        .await
        .with_context(|| format!("Failed to bind port {}", config.port))?;
    let metrics_listener = TcpListener::bind(format!("127.0.0.1:{}", config.metrics_port))
        .await
        .with_context(|| format!("Failed to bind metrics port {}", config.metrics_port))?;

    info!("Ready to serve at port {}!", config.port);
    info!("Metrics available at port {}!", config.metrics_port);

    let app = make_app(config, search_manager.clone());
    let api_server = async {
        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown.clone().cancelled_owned())
            .await
    };
    let metrics_server = async {
        axum::serve(metrics_listener, make_metrics_app())
            .with_graceful_shutdown(shutdown.clone().cancelled_owned())
            .await
    };

    let result = tokio::try_join!(api_server, metrics_server);

    // One server failing takes the other down with it.
    shutdown.cancel();
    search_manager.shutdown().await;

    result.context("HTTP server failed")?;
    Ok(())
}
