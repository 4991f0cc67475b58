use axum::extract::FromRef;

use crate::search_job::SearchManager;
use std::sync::Arc;

use super::ServerConfig;

pub type GuardedSearchManager = Arc<SearchManager>;

#[derive(Clone)]
pub struct ServerState {
    pub config: ServerConfig,
    pub search_manager: GuardedSearchManager,
}

impl FromRef<ServerState> for GuardedSearchManager {
    fn from_ref(input: &ServerState) -> Self {
        input.search_manager.clone()
    }
}

impl FromRef<ServerState> for ServerConfig {
    fn from_ref(input: &ServerState) -> Self {
        input.config.clone()
    }
}
