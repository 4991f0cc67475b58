use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct FileConfig {
    // Core settings (can override CLI)
    pub port: Option<u16>,
    pub metrics_port: Option<u16>,
    pub logging_level: Option<String>,
    pub frontend_dir_path: Option<String>,

    // Feature configs
    pub search: Option<SearchConfig>,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct SearchConfig {
    // Search engine settings
    pub base_url: Option<String>,
    pub language: Option<String>,
    pub user_agent: Option<String>,
    pub timeout_sec: Option<u64>,
    pub page_pause_ms: Option<u64>,
    // Job settings
    pub max_candidates_per_query: Option<usize>,
    pub default_num_results: Option<usize>,
    pub throttle_min_ms: Option<u64>,
    pub throttle_max_ms: Option<u64>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
