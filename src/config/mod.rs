mod file_config;

pub use file_config::{FileConfig, SearchConfig};

use crate::search_engine::GoogleSearchConfig;
use crate::search_job::{RunnerSettings, ThrottleRange};
use crate::server::RequestsLoggingLevel;
use anyhow::{bail, Result};
use clap::ValueEnum;
use std::time::Duration;

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,
    pub search_base_url: Option<String>,
    pub search_timeout_sec: Option<u64>,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    // Core settings
    pub port: u16,
    pub metrics_port: u16,
    pub logging_level: RequestsLoggingLevel,
    pub frontend_dir_path: Option<String>,

    // Feature configs (with defaults)
    pub search: SearchSettings,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let port = file.port.unwrap_or(cli.port);
        let metrics_port = file.metrics_port.unwrap_or(cli.metrics_port);
        if port == metrics_port && port != 0 {
            bail!("port and metrics_port must differ (both are {})", port);
        }

        let logging_level = file
            .logging_level
            .and_then(|s| parse_logging_level(&s))
            .unwrap_or_else(|| cli.logging_level.clone());

        let frontend_dir_path = file
            .frontend_dir_path
            .or_else(|| cli.frontend_dir_path.clone());

        // Search settings - merge file config with defaults
        let search_file = file.search.unwrap_or_default();
        let defaults = SearchSettings::default();
        let search = SearchSettings {
            base_url: search_file
                .base_url
                .or_else(|| cli.search_base_url.clone())
                .unwrap_or(defaults.base_url),
            language: search_file.language.unwrap_or(defaults.language),
            user_agent: search_file.user_agent.unwrap_or(defaults.user_agent),
            timeout_sec: search_file
                .timeout_sec
                .or(cli.search_timeout_sec)
                .unwrap_or(defaults.timeout_sec),
            page_pause_ms: search_file.page_pause_ms.unwrap_or(defaults.page_pause_ms),
            max_candidates_per_query: search_file
                .max_candidates_per_query
                .unwrap_or(defaults.max_candidates_per_query),
            default_num_results: search_file
                .default_num_results
                .unwrap_or(defaults.default_num_results),
            throttle_min_ms: search_file
                .throttle_min_ms
                .unwrap_or(defaults.throttle_min_ms),
            throttle_max_ms: search_file
                .throttle_max_ms
                .unwrap_or(defaults.throttle_max_ms),
        };
        search.validate()?;

        Ok(Self {
            port,
            metrics_port,
            logging_level,
            frontend_dir_path,
            search,
        })
    }
}

#[derive(Debug, Clone)]
pub struct SearchSettings {
    pub base_url: String,
    pub language: String,
    pub user_agent: String,
    pub timeout_sec: u64,
    pub page_pause_ms: u64,
    pub max_candidates_per_query: usize,
    pub default_num_results: usize,
    pub throttle_min_ms: u64,
    pub throttle_max_ms: u64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        let engine = GoogleSearchConfig::default();
        Self {
            base_url: engine.base_url,
            language: engine.language,
            user_agent: engine.user_agent,
            timeout_sec: engine.timeout.as_secs(),
            page_pause_ms: engine.page_pause.as_millis() as u64,
            max_candidates_per_query: 10,
            default_num_results: 10,
            throttle_min_ms: 1000,
            throttle_max_ms: 3000,
        }
    }
}

impl SearchSettings {
    fn validate(&self) -> Result<()> {
        if self.throttle_min_ms > self.throttle_max_ms {
            bail!(
                "throttle_min_ms ({}) must not exceed throttle_max_ms ({})",
                self.throttle_min_ms,
                self.throttle_max_ms
            );
        }
        if self.max_candidates_per_query == 0 {
            bail!("max_candidates_per_query must be at least 1");
        }
        if self.default_num_results == 0 {
            bail!("default_num_results must be at least 1");
        }
        Ok(())
    }

    pub fn engine_config(&self) -> GoogleSearchConfig {
        GoogleSearchConfig {
            base_url: self.base_url.clone(),
            language: self.language.clone(),
            user_agent: self.user_agent.clone(),
            timeout: Duration::from_secs(self.timeout_sec),
            page_pause: Duration::from_millis(self.page_pause_ms),
        }
    }

    pub fn runner_settings(&self) -> RunnerSettings {
        RunnerSettings {
            max_candidates_per_query: self.max_candidates_per_query,
            throttle: ThrottleRange {
                min: Duration::from_millis(self.throttle_min_ms),
                max: Duration::from_millis(self.throttle_max_ms),
            },
        }
    }
}

/// Parses a logging level string into RequestsLoggingLevel.
/// Uses clap's ValueEnum trait for parsing.
fn parse_logging_level(s: &str) -> Option<RequestsLoggingLevel> {
    RequestsLoggingLevel::from_str(s, true).ok()
}
