use super::RequestsLoggingLevel;

#[derive(Clone)]
pub struct ServerConfig {
    pub requests_logging_level: RequestsLoggingLevel,
    pub port: u16,
    pub metrics_port: u16,
    /// Directory served in place of the built-in landing page.
    pub frontend_dir_path: Option<String>,
    /// Used when a search request doesn't say how many URLs it wants.
    pub default_num_results: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            requests_logging_level: RequestsLoggingLevel::Path,
            port: 5000,
            metrics_port: 9091,
            frontend_dir_path: None,
            default_num_results: 10,
        }
    }
}
