use serde::Deserialize;

/// Client configuration loaded from environment variables
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Base URL of the catalog API (without the `/api/v1` prefix)
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,

    /// Quiet period before a primary search is issued
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,

    /// Quiet period before suggestions are fetched
    #[serde(default = "default_suggestion_debounce_ms")]
    pub suggestion_debounce_ms: u64,

    /// Queries shorter than this never reach the network
    #[serde(default = "default_min_query_len")]
    pub min_query_len: usize,

    #[serde(default = "default_suggestions_per_type")]
    pub suggestions_per_type: usize,

    /// Provider-imposed ceiling on total pages
    #[serde(default = "default_max_total_pages")]
    pub max_total_pages: u32,

    #[serde(default = "default_page_window_radius")]
    pub page_window_radius: u32,

    /// Default tracing filter, overridden by `RUST_LOG`
    #[serde(default = "default_log_filter")]
    pub log_filter: String,
}

fn default_api_base_url() -> String {
    "http://localhost:8080".to_string()
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_search_debounce_ms() -> u64 {
    500
}

fn default_suggestion_debounce_ms() -> u64 {
    300
}

fn default_min_query_len() -> usize {
    2
}

fn default_suggestions_per_type() -> usize {
    3
}

fn default_max_total_pages() -> u32 {
    500
}

fn default_page_window_radius() -> u32 {
    2
}

fn default_log_filter() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_base_url: default_api_base_url(),
            request_timeout_secs: default_request_timeout_secs(),
            search_debounce_ms: default_search_debounce_ms(),
            suggestion_debounce_ms: default_suggestion_debounce_ms(),
            min_query_len: default_min_query_len(),
            suggestions_per_type: default_suggestions_per_type(),
            max_total_pages: default_max_total_pages(),
            page_window_radius: default_page_window_radius(),
            log_filter: default_log_filter(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        envy::from_env::<Config>().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_env() {
        let vars: Vec<(String, String)> = Vec::new();
        let config: Config = envy::from_iter(vars).unwrap();
        assert_eq!(config.api_base_url, "http://localhost:8080");
        assert_eq!(config.search_debounce_ms, 500);
        assert_eq!(config.suggestion_debounce_ms, 300);
        assert_eq!(config.min_query_len, 2);
        assert_eq!(config.max_total_pages, 500);
    }

    #[test]
    fn test_overrides_from_env() {
        let vars = vec![
            ("API_BASE_URL".to_string(), "https://catalog.test".to_string()),
            ("SEARCH_DEBOUNCE_MS".to_string(), "250".to_string()),
        ];
        let config: Config = envy::from_iter(vars).unwrap();
        assert_eq!(config.api_base_url, "https://catalog.test");
        assert_eq!(config.search_debounce_ms, 250);
        assert_eq!(config.suggestions_per_type, 3);
    }
}
