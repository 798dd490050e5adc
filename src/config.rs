//! API endpoint configuration.

use std::env;
use std::time::Duration;

/// Default emissions API root when `GHGSTATS_API_URL` is not set.
pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8000/api";

/// Path of the emissions collection under the API root.
pub const EMISSIONS_ENDPOINT: &str = "/emissions/";

/// Connection settings for the emissions API.
#[derive(Clone, Debug)]
pub struct ApiConfig {
    /// API root, without the endpoint path
    pub base_url: String,
    /// Per-request timeout
    pub timeout: Duration,
}

impl ApiConfig {
    /// Build a config from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let base_url = env::var("GHGSTATS_API_URL")
            .ok()
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        Self {
            base_url,
            timeout: Duration::from_secs(30),
        }
    }

    /// Full URL of the emissions collection.
    pub fn emissions_url(&self) -> String {
        format!(
            "{}{}",
            self.base_url.trim_end_matches('/'),
            EMISSIONS_ENDPOINT
        )
    }
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self::from_env()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emissions_url_joins_without_double_slash() {
        let config = ApiConfig {
            base_url: "http://localhost:9000/api/".to_string(),
            timeout: Duration::from_secs(30),
        };
        assert_eq!(config.emissions_url(), "http://localhost:9000/api/emissions/");
    }
}
