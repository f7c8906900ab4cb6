use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://localhost:8000";
pub const PROXY_MARKER: &str = "/proxy/";
pub const PROXY_PATH: &str = "/proxy/8000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

pub const HEALTH_PATH: &str = "/health";
pub const PLAN_PATH: &str = "/plan";
pub const RECIPE_PATH: &str = "/recipe";
pub const SHOPPING_PATH: &str = "/ingredients/shop";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid API base URL '{0}': {1}")]
    InvalidBaseUrl(String, url::ParseError),
    #[error("Unsupported API URL scheme '{0}'")]
    UnsupportedScheme(String),
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl ApiConfig {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ConfigError> {
        let parsed = Url::parse(base_url).map_err(|e|
            ConfigError::InvalidBaseUrl(base_url.to_string(), e)
        )?;
        match parsed.scheme() {
            "http" | "https" => {}
            other => {
                return Err(ConfigError::UnsupportedScheme(other.to_string()));
            }
        }
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
        })
    }

    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub fn health_url(&self) -> String {
        self.endpoint(HEALTH_PATH)
    }

    pub fn plan_url(&self) -> String {
        self.endpoint(PLAN_PATH)
    }

    pub fn recipe_url(&self) -> String {
        self.endpoint(RECIPE_PATH)
    }

    pub fn shopping_url(&self) -> String {
        self.endpoint(SHOPPING_PATH)
    }
}

/// Picks the API base URL: an explicit override first, then the page location
/// (proxied or same-origin), then the local development server.
pub fn resolve_base_url(api_override: Option<&str>, page_location: Option<&str>) -> String {
    if let Some(url) = api_override.map(str::trim).filter(|u| !u.is_empty()) {
        return url.trim_end_matches('/').to_string();
    }

    let location = match page_location.and_then(|l| Url::parse(l.trim()).ok()) {
        Some(location) => location,
        None => {
            return DEFAULT_BASE_URL.to_string();
        }
    };

    if !matches!(location.scheme(), "http" | "https") || location.host_str().is_none() {
        return DEFAULT_BASE_URL.to_string();
    }

    let origin = location.origin().ascii_serialization();
    if location.path().contains(PROXY_MARKER) {
        format!("{}{}", origin, PROXY_PATH)
    } else {
        origin
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn override_wins() {
        let url = resolve_base_url(
            Some("https://api.example.com/"),
            Some("https://notebook.example.com/proxy/8888/")
        );
        assert_eq!(url, "https://api.example.com");
    }

    #[test]
    fn blank_override_is_ignored() {
        let url = resolve_base_url(Some("  "), Some("https://chef.example.com/index.html"));
        assert_eq!(url, "https://chef.example.com");
    }

    #[test]
    fn proxy_path_is_substituted() {
        let url = resolve_base_url(
            None,
            Some("https://studio.example.com/jupyter/default/proxy/3000/index.html")
        );
        assert_eq!(url, "https://studio.example.com/proxy/8000");
    }

    #[test]
    fn same_origin_keeps_port() {
        let url = resolve_base_url(None, Some("http://10.0.0.5:8000/static/index.html"));
        assert_eq!(url, "http://10.0.0.5:8000");
    }

    #[test]
    fn falls_back_to_local_host() {
        assert_eq!(resolve_base_url(None, None), DEFAULT_BASE_URL);
        assert_eq!(resolve_base_url(None, Some("file:///tmp/index.html")), DEFAULT_BASE_URL);
        assert_eq!(resolve_base_url(None, Some("not a url")), DEFAULT_BASE_URL);
    }

    #[test]
    fn endpoints_join_without_double_slash() {
        let config = ApiConfig::new("http://localhost:8000/", Duration::from_secs(5)).unwrap();
        assert_eq!(config.plan_url(), "http://localhost:8000/plan");
        assert_eq!(config.shopping_url(), "http://localhost:8000/ingredients/shop");
    }

    #[test]
    fn rejects_non_http_base() {
        assert!(ApiConfig::new("ftp://example.com", Duration::from_secs(5)).is_err());
        assert!(ApiConfig::new("::nope::", Duration::from_secs(5)).is_err());
    }
}
