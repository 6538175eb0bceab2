//! Configuration for the news deck

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use validator::Validate;

use crate::http_client::HttpClientConfig;
use crate::sources::guardian::GUARDIAN_BASE_URL;
use crate::sources::newsapi::NEWSAPI_BASE_URL;

#[derive(Debug, Clone, Deserialize, Validate)]
pub struct Config {
    // Provider credentials
    pub newsapi_key: Option<String>,
    pub guardian_key: Option<String>,

    // Provider endpoints
    #[serde(default = "default_newsapi_base_url")]
    #[validate(url)]
    pub newsapi_base_url: String,
    #[serde(default = "default_guardian_base_url")]
    #[validate(url)]
    pub guardian_base_url: String,

    // Upstream request parameters
    #[serde(default = "default_country")]
    pub newsapi_country: String,
    #[serde(default = "default_category")]
    pub default_category: String,
    #[serde(default = "default_section")]
    pub default_section: String,
    #[serde(default = "default_upstream_page_size")]
    #[validate(range(min = 1, max = 100))]
    pub upstream_page_size: u32,

    // View
    #[serde(default = "default_page_size")]
    #[validate(range(min = 1, max = 100))]
    pub page_size: usize,
    #[serde(default = "default_search_debounce_ms")]
    pub search_debounce_ms: u64,

    // Recent searches
    #[serde(default = "default_max_recent_searches")]
    #[validate(range(min = 1))]
    pub max_recent_searches: usize,
    #[serde(default = "default_recent_searches_path")]
    pub recent_searches_path: PathBuf,

    // Response cache, humantime format ("1h", "90s")
    #[serde(default = "default_cache_ttl")]
    pub cache_ttl: String,

    // HTTP
    #[serde(default = "default_max_concurrent_requests")]
    #[validate(range(min = 1))]
    pub max_concurrent_requests: usize,
    #[serde(default = "default_rate_limit")]
    #[validate(range(min = 1))]
    pub provider_rate_limit_rpm: u32,
    #[serde(default = "default_request_timeout")]
    #[validate(range(min = 1))]
    pub request_timeout_secs: u64,
}

fn default_newsapi_base_url() -> String {
    NEWSAPI_BASE_URL.to_string()
}

fn default_guardian_base_url() -> String {
    GUARDIAN_BASE_URL.to_string()
}

fn default_country() -> String {
    "us".to_string()
}

fn default_category() -> String {
    "technology".to_string()
}

fn default_section() -> String {
    "technology".to_string()
}

fn default_upstream_page_size() -> u32 {
    20
}

fn default_page_size() -> usize {
    12
}

fn default_search_debounce_ms() -> u64 {
    300
}

fn default_max_recent_searches() -> usize {
    5
}

fn default_recent_searches_path() -> PathBuf {
    PathBuf::from("./data/recent-searches.json")
}

fn default_cache_ttl() -> String {
    "1h".to_string()
}

fn default_max_concurrent_requests() -> usize {
    4
}

fn default_rate_limit() -> u32 {
    30 // NewsAPI free tier: 100 requests/day
}

fn default_request_timeout() -> u64 {
    15
}

impl Default for Config {
    fn default() -> Self {
        Self {
            newsapi_key: None,
            guardian_key: None,
            newsapi_base_url: default_newsapi_base_url(),
            guardian_base_url: default_guardian_base_url(),
            newsapi_country: default_country(),
            default_category: default_category(),
            default_section: default_section(),
            upstream_page_size: default_upstream_page_size(),
            page_size: default_page_size(),
            search_debounce_ms: default_search_debounce_ms(),
            max_recent_searches: default_max_recent_searches(),
            recent_searches_path: default_recent_searches_path(),
            cache_ttl: default_cache_ttl(),
            max_concurrent_requests: default_max_concurrent_requests(),
            provider_rate_limit_rpm: default_rate_limit(),
            request_timeout_secs: default_request_timeout(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        // Load .env file
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let cfg: Config = config.try_deserialize()?;
        Ok(cfg)
    }

    /// Validates ranges, URLs and the cache TTL format
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).context("invalid configuration")?;
        self.cache_ttl_duration()?;
        Ok(())
    }

    pub fn cache_ttl_duration(&self) -> Result<Duration> {
        humantime::parse_duration(&self.cache_ttl)
            .with_context(|| format!("invalid cache_ttl '{}'", self.cache_ttl))
    }

    pub fn search_debounce(&self) -> Duration {
        Duration::from_millis(self.search_debounce_ms)
    }

    pub fn http_client_config(&self) -> HttpClientConfig {
        HttpClientConfig {
            max_concurrent_requests: self.max_concurrent_requests,
            request_timeout: Duration::from_secs(self.request_timeout_secs),
            ..HttpClientConfig::default()
        }
    }

    /// Checks if NewsAPI is configured
    pub fn has_newsapi(&self) -> bool {
        self.newsapi_key.as_deref().is_some_and(|k| !k.is_empty())
    }

    /// Checks if The Guardian is configured
    pub fn has_guardian(&self) -> bool {
        self.guardian_key.as_deref().is_some_and(|k| !k.is_empty())
    }
}
