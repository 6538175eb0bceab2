//! Upstream news providers
//!
//! Each provider implements the `Source` trait: fetch a raw JSON payload for
//! a category/section, and map that payload into canonical `Article`s.
//! Mapping is pure and never touches the network.

pub mod guardian;
pub mod newsapi;
pub mod normalize;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::Result;
use crate::schemas::Article;

/// The two upstream providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    NewsApi,
    Guardian,
}

impl ProviderKind {
    /// Providers in merge order
    pub const ALL: [ProviderKind; 2] = [ProviderKind::NewsApi, ProviderKind::Guardian];

    /// Stable identifier, also used as the default `source.id`
    pub fn id(self) -> &'static str {
        match self {
            ProviderKind::NewsApi => "newsapi",
            ProviderKind::Guardian => "guardian",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            ProviderKind::NewsApi => "NewsAPI",
            ProviderKind::Guardian => "The Guardian",
        }
    }

    /// Message shown to the user when this provider's fetch failed
    pub fn load_error_message(self) -> &'static str {
        match self {
            ProviderKind::NewsApi => "Error loading NewsAPI data",
            ProviderKind::Guardian => "Error loading Guardian data",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Context handed to adapters alongside each raw record
#[derive(Debug, Clone)]
pub struct ProviderContext {
    pub provider: ProviderKind,
    /// Used as `publishedAt` when a record has none
    pub ingested_at: DateTime<Utc>,
}

impl ProviderContext {
    pub fn new(provider: ProviderKind) -> Self {
        Self {
            provider,
            ingested_at: Utc::now(),
        }
    }

    pub fn at(mut self, ingested_at: DateTime<Utc>) -> Self {
        self.ingested_at = ingested_at;
        self
    }
}

/// Options for fetching a provider payload
#[derive(Debug, Clone, Default)]
pub struct FetchOptions {
    /// Category (NewsAPI) or section (Guardian)
    pub param: Option<String>,
    /// Upstream page size
    pub page_size: Option<u32>,
}

impl FetchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, param: impl Into<String>) -> Self {
        self.param = Some(param.into());
        self
    }

    pub fn page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }
}

/// Trait for all upstream providers
#[async_trait]
pub trait Source: Send + Sync {
    fn kind(&self) -> ProviderKind;

    /// Whether credentials are present
    fn is_configured(&self) -> bool;

    /// Fetches the raw response body for the given options
    async fn fetch_payload(&self, options: &FetchOptions) -> Result<serde_json::Value>;

    /// Maps a raw response body into canonical articles
    fn normalize_payload(&self, payload: serde_json::Value, ctx: &ProviderContext) -> Result<Vec<Article>>;

    /// Fetches and normalizes in one step
    async fn fetch(&self, options: &FetchOptions) -> Result<Vec<Article>> {
        let payload = self.fetch_payload(options).await?;
        let ctx = ProviderContext::new(self.kind());
        self.normalize_payload(payload, &ctx)
    }
}

pub use guardian::GuardianSource;
pub use newsapi::NewsApiSource;
