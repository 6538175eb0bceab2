//! Provider aggregation
//!
//! Fetches both providers concurrently and feeds each result into the
//! controller as it arrives:
//! - Response cache keyed by provider and category/section
//! - Fetch success/failure metrics per provider
//! - Offline loading from saved JSON payloads

use anyhow::Result;
use futures::stream::{FuturesUnordered, StreamExt};
use serde::Serialize;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use crate::cache::{CacheKey, ResponseCache};
use crate::config::Config;
use crate::controller::{ProviderSlot, QueryController};
use crate::http_client::SharedHttpClient;
use crate::metrics;
use crate::sources::{FetchOptions, GuardianSource, NewsApiSource, ProviderContext, ProviderKind, Source};

/// Provider status for the `status` command
#[derive(Debug, Clone, Serialize)]
pub struct ProviderStatus {
    pub provider: ProviderKind,
    pub name: &'static str,
    pub configured: bool,
    pub default_param: String,
}

pub struct Aggregator {
    config: Config,
    correlation_id: String,
    sources: HashMap<ProviderKind, Arc<dyn Source>>,
    cache: ResponseCache,
}

impl Aggregator {
    #[instrument(skip(config), fields(correlation_id = %correlation_id))]
    pub fn new(config: Config, correlation_id: String) -> Result<Self> {
        info!("Initializing aggregator...");

        let http_client = Arc::new(SharedHttpClient::new(config.http_client_config())?);

        let mut sources: HashMap<ProviderKind, Arc<dyn Source>> = HashMap::new();
        sources.insert(
            ProviderKind::NewsApi,
            Arc::new(NewsApiSource::new(
                http_client.clone(),
                config.newsapi_key.clone().filter(|k| !k.is_empty()),
                config.newsapi_base_url.clone(),
                config.newsapi_country.clone(),
                config.provider_rate_limit_rpm,
            )),
        );
        sources.insert(
            ProviderKind::Guardian,
            Arc::new(GuardianSource::new(
                http_client,
                config.guardian_key.clone().filter(|k| !k.is_empty()),
                config.guardian_base_url.clone(),
                config.provider_rate_limit_rpm,
            )),
        );

        if !config.has_newsapi() {
            warn!("NEWSAPI_KEY not set - NewsAPI requests will fail");
        }
        if !config.has_guardian() {
            warn!("GUARDIAN_KEY not set - Guardian requests will fail");
        }

        let cache = ResponseCache::new(config.cache_ttl_duration()?);

        Ok(Self {
            config,
            correlation_id,
            sources,
            cache,
        })
    }

    pub fn cache(&self) -> &ResponseCache {
        &self.cache
    }

    /// Category for NewsAPI, section for the Guardian
    pub fn default_param(&self, provider: ProviderKind) -> &str {
        match provider {
            ProviderKind::NewsApi => &self.config.default_category,
            ProviderKind::Guardian => &self.config.default_section,
        }
    }

    pub fn status(&self) -> Vec<ProviderStatus> {
        ProviderKind::ALL
            .into_iter()
            .map(|provider| ProviderStatus {
                provider,
                name: provider.display_name(),
                configured: self.sources.get(&provider).is_some_and(|s| s.is_configured()),
                default_param: self.default_param(provider).to_string(),
            })
            .collect()
    }

    /// Fetches one provider, serving from cache while fresh
    #[instrument(skip(self, provider), fields(provider = %provider.id(), correlation_id = %self.correlation_id))]
    pub async fn fetch_provider(&self, provider: ProviderKind, param: Option<&str>) -> ProviderSlot {
        let key = CacheKey::new(provider, param);
        if let Some(hit) = self.cache.get(&key) {
            return ProviderSlot::Loaded(hit.as_ref().clone());
        }

        let Some(source) = self.sources.get(&provider) else {
            return ProviderSlot::Failed(format!("{} source not registered", provider.id()));
        };

        let mut options = FetchOptions::new().page_size(self.config.upstream_page_size);
        if let Some(param) = param {
            options = options.param(param);
        }

        match source.fetch(&options).await {
            Ok(articles) => {
                metrics::record_fetch_success(provider.id());
                info!(source = %provider.id(), articles = articles.len(), "Provider fetch completed");
                let articles = self.cache.insert(key, articles);
                ProviderSlot::Loaded(articles.as_ref().clone())
            }
            Err(e) => {
                metrics::record_fetch_failure(provider.id());
                warn!(source = %provider.id(), error = %e, "Provider fetch failed");
                ProviderSlot::Failed(e.to_string())
            }
        }
    }

    /// Fetches both providers concurrently with their default parameters,
    /// handing each slot to the controller in completion order.
    pub async fn load_into(&self, controller: &mut QueryController) {
        let mut pending: FuturesUnordered<_> = ProviderKind::ALL
            .into_iter()
            .map(|provider| async move {
                let param = self.default_param(provider);
                (provider, self.fetch_provider(provider, Some(param)).await)
            })
            .collect();

        while let Some((provider, slot)) = pending.next().await {
            controller.set_provider_slot(provider, slot);
        }
    }

    /// Loads `newsapi.json` and `guardian.json` from `dir` instead of the
    /// network. A missing or malformed file fails that provider's slot.
    pub fn load_fixtures(&self, dir: &Path, controller: &mut QueryController) {
        for provider in ProviderKind::ALL {
            let slot = match self.read_fixture(provider, dir) {
                Ok(slot) => slot,
                Err(e) => {
                    warn!(source = %provider.id(), error = %e, "Failed to load fixture");
                    ProviderSlot::Failed(e.to_string())
                }
            };
            controller.set_provider_slot(provider, slot);
        }
    }

    fn read_fixture(&self, provider: ProviderKind, dir: &Path) -> Result<ProviderSlot> {
        let path = dir.join(format!("{}.json", provider.id()));
        let raw = std::fs::read_to_string(&path)?;
        let payload: serde_json::Value = serde_json::from_str(&raw)?;

        let source = self
            .sources
            .get(&provider)
            .ok_or_else(|| anyhow::anyhow!("{} source not registered", provider.id()))?;
        let ctx = ProviderContext::new(provider);
        let articles = source.normalize_payload(payload, &ctx)?;

        info!(source = %provider.id(), path = %path.display(), articles = articles.len(), "Loaded fixture");
        Ok(ProviderSlot::Loaded(articles))
    }
}
