//! Response Cache
//!
//! Keeps normalized provider responses for a fixed TTL so repeated loads of
//! the same category/section do not hit the upstream API again.

use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::debug;

use crate::metrics;
use crate::schemas::Article;
use crate::sources::ProviderKind;

/// Cache key: provider plus the category/section it was fetched for
#[derive(Debug, Clone, Hash, Eq, PartialEq)]
pub struct CacheKey {
    pub provider: ProviderKind,
    pub param: Option<String>,
}

impl CacheKey {
    pub fn new(provider: ProviderKind, param: Option<&str>) -> Self {
        Self {
            provider,
            param: param.map(str::to_string),
        }
    }
}

struct CacheEntry {
    articles: Arc<Vec<Article>>,
    stored_at: Instant,
}

/// In-memory TTL cache of provider responses
#[derive(Clone)]
pub struct ResponseCache {
    entries: Arc<RwLock<HashMap<CacheKey, CacheEntry>>>,
    ttl: Duration,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            entries: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    /// Returns the cached articles if the entry is still fresh
    pub fn get(&self, key: &CacheKey) -> Option<Arc<Vec<Article>>> {
        let entries = self.entries.read();
        let entry = entries.get(key)?;
        if entry.stored_at.elapsed() >= self.ttl {
            return None;
        }

        metrics::record_cache_hit(key.provider.id());
        debug!(provider = %key.provider.id(), param = ?key.param, "Cache hit");
        Some(Arc::clone(&entry.articles))
    }

    pub fn insert(&self, key: CacheKey, articles: Vec<Article>) -> Arc<Vec<Article>> {
        let articles = Arc::new(articles);
        let mut entries = self.entries.write();

        // Drop expired entries while we hold the lock
        let ttl = self.ttl;
        entries.retain(|_, e| e.stored_at.elapsed() < ttl);

        entries.insert(
            key,
            CacheEntry {
                articles: Arc::clone(&articles),
                stored_at: Instant::now(),
            },
        );
        articles
    }

    pub fn invalidate(&self, key: &CacheKey) {
        self.entries.write().remove(key);
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
