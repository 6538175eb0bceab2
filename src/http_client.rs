//! HTTP Client Module
//!
//! Provides the HTTP client shared by both providers:
//! - Semaphore-based concurrency limiting
//! - Per-provider rate limiting
//! - Non-success statuses mapped to `NewsError::ApiError`
//!
//! Requests are never retried here. A retry is the caller re-issuing the
//! same fetch.

use governor::{clock::DefaultClock, middleware::NoOpMiddleware, state::NotKeyed, Quota, RateLimiter};
use reqwest::{Client, Request, Response};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::error::{NewsError, Result};
use crate::sources::ProviderKind;

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Maximum concurrent requests across all providers
    pub max_concurrent_requests: usize,
    /// Request timeout
    pub request_timeout: Duration,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            max_concurrent_requests: 4,
            request_timeout: Duration::from_secs(15),
            connect_timeout: Duration::from_secs(5),
            user_agent: format!("newsdeck/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

/// HTTP client with a global concurrency cap
pub struct SharedHttpClient {
    client: Client,
    semaphore: Arc<Semaphore>,
}

impl SharedHttpClient {
    pub fn new(config: HttpClientConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self {
            client,
            semaphore: Arc::new(Semaphore::new(config.max_concurrent_requests.max(1))),
        })
    }

    pub fn with_defaults() -> Result<Self> {
        Self::new(HttpClientConfig::default())
    }

    pub fn inner(&self) -> &Client {
        &self.client
    }

    /// Executes a request once, turning non-success statuses into errors
    pub async fn execute(&self, request: Request) -> Result<Response> {
        let _permit = self
            .semaphore
            .acquire()
            .await
            .map_err(|_| NewsError::ConnectionLost("Semaphore closed".to_string()))?;

        let method = request.method().clone();
        // Query strings carry API keys; only the path is logged.
        let path = request.url().path().to_string();
        debug!(method = %method, path = %path, permits = self.available_permits(), "Executing HTTP request");

        let response = self.client.execute(request).await?;
        let status = response.status();

        if status.is_success() {
            debug!(status = %status, path = %path, "Request succeeded");
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        warn!(status = %status, path = %path, "Upstream returned non-success status");
        Err(NewsError::ApiError {
            code: status.as_u16().to_string(),
            message: body,
        })
    }

    pub fn available_permits(&self) -> usize {
        self.semaphore.available_permits()
    }
}

/// Provider-specific HTTP client with rate limiting
pub struct ProviderHttpClient {
    client: Arc<SharedHttpClient>,
    rate_limiter: RateLimiter<NotKeyed, governor::state::InMemoryState, DefaultClock, NoOpMiddleware>,
    provider: ProviderKind,
}

impl ProviderHttpClient {
    pub fn new(client: Arc<SharedHttpClient>, provider: ProviderKind, rate_limit_rpm: u32) -> Self {
        let rpm = NonZeroU32::new(rate_limit_rpm).unwrap_or(NonZeroU32::MIN);
        Self {
            client,
            rate_limiter: RateLimiter::direct(Quota::per_minute(rpm)),
            provider,
        }
    }

    /// Executes a GET request with query parameters
    pub async fn get_with_query<T: serde::Serialize + ?Sized>(&self, url: &str, query: &T) -> Result<Response> {
        self.rate_limiter.until_ready().await;

        let request = self.client.inner().get(url).query(query).build()?;
        self.client.execute(request).await.map_err(|e| {
            warn!(provider = %self.provider, error = %e, "Provider request failed");
            e
        })
    }
}
