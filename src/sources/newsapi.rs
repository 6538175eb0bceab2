//! NewsAPI Data Source
//!
//! Fetches US top headlines from NewsAPI.org
//! https://newsapi.org/docs/endpoints/top-headlines

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use super::normalize::ArticleDraft;
use super::{FetchOptions, ProviderContext, ProviderKind, Source};
use crate::error::{NewsError, Result};
use crate::http_client::{ProviderHttpClient, SharedHttpClient};
use crate::metrics;
use crate::schemas::Article;

pub const NEWSAPI_BASE_URL: &str = "https://newsapi.org/v2";

/// NewsAPI response envelope
#[derive(Debug, Deserialize)]
struct NewsApiResponse {
    status: String,
    #[serde(rename = "totalResults")]
    total_results: Option<u32>,
    articles: Option<Vec<NewsApiArticle>>,
    code: Option<String>,
    message: Option<String>,
}

/// Raw NewsAPI article; every field may be missing
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct NewsApiArticle {
    pub id: Option<String>,
    pub source: Option<NewsApiSourceRef>,
    pub author: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub url: Option<String>,
    pub url_to_image: Option<String>,
    pub published_at: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NewsApiSourceRef {
    pub id: Option<String>,
    pub name: Option<String>,
}

/// Maps a NewsAPI record to the canonical article
pub fn normalize(raw: &NewsApiArticle, ctx: &ProviderContext) -> Article {
    let source = raw.source.clone().unwrap_or_default();
    ArticleDraft {
        id: raw.id.clone(),
        title: raw.title.clone(),
        description: raw.description.clone(),
        content: raw.content.clone(),
        url: raw.url.clone(),
        url_to_image: raw.url_to_image.clone(),
        published_at: raw.published_at.clone(),
        author: raw.author.clone(),
        source_id: Some(source.id.unwrap_or_else(|| ProviderKind::NewsApi.id().to_string())),
        source_name: source.name,
        category: raw.category.clone(),
    }
    .finish(ctx)
}

/// NewsAPI data source
pub struct NewsApiSource {
    client: ProviderHttpClient,
    api_key: Option<String>,
    base_url: String,
    country: String,
}

impl NewsApiSource {
    pub fn new(
        http_client: Arc<SharedHttpClient>,
        api_key: Option<String>,
        base_url: impl Into<String>,
        country: impl Into<String>,
        rate_limit_rpm: u32,
    ) -> Self {
        Self {
            client: ProviderHttpClient::new(http_client, ProviderKind::NewsApi, rate_limit_rpm),
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            country: country.into(),
        }
    }

    fn parse_response(payload: serde_json::Value) -> Result<Vec<NewsApiArticle>> {
        let response: NewsApiResponse = serde_json::from_value(payload)?;

        if response.status != "ok" {
            return Err(NewsError::ApiError {
                code: response.code.unwrap_or_else(|| "unknown".to_string()),
                message: response.message.unwrap_or_else(|| "Unknown error".to_string()),
            });
        }

        debug!(total_results = ?response.total_results, "Parsed NewsAPI response");
        Ok(response.articles.unwrap_or_default())
    }
}

#[async_trait]
impl Source for NewsApiSource {
    fn kind(&self) -> ProviderKind {
        ProviderKind::NewsApi
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn fetch_payload(&self, options: &FetchOptions) -> Result<serde_json::Value> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            NewsError::provider(ProviderKind::NewsApi, "API key for NewsAPI is not configured")
        })?;

        let mut params: Vec<(&str, String)> = vec![
            ("country", self.country.clone()),
            ("pageSize", options.page_size.unwrap_or(20).to_string()),
            ("apiKey", api_key.to_string()),
        ];
        if let Some(ref category) = options.param {
            params.push(("category", category.clone()));
        }

        let url = format!("{}/top-headlines", self.base_url);
        debug!(source = "newsapi", category = ?options.param, "Fetching headlines");

        let response = self.client.get_with_query(&url, &params).await?;
        let payload: serde_json::Value = response.json().await?;
        Ok(payload)
    }

    fn normalize_payload(&self, payload: serde_json::Value, ctx: &ProviderContext) -> Result<Vec<Article>> {
        let _timer = metrics::StageTimer::new(metrics::STAGE_NORMALIZE);
        let raw = Self::parse_response(payload)?;
        let articles: Vec<Article> = raw.iter().map(|a| normalize(a, ctx)).collect();

        metrics::record_articles_normalized(ProviderKind::NewsApi.id(), articles.len() as u64);
        info!(source = "newsapi", articles = articles.len(), "Normalized NewsAPI articles");
        Ok(articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn ctx() -> ProviderContext {
        ProviderContext::new(ProviderKind::NewsApi)
            .at(Utc.with_ymd_and_hms(2024, 6, 10, 0, 0, 0).unwrap())
    }

    fn source() -> NewsApiSource {
        let http = Arc::new(SharedHttpClient::with_defaults().unwrap());
        NewsApiSource::new(http, Some("test-key".to_string()), NEWSAPI_BASE_URL, "us", 30)
    }

    #[test]
    fn test_article_parsing() {
        let json = r#"{
            "source": {"id": null, "name": "The Verge"},
            "author": "John Doe",
            "title": "New Phone Announced",
            "description": "A new phone was announced today",
            "url": "https://theverge.com/phone",
            "urlToImage": "https://theverge.com/image.jpg",
            "publishedAt": "2024-01-15T10:00:00Z",
            "content": "Full article content here..."
        }"#;

        let raw: NewsApiArticle = serde_json::from_str(json).unwrap();
        let article = normalize(&raw, &ctx());
        assert_eq!(article.title, "New Phone Announced");
        assert_eq!(article.source.name, "The Verge");
        assert_eq!(article.source.id.as_deref(), Some("newsapi"));
        assert_eq!(article.url_to_image.as_deref(), Some("https://theverge.com/image.jpg"));
        assert_eq!(article.category.as_deref(), Some("general"));
        assert!(article.id.starts_with("newsapi-"));
    }

    #[test]
    fn test_sparse_record_does_not_fail() {
        let raw: NewsApiArticle = serde_json::from_str(r#"{"title": null, "source": {}}"#).unwrap();
        let article = normalize(&raw, &ctx());
        assert_eq!(article.title, "Untitled");
        assert_eq!(article.source.name, "Unknown Source");
        assert_eq!(article.published_at, ctx().ingested_at);
    }

    #[test]
    fn test_explicit_category_is_kept() {
        let raw = NewsApiArticle {
            category: Some("Business".to_string()),
            ..Default::default()
        };
        assert_eq!(normalize(&raw, &ctx()).category.as_deref(), Some("Business"));
    }

    #[test]
    fn test_error_envelope() {
        let payload = serde_json::json!({
            "status": "error",
            "code": "apiKeyInvalid",
            "message": "Your API key is invalid"
        });
        let err = source().normalize_payload(payload, &ctx()).unwrap_err();
        assert!(matches!(err, NewsError::ApiError { ref code, .. } if code == "apiKeyInvalid"));
    }

    #[test]
    fn test_normalize_payload() {
        let payload = serde_json::json!({
            "status": "ok",
            "totalResults": 2,
            "articles": [
                {"title": "One", "url": "https://a.com/1", "publishedAt": "2024-06-01T00:00:00Z", "source": {"name": "A"}},
                {"title": "Two", "url": "https://a.com/2", "publishedAt": "2024-06-02T00:00:00Z", "source": {"id": "a", "name": "A"}}
            ]
        });
        let articles = source().normalize_payload(payload, &ctx()).unwrap();
        assert_eq!(articles.len(), 2);
        assert_eq!(articles[1].source.id.as_deref(), Some("a"));
    }
}
