//! Guardian Data Source
//!
//! Fetches section results from The Guardian content API
//! https://open-platform.theguardian.com/documentation/search
//!
//! Guardian records use their own vocabulary: `webTitle`, `webUrl`,
//! `sectionName` and a `fields` object requested via `show-fields`.

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

pub const GUARDIAN_BASE_URL: &str = "https://content.guardianapis.com";
pub const GUARDIAN_SOURCE_NAME: &str = "The Guardian";
const SHOW_FIELDS: &str = "thumbnail,trailText,bodyText";

#[derive(Debug, Deserialize)]
struct GuardianEnvelope {
    response: GuardianResponse,
}

#[derive(Debug, Deserialize)]
struct GuardianResponse {
    status: String,
    total: Option<u32>,
    #[serde(default)]
    results: Vec<GuardianItem>,
    message: Option<String>,
}

/// Raw Guardian search result
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GuardianItem {
    pub id: Option<String>,
    pub section_id: Option<String>,
    pub section_name: Option<String>,
    pub web_publication_date: Option<String>,
    pub web_title: Option<String>,
    pub web_url: Option<String>,
    pub fields: Option<GuardianFields>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct GuardianFields {
    pub thumbnail: Option<String>,
    pub trail_text: Option<String>,
    pub body_text: Option<String>,
    pub byline: Option<String>,
}

/// Maps a Guardian record to the canonical article
pub fn normalize(raw: &GuardianItem, ctx: &ProviderContext) -> Article {
    let fields = raw.fields.clone().unwrap_or_default();
    ArticleDraft {
        id: raw.id.clone(),
        title: raw.web_title.clone(),
        description: fields.trail_text,
        content: fields.body_text,
        url: raw.web_url.clone(),
        url_to_image: fields.thumbnail,
        published_at: raw.web_publication_date.clone(),
        author: fields.byline,
        source_id: Some(ProviderKind::Guardian.id().to_string()),
        source_name: Some(GUARDIAN_SOURCE_NAME.to_string()),
        category: raw.section_name.clone(),
    }
    .finish(ctx)
}

/// Guardian data source
pub struct GuardianSource {
    client: ProviderHttpClient,
    api_key: Option<String>,
    base_url: String,
}

impl GuardianSource {
    pub fn new(
        http_client: Arc<SharedHttpClient>,
        api_key: Option<String>,
        base_url: impl Into<String>,
        rate_limit_rpm: u32,
    ) -> Self {
        Self {
            client: ProviderHttpClient::new(http_client, ProviderKind::Guardian, rate_limit_rpm),
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    fn parse_response(payload: serde_json::Value) -> Result<Vec<GuardianItem>> {
        let envelope: GuardianEnvelope = serde_json::from_value(payload)?;
        let response = envelope.response;

        if response.status != "ok" {
            return Err(NewsError::ApiError {
                code: response.status,
                message: response.message.unwrap_or_else(|| "Unknown error".to_string()),
            });
        }

        debug!(total = ?response.total, "Parsed Guardian response");
        Ok(response.results)
    }
}

#[async_trait]
impl Source for GuardianSource {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Guardian
    }

    fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    async fn fetch_payload(&self, options: &FetchOptions) -> Result<serde_json::Value> {
        let api_key = self.api_key.as_deref().ok_or_else(|| {
            NewsError::provider(ProviderKind::Guardian, "API key for The Guardian is not configured")
        })?;

        let mut params: Vec<(&str, String)> = vec![
            ("show-fields", SHOW_FIELDS.to_string()),
            ("page-size", options.page_size.unwrap_or(20).to_string()),
            ("api-key", api_key.to_string()),
        ];
        if let Some(ref section) = options.param {
            params.push(("section", section.clone()));
        }

        let url = format!("{}/search", self.base_url);
        debug!(source = "guardian", section = ?options.param, "Fetching section");

        let response = self.client.get_with_query(&url, &params).await?;
        let payload: serde_json::Value = response.json().await?;
        Ok(payload)
    }

    fn normalize_payload(&self, payload: serde_json::Value, ctx: &ProviderContext) -> Result<Vec<Article>> {
        let _timer = metrics::StageTimer::new(metrics::STAGE_NORMALIZE);
        let raw = Self::parse_response(payload)?;
        let articles: Vec<Article> = raw.iter().map(|item| normalize(item, ctx)).collect();

        metrics::record_articles_normalized(ProviderKind::Guardian.id(), articles.len() as u64);
        info!(source = "guardian", articles = articles.len(), "Normalized Guardian articles");
        Ok(articles)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn ctx() -> ProviderContext {
        ProviderContext::new(ProviderKind::Guardian)
            .at(Utc.with_ymd_and_hms(2024, 6, 10, 0, 0, 0).unwrap())
    }

    #[test]
    fn test_item_mapping() {
        let json = r#"{
            "id": "technology/2024/jun/08/ai-chips",
            "sectionId": "technology",
            "sectionName": "Technology",
            "webPublicationDate": "2024-06-08T09:30:00Z",
            "webTitle": "AI chip demand surges",
            "webUrl": "https://www.theguardian.com/technology/2024/jun/08/ai-chips",
            "fields": {
                "thumbnail": "https://media.guim.co.uk/abc/500.jpg",
                "trailText": "Demand keeps climbing",
                "bodyText": "Long body",
                "byline": "Alex Hern"
            }
        }"#;
        let raw: GuardianItem = serde_json::from_str(json).unwrap();
        let article = normalize(&raw, &ctx());

        assert_eq!(article.id, "technology/2024/jun/08/ai-chips");
        assert_eq!(article.title, "AI chip demand surges");
        assert_eq!(article.description.as_deref(), Some("Demand keeps climbing"));
        assert_eq!(article.content.as_deref(), Some("Long body"));
        assert_eq!(article.author.as_deref(), Some("Alex Hern"));
        assert_eq!(article.category.as_deref(), Some("Technology"));
        assert_eq!(article.source.name, "The Guardian");
        assert_eq!(article.source.id.as_deref(), Some("guardian"));
        assert_eq!(article.category_key().as_deref(), Some("technology"));
    }

    #[test]
    fn test_missing_fields_object() {
        let raw: GuardianItem = serde_json::from_str(
            r#"{"webTitle": "Bare", "webUrl": "https://www.theguardian.com/x"}"#,
        )
        .unwrap();
        let article = normalize(&raw, &ctx());
        assert_eq!(article.author.as_deref(), Some("Unknown Author"));
        assert_eq!(article.category.as_deref(), Some("general"));
        assert_eq!(article.url_to_image.as_deref(), Some("/images/news-fallback.jpg"));
        assert!(article.id.starts_with("guardian-"));
    }

    #[test]
    fn test_normalize_payload_and_error_status() {
        let http = Arc::new(SharedHttpClient::with_defaults().unwrap());
        let source = GuardianSource::new(http, Some("key".to_string()), GUARDIAN_BASE_URL, 30);

        let ok = serde_json::json!({
            "response": {"status": "ok", "total": 1, "results": [{"webTitle": "One", "webUrl": "https://g.co/1"}]}
        });
        assert_eq!(source.normalize_payload(ok, &ctx()).unwrap().len(), 1);

        let failed = serde_json::json!({"response": {"status": "error", "message": "Invalid section"}});
        assert!(matches!(
            source.normalize_payload(failed, &ctx()),
            Err(NewsError::ApiError { .. })
        ));
    }
}
