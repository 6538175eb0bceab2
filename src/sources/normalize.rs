//! Default table shared by all provider adapters
//!
//! | field        | when                          | value                    |
//! |--------------|-------------------------------|--------------------------|
//! | id           | absent or blank               | hash of canonical URL    |
//! | title        | absent or blank               | `Untitled`               |
//! | url          | absent or blank               | `#`                      |
//! | publishedAt  | absent or not ISO-8601        | ingestion time           |
//! | author       | absent                        | `Unknown Author`         |
//! | source.name  | absent or blank               | `Unknown Source`         |
//! | category     | absent                        | `general`                |
//! | urlToImage   | absent, not http, placeholder | category fallback image  |
//!
//! Fields that must be non-empty treat blank strings as absent. Optional
//! fields keep an empty string as an explicit value.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use tracing::debug;

use super::ProviderContext;
use crate::identity::article_id;
use crate::schemas::{Article, ArticleSource};

pub const DEFAULT_TITLE: &str = "Untitled";
pub const DEFAULT_URL: &str = "#";
pub const DEFAULT_AUTHOR: &str = "Unknown Author";
pub const DEFAULT_SOURCE_NAME: &str = "Unknown Source";
pub const DEFAULT_CATEGORY: &str = "general";

const FALLBACK_IMAGES: &[(&str, &str)] = &[
    ("technology", "/images/tech-fallback.jpg"),
    ("business", "/images/business-fallback.jpg"),
    ("sports", "/images/sports-fallback.jpg"),
    ("entertainment", "/images/entertainment-fallback.jpg"),
    ("health", "/images/health-fallback.jpg"),
    ("science", "/images/science-fallback.jpg"),
];
pub const DEFAULT_FALLBACK_IMAGE: &str = "/images/news-fallback.jpg";

/// Provider-agnostic record after field renaming, before defaults apply
#[derive(Debug, Clone, Default)]
pub struct ArticleDraft {
    pub id: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
    pub content: Option<String>,
    pub url: Option<String>,
    pub url_to_image: Option<String>,
    pub published_at: Option<String>,
    pub author: Option<String>,
    pub source_id: Option<String>,
    pub source_name: Option<String>,
    pub category: Option<String>,
}

impl ArticleDraft {
    /// Applies the default table and produces a canonical article
    pub fn finish(self, ctx: &ProviderContext) -> Article {
        let title = required_text(self.title, DEFAULT_TITLE);
        let url = required_text(self.url, DEFAULT_URL);
        let category = self.category.unwrap_or_else(|| DEFAULT_CATEGORY.to_string());
        let published_at = parse_published(self.published_at.as_deref(), ctx.ingested_at);

        let id = match self.id.filter(|id| !id.trim().is_empty()) {
            Some(id) => id,
            None => article_id(
                ctx.provider.id(),
                Some(url.as_str()),
                &title,
                &published_at.to_rfc3339(),
            ),
        };

        let url_to_image = image_or_fallback(self.url_to_image.as_deref(), &category);

        Article {
            id,
            title,
            description: self.description,
            content: self.content,
            url,
            url_to_image: Some(url_to_image),
            published_at,
            author: Some(self.author.unwrap_or_else(|| DEFAULT_AUTHOR.to_string())),
            source: ArticleSource {
                id: self.source_id,
                name: required_text(self.source_name, DEFAULT_SOURCE_NAME),
            },
            category: Some(category),
        }
    }
}

/// Returns the trimmed value, or `default` when absent or blank
pub fn required_text(value: Option<String>, default: &str) -> String {
    match value {
        Some(v) if !v.trim().is_empty() => v.trim().to_string(),
        _ => default.to_string(),
    }
}

/// Absolute, non-placeholder image URLs are usable as-is
pub fn has_valid_image(url: Option<&str>) -> bool {
    matches!(url, Some(u) if u.starts_with("http") && !u.contains("placeholder"))
}

pub fn fallback_image(category: &str) -> &'static str {
    let key = category.trim().to_lowercase();
    FALLBACK_IMAGES
        .iter()
        .find(|(name, _)| *name == key)
        .map(|(_, path)| *path)
        .unwrap_or(DEFAULT_FALLBACK_IMAGE)
}

pub fn image_or_fallback(url: Option<&str>, category: &str) -> String {
    match url {
        Some(u) if has_valid_image(Some(u)) => u.to_string(),
        _ => fallback_image(category).to_string(),
    }
}

/// Parses an ISO-8601 timestamp, falling back to `ingested_at`.
///
/// Accepts RFC 3339, a date-time without offset, or a bare date. The last
/// two are read as UTC, a bare date at midnight.
pub fn parse_published(value: Option<&str>, ingested_at: DateTime<Utc>) -> DateTime<Utc> {
    let Some(raw) = value.map(str::trim).filter(|v| !v.is_empty()) else {
        return ingested_at;
    };
    match parse_iso8601(raw) {
        Some(dt) => dt,
        None => {
            debug!(value = %raw, "Unparseable publishedAt, using ingestion time");
            ingested_at
        }
    }
}

fn parse_iso8601(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}
