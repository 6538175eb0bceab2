//! Article Schema
//!
//! The canonical article shape every provider is mapped into before merge.
//! Serializes with camelCase keys (`urlToImage`, `publishedAt`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ArticleSource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    pub url: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url_to_image: Option<String>,
    pub published_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    pub source: ArticleSource,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl Article {
    /// Category as used for facet matching: trimmed and lowercased.
    pub fn category_key(&self) -> Option<String> {
        self.category
            .as_deref()
            .map(|c| c.trim().to_lowercase())
            .filter(|c| !c.is_empty())
    }

    /// Short preview text: description, else content, truncated to `max_chars`.
    pub fn excerpt(&self, max_chars: usize) -> String {
        let text = self
            .description
            .as_deref()
            .filter(|d| !d.is_empty())
            .or(self.content.as_deref())
            .unwrap_or("");
        truncate_text(text, max_chars)
    }

    /// Human-readable age of the article relative to `now`.
    pub fn format_published(&self, now: DateTime<Utc>) -> String {
        let elapsed = now.signed_duration_since(self.published_at);
        let minutes = elapsed.num_minutes().max(0);
        let hours = elapsed.num_hours().max(0);
        let days = elapsed.num_days().max(0);

        if hours < 1 {
            format!("{} minute{} ago", minutes, plural(minutes))
        } else if hours < 24 {
            format!("{} hour{} ago", hours, plural(hours))
        } else if days < 7 {
            format!("{} day{} ago", days, plural(days))
        } else {
            self.published_at.format("%b %-d, %Y").to_string()
        }
    }
}

fn plural(n: i64) -> &'static str {
    if n == 1 { "" } else { "s" }
}

/// Cuts `text` to at most `max_chars` characters, appending `...` when cut.
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut.trim())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample() -> Article {
        Article {
            id: "a1".to_string(),
            title: "Chip makers rally".to_string(),
            description: Some("Semiconductor stocks climbed".to_string()),
            content: None,
            url: "https://example.com/chips".to_string(),
            url_to_image: None,
            published_at: Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap(),
            author: Some("Jane Roe".to_string()),
            source: ArticleSource {
                id: Some("reuters".to_string()),
                name: "Reuters".to_string(),
            },
            category: Some(" Tech ".to_string()),
        }
    }

    #[test]
    fn test_camel_case_serialization() {
        let json = serde_json::to_string(&sample()).unwrap();
        assert!(json.contains("publishedAt"));
        assert!(json.contains("\"publishedAt\":\"2024-06-01T12:00:00Z\""));
        assert!(!json.contains("urlToImage"));
    }

    #[test]
    fn test_category_key() {
        assert_eq!(sample().category_key().as_deref(), Some("tech"));

        let mut blank = sample();
        blank.category = Some("   ".to_string());
        assert_eq!(blank.category_key(), None);
    }

    #[test]
    fn test_excerpt_truncates() {
        let article = sample();
        assert_eq!(article.excerpt(200), "Semiconductor stocks climbed");
        assert_eq!(article.excerpt(13), "Semiconductor...");
    }

    #[test]
    fn test_excerpt_falls_back_to_content() {
        let mut article = sample();
        article.description = Some(String::new());
        article.content = Some("Body text".to_string());
        assert_eq!(article.excerpt(150), "Body text");
    }

    #[test]
    fn test_format_published() {
        let article = sample();
        let base = article.published_at;
        assert_eq!(article.format_published(base + chrono::Duration::minutes(1)), "1 minute ago");
        assert_eq!(article.format_published(base + chrono::Duration::hours(5)), "5 hours ago");
        assert_eq!(article.format_published(base + chrono::Duration::days(2)), "2 days ago");
        assert_eq!(article.format_published(base + chrono::Duration::days(30)), "Jun 1, 2024");
    }
}
