//! Merge & facet extraction
//!
//! Combines both providers' articles into one newest-first collection and
//! derives the category/source facet lists from it.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::metrics::{self, StageTimer};
use crate::schemas::Article;

/// Distinct values available for facet selection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Facets {
    /// Trimmed, lowercased, sorted
    pub categories: Vec<String>,
    /// Trimmed, case preserved, sorted
    pub sources: Vec<String>,
}

/// Concatenates both lists and orders them newest first.
///
/// `None` means the provider has not produced data yet; the result is then
/// empty even if the other side is loaded.
pub fn merge(list_a: Option<&[Article]>, list_b: Option<&[Article]>) -> Vec<Article> {
    let (Some(a), Some(b)) = (list_a, list_b) else {
        return Vec::new();
    };

    let _timer = StageTimer::new(metrics::STAGE_MERGE);
    let mut merged: Vec<Article> = a.iter().chain(b.iter()).cloned().collect();
    // sort_by is stable: equal timestamps keep provider order.
    merged.sort_by(|x, y| y.published_at.cmp(&x.published_at));
    merged
}

pub fn extract_facets(articles: &[Article]) -> Facets {
    let mut categories = BTreeSet::new();
    let mut sources = BTreeSet::new();

    for article in articles {
        if let Some(category) = article.category_key() {
            categories.insert(category);
        }
        let source = article.source.name.trim();
        if !source.is_empty() {
            sources.insert(source.to_string());
        }
    }

    Facets {
        categories: categories.into_iter().collect(),
        sources: sources.into_iter().collect(),
    }
}
