//! View state published to renderers

use serde::Serialize;

use crate::schemas::Article;

/// Shown when loading finished cleanly but nothing matched
pub const EMPTY_STATE_MESSAGE: &str = "No articles found matching your criteria.";

/// Per-provider fetch state. `Loaded(vec![])` is data; `Loading` is not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ProviderSlot {
    #[default]
    Loading,
    Loaded(Vec<Article>),
    /// Underlying failure detail, for logs
    Failed(String),
}

impl ProviderSlot {
    pub fn articles(&self) -> Option<&[Article]> {
        match self {
            ProviderSlot::Loaded(articles) => Some(articles),
            _ => None,
        }
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, ProviderSlot::Loading)
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, ProviderSlot::Failed(_))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ViewState {
    /// Current page of filtered, sorted articles
    pub items: Vec<Article>,
    pub page_count: usize,
    pub current_page: usize,
    pub loading: bool,
    pub error: Option<String>,
    pub available_categories: Vec<String>,
    pub available_sources: Vec<String>,
    /// Filtered count across all pages
    pub total_results: usize,
    pub has_active_filters: bool,
    pub empty_message: Option<String>,
}
