//! Query State Controller
//!
//! Single owner of the browsing state:
//! - Provider slots and the merged collection with its facets
//! - Raw and debounced search text
//! - Facet selections, `SearchFilters` and the current page
//!
//! Every mutation recomputes filter → sort → paginate synchronously and
//! publishes a fresh [`ViewState`] on a watch channel.

mod debounce;
mod view;

pub use debounce::{Debouncer, DEFAULT_DEBOUNCE};
pub use view::{ProviderSlot, ViewState, EMPTY_STATE_MESSAGE};

use chrono::{DateTime, Utc};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, warn};

use crate::metrics;
use crate::pipeline::{self, Facets, DEFAULT_PAGE_SIZE};
use crate::schemas::{Article, SearchFilters};
use crate::sources::ProviderKind;

pub struct QueryController {
    newsapi: ProviderSlot,
    guardian: ProviderSlot,
    merged: Vec<Article>,
    facets: Facets,

    search_input: String,
    search_query: String,
    debouncer: Debouncer<String>,

    selected_categories: Vec<String>,
    selected_sources: Vec<String>,
    filters: SearchFilters,

    page_size: usize,
    current_page: usize,
    filtered: Vec<Article>,
    last_filtered_len: Option<usize>,

    /// Fixed "now" for date-range cutoffs; wall clock when unset
    clock: Option<DateTime<Utc>>,
    recomputations: u64,
    view_tx: watch::Sender<ViewState>,
}

impl Default for QueryController {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE_SIZE, DEFAULT_DEBOUNCE)
    }
}

impl QueryController {
    pub fn new(page_size: usize, debounce: Duration) -> Self {
        let (view_tx, _) = watch::channel(ViewState {
            loading: true,
            ..ViewState::default()
        });

        Self {
            newsapi: ProviderSlot::Loading,
            guardian: ProviderSlot::Loading,
            merged: Vec::new(),
            facets: Facets::default(),
            search_input: String::new(),
            search_query: String::new(),
            debouncer: Debouncer::new(debounce),
            selected_categories: Vec::new(),
            selected_sources: Vec::new(),
            filters: SearchFilters::default(),
            page_size: page_size.max(1),
            current_page: 0,
            filtered: Vec::new(),
            last_filtered_len: None,
            clock: None,
            recomputations: 0,
            view_tx,
        }
    }

    /// Pins the clock used for date-range cutoffs
    pub fn with_clock(mut self, now: DateTime<Utc>) -> Self {
        self.clock = Some(now);
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.view_tx.subscribe()
    }

    pub fn view(&self) -> ViewState {
        self.view_tx.borrow().clone()
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn facets(&self) -> &Facets {
        &self.facets
    }

    pub fn merged(&self) -> &[Article] {
        &self.merged
    }

    /// Full filtered and sorted result, before pagination
    pub fn filtered(&self) -> &[Article] {
        &self.filtered
    }

    pub fn search_input(&self) -> &str {
        &self.search_input
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn filters(&self) -> &SearchFilters {
        &self.filters
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn recomputations(&self) -> u64 {
        self.recomputations
    }

    pub fn slot(&self, provider: ProviderKind) -> &ProviderSlot {
        match provider {
            ProviderKind::NewsApi => &self.newsapi,
            ProviderKind::Guardian => &self.guardian,
        }
    }

    pub fn has_active_filters(&self) -> bool {
        !self.search_input.is_empty()
            || !self.search_query.is_empty()
            || !self.selected_categories.is_empty()
            || !self.selected_sources.is_empty()
            || self.filters.is_narrowing()
    }

    // ========================================================================
    // Mutations
    // ========================================================================

    /// Stores a provider result and rebuilds the merged collection and facets
    pub fn set_provider_slot(&mut self, provider: ProviderKind, slot: ProviderSlot) {
        if let ProviderSlot::Failed(ref detail) = slot {
            warn!(provider = %provider.id(), error = %detail, "Provider failed");
        }
        match provider {
            ProviderKind::NewsApi => self.newsapi = slot,
            ProviderKind::Guardian => self.guardian = slot,
        }

        self.merged = pipeline::merge(self.newsapi.articles(), self.guardian.articles());
        self.facets = pipeline::extract_facets(&self.merged);
        debug!(
            merged = self.merged.len(),
            categories = self.facets.categories.len(),
            sources = self.facets.sources.len(),
            "Merged provider data"
        );
        self.recompute();
    }

    /// Raw keystroke input. Only the debounced value reaches the pipeline.
    pub fn set_search_input(&mut self, text: impl Into<String>) {
        let text = text.into();
        self.search_input = text.clone();
        self.debouncer.push(text);
    }

    /// Applies the pending search text if its quiet period has elapsed.
    /// Returns whether a recomputation happened.
    pub fn poll_debounce(&mut self) -> bool {
        match self.debouncer.poll() {
            Some(query) => self.apply_search_query(query),
            None => false,
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.debouncer.deadline()
    }

    /// Waits for the search input to go quiet, then applies it
    pub async fn settle_search(&mut self) -> bool {
        match self.debouncer.settled().await {
            Some(query) => self.apply_search_query(query),
            None => false,
        }
    }

    /// Applies a search immediately, bypassing the debounce
    pub fn commit_search(&mut self, query: impl Into<String>) {
        let query = query.into();
        self.debouncer.cancel();
        self.search_input = query.clone();
        self.search_query = query;
        self.recompute();
    }

    pub fn set_selected_categories(&mut self, categories: Vec<String>) {
        self.selected_categories = categories;
        self.recompute();
    }

    pub fn set_selected_sources(&mut self, sources: Vec<String>) {
        self.selected_sources = sources;
        self.recompute();
    }

    pub fn set_filters(&mut self, filters: SearchFilters) {
        self.filters = filters;
        self.recompute();
    }

    /// Page-change callback from the renderer
    pub fn set_page(&mut self, page_index: usize) {
        self.current_page = page_index;
        self.recompute();
    }

    /// Resets search, selections, filters and page with one recomputation
    pub fn clear_all_filters(&mut self) {
        self.debouncer.cancel();
        self.search_input.clear();
        self.search_query.clear();
        self.selected_categories.clear();
        self.selected_sources.clear();
        self.filters = SearchFilters::default();
        self.current_page = 0;
        self.recompute();
    }

    // ========================================================================
    // Recomputation
    // ========================================================================

    fn apply_search_query(&mut self, query: String) -> bool {
        if query == self.search_query {
            return false;
        }
        self.search_query = query;
        self.recompute();
        true
    }

    fn recompute(&mut self) {
        let now = self.clock.unwrap_or_else(Utc::now);

        let matched = pipeline::apply_filters(
            &self.merged,
            &self.search_query,
            &self.selected_categories,
            &self.selected_sources,
            &self.filters,
            now,
        );
        self.filtered = pipeline::sort_articles(&matched, self.filters.sort_by, self.filters.sort_order);

        if self.last_filtered_len != Some(self.filtered.len()) {
            self.current_page = 0;
            self.last_filtered_len = Some(self.filtered.len());
        }

        let page = pipeline::paginate(&self.filtered, self.page_size, self.current_page);
        let (loading, error) = self.status();
        let empty_message = (!loading && error.is_none() && self.filtered.is_empty())
            .then(|| EMPTY_STATE_MESSAGE.to_string());

        let view = ViewState {
            items: page.items,
            page_count: page.page_count,
            current_page: self.current_page,
            loading,
            error,
            available_categories: self.facets.categories.clone(),
            available_sources: self.facets.sources.clone(),
            total_results: self.filtered.len(),
            has_active_filters: self.has_active_filters(),
            empty_message,
        };

        self.recomputations += 1;
        metrics::record_recomputation();
        debug!(
            results = view.total_results,
            page = view.current_page,
            page_count = view.page_count,
            "Recomputed view"
        );
        self.view_tx.send_replace(view);
    }

    /// NewsAPI is checked first; a failure anywhere clears `loading`
    fn status(&self) -> (bool, Option<String>) {
        for provider in ProviderKind::ALL {
            if self.slot(provider).is_failed() {
                return (false, Some(provider.load_error_message().to_string()));
            }
        }
        let loading = self.newsapi.is_loading() || self.guardian.is_loading();
        (loading, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::test_support::{article, at};
    use crate::schemas::{DateRange, SortBy, SortOrder};
    use tokio::time::advance;

    fn numbered(prefix: &str, n: usize) -> Vec<Article> {
        (0..n)
            .map(|i| {
                let mut a = article(&format!("{}-{:02}", prefix, i), "2024-06-08T00:00:00Z");
                a.category = Some(if i % 2 == 0 { "Tech" } else { "sports" }.to_string());
                a
            })
            .collect()
    }

    fn loaded(newsapi: Vec<Article>, guardian: Vec<Article>) -> QueryController {
        let mut controller = QueryController::default().with_clock(at("2024-06-10T00:00:00Z"));
        controller.set_provider_slot(ProviderKind::NewsApi, ProviderSlot::Loaded(newsapi));
        controller.set_provider_slot(ProviderKind::Guardian, ProviderSlot::Loaded(guardian));
        controller
    }

    #[test]
    fn test_initial_view_is_loading() {
        let controller = QueryController::default();
        let view = controller.view();
        assert!(view.loading);
        assert!(view.items.is_empty());
        assert!(view.empty_message.is_none());
    }

    #[test]
    fn test_one_slot_loaded_shows_nothing() {
        let mut controller = QueryController::default();
        controller.set_provider_slot(ProviderKind::Guardian, ProviderSlot::Loaded(numbered("g", 3)));
        let view = controller.view();
        assert!(view.loading);
        assert!(view.items.is_empty());
        assert!(view.available_categories.is_empty());
    }

    #[test]
    fn test_loaded_view() {
        let controller = loaded(numbered("n", 20), numbered("g", 5));
        let view = controller.view();
        assert!(!view.loading);
        assert_eq!(view.total_results, 25);
        assert_eq!(view.items.len(), 12);
        assert_eq!(view.page_count, 3);
        assert_eq!(view.available_categories, vec!["sports", "tech"]);
        assert_eq!(view.available_sources, vec!["Example"]);
        assert!(!view.has_active_filters);
    }

    #[test]
    fn test_error_precedence_newsapi_first() {
        let mut controller = QueryController::default();
        controller.set_provider_slot(ProviderKind::Guardian, ProviderSlot::Failed("boom".into()));
        assert_eq!(controller.view().error.as_deref(), Some("Error loading Guardian data"));
        assert!(!controller.view().loading);

        controller.set_provider_slot(ProviderKind::NewsApi, ProviderSlot::Failed("boom".into()));
        let view = controller.view();
        assert_eq!(view.error.as_deref(), Some("Error loading NewsAPI data"));
        assert!(view.items.is_empty());
        assert!(view.empty_message.is_none());
    }

    #[test]
    fn test_page_resets_when_filtered_length_changes() {
        let mut controller = loaded(numbered("n", 20), numbered("g", 5));
        controller.set_page(2);
        assert_eq!(controller.view().current_page, 2);
        assert_eq!(controller.view().items.len(), 1);

        // same length keeps the page
        controller.set_filters(SearchFilters::new().sort(SortBy::Title, SortOrder::Asc));
        assert_eq!(controller.view().current_page, 2);

        controller.set_selected_categories(vec!["tech".to_string()]);
        let view = controller.view();
        assert_eq!(view.current_page, 0);
        assert_eq!(view.total_results, 13);
        assert!(view.has_active_filters);
    }

    #[test]
    fn test_out_of_range_page_is_empty() {
        let mut controller = loaded(numbered("n", 3), Vec::new());
        controller.set_page(9);
        let view = controller.view();
        assert!(view.items.is_empty());
        assert_eq!(view.page_count, 1);
    }

    #[test]
    fn test_clear_all_filters_recomputes_once() {
        let mut controller = loaded(numbered("n", 4), Vec::new());
        controller.commit_search("n-01");
        controller.set_selected_sources(vec!["Example".to_string()]);
        controller.set_filters(SearchFilters::new().author("x").date_range(Some(DateRange::Week)));
        assert!(controller.view().has_active_filters);

        let before = controller.recomputations();
        controller.clear_all_filters();
        assert_eq!(controller.recomputations(), before + 1);

        let view = controller.view();
        assert_eq!(view.total_results, 4);
        assert!(!view.has_active_filters);
        assert_eq!(controller.filters(), &SearchFilters::default());
    }

    #[test]
    fn test_empty_state_message() {
        let mut controller = loaded(numbered("n", 4), Vec::new());
        controller.commit_search("no such thing");
        assert_eq!(controller.view().empty_message.as_deref(), Some(EMPTY_STATE_MESSAGE));
    }

    #[test]
    fn test_subscribers_see_updates() {
        let mut controller = QueryController::default();
        let mut rx = controller.subscribe();
        controller.set_provider_slot(ProviderKind::NewsApi, ProviderSlot::Loaded(numbered("n", 2)));
        controller.set_provider_slot(ProviderKind::Guardian, ProviderSlot::Loaded(Vec::new()));
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().total_results, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_typing_burst_recomputes_once() {
        let mut controller = loaded(numbered("n", 12), Vec::new());
        let before = controller.recomputations();

        controller.set_search_input("n");
        advance(Duration::from_millis(40)).await;
        controller.set_search_input("n-");
        advance(Duration::from_millis(40)).await;
        controller.set_search_input("n-1");

        assert!(!controller.poll_debounce());
        assert_eq!(controller.recomputations(), before);

        assert!(controller.settle_search().await);
        assert_eq!(controller.recomputations(), before + 1);
        assert_eq!(controller.search_query(), "n-1");
        assert_eq!(controller.view().total_results, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_after_deadline() {
        let mut controller = loaded(numbered("n", 3), Vec::new());
        controller.set_search_input("n-00");
        let deadline = controller.next_deadline().unwrap();
        tokio::time::sleep_until(deadline).await;
        assert!(controller.poll_debounce());
        assert_eq!(controller.view().total_results, 1);
        assert!(controller.next_deadline().is_none());
    }
}
