//! Filter stage
//!
//! Applies, in order: text search, category facet, source facet, author
//! substring, date range. Every stage keeps the relative order of the
//! articles it lets through.

use chrono::{DateTime, Utc};

use crate::metrics::{self, StageTimer};
use crate::schemas::{Article, SearchFilters};

pub fn apply_filters(
    articles: &[Article],
    search_query: &str,
    selected_categories: &[String],
    selected_sources: &[String],
    filters: &SearchFilters,
    now: DateTime<Utc>,
) -> Vec<Article> {
    let _timer = StageTimer::new(metrics::STAGE_FILTER);

    let query = search_query.to_lowercase();
    let author = filters.author.to_lowercase();
    let cutoff = filters.date_range.map(|range| range.cutoff(now));

    articles
        .iter()
        .filter(|a| query.is_empty() || matches_query(a, &query))
        .filter(|a| selected_categories.is_empty() || matches_category(a, selected_categories))
        .filter(|a| selected_sources.is_empty() || selected_sources.contains(&a.source.name))
        .filter(|a| author.is_empty() || contains_lower(a.author.as_deref(), &author))
        .filter(|a| cutoff.map_or(true, |c| a.published_at >= c))
        .cloned()
        .collect()
}

fn matches_query(article: &Article, query: &str) -> bool {
    contains_lower(Some(&article.title), query)
        || contains_lower(article.description.as_deref(), query)
        || contains_lower(article.author.as_deref(), query)
        || contains_lower(article.category.as_deref(), query)
}

fn matches_category(article: &Article, selected: &[String]) -> bool {
    article
        .category_key()
        .is_some_and(|key| selected.iter().any(|s| *s == key))
}

/// `needle` must already be lowercase
fn contains_lower(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::test_support::{article, at};
    use crate::schemas::DateRange;

    fn corpus() -> Vec<Article> {
        let mut tech = article("Rust 2.0 released", "2024-06-08T00:00:00Z");
        tech.category = Some("Tech".to_string());
        tech.author = Some("Ferris Crab".to_string());
        tech.source.name = "Wired".to_string();

        let mut sport = article("Cup final recap", "2024-06-01T00:00:00Z");
        sport.category = Some("sports".to_string());
        sport.description = Some("A late rust-coloured sunset goal".to_string());
        sport.source.name = "BBC News".to_string();

        let mut biz = article("Markets rally", "2023-01-01T00:00:00Z");
        biz.category = Some("business".to_string());
        biz.author = Some("Jane Roe".to_string());
        biz.source.name = "wired".to_string();

        vec![tech, sport, biz]
    }

    fn titles(items: &[Article]) -> Vec<&str> {
        items.iter().map(|a| a.title.as_str()).collect()
    }

    fn run(query: &str, cats: &[&str], sources: &[&str], filters: &SearchFilters) -> Vec<Article> {
        let cats: Vec<String> = cats.iter().map(|s| s.to_string()).collect();
        let sources: Vec<String> = sources.iter().map(|s| s.to_string()).collect();
        apply_filters(&corpus(), query, &cats, &sources, filters, at("2024-06-10T00:00:00Z"))
    }

    #[test]
    fn test_no_filters_pass_everything() {
        let result = run("", &[], &[], &SearchFilters::default());
        assert_eq!(titles(&result), vec!["Rust 2.0 released", "Cup final recap", "Markets rally"]);
    }

    #[test]
    fn test_text_search_is_case_insensitive_across_fields() {
        let result = run("RUST", &[], &[], &SearchFilters::default());
        assert_eq!(titles(&result), vec!["Rust 2.0 released", "Cup final recap"]);

        let by_author = run("jane", &[], &[], &SearchFilters::default());
        assert_eq!(titles(&by_author), vec!["Markets rally"]);

        let by_category = run("sport", &[], &[], &SearchFilters::default());
        assert_eq!(titles(&by_category), vec!["Cup final recap"]);
    }

    #[test]
    fn test_category_facet_uses_normalized_category() {
        let result = run("", &["tech"], &[], &SearchFilters::default());
        assert_eq!(titles(&result), vec!["Rust 2.0 released"]);
    }

    #[test]
    fn test_source_facet_is_case_sensitive() {
        let result = run("", &[], &["Wired"], &SearchFilters::default());
        assert_eq!(titles(&result), vec!["Rust 2.0 released"]);
    }

    #[test]
    fn test_author_filter() {
        let filters = SearchFilters::new().author("CRAB");
        assert_eq!(titles(&run("", &[], &[], &filters)), vec!["Rust 2.0 released"]);
    }

    #[test]
    fn test_week_range() {
        let filters = SearchFilters::new().date_range(Some(DateRange::Week));
        assert_eq!(titles(&run("", &[], &[], &filters)), vec!["Rust 2.0 released"]);
    }

    #[test]
    fn test_year_range() {
        let filters = SearchFilters::new().date_range(Some(DateRange::Year));
        assert_eq!(
            titles(&run("", &[], &[], &filters)),
            vec!["Rust 2.0 released", "Cup final recap"]
        );
    }

    #[test]
    fn test_stages_combine_with_and() {
        let filters = SearchFilters::new().date_range(Some(DateRange::Month));
        let result = run("rust", &["sports", "tech"], &["BBC News"], &filters);
        assert_eq!(titles(&result), vec!["Cup final recap"]);
    }

    #[test]
    fn test_category_filter_skips_articles_without_category() {
        let mut bare = article("No category", "2024-06-08T00:00:00Z");
        bare.category = None;
        let selected = vec!["general".to_string()];
        let result = apply_filters(&[bare], "", &selected, &[], &SearchFilters::default(), at("2024-06-10T00:00:00Z"));
        assert!(result.is_empty());
    }
}
