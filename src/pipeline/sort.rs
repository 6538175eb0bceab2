//! Sort stage

use std::cmp::Ordering;

use crate::metrics::{self, StageTimer};
use crate::schemas::{Article, SortBy, SortOrder};

/// Returns a newly ordered copy. The sort is stable, so ties keep their
/// incoming (merge) order in both directions.
pub fn sort_articles(articles: &[Article], sort_by: SortBy, sort_order: SortOrder) -> Vec<Article> {
    let _timer = StageTimer::new(metrics::STAGE_SORT);

    let mut sorted = articles.to_vec();
    sorted.sort_by(|a, b| {
        let ordering = compare(a, b, sort_by);
        match sort_order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
    sorted
}

fn compare(a: &Article, b: &Article, sort_by: SortBy) -> Ordering {
    match sort_by {
        SortBy::PublishedAt => a.published_at.cmp(&b.published_at),
        SortBy::Title => a.title.cmp(&b.title),
        SortBy::Source => a.source.name.cmp(&b.source.name),
    }
}
