//! Pagination stage

use serde::Serialize;

use crate::metrics::{self, StageTimer};
use crate::schemas::Article;

/// Articles per page when nothing else is configured
pub const DEFAULT_PAGE_SIZE: usize = 12;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub items: Vec<Article>,
    pub page_count: usize,
}

/// Slices out page `page_index` (zero-based). Out-of-range indices yield an
/// empty page; a zero page size yields no pages at all.
pub fn paginate(articles: &[Article], page_size: usize, page_index: usize) -> Page {
    let _timer = StageTimer::new(metrics::STAGE_PAGINATE);

    if page_size == 0 {
        return Page {
            items: Vec::new(),
            page_count: 0,
        };
    }

    let page_count = articles.len().div_ceil(page_size);
    let start = page_index.saturating_mul(page_size).min(articles.len());
    let end = start.saturating_add(page_size).min(articles.len());

    Page {
        items: articles[start..end].to_vec(),
        page_count,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::test_support::article;

    fn items(n: usize) -> Vec<Article> {
        (0..n).map(|i| article(&format!("item-{}", i), "2024-06-01T00:00:00Z")).collect()
    }

    #[test]
    fn test_last_partial_page() {
        let page = paginate(&items(25), 12, 2);
        assert_eq!(page.items.len(), 1);
        assert_eq!(page.page_count, 3);
        assert_eq!(page.items[0].title, "item-24");
    }

    #[test]
    fn test_first_page() {
        let page = paginate(&items(25), 12, 0);
        assert_eq!(page.items.len(), 12);
        assert_eq!(page.items[0].title, "item-0");
    }

    #[test]
    fn test_out_of_range_is_empty() {
        let page = paginate(&items(5), 12, 7);
        assert!(page.items.is_empty());
        assert_eq!(page.page_count, 1);

        let huge = paginate(&items(5), 12, usize::MAX);
        assert!(huge.items.is_empty());
    }

    #[test]
    fn test_empty_input() {
        let page = paginate(&[], 12, 0);
        assert!(page.items.is_empty());
        assert_eq!(page.page_count, 0);
    }

    #[test]
    fn test_zero_page_size() {
        assert_eq!(paginate(&items(3), 0, 0).page_count, 0);
    }
}
