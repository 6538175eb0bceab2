//! Article pipeline
//!
//! Implements: merge → filter → sort → paginate
//!
//! Every stage is a pure function over slices; the controller owns the
//! state and decides when to run them.

pub mod filter;
pub mod merge;
pub mod paginate;
pub mod sort;

pub use filter::apply_filters;
pub use merge::{extract_facets, merge, Facets};
pub use paginate::{paginate, Page, DEFAULT_PAGE_SIZE};
pub use sort::sort_articles;

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::{DateTime, Utc};

    use crate::schemas::{Article, ArticleSource};

    pub fn at(ts: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(ts).unwrap().with_timezone(&Utc)
    }

    pub fn article(title: &str, published_at: &str) -> Article {
        Article {
            id: format!("id-{}", title),
            title: title.to_string(),
            description: None,
            content: None,
            url: format!("https://example.com/{}", title),
            url_to_image: None,
            published_at: at(published_at),
            author: None,
            source: ArticleSource {
                id: None,
                name: "Example".to_string(),
            },
            category: Some("general".to_string()),
        }
    }
}
