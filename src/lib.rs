//! newsdeck
//! Multi-provider news aggregation with client-side filtering
//!
//! Features:
//! - NewsAPI and Guardian adapters normalizing into one `Article` model
//! - Documented defaults for every missing upstream field
//! - Newest-first merge with category/source facets
//! - Text search, facet, author and date-range filters
//! - Stable sort and pagination
//! - Debounced search input and single-owner view state
//! - TTL response cache, rate limiting and concurrency limits
//! - Persistent recent searches
//! - Prometheus metrics per pipeline stage

pub mod aggregator;
pub mod cache;
pub mod config;
pub mod controller;
pub mod error;
pub mod http_client;
pub mod identity;
pub mod metrics;
pub mod pipeline;
pub mod recent_searches;
pub mod schemas;
pub mod sources;

pub use aggregator::Aggregator;
pub use config::Config;
pub use controller::{ProviderSlot, QueryController, ViewState};
pub use error::{NewsError, Result};
pub use schemas::{Article, ArticleSource, DateRange, SearchFilters, SortBy, SortOrder};
pub use sources::ProviderKind;
