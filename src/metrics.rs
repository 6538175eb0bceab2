//! Prometheus Metrics for the Article Pipeline
//!
//! Metrics include:
//! - articles normalized per provider
//! - provider fetch outcomes
//! - response cache hits
//! - pipeline recomputations
//! - latency per stage (histogram)

use once_cell::sync::Lazy;
use prometheus::{
    register_histogram_vec, register_int_counter, register_int_counter_vec, Encoder, HistogramOpts,
    HistogramVec, IntCounter, IntCounterVec, TextEncoder,
};
use tracing::error;

// ============================================
// METRIC DEFINITIONS
// ============================================

/// Stages in the article pipeline
pub const STAGE_NORMALIZE: &str = "normalize";
pub const STAGE_MERGE: &str = "merge";
pub const STAGE_FILTER: &str = "filter";
pub const STAGE_SORT: &str = "sort";
pub const STAGE_PAGINATE: &str = "paginate";

static ARTICLES_NORMALIZED: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "newsdeck_articles_normalized_total",
        "Total number of raw records normalized into articles",
        &["provider"]
    )
    .expect("Failed to create articles_normalized metric")
});

static PROVIDER_FETCHES: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "newsdeck_provider_fetch_total",
        "Provider fetches by outcome",
        &["provider", "status"]
    )
    .expect("Failed to create provider_fetch metric")
});

static CACHE_HITS: Lazy<IntCounterVec> = Lazy::new(|| {
    register_int_counter_vec!(
        "newsdeck_cache_hits_total",
        "Provider payloads served from the response cache",
        &["provider"]
    )
    .expect("Failed to create cache_hits metric")
});

static RECOMPUTATIONS: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "newsdeck_pipeline_recomputations_total",
        "Number of filter/sort/paginate recomputations"
    )
    .expect("Failed to create recomputations metric")
});

// Latency histogram (in seconds)
static STAGE_LATENCY: Lazy<HistogramVec> = Lazy::new(|| {
    let buckets = vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0];
    register_histogram_vec!(
        HistogramOpts::new(
            "newsdeck_stage_latency_seconds",
            "Latency of each pipeline stage in seconds"
        )
        .buckets(buckets),
        &["stage"]
    )
    .expect("Failed to create stage_latency metric")
});

// ============================================
// METRICS API
// ============================================

pub fn record_articles_normalized(provider: &str, count: u64) {
    ARTICLES_NORMALIZED.with_label_values(&[provider]).inc_by(count);
}

pub fn record_fetch_success(provider: &str) {
    PROVIDER_FETCHES.with_label_values(&[provider, "success"]).inc();
}

pub fn record_fetch_failure(provider: &str) {
    PROVIDER_FETCHES.with_label_values(&[provider, "failure"]).inc();
}

pub fn record_cache_hit(provider: &str) {
    CACHE_HITS.with_label_values(&[provider]).inc();
}

pub fn record_recomputation() {
    RECOMPUTATIONS.inc();
}

pub fn record_stage_latency(stage: &str, latency_secs: f64) {
    STAGE_LATENCY.with_label_values(&[stage]).observe(latency_secs);
}

/// Collects all metrics as Prometheus text format
pub fn gather_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();

    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        error!(error = %e, "Failed to encode metrics");
        return String::new();
    }

    String::from_utf8(buffer).unwrap_or_default()
}

/// A timer for measuring stage latency
pub struct StageTimer {
    stage: &'static str,
    start: std::time::Instant,
}

impl StageTimer {
    pub fn new(stage: &'static str) -> Self {
        Self {
            stage,
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for StageTimer {
    fn drop(&mut self) {
        record_stage_latency(self.stage, self.start.elapsed().as_secs_f64());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_metrics() {
        record_articles_normalized("newsapi", 3);
        record_fetch_failure("guardian");
        record_cache_hit("newsapi");
        record_recomputation();

        let metrics = gather_metrics();
        assert!(metrics.contains("newsdeck_articles_normalized_total"));
        assert!(metrics.contains("newsdeck_provider_fetch_total"));
        assert!(metrics.contains("newsdeck_cache_hits_total"));
        assert!(metrics.contains("newsdeck_pipeline_recomputations_total"));
    }

    #[test]
    fn test_stage_timer() {
        {
            let _timer = StageTimer::new(STAGE_FILTER);
        }
        assert!(gather_metrics().contains("newsdeck_stage_latency_seconds"));
    }
}
