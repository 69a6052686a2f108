//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - The response cache (lookups, evictions)
//! - The remote anime catalog (requests, latency)
//! - Local filtering (match counts)

use once_cell::sync::Lazy;
use prometheus::{HistogramOpts, HistogramVec, IntCounterVec, Opts};

// =============================================================================
// Cache Metrics
// =============================================================================

/// Cache lookups total by cache and result.
pub static CACHE_LOOKUPS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("anitrack_cache_lookups_total", "Total cache lookups"),
        &["cache", "result"], // result: "hit", "miss", "expired"
    )
    .unwrap()
});

/// Entries evicted because the cache was full.
pub static CACHE_EVICTIONS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "anitrack_cache_evictions_total",
            "Total cache entries evicted by the size bound",
        ),
        &["cache"],
    )
    .unwrap()
});

// =============================================================================
// Catalog Metrics
// =============================================================================

/// Catalog request duration.
pub static CATALOG_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "anitrack_catalog_request_duration_seconds",
            "Duration of remote catalog calls",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["operation"],
    )
    .unwrap()
});

/// Catalog requests total.
pub static CATALOG_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "anitrack_catalog_requests_total",
            "Total remote catalog requests",
        ),
        &["operation", "status"], // status: "success" or CatalogError::kind()
    )
    .unwrap()
});

// =============================================================================
// Browse Metrics
// =============================================================================

/// Records left after local filtering.
pub static FILTER_MATCHES: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "anitrack_filter_matches",
            "Number of records matching the local filter per request",
        )
        .buckets(vec![0.0, 1.0, 5.0, 10.0, 25.0, 50.0, 100.0]),
        &["source"], // "search", "ranking", "genre"
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Cache
        Box::new(CACHE_LOOKUPS.clone()),
        Box::new(CACHE_EVICTIONS.clone()),
        // Catalog
        Box::new(CATALOG_REQUEST_DURATION.clone()),
        Box::new(CATALOG_REQUESTS.clone()),
        // Browse
        Box::new(FILTER_MATCHES.clone()),
    ]
}
