//! Prometheus metrics for the HTTP server.
//!
//! HTTP request and authentication metrics live here; cache and catalog
//! metrics are defined in `anitrack_core::metrics` and registered into the
//! same registry.

use once_cell::sync::Lazy;
use prometheus::{
    self, Encoder, HistogramOpts, HistogramVec, IntCounterVec, IntGauge, IntGaugeVec, Opts,
    Registry, TextEncoder,
};

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// HTTP Request Metrics
// =============================================================================

/// HTTP request duration in seconds.
pub static HTTP_REQUEST_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "anitrack_http_request_duration_seconds",
            "HTTP request duration in seconds",
        )
        .buckets(vec![
            0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0,
        ]),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests total count.
pub static HTTP_REQUESTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("anitrack_http_requests_total", "Total HTTP requests"),
        &["method", "path", "status"],
    )
    .unwrap()
});

/// HTTP requests currently in flight.
pub static HTTP_REQUESTS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "anitrack_http_requests_in_flight",
        "Number of HTTP requests currently being processed",
    )
    .unwrap()
});

/// Authentication failures.
pub static AUTH_FAILURES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "anitrack_auth_failures_total",
            "Total authentication failures",
        ),
        &["reason"],
    )
    .unwrap()
});

// =============================================================================
// Cache gauges (collected dynamically)
// =============================================================================

/// Live entries per response cache.
pub static CACHE_ENTRIES: Lazy<IntGaugeVec> = Lazy::new(|| {
    IntGaugeVec::new(
        Opts::new("anitrack_cache_entries", "Entries currently held per cache"),
        &["cache"],
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(HTTP_REQUEST_DURATION.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_TOTAL.clone()))
        .unwrap();
    registry
        .register(Box::new(HTTP_REQUESTS_IN_FLIGHT.clone()))
        .unwrap();
    registry
        .register(Box::new(AUTH_FAILURES_TOTAL.clone()))
        .unwrap();
    registry.register(Box::new(CACHE_ENTRIES.clone())).unwrap();

    // Core metrics (cache lookups, catalog requests, filter matches)
    for metric in anitrack_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer).unwrap();
    String::from_utf8(buffer).unwrap()
}

/// Refresh gauges that mirror application state before encoding.
pub fn collect_dynamic_metrics(state: &crate::state::AppState) {
    for stats in state.catalog().stats() {
        CACHE_ENTRIES
            .with_label_values(&[stats.name.as_str()])
            .set(stats.entries as i64);
    }
}

/// Normalize a path for metric labels (replace IDs with placeholders).
pub fn normalize_path(path: &str) -> String {
    let numeric_regex = regex_lite::Regex::new(r"/\d+(/|$)").unwrap();
    let result = numeric_regex.replace_all(path, "/{id}$1").to_string();

    // Usernames are unbounded too
    match result.strip_prefix("/api/v1/users/") {
        Some(rest) if !rest.is_empty() && rest != "me" && !rest.contains('/') => {
            "/api/v1/users/{username}".to_string()
        }
        _ => result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_path_numeric() {
        let path = "/api/v1/anime/5114";
        assert_eq!(normalize_path(path), "/api/v1/anime/{id}");
    }

    #[test]
    fn test_normalize_path_numeric_middle() {
        let path = "/api/v1/anime/5114/reviews";
        assert_eq!(normalize_path(path), "/api/v1/anime/{id}/reviews");
    }

    #[test]
    fn test_normalize_path_username() {
        assert_eq!(
            normalize_path("/api/v1/users/spike"),
            "/api/v1/users/{username}"
        );
        assert_eq!(normalize_path("/api/v1/users/me"), "/api/v1/users/me");
    }

    #[test]
    fn test_normalize_path_no_ids() {
        let path = "/api/v1/anime/ranking/airing";
        assert_eq!(normalize_path(path), "/api/v1/anime/ranking/airing");
    }

    #[test]
    fn test_encode_metrics_returns_prometheus_format() {
        HTTP_REQUESTS_TOTAL
            .with_label_values(&["GET", "/test", "200"])
            .inc();

        let output = encode_metrics();
        assert!(output.contains("anitrack_http_requests_total"));
        assert!(output.contains("# HELP"));
        assert!(output.contains("# TYPE"));
    }

    #[test]
    fn test_registry_contains_core_metrics() {
        anitrack_core::metrics::CACHE_LOOKUPS
            .with_label_values(&["lists", "hit"])
            .inc();
        HTTP_REQUESTS_IN_FLIGHT.set(0);
        CACHE_ENTRIES.with_label_values(&["lists"]).set(0);

        let output = encode_metrics();

        assert!(output.contains("anitrack_http_requests_in_flight"));
        assert!(output.contains("anitrack_cache_entries"));
        assert!(output.contains("anitrack_cache_lookups_total"));
    }
}
