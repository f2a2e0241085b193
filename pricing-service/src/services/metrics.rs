//! Prometheus metrics for pricing-service.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_histogram, register_int_gauge, CounterVec, Histogram,
    IntGauge, TextEncoder,
};

/// Scenario actions by kind and outcome.
pub static SCENARIO_ACTIONS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "pricing_scenario_actions_total",
        "Total number of scenario actions by action and outcome",
        &["action", "outcome"] // apply|reset|promote, applied|skipped|rejected|failed
    )
    .expect("Failed to register scenario_actions_total")
});

/// Scenario rule edits by kind.
pub static RULE_EDITS_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "pricing_rule_edits_total",
        "Total number of scenario rule edits by kind",
        &["kind"] // add, edit, remove
    )
    .expect("Failed to register rule_edits_total")
});

/// Time spent repricing the base lines for the live preview.
pub static PREVIEW_DURATION: Lazy<Histogram> = Lazy::new(|| {
    register_histogram!(
        "pricing_preview_duration_seconds",
        "Preview recomputation duration in seconds",
        vec![0.0001, 0.0005, 0.001, 0.005, 0.01, 0.05, 0.1]
    )
    .expect("Failed to register preview_duration")
});

/// Number of base lines currently loaded.
pub static BASE_LINES: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!("pricing_base_lines", "Number of invoice lines loaded")
        .expect("Failed to register base_lines")
});

/// Initialize all metrics (forces lazy initialization).
pub fn init_metrics() {
    Lazy::force(&SCENARIO_ACTIONS_TOTAL);
    Lazy::force(&RULE_EDITS_TOTAL);
    Lazy::force(&PREVIEW_DURATION);
    Lazy::force(&BASE_LINES);
    Lazy::force(&service_core::middleware::metrics::HTTP_REQUESTS_TOTAL);
    Lazy::force(&service_core::middleware::metrics::HTTP_REQUEST_DURATION);
}

/// Get metrics in Prometheus text format.
pub fn get_metrics() -> String {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    encoder
        .encode_to_string(&metric_families)
        .unwrap_or_default()
}
