//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Tool availability checks
//! - Per-file conversions (results, durations, concurrency)
//! - Batches

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, IntGauge, Opts};

// =============================================================================
// Tool
// =============================================================================

/// Availability checks total by result.
pub static TOOL_CHECKS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("audiorip_tool_checks_total", "Total ffmpeg availability checks"),
        &["result"], // "available", "unavailable"
    )
    .unwrap()
});

// =============================================================================
// Conversions
// =============================================================================

/// Conversions total by result.
pub static CONVERSIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("audiorip_conversions_total", "Total file conversions"),
        &["result"], // "success", "spawn_failure", "tool_failure"
    )
    .unwrap()
});

/// Conversion duration in seconds.
pub static CONVERSION_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "audiorip_conversion_duration_seconds",
            "Duration of single file conversions",
        )
        .buckets(vec![0.5, 1.0, 2.5, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0, 600.0]),
        &["result"],
    )
    .unwrap()
});

/// Conversions currently running.
pub static CONVERSIONS_IN_FLIGHT: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "audiorip_conversions_in_flight",
        "Number of ffmpeg processes currently running",
    )
    .unwrap()
});

// =============================================================================
// Batches
// =============================================================================

/// Batches started total.
pub static BATCHES_TOTAL: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new("audiorip_batches_total", "Total batches started").unwrap()
});

/// Files per batch.
pub static BATCH_SIZE: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new("audiorip_batch_size", "Number of files per batch")
            .buckets(vec![1.0, 2.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0]),
    )
    .unwrap()
});

/// Records one finished conversion.
pub fn record_conversion(result: &str, duration_ms: u64) {
    CONVERSIONS_TOTAL.with_label_values(&[result]).inc();
    CONVERSION_DURATION
        .with_label_values(&[result])
        .observe(duration_ms as f64 / 1000.0);
}

/// Returns all core metrics for registration.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(TOOL_CHECKS.clone()),
        Box::new(CONVERSIONS_TOTAL.clone()),
        Box::new(CONVERSION_DURATION.clone()),
        Box::new(CONVERSIONS_IN_FLIGHT.clone()),
        Box::new(BATCHES_TOTAL.clone()),
        Box::new(BATCH_SIZE.clone()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_conversion_increments_counter() {
        let before = CONVERSIONS_TOTAL.with_label_values(&["spawn_failure"]).get();
        record_conversion("spawn_failure", 1500);
        let after = CONVERSIONS_TOTAL.with_label_values(&["spawn_failure"]).get();
        assert!(after > before);
    }

    #[test]
    fn test_all_metrics_register() {
        let registry = prometheus::Registry::new();
        for metric in all_metrics() {
            registry.register(metric).unwrap();
        }
        // Touch a labelled metric so it shows up in the gather output.
        TOOL_CHECKS.with_label_values(&["available"]);
        let names: Vec<String> = registry
            .gather()
            .iter()
            .map(|f| f.get_name().to_string())
            .collect();
        assert!(names.contains(&"audiorip_batches_total".to_string()));
        assert!(names.contains(&"audiorip_tool_checks_total".to_string()));
    }

    #[test]
    fn test_batch_size_is_unlabelled() {
        let before = BATCH_SIZE.get_sample_count();
        BATCH_SIZE.observe(3.0);
        assert!(BATCH_SIZE.get_sample_count() > before);

        let registry = prometheus::Registry::new();
        registry.register(Box::new(BATCH_SIZE.clone())).unwrap();
        let families = registry.gather();
        let family = families
            .iter()
            .find(|f| f.get_name() == "audiorip_batch_size")
            .unwrap();
        assert!(family.get_metric()[0].get_label().is_empty());
    }
}
