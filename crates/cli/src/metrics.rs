//! Prometheus metrics for a CLI run.
//!
//! Core conversion metrics are registered alongside a few run-level ones and
//! written out in text format with `--metrics-file`.

use anyhow::{Context, Result};
use once_cell::sync::Lazy;
use prometheus::{Encoder, IntCounterVec, IntGauge, Opts, Registry, TextEncoder};

/// Global metrics registry.
pub static REGISTRY: Lazy<Registry> = Lazy::new(|| {
    let registry = Registry::new();
    register_metrics(&registry);
    registry
});

// =============================================================================
// Run Metrics
// =============================================================================

/// Wall-clock duration of the last batch in milliseconds.
pub static BATCH_WALL_TIME_MS: Lazy<IntGauge> = Lazy::new(|| {
    IntGauge::new(
        "audiorip_batch_wall_time_ms",
        "Wall-clock duration of the last batch in milliseconds",
    )
    .unwrap()
});

/// Interrupts received during a batch, by the user's answer.
pub static INTERRUPTS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "audiorip_interrupts_total",
            "Ctrl+C presses while a batch was running",
        ),
        &["answer"], // "exit", "continue"
    )
    .unwrap()
});

// =============================================================================
// Registration
// =============================================================================

fn register_metrics(registry: &Registry) {
    registry
        .register(Box::new(BATCH_WALL_TIME_MS.clone()))
        .unwrap();
    registry
        .register(Box::new(INTERRUPTS_TOTAL.clone()))
        .unwrap();

    // Core metrics (tool checks, conversions, batches)
    for metric in audiorip_core::metrics::all_metrics() {
        registry.register(metric).unwrap();
    }
}

/// Encode all metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .context("Failed to encode metrics")?;
    String::from_utf8(buffer).context("Metrics output is not UTF-8")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_includes_core_metrics() {
        audiorip_core::metrics::record_conversion("success", 250);
        INTERRUPTS_TOTAL.with_label_values(&["continue"]).inc();

        let text = encode_metrics().unwrap();
        assert!(text.contains("audiorip_conversions_total"));
        assert!(text.contains("audiorip_interrupts_total"));
    }
}
