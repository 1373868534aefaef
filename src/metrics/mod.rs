//! Prometheus metrics for the content pipeline
//!
//! This module provides metrics tracking for:
//! - Cycles: run duration, items by outcome, source fetch failures
//! - Translation: sub-translations by target language and outcome
//! - Moderation: decisions by resulting status and decision path
//!
//! # Usage
//!
//! Call `init_metrics()` at application startup to register all metrics.
//! If initialization fails, metrics operations become no-ops.

use prometheus::{
    register_counter_vec, register_histogram, CounterVec, Encoder, Histogram, TextEncoder,
};
use std::sync::{Mutex, OnceLock};

// ============================================================================
// Metrics Storage
// ============================================================================

/// Container for all pipeline metrics
struct PipelineMetrics {
    cycle_duration: Histogram,
    cycle_items: CounterVec,
    source_failures: CounterVec,
    translations: CounterVec,
    moderation_decisions: CounterVec,
}

/// Global storage for pipeline metrics
static PIPELINE_METRICS: OnceLock<PipelineMetrics> = OnceLock::new();

/// Flag to track if initialization was attempted
static METRICS_INIT_ATTEMPTED: OnceLock<bool> = OnceLock::new();

/// Serializes concurrent `init_metrics` calls
static INIT_LOCK: Mutex<()> = Mutex::new(());

// ============================================================================
// Initialization
// ============================================================================

/// Initialize all Prometheus metrics
///
/// Safe to call more than once; only the first call registers anything.
pub fn init_metrics() -> Result<(), Box<dyn std::error::Error>> {
    let _guard = INIT_LOCK.lock().map_err(|_| "metrics init lock poisoned")?;
    if METRICS_INIT_ATTEMPTED.get().is_some() {
        return Ok(());
    }
    METRICS_INIT_ATTEMPTED.set(true).ok();

    let metrics = PipelineMetrics {
        cycle_duration: register_histogram!(
            "newsbridge_cycle_duration_seconds",
            "Time spent running one pipeline cycle in seconds",
            vec![1.0, 5.0, 10.0, 30.0, 60.0, 120.0, 300.0, 600.0, 1800.0]
        )?,
        cycle_items: register_counter_vec!(
            "newsbridge_cycle_items_total",
            "News items handled by pipeline cycles, by outcome",
            &["outcome"]
        )?,
        source_failures: register_counter_vec!(
            "newsbridge_source_failures_total",
            "Sources that yielded no items because both feed and page failed",
            &["source"]
        )?,
        translations: register_counter_vec!(
            "newsbridge_translations_total",
            "Sub-translations by target language and outcome",
            &["target", "outcome"]
        )?,
        moderation_decisions: register_counter_vec!(
            "newsbridge_moderation_decisions_total",
            "Moderation decisions by resulting status and decision path",
            &["status", "path"]
        )?,
    };

    PIPELINE_METRICS
        .set(metrics)
        .map_err(|_| "Pipeline metrics already initialized")?;

    tracing::info!("Prometheus metrics initialized successfully");
    Ok(())
}

/// Check if metrics have been initialized
pub fn metrics_initialized() -> bool {
    PIPELINE_METRICS.get().is_some()
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Encode all metrics to Prometheus text format
pub fn encode_metrics() -> Result<String, Box<dyn std::error::Error>> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    Ok(String::from_utf8(buffer)?)
}

/// Record the item counts and duration of a finished cycle
pub fn record_cycle(processed: usize, success: usize, skipped: usize, error: usize, duration_secs: f64) {
    let Some(m) = PIPELINE_METRICS.get() else {
        return;
    };

    m.cycle_duration.observe(duration_secs);
    for (outcome, count) in [
        ("processed", processed),
        ("success", success),
        ("skipped", skipped),
        ("error", error),
    ] {
        if count > 0 {
            m.cycle_items
                .with_label_values(&[outcome])
                .inc_by(count as f64);
        }
    }
}

/// Record a source whose feed and page fallback both failed
pub fn record_source_failure(source: &str) {
    if let Some(m) = PIPELINE_METRICS.get() {
        m.source_failures.with_label_values(&[source]).inc();
    }
}

/// Record one sub-translation outcome
pub fn record_translation(target: &str, outcome: &str) {
    if let Some(m) = PIPELINE_METRICS.get() {
        m.translations.with_label_values(&[target, outcome]).inc();
    }
}

/// Record one moderation decision
pub fn record_moderation(status: &str, path: &str) {
    if let Some(m) = PIPELINE_METRICS.get() {
        m.moderation_decisions
            .with_label_values(&[status, path])
            .inc();
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn ensure_metrics_initialized() {
        let _ = init_metrics();
    }

    #[test]
    fn test_init_metrics() {
        let result = init_metrics();
        assert!(result.is_ok());

        // Second call is a no-op
        let result2 = init_metrics();
        assert!(result2.is_ok());
    }

    #[test]
    fn test_metrics_initialized() {
        ensure_metrics_initialized();
        assert!(metrics_initialized());
    }

    #[test]
    fn test_encode_metrics() {
        ensure_metrics_initialized();
        record_translation("zh", "ok");
        let text = encode_metrics().unwrap();
        assert!(text.contains("newsbridge_translations_total"));
    }

    #[test]
    fn test_recording_does_not_panic() {
        ensure_metrics_initialized();
        record_cycle(10, 7, 2, 1, 12.5);
        record_source_failure("Thai Rath");
        record_moderation("APPROVED", "classifier");
    }
}
