//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Explorer lookups (requests, latency, retries)
//! - Batch enrichment (records, batches, batch duration)

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, HistogramVec, IntCounterVec, Opts};

// =============================================================================
// Lookup Metrics
// =============================================================================

/// Explorer lookup requests by source and outcome.
pub static LOOKUP_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "enricher_lookup_requests_total",
            "Total explorer lookup requests",
        ),
        &["source", "outcome"], // outcome: "success", "not_found", "parse_error", "error"
    )
    .unwrap()
});

/// Explorer lookup latency in seconds.
pub static LOOKUP_DURATION: Lazy<HistogramVec> = Lazy::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "enricher_lookup_duration_seconds",
            "Duration of a single explorer lookup",
        )
        .buckets(vec![0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
        &["source"],
    )
    .unwrap()
});

/// Lookup retries scheduled after a retryable failure.
pub static LOOKUP_RETRIES: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("enricher_lookup_retries_total", "Total lookup retries"),
        &["source"],
    )
    .unwrap()
});

// =============================================================================
// Batch Metrics
// =============================================================================

/// Records finished by outcome.
pub static RECORDS_PROCESSED: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "enricher_records_processed_total",
            "Total contract records processed",
        ),
        &["outcome"], // "enriched", "not_found", "skipped", "failed"
    )
    .unwrap()
});

/// Batches finished by result.
pub static BATCHES_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("enricher_batches_total", "Total enrichment batches"),
        &["result"], // "success", "partial_failure", "panicked"
    )
    .unwrap()
});

/// Wall-clock batch duration in seconds.
pub static BATCH_DURATION: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "enricher_batch_duration_seconds",
            "Duration of an enrichment batch",
        )
        .buckets(vec![1.0, 5.0, 15.0, 30.0, 60.0, 120.0, 300.0, 600.0, 1800.0]),
    )
    .unwrap()
});

// =============================================================================
// Helper functions
// =============================================================================

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        // Lookups
        Box::new(LOOKUP_REQUESTS.clone()),
        Box::new(LOOKUP_DURATION.clone()),
        Box::new(LOOKUP_RETRIES.clone()),
        // Batches
        Box::new(RECORDS_PROCESSED.clone()),
        Box::new(BATCHES_TOTAL.clone()),
        Box::new(BATCH_DURATION.clone()),
    ]
}
