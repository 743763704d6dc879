// src/metrics.rs
//! Metric names and one-time descriptions. Recording goes through the
//! `metrics` facade; installing an exporter is left to the host process.

use metrics::{describe_counter, describe_histogram};
use once_cell::sync::OnceCell;

pub const ATTEMPTS_TOTAL: &str = "generation_attempts_total";
pub const SUCCESS_TOTAL: &str = "generation_success_total";
pub const FAILURES_TOTAL: &str = "generation_failures_total";
pub const DURATION_MS: &str = "generation_duration_ms";

/// One-time metrics registration (so series show up once an exporter is installed).
pub fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!(ATTEMPTS_TOTAL, "Generation attempts started.");
        describe_counter!(SUCCESS_TOTAL, "Attempts that persisted a content item.");
        describe_counter!(
            FAILURES_TOTAL,
            "Attempts that ended in an error, labelled by error code."
        );
        describe_counter!(
            "dedup_rejected_total",
            "Candidates rejected as near-duplicates of existing content."
        );
        describe_counter!(
            "quota_rejections_total",
            "Attempts refused because the daily quota was exhausted."
        );
        describe_histogram!(DURATION_MS, "Wall time of one generation attempt in milliseconds.");
    });
}
