// src/quota.rs
//! Per-principal daily generation quota.
//!
//! The window is the UTC calendar day containing `now`: `[midnight, midnight + 1d)`.
//! The count comes from the append-only attempt log, so successful and failed
//! attempts both consume quota. Nothing is cached between calls.
//!
//! Failure policy is fail-open: if the log cannot be queried (error or timeout)
//! the check allows the attempt with `count_so_far = 0` and logs a warning.
//!
//! Known limitation: check and record are separate calls, so concurrent
//! attempts by the same principal can over-admit slightly. No locking is done.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use metrics::counter;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;

use crate::store::AttemptLog;
use crate::types::GenerationAttemptLog;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct QuotaStatus {
    pub allowed: bool,
    pub remaining: u64,
    pub count_so_far: u64,
    pub window_start: DateTime<Utc>,
    pub window_resets_at: DateTime<Utc>,
}

/// UTC-day window containing `now`.
pub fn quota_window(now: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = now
        .date_naive()
        .and_hms_opt(0, 0, 0)
        .map(|ndt| ndt.and_utc())
        .unwrap_or(now);
    (start, start + ChronoDuration::days(1))
}

fn status_for(count_so_far: u64, limit: u32, now: DateTime<Utc>) -> QuotaStatus {
    let (window_start, window_resets_at) = quota_window(now);
    let limit = u64::from(limit);
    QuotaStatus {
        allowed: count_so_far < limit,
        remaining: limit.saturating_sub(count_so_far),
        count_so_far,
        window_start,
        window_resets_at,
    }
}

#[derive(Clone)]
pub struct QuotaTracker {
    log: Arc<dyn AttemptLog>,
    call_timeout: Duration,
}

impl QuotaTracker {
    pub fn new(log: Arc<dyn AttemptLog>, call_timeout: Duration) -> Self {
        Self { log, call_timeout }
    }

    pub async fn check_quota(&self, principal_id: &str, limit: u32, now: DateTime<Utc>) -> QuotaStatus {
        let (start, end) = quota_window(now);
        let queried = tokio::time::timeout(
            self.call_timeout,
            self.log.count_attempts(principal_id, start, end),
        )
        .await;

        let count = match queried {
            Ok(Ok(n)) => n,
            Ok(Err(e)) => {
                warn!(target: "quota", "attempt count query failed, allowing: {e:#}");
                0
            }
            Err(_) => {
                warn!(
                    target: "quota",
                    timeout_ms = self.call_timeout.as_millis() as u64,
                    "attempt count query timed out, allowing"
                );
                0
            }
        };

        let status = status_for(count, limit, now);
        if !status.allowed {
            counter!("quota_rejections_total").increment(1);
        }
        status
    }

    /// Append one attempt row. Called once per attempt that passed the quota check.
    pub async fn record_attempt(
        &self,
        principal_id: &str,
        topic_title: Option<&str>,
        succeeded: bool,
        error_message: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<()> {
        let row = GenerationAttemptLog {
            principal_id: principal_id.to_string(),
            timestamp: at,
            topic_title: topic_title.map(str::to_string),
            succeeded,
            error_message: error_message.map(str::to_string),
        };
        tokio::time::timeout(self.call_timeout, self.log.append_attempt(row))
            .await
            .map_err(|_| anyhow!("attempt log append timed out"))?
    }
}
