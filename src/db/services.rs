//! High-level database service layer.
//!
//! This module provides repository-agnostic operations that work with any
//! implementation of [`PrayerLogRepository`]. These functions contain the
//! business logic that must be consistent regardless of the storage backend:
//! input validation, bucketing of submitted coordinates, window clamping,
//! and the k-anonymity gate applied to bucket aggregates.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Application Layer (HTTP handlers)                       │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Service Layer (services.rs) - Business Logic            │
//! │  - Submission validation and bucketing                   │
//! │  - Window clamping                                       │
//! │  - K-anonymity gate                                      │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//! ┌───────────────────▼─────────────────────────────────────┐
//! │  Repository Trait (repository/) - Abstract Interface     │
//! └───────────────────┬─────────────────────────────────────┘
//!                     │
//!     ┌───────────────┴────────────────┐
//!     │                                 │
//! ┌───▼──────────────┐     ┌──────────▼──────────────┐
//! │ Postgres (Diesel)│     │ Local Repository        │
//! │                  │     │ (in-memory)             │
//! └──────────────────┘     └─────────────────────────┘
//! ```

use chrono::{Duration, Utc};
use log::{info, warn};
use serde::{Deserialize, Serialize};

use super::repository::{ErrorContext, PrayerLogRepository, RepositoryError, RepositoryResult};
use crate::analytics::{
    aggregate_entries, personal_summary as summarize, AggregateOutcome, AggregationPolicy,
    PersonalSummary,
};
use crate::geo::{encode5, is_valid_bucket};
use crate::models::{Coordinate, NewPrayerLog, NewPrayerLogRecord, PrayerStatus};

// ==================== Health & Connection ====================

/// Check if the backing store is healthy.
///
/// This is a simple pass-through to the repository's health check.
pub async fn health_check<R: PrayerLogRepository + ?Sized>(repo: &R) -> RepositoryResult<()> {
    repo.health_check().await
}

// ==================== Submission ====================

/// Result of a successful log submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    /// Number of records inserted.
    pub inserted: usize,
    /// Spatial bucket all records of the batch landed in.
    pub bucket: String,
}

/// Validate and persist a batch of prayer logs.
///
/// The raw coordinate is reduced to its geohash bucket here and never
/// reaches the repository. Delay minutes are kept only for `Delayed`
/// entries; any delay on other statuses is dropped rather than rejected.
///
/// # Arguments
/// * `repo` - Repository implementation
/// * `coordinate` - Submitter's location, already validated by construction
/// * `submitter` - Opaque submitter identifier, if authenticated
/// * `timezone` - IANA timezone name reported by the client
/// * `logs` - The batch; must be non-empty
pub async fn submit_logs<R: PrayerLogRepository + ?Sized>(
    repo: &R,
    coordinate: Coordinate,
    submitter: Option<String>,
    timezone: Option<String>,
    logs: &[NewPrayerLog],
) -> RepositoryResult<SubmissionReceipt> {
    if logs.is_empty() {
        return Err(RepositoryError::validation_with_context(
            "Submission batch is empty",
            ErrorContext::new("submit_logs").with_entity("prayer_log"),
        ));
    }

    for log in logs {
        if let Some(delay) = log.delay_minutes {
            if delay < 0 {
                return Err(RepositoryError::validation_with_context(
                    format!("Negative delay_minutes: {}", delay),
                    ErrorContext::new("submit_logs").with_entity("prayer_log"),
                ));
            }
        }
    }

    let bucket = encode5(coordinate);
    let logged_at = Utc::now();

    let records: Vec<NewPrayerLogRecord> = logs
        .iter()
        .map(|log| NewPrayerLogRecord {
            submitter: submitter.clone(),
            prayer: log.prayer,
            status: log.status,
            delay_minutes: if log.status == PrayerStatus::Delayed {
                log.delay_minutes
            } else {
                None
            },
            location_type: log.location_type,
            geohash5: bucket.clone(),
            timezone: timezone.clone(),
            logged_at,
        })
        .collect();

    let inserted = repo.insert_logs(&records).await?;

    info!(
        "Service layer: inserted {} prayer logs into bucket {}",
        inserted, bucket
    );

    Ok(SubmissionReceipt { inserted, bucket })
}

// ==================== Aggregation ====================

/// Resolve the lookback window for a query.
///
/// `None` falls back to the policy default. Non-positive values are
/// rejected; positive values outside the accepted range are clamped, not
/// rejected, so very long lookbacks degrade gracefully.
fn resolve_window(policy: &AggregationPolicy, days: Option<i64>) -> RepositoryResult<i64> {
    let days = days.unwrap_or(policy.default_window_days);
    if days <= 0 {
        return Err(RepositoryError::validation_with_context(
            format!("Window must be positive, got {}", days),
            ErrorContext::new("resolve_window"),
        ));
    }
    Ok(policy.clamp_window(days))
}

/// Aggregate a bucket's entries over a lookback window.
///
/// The repository returns the raw entries; the k-anonymity gate in
/// [`crate::analytics`] decides whether anything beyond the sample size is
/// disclosed.
///
/// # Arguments
/// * `repo` - Repository implementation
/// * `policy` - Aggregation policy (k-floor and window bounds)
/// * `bucket` - 5-character geohash bucket key
/// * `window_days` - Lookback window; `None` uses the policy default
pub async fn bucket_aggregate<R: PrayerLogRepository + ?Sized>(
    repo: &R,
    policy: &AggregationPolicy,
    bucket: &str,
    window_days: Option<i64>,
) -> RepositoryResult<AggregateOutcome> {
    if !is_valid_bucket(bucket) {
        return Err(RepositoryError::validation_with_context(
            format!("Malformed bucket key: {:?}", bucket),
            ErrorContext::new("bucket_aggregate").with_entity("bucket"),
        ));
    }

    let days = resolve_window(policy, window_days)?;
    let since = Utc::now() - Duration::days(days);

    let entries = repo.fetch_bucket_entries(bucket, since).await?;
    let outcome = aggregate_entries(&entries, policy);

    if outcome.is_suppressed() {
        warn!(
            "Service layer: bucket {} suppressed (k={} < {})",
            bucket,
            outcome.k(),
            policy.k_floor
        );
    } else {
        info!(
            "Service layer: bucket {} aggregated over {} days (k={})",
            bucket,
            days,
            outcome.k()
        );
    }

    Ok(outcome)
}

/// Aggregate the bucket containing a raw coordinate.
///
/// Convenience wrapper for callers that have a location rather than a
/// bucket key; the coordinate is reduced to its bucket and discarded.
pub async fn coordinate_aggregate<R: PrayerLogRepository + ?Sized>(
    repo: &R,
    policy: &AggregationPolicy,
    coordinate: Coordinate,
    window_days: Option<i64>,
) -> RepositoryResult<AggregateOutcome> {
    let bucket = encode5(coordinate);
    bucket_aggregate(repo, policy, &bucket, window_days).await
}

// ==================== Personal Analytics ====================

/// Summarize one submitter's own entries over a lookback window.
///
/// No k-floor applies here; the caller only ever sees their own data.
///
/// # Arguments
/// * `repo` - Repository implementation
/// * `policy` - Aggregation policy (window bounds only)
/// * `submitter` - Opaque submitter identifier; must be non-empty
/// * `window_days` - Lookback window; `None` uses the policy default
pub async fn submitter_summary<R: PrayerLogRepository + ?Sized>(
    repo: &R,
    policy: &AggregationPolicy,
    submitter: &str,
    window_days: Option<i64>,
) -> RepositoryResult<PersonalSummary> {
    if submitter.is_empty() {
        return Err(RepositoryError::validation_with_context(
            "Submitter identifier is empty",
            ErrorContext::new("submitter_summary"),
        ));
    }

    let days = resolve_window(policy, window_days)?;
    let since = Utc::now() - Duration::days(days);

    let entries = repo.fetch_submitter_entries(submitter, since).await?;
    Ok(summarize(&entries))
}
