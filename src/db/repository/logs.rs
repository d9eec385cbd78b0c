//! Prayer log repository trait.
//!
//! This trait defines the persistence operations the service layer depends
//! on: inserting submitted log records and fetching entries back out by
//! spatial bucket or by submitter for aggregation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::error::RepositoryResult;
use crate::models::{NewPrayerLogRecord, PrayerLogEntry};

/// Repository trait for prayer log operations.
///
/// Implementations back the service layer with either in-memory storage
/// (testing, development) or PostgreSQL (production).
///
/// # Thread Safety
/// Implementations must be `Send + Sync` to work with async Rust.
#[async_trait]
pub trait PrayerLogRepository: Send + Sync {
    /// Check that the backing store is reachable.
    ///
    /// # Returns
    /// * `Ok(())` - The store is healthy
    /// * `Err(RepositoryError)` - If the store cannot be reached
    async fn health_check(&self) -> RepositoryResult<()>;

    /// Insert a batch of fully-formed log records.
    ///
    /// # Arguments
    /// * `records` - Records already stamped with bucket and timestamp
    ///
    /// # Returns
    /// * `Ok(usize)` - Number of records inserted
    /// * `Err(RepositoryError)` - If the insert fails
    async fn insert_logs(&self, records: &[NewPrayerLogRecord]) -> RepositoryResult<usize>;

    /// Fetch all entries in a spatial bucket logged at or after `since`.
    ///
    /// An empty result is `Ok(vec![])`, not an error; "no data" and
    /// "store unreachable" are distinct outcomes.
    ///
    /// # Arguments
    /// * `bucket` - A 5-character geohash bucket key
    /// * `since` - Start of the lookback window (inclusive)
    async fn fetch_bucket_entries(
        &self,
        bucket: &str,
        since: DateTime<Utc>,
    ) -> RepositoryResult<Vec<PrayerLogEntry>>;

    /// Fetch one submitter's entries logged at or after `since`.
    ///
    /// # Arguments
    /// * `submitter` - Opaque submitter identifier
    /// * `since` - Start of the lookback window (inclusive)
    async fn fetch_submitter_entries(
        &self,
        submitter: &str,
        since: DateTime<Utc>,
    ) -> RepositoryResult<Vec<PrayerLogEntry>>;
}
