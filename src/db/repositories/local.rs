//! In-memory local repository implementation.
//!
//! This module provides a local implementation of the prayer log repository
//! suitable for unit testing and local development. All data is stored in
//! memory behind a `RwLock`, providing fast, deterministic, and isolated
//! execution.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::sync::{Arc, RwLock};

use crate::db::repository::{PrayerLogRepository, RepositoryError, RepositoryResult};
use crate::models::{LogId, NewPrayerLogRecord, PrayerLogEntry};

/// In-memory local repository.
///
/// This implementation stores all entries in a Vec, making it ideal for unit
/// tests and local development that need isolation and speed.
#[derive(Clone)]
pub struct LocalRepository {
    data: Arc<RwLock<LocalData>>,
}

struct LocalData {
    entries: Vec<PrayerLogEntry>,

    // ID counter
    next_log_id: i64,

    // Connection health
    is_healthy: bool,
}

impl Default for LocalData {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            next_log_id: 1,
            is_healthy: true,
        }
    }
}

impl LocalRepository {
    /// Create a new empty local repository.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(LocalData::default())),
        }
    }

    /// Set the health status for testing connection failures.
    pub fn set_healthy(&self, healthy: bool) {
        let mut data = self.data.write().unwrap();
        data.is_healthy = healthy;
    }

    /// Clear all entries from the repository.
    pub fn clear(&self) {
        let mut data = self.data.write().unwrap();
        *data = LocalData {
            is_healthy: data.is_healthy,
            ..Default::default()
        };
    }

    /// Get the number of entries stored.
    pub fn entry_count(&self) -> usize {
        self.data.read().unwrap().entries.len()
    }

    /// Insert a pre-built entry directly, bypassing the service layer.
    ///
    /// Helper for setting up test data at arbitrary timestamps. The entry's
    /// id is overwritten with the next available one.
    pub fn insert_entry_at(&self, mut entry: PrayerLogEntry) -> LogId {
        let mut data = self.data.write().unwrap();
        let id = LogId::new(data.next_log_id);
        data.next_log_id += 1;
        entry.id = id;
        data.entries.push(entry);
        id
    }

    /// Helper to check health and return error if unhealthy.
    fn check_health(&self) -> RepositoryResult<()> {
        let data = self.data.read().unwrap();
        if !data.is_healthy {
            return Err(RepositoryError::connection("Database is not healthy"));
        }
        Ok(())
    }
}

impl Default for LocalRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PrayerLogRepository for LocalRepository {
    async fn health_check(&self) -> RepositoryResult<()> {
        self.check_health()
    }

    async fn insert_logs(&self, records: &[NewPrayerLogRecord]) -> RepositoryResult<usize> {
        self.check_health()?;

        let mut data = self.data.write().unwrap();
        for record in records {
            let id = LogId::new(data.next_log_id);
            data.next_log_id += 1;
            data.entries.push(PrayerLogEntry {
                id,
                submitter: record.submitter.clone(),
                prayer: record.prayer,
                status: record.status,
                delay_minutes: record.delay_minutes,
                location_type: record.location_type,
                geohash5: record.geohash5.clone(),
                timezone: record.timezone.clone(),
                logged_at: record.logged_at,
            });
        }
        Ok(records.len())
    }

    async fn fetch_bucket_entries(
        &self,
        bucket: &str,
        since: DateTime<Utc>,
    ) -> RepositoryResult<Vec<PrayerLogEntry>> {
        self.check_health()?;

        let data = self.data.read().unwrap();
        Ok(data
            .entries
            .iter()
            .filter(|e| e.geohash5 == bucket && e.logged_at >= since)
            .cloned()
            .collect())
    }

    async fn fetch_submitter_entries(
        &self,
        submitter: &str,
        since: DateTime<Utc>,
    ) -> RepositoryResult<Vec<PrayerLogEntry>> {
        self.check_health()?;

        let data = self.data.read().unwrap();
        Ok(data
            .entries
            .iter()
            .filter(|e| e.submitter.as_deref() == Some(submitter) && e.logged_at >= since)
            .cloned()
            .collect())
    }
}
