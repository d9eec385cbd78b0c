//! Tests for the in-memory repository implementation.

use chrono::{Duration, Utc};
use ouribadah::db::repositories::LocalRepository;
use ouribadah::db::repository::{PrayerLogRepository, RepositoryError};
use ouribadah::models::{
    LocationType, LogId, NewPrayerLogRecord, Prayer, PrayerLogEntry, PrayerStatus,
};

fn record(bucket: &str, submitter: Option<&str>) -> NewPrayerLogRecord {
    NewPrayerLogRecord {
        submitter: submitter.map(str::to_string),
        prayer: Prayer::Fajr,
        status: PrayerStatus::OnTime,
        delay_minutes: None,
        location_type: LocationType::Home,
        geohash5: bucket.to_string(),
        timezone: None,
        logged_at: Utc::now(),
    }
}

fn entry_days_ago(bucket: &str, days_ago: i64) -> PrayerLogEntry {
    PrayerLogEntry {
        id: LogId::new(0),
        submitter: None,
        prayer: Prayer::Isha,
        status: PrayerStatus::OnTime,
        delay_minutes: None,
        location_type: LocationType::Home,
        geohash5: bucket.to_string(),
        timezone: None,
        logged_at: Utc::now() - Duration::days(days_ago),
    }
}

#[tokio::test]
async fn test_insert_assigns_sequential_ids() {
    let repo = LocalRepository::new();

    repo.insert_logs(&[record("u4pru", None), record("u4pru", None)])
        .await
        .unwrap();

    let since = Utc::now() - Duration::days(1);
    let entries = repo.fetch_bucket_entries("u4pru", since).await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].id, LogId::new(1));
    assert_eq!(entries[1].id, LogId::new(2));
}

#[tokio::test]
async fn test_fetch_empty_bucket_is_ok_not_error() {
    let repo = LocalRepository::new();
    let since = Utc::now() - Duration::days(30);

    let entries = repo.fetch_bucket_entries("zzzzz", since).await.unwrap();
    assert!(entries.is_empty());
}

#[tokio::test]
async fn test_fetch_filters_by_bucket() {
    let repo = LocalRepository::new();
    repo.insert_logs(&[record("u4pru", None), record("s0000", None)])
        .await
        .unwrap();

    let since = Utc::now() - Duration::days(1);
    let entries = repo.fetch_bucket_entries("u4pru", since).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].geohash5, "u4pru");
}

#[tokio::test]
async fn test_fetch_respects_since_boundary() {
    let repo = LocalRepository::new();
    repo.insert_entry_at(entry_days_ago("u4pru", 10));
    repo.insert_entry_at(entry_days_ago("u4pru", 2));

    let since = Utc::now() - Duration::days(5);
    let entries = repo.fetch_bucket_entries("u4pru", since).await.unwrap();
    assert_eq!(entries.len(), 1);
}

#[tokio::test]
async fn test_fetch_submitter_ignores_guests() {
    let repo = LocalRepository::new();
    repo.insert_logs(&[record("u4pru", Some("alice")), record("u4pru", None)])
        .await
        .unwrap();

    let since = Utc::now() - Duration::days(1);
    let entries = repo.fetch_submitter_entries("alice", since).await.unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].submitter.as_deref(), Some("alice"));
}

#[tokio::test]
async fn test_unhealthy_repository_fails_operations() {
    let repo = LocalRepository::new();
    repo.set_healthy(false);

    assert!(matches!(
        repo.health_check().await,
        Err(RepositoryError::ConnectionError { .. })
    ));
    assert!(repo.insert_logs(&[record("u4pru", None)]).await.is_err());
    assert!(repo
        .fetch_bucket_entries("u4pru", Utc::now())
        .await
        .is_err());

    // Recovers once healthy again
    repo.set_healthy(true);
    assert!(repo.health_check().await.is_ok());
}

#[tokio::test]
async fn test_clear_preserves_health_flag() {
    let repo = LocalRepository::new();
    repo.insert_logs(&[record("u4pru", None)]).await.unwrap();
    repo.set_healthy(false);

    repo.clear();
    assert_eq!(repo.entry_count(), 0);
    assert!(repo.health_check().await.is_err());
}
