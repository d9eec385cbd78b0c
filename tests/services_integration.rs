use chrono::{Duration, Utc};
use ouribadah::analytics::{AggregateOutcome, AggregationPolicy};
use ouribadah::db::repositories::LocalRepository;
use ouribadah::db::repository::PrayerLogRepository;
use ouribadah::db::services::{
    bucket_aggregate, coordinate_aggregate, health_check, submit_logs, submitter_summary,
};
use ouribadah::geo::encode5;
use ouribadah::models::{
    Coordinate, LocationType, LogId, NewPrayerLog, Prayer, PrayerLogEntry, PrayerStatus,
};

fn coord(lat: f64, lon: f64) -> Coordinate {
    Coordinate::new(lat, lon).unwrap()
}

fn log(prayer: Prayer, status: PrayerStatus, delay: Option<i32>) -> NewPrayerLog {
    NewPrayerLog {
        prayer,
        status,
        delay_minutes: delay,
        location_type: LocationType::Home,
    }
}

fn entry_in_bucket(
    bucket: &str,
    submitter: Option<&str>,
    status: PrayerStatus,
    delay: Option<i32>,
    days_ago: i64,
) -> PrayerLogEntry {
    PrayerLogEntry {
        id: LogId::new(0),
        submitter: submitter.map(str::to_string),
        prayer: Prayer::Fajr,
        status,
        delay_minutes: delay,
        location_type: LocationType::Masjid,
        geohash5: bucket.to_string(),
        timezone: Some("Europe/London".to_string()),
        logged_at: Utc::now() - Duration::days(days_ago),
    }
}

fn seed_bucket(repo: &LocalRepository, bucket: &str, count: usize, days_ago: i64) {
    for _ in 0..count {
        repo.insert_entry_at(entry_in_bucket(
            bucket,
            None,
            PrayerStatus::OnTime,
            None,
            days_ago,
        ));
    }
}

#[tokio::test]
async fn test_health_check() {
    let repo = LocalRepository::new();
    assert!(health_check(&repo).await.is_ok());
}

#[tokio::test]
async fn test_submit_batch_lands_in_one_bucket() {
    let repo = LocalRepository::new();
    let location = coord(48.8584, 2.2945);

    let logs = vec![
        log(Prayer::Fajr, PrayerStatus::OnTime, None),
        log(Prayer::Dhuhr, PrayerStatus::Delayed, Some(15)),
        log(Prayer::Asr, PrayerStatus::Qada, None),
    ];

    let receipt = submit_logs(&repo, location, Some("user-7".to_string()), None, &logs)
        .await
        .unwrap();

    assert_eq!(receipt.inserted, 3);
    assert_eq!(receipt.bucket, encode5(location));
    assert_eq!(repo.entry_count(), 3);
}

#[tokio::test]
async fn test_submit_rejects_empty_batch() {
    let repo = LocalRepository::new();
    let result = submit_logs(&repo, coord(0.0, 0.0), None, None, &[]).await;

    assert!(result.is_err());
    assert_eq!(repo.entry_count(), 0);
}

#[tokio::test]
async fn test_submit_rejects_negative_delay() {
    let repo = LocalRepository::new();
    let logs = vec![log(Prayer::Isha, PrayerStatus::Delayed, Some(-5))];

    let result = submit_logs(&repo, coord(0.0, 0.0), None, None, &logs).await;
    assert!(result.is_err());
    assert_eq!(repo.entry_count(), 0);
}

#[tokio::test]
async fn test_submit_drops_delay_on_non_delayed_status() {
    let repo = LocalRepository::new();
    let location = coord(51.5074, -0.1278);
    let logs = vec![log(Prayer::Maghrib, PrayerStatus::OnTime, Some(10))];

    submit_logs(&repo, location, None, None, &logs).await.unwrap();

    let since = Utc::now() - Duration::days(1);
    let entries = repo
        .fetch_bucket_entries(&encode5(location), since)
        .await
        .unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0].delay_minutes, None);
}

#[tokio::test]
async fn test_aggregate_suppressed_below_floor() {
    let repo = LocalRepository::new();
    let policy = AggregationPolicy::default();
    seed_bucket(&repo, "u09tu", 19, 1);

    let outcome = bucket_aggregate(&repo, &policy, "u09tu", Some(30))
        .await
        .unwrap();

    assert_eq!(outcome, AggregateOutcome::Suppressed { k: 19 });
}

#[tokio::test]
async fn test_aggregate_disclosed_at_floor() {
    let repo = LocalRepository::new();
    let policy = AggregationPolicy::default();
    seed_bucket(&repo, "u09tu", 20, 1);

    let outcome = bucket_aggregate(&repo, &policy, "u09tu", Some(30))
        .await
        .unwrap();

    match outcome {
        AggregateOutcome::Disclosed(agg) => {
            assert_eq!(agg.k, 20);
            assert_eq!(agg.counts.on_time + agg.counts.delayed + agg.counts.qada, 20);
            assert_eq!(agg.avg_delay_min, 0.0);
        }
        other => panic!("expected disclosure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_aggregate_window_excludes_old_entries() {
    let repo = LocalRepository::new();
    let policy = AggregationPolicy::default();
    // 20 recent entries, 5 ancient ones in the same bucket.
    seed_bucket(&repo, "u09tu", 20, 1);
    seed_bucket(&repo, "u09tu", 5, 400);

    let outcome = bucket_aggregate(&repo, &policy, "u09tu", Some(30))
        .await
        .unwrap();

    assert_eq!(outcome.k(), 20);
}

#[tokio::test]
async fn test_aggregate_clamps_short_window_up() {
    let repo = LocalRepository::new();
    let policy = AggregationPolicy::default();
    // Entries 5 days old: outside a literal 1-day window, inside the
    // 7-day minimum the window is clamped up to.
    seed_bucket(&repo, "u09tu", 20, 5);

    let outcome = bucket_aggregate(&repo, &policy, "u09tu", Some(1))
        .await
        .unwrap();

    assert_eq!(outcome.k(), 20);
}

#[tokio::test]
async fn test_aggregate_clamps_long_window_down() {
    let repo = LocalRepository::new();
    let policy = AggregationPolicy::default();
    // Entries 400 days old stay excluded even when the caller asks for
    // a 10-year window; it is clamped down to 365 days.
    seed_bucket(&repo, "u09tu", 20, 400);

    let outcome = bucket_aggregate(&repo, &policy, "u09tu", Some(3650))
        .await
        .unwrap();

    assert_eq!(outcome.k(), 0);
    assert!(outcome.is_suppressed());
}

#[tokio::test]
async fn test_aggregate_rejects_non_positive_window() {
    let repo = LocalRepository::new();
    let policy = AggregationPolicy::default();

    assert!(bucket_aggregate(&repo, &policy, "u09tu", Some(0))
        .await
        .is_err());
    assert!(bucket_aggregate(&repo, &policy, "u09tu", Some(-7))
        .await
        .is_err());
}

#[tokio::test]
async fn test_aggregate_rejects_malformed_bucket() {
    let repo = LocalRepository::new();
    let policy = AggregationPolicy::default();

    assert!(bucket_aggregate(&repo, &policy, "bad", None).await.is_err());
    assert!(bucket_aggregate(&repo, &policy, "u4pra", None).await.is_err());
}

#[tokio::test]
async fn test_coordinate_aggregate_matches_bucket_aggregate() {
    let repo = LocalRepository::new();
    let policy = AggregationPolicy::default();
    let location = coord(48.858370, 2.294481);
    let bucket = encode5(location);
    seed_bucket(&repo, &bucket, 25, 1);

    let by_coord = coordinate_aggregate(&repo, &policy, location, Some(30))
        .await
        .unwrap();
    let by_bucket = bucket_aggregate(&repo, &policy, &bucket, Some(30))
        .await
        .unwrap();

    assert_eq!(by_coord, by_bucket);
}

#[tokio::test]
async fn test_submitter_summary_only_sees_own_entries() {
    let repo = LocalRepository::new();
    let policy = AggregationPolicy::default();

    repo.insert_entry_at(entry_in_bucket(
        "u09tu",
        Some("alice"),
        PrayerStatus::Delayed,
        Some(12),
        2,
    ));
    repo.insert_entry_at(entry_in_bucket(
        "u09tu",
        Some("alice"),
        PrayerStatus::OnTime,
        None,
        3,
    ));
    repo.insert_entry_at(entry_in_bucket(
        "u09tu",
        Some("bob"),
        PrayerStatus::Qada,
        None,
        2,
    ));

    let summary = submitter_summary(&repo, &policy, "alice", Some(30))
        .await
        .unwrap();

    assert_eq!(summary.total, 2);
    assert_eq!(summary.counts.delayed, 1);
    assert_eq!(summary.counts.qada, 0);
    assert_eq!(summary.avg_delay_min, 12.0);
}

#[tokio::test]
async fn test_submitter_summary_no_k_floor() {
    // A single entry is disclosed; the k-floor only applies to buckets.
    let repo = LocalRepository::new();
    let policy = AggregationPolicy::default();

    repo.insert_entry_at(entry_in_bucket(
        "u09tu",
        Some("carol"),
        PrayerStatus::OnTime,
        None,
        1,
    ));

    let summary = submitter_summary(&repo, &policy, "carol", None).await.unwrap();
    assert_eq!(summary.total, 1);
}

#[tokio::test]
async fn test_submitter_summary_rejects_empty_identifier() {
    let repo = LocalRepository::new();
    let policy = AggregationPolicy::default();

    assert!(submitter_summary(&repo, &policy, "", None).await.is_err());
}

#[tokio::test]
async fn test_submitter_summary_series_is_date_sorted() {
    let repo = LocalRepository::new();
    let policy = AggregationPolicy::default();

    for days_ago in [9, 2, 5, 2] {
        repo.insert_entry_at(entry_in_bucket(
            "u09tu",
            Some("dave"),
            PrayerStatus::OnTime,
            None,
            days_ago,
        ));
    }

    let summary = submitter_summary(&repo, &policy, "dave", Some(30))
        .await
        .unwrap();

    assert_eq!(summary.series.len(), 3);
    let dates: Vec<_> = summary.series.iter().map(|d| d.date).collect();
    let mut sorted = dates.clone();
    sorted.sort();
    assert_eq!(dates, sorted);
}
