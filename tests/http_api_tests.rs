//! Tests for the HTTP layer: router construction and DTO wire shapes.

#![cfg(feature = "http-server")]

use axum::extract::Query;

use ouribadah::analytics::{
    aggregate_entries, AggregateOutcome, AggregationPolicy, BucketAggregate, StatusCounts,
};
use ouribadah::http::dto::{AggregateResponse, QiblaQuery, SubmitLogsRequest};
use ouribadah::http::handlers::get_qibla;
use ouribadah::http::{create_router, AppState};
use ouribadah::models::Prayer;

fn sample_disclosed() -> AggregateOutcome {
    let mut per_prayer = std::collections::BTreeMap::new();
    for prayer in Prayer::ALL {
        per_prayer.insert(prayer, StatusCounts::default());
    }
    AggregateOutcome::Disclosed(BucketAggregate {
        k: 24,
        counts: StatusCounts {
            on_time: 20,
            delayed: 3,
            qada: 1,
        },
        avg_delay_min: 12.5,
        per_prayer,
    })
}

#[test]
fn test_router_creation_with_local_repository() {
    let repo = ouribadah::db::RepositoryFactory::create_local();
    let state = AppState::new(repo, AggregationPolicy::default());
    let _router = create_router(state);
}

#[test]
fn test_router_creation_shares_policy() {
    let repo = ouribadah::db::RepositoryFactory::create_local();
    let policy = AggregationPolicy {
        k_floor: 5,
        ..Default::default()
    };
    let state = AppState::new(repo, policy);
    assert_eq!(state.policy.k_floor, 5);
    let _router = create_router(state);
}

#[tokio::test]
async fn test_qibla_with_heading_returns_relative_bearing() {
    // Due south of the Kaaba the bearing is 0; facing east (90) the
    // needle must point 270 degrees to the device's left.
    let query = QiblaQuery {
        lat: 0.0,
        lon: 39.8262,
        heading: Some(90.0),
    };

    let response = get_qibla(Query(query)).await.unwrap().0;
    assert!(response.bearing_deg < 1e-9 || (360.0 - response.bearing_deg) < 1e-9);

    let relative = response.relative_bearing.expect("heading supplied");
    assert!((relative - 270.0).abs() < 1e-9, "expected ~270, got {relative}");

    let json = serde_json::to_value(&response).unwrap();
    assert!(json.get("relativeBearing").is_some());
}

#[tokio::test]
async fn test_qibla_without_heading_omits_relative_bearing() {
    let query = QiblaQuery {
        lat: 51.5074,
        lon: -0.1278,
        heading: None,
    };

    let response = get_qibla(Query(query)).await.unwrap().0;
    assert!(response.relative_bearing.is_none());

    let json = serde_json::to_value(&response).unwrap();
    assert!(json.get("bearingDeg").is_some());
    assert!(json.get("relativeBearing").is_none());
}

#[tokio::test]
async fn test_qibla_rejects_non_finite_heading() {
    let query = QiblaQuery {
        lat: 0.0,
        lon: 0.0,
        heading: Some(f64::NAN),
    };

    assert!(get_qibla(Query(query)).await.is_err());
}

#[test]
fn test_suppressed_response_omits_statistics() {
    let response = AggregateResponse::from(AggregateOutcome::Suppressed { k: 7 });
    let json = serde_json::to_value(&response).unwrap();

    assert_eq!(json["k"], 7);
    assert_eq!(json["suppressed"], true);
    assert!(json.get("counts").is_none());
    assert!(json.get("avgDelayMin").is_none());
    assert!(json.get("perPrayer").is_none());
}

#[test]
fn test_disclosed_response_uses_camel_case() {
    let response = AggregateResponse::from(sample_disclosed());
    let json = serde_json::to_value(&response).unwrap();

    assert_eq!(json["k"], 24);
    assert_eq!(json["suppressed"], false);
    assert_eq!(json["counts"]["onTime"], 20);
    assert_eq!(json["counts"]["delayed"], 3);
    assert_eq!(json["counts"]["qada"], 1);
    assert_eq!(json["avgDelayMin"], 12.5);
    assert_eq!(json["perPrayer"]["fajr"]["onTime"], 0);
}

#[test]
fn test_submit_request_parses_minimal_body() {
    let body = r#"{
        "lat": 51.5074,
        "lon": -0.1278,
        "logs": [
            {"prayer": "fajr", "status": "on_time", "location_type": "home"}
        ]
    }"#;

    let request: SubmitLogsRequest = serde_json::from_str(body).unwrap();
    assert_eq!(request.logs.len(), 1);
    assert!(request.submitter.is_none());
    assert!(request.logs[0].delay_minutes.is_none());
}

#[test]
fn test_gate_outcome_round_trips_through_dto() {
    // A 19-entry bucket must serialize as a bare suppression marker.
    let entries: Vec<_> = (0..19)
        .map(|i| ouribadah::models::PrayerLogEntry {
            id: ouribadah::models::LogId::new(i),
            submitter: None,
            prayer: Prayer::Fajr,
            status: ouribadah::models::PrayerStatus::OnTime,
            delay_minutes: None,
            location_type: ouribadah::models::LocationType::Home,
            geohash5: "u4pru".to_string(),
            timezone: None,
            logged_at: chrono::Utc::now(),
        })
        .collect();

    let outcome = aggregate_entries(&entries, &AggregationPolicy::default());
    let json = serde_json::to_value(AggregateResponse::from(outcome)).unwrap();
    assert_eq!(json["k"], 19);
    assert_eq!(json["suppressed"], true);
    assert!(json.get("counts").is_none());
}
