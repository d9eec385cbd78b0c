//! HTTP handlers for the REST API.
//!
//! Each handler corresponds to an API endpoint and delegates to the
//! service layer for business logic.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    Json,
};

use super::dto::{
    AggregateQuery, AggregateResponse, HealthResponse, PersonalQuery, PersonalResponse,
    QiblaQuery, QiblaResponse, SubmitLogsRequest, SubmitLogsResponse,
};
use super::error::AppError;
use super::state::AppState;
use crate::db::services as db_services;
use crate::geo::{bearing_to_kaaba, relative_bearing};
use crate::models::Coordinate;

/// Result type for handlers.
pub type HandlerResult<T> = Result<Json<T>, AppError>;

// =============================================================================
// Health Check
// =============================================================================

/// GET /health
///
/// Health check endpoint to verify the service is running and database is accessible.
pub async fn health_check(State(state): State<AppState>) -> HandlerResult<HealthResponse> {
    let db_status = match db_services::health_check(state.repository.as_ref()).await {
        Ok(()) => "connected".to_string(),
        Err(e) => format!("error: {}", e),
    };

    Ok(Json(HealthResponse {
        status: "ok".to_string(),
        version: "v1".to_string(),
        database: db_status,
    }))
}

// =============================================================================
// Qibla
// =============================================================================

/// GET /v1/qibla?lat=..&lon=..[&heading=..]
///
/// Compute the initial great-circle bearing from the observer toward the
/// Kaaba. When a device compass heading is supplied, the response also
/// carries the bearing relative to that heading. Pure computation, no
/// state touched.
pub async fn get_qibla(Query(query): Query<QiblaQuery>) -> HandlerResult<QiblaResponse> {
    let coordinate = Coordinate::new(query.lat, query.lon)?;
    let bearing = bearing_to_kaaba(coordinate);

    let relative = match query.heading {
        Some(heading) if !heading.is_finite() => {
            return Err(AppError::BadRequest(format!(
                "Non-finite heading: {}",
                heading
            )))
        }
        Some(heading) => Some(relative_bearing(bearing, heading)),
        None => None,
    };

    Ok(Json(QiblaResponse {
        bearing_deg: bearing,
        relative_bearing: relative,
    }))
}

// =============================================================================
// Prayer Logs
// =============================================================================

/// POST /v1/prayer-logs
///
/// Submit a batch of prayer logs. The raw coordinate is reduced to its
/// geohash bucket before anything is persisted.
pub async fn submit_logs(
    State(state): State<AppState>,
    Json(request): Json<SubmitLogsRequest>,
) -> Result<(StatusCode, Json<SubmitLogsResponse>), AppError> {
    let coordinate = Coordinate::new(request.lat, request.lon)?;

    let receipt = db_services::submit_logs(
        state.repository.as_ref(),
        coordinate,
        request.submitter,
        request.timezone,
        &request.logs,
    )
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(SubmitLogsResponse {
            inserted: receipt.inserted,
            bucket: receipt.bucket,
        }),
    ))
}

// =============================================================================
// Analytics
// =============================================================================

/// GET /v1/analytics/aggregate?bucket=..&days=..
///
/// Aggregate a bucket's prayer logs over a lookback window. Accepts either
/// a bucket key or a raw lat/lon pair. The k-anonymity gate applies: below
/// the floor, only the sample size is disclosed.
pub async fn get_aggregate(
    State(state): State<AppState>,
    Query(query): Query<AggregateQuery>,
) -> HandlerResult<AggregateResponse> {
    let outcome = match (query.bucket, query.lat, query.lon) {
        (Some(bucket), _, _) => {
            db_services::bucket_aggregate(
                state.repository.as_ref(),
                &state.policy,
                &bucket,
                query.days,
            )
            .await?
        }
        (None, Some(lat), Some(lon)) => {
            let coordinate = Coordinate::new(lat, lon)?;
            db_services::coordinate_aggregate(
                state.repository.as_ref(),
                &state.policy,
                coordinate,
                query.days,
            )
            .await?
        }
        _ => {
            return Err(AppError::BadRequest(
                "Provide either 'bucket' or both 'lat' and 'lon'".to_string(),
            ))
        }
    };

    Ok(Json(outcome.into()))
}

/// GET /v1/analytics/personal?submitter=..&days=..
///
/// Summarize one submitter's own entries. No k-floor applies; the caller
/// only ever sees their own data.
pub async fn get_personal(
    State(state): State<AppState>,
    Query(query): Query<PersonalQuery>,
) -> HandlerResult<PersonalResponse> {
    let summary = db_services::submitter_summary(
        state.repository.as_ref(),
        &state.policy,
        &query.submitter,
        query.days,
    )
    .await?;

    Ok(Json(summary.into()))
}
