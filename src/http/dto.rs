//! Data Transfer Objects for the HTTP API.
//!
//! These DTOs are used for request/response serialization in the REST API.
//! Coordinates arrive as raw floats and are validated into
//! [`crate::models::Coordinate`] at the handler boundary; aggregate responses
//! use camelCase field names to stay compatible with existing clients.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::analytics::{
    AggregateOutcome, DayCounts, LocationSplit, PersonalSummary, StatusCounts,
};
use crate::models::{NewPrayerLog, Prayer};

/// Health check response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status
    pub status: String,
    /// API version
    pub version: String,
    /// Database connection status
    pub database: String,
}

/// Query parameters for the Qibla bearing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QiblaQuery {
    /// Observer latitude in degrees
    pub lat: f64,
    /// Observer longitude in degrees
    pub lon: f64,
    /// Device compass heading in degrees from true north (optional)
    #[serde(default)]
    pub heading: Option<f64>,
}

/// Response for the Qibla bearing endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QiblaResponse {
    /// Initial great-circle bearing toward the Kaaba, degrees from true north
    #[serde(rename = "bearingDeg")]
    pub bearing_deg: f64,
    /// Bearing to show on the compass needle, present when a device
    /// heading was supplied; same [0, 360) normalization as `bearingDeg`
    #[serde(rename = "relativeBearing", skip_serializing_if = "Option::is_none")]
    pub relative_bearing: Option<f64>,
}

/// Request body for submitting a batch of prayer logs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitLogsRequest {
    /// Submitter latitude in degrees; reduced to a bucket, never stored
    pub lat: f64,
    /// Submitter longitude in degrees; reduced to a bucket, never stored
    pub lon: f64,
    /// Opaque submitter identifier (optional, for personal analytics)
    #[serde(default)]
    pub submitter: Option<String>,
    /// IANA timezone name reported by the client
    #[serde(default)]
    pub timezone: Option<String>,
    /// The batch of logs; must be non-empty
    pub logs: Vec<NewPrayerLog>,
}

/// Response for a successful log submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitLogsResponse {
    /// Number of records inserted
    pub inserted: usize,
    /// Spatial bucket the batch landed in
    pub bucket: String,
}

/// Query parameters for the aggregate endpoint.
///
/// Callers pass either `bucket` or a raw `lat`/`lon` pair; the coordinate
/// form is reduced to its bucket server-side.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AggregateQuery {
    /// 5-character geohash bucket key
    #[serde(default)]
    pub bucket: Option<String>,
    /// Latitude, used when no bucket is given
    #[serde(default)]
    pub lat: Option<f64>,
    /// Longitude, used when no bucket is given
    #[serde(default)]
    pub lon: Option<f64>,
    /// Lookback window in days (optional, clamped server-side)
    #[serde(default)]
    pub days: Option<i64>,
}

/// Per-status counts in API shape.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusCountsDto {
    #[serde(rename = "onTime")]
    pub on_time: usize,
    pub delayed: usize,
    pub qada: usize,
}

impl From<StatusCounts> for StatusCountsDto {
    fn from(counts: StatusCounts) -> Self {
        Self {
            on_time: counts.on_time,
            delayed: counts.delayed,
            qada: counts.qada,
        }
    }
}

/// Response for the aggregate endpoint.
///
/// When the bucket's sample size is below the k-floor, only `k` and
/// `suppressed: true` are present; the statistical fields are omitted
/// entirely rather than zeroed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateResponse {
    /// Sample size in the window
    pub k: usize,
    /// True when statistics were withheld
    pub suppressed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub counts: Option<StatusCountsDto>,
    #[serde(rename = "avgDelayMin", skip_serializing_if = "Option::is_none")]
    pub avg_delay_min: Option<f64>,
    #[serde(rename = "perPrayer", skip_serializing_if = "Option::is_none")]
    pub per_prayer: Option<BTreeMap<Prayer, StatusCountsDto>>,
}

impl From<AggregateOutcome> for AggregateResponse {
    fn from(outcome: AggregateOutcome) -> Self {
        match outcome {
            AggregateOutcome::Suppressed { k } => Self {
                k,
                suppressed: true,
                counts: None,
                avg_delay_min: None,
                per_prayer: None,
            },
            AggregateOutcome::Disclosed(agg) => Self {
                k: agg.k,
                suppressed: false,
                counts: Some(agg.counts.into()),
                avg_delay_min: Some(agg.avg_delay_min),
                per_prayer: Some(
                    agg.per_prayer
                        .into_iter()
                        .map(|(prayer, counts)| (prayer, counts.into()))
                        .collect(),
                ),
            },
        }
    }
}

/// Query parameters for the personal analytics endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalQuery {
    /// Opaque submitter identifier
    pub submitter: String,
    /// Lookback window in days (optional, clamped server-side)
    #[serde(default)]
    pub days: Option<i64>,
}

/// One day of the personal series in API shape.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DayCountsDto {
    /// ISO-8601 calendar date
    pub date: String,
    pub counts: StatusCountsDto,
}

impl From<DayCounts> for DayCountsDto {
    fn from(day: DayCounts) -> Self {
        Self {
            date: day.date.to_string(),
            counts: day.counts.into(),
        }
    }
}

/// Home/masjid split in API shape.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LocationSplitDto {
    pub home: usize,
    pub masjid: usize,
}

impl From<LocationSplit> for LocationSplitDto {
    fn from(split: LocationSplit) -> Self {
        Self {
            home: split.home,
            masjid: split.masjid,
        }
    }
}

/// Response for the personal analytics endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonalResponse {
    /// Total entries in the window
    pub total: usize,
    pub counts: StatusCountsDto,
    #[serde(rename = "avgDelayMin")]
    pub avg_delay_min: f64,
    /// Per-day counts, date-sorted ascending
    pub series: Vec<DayCountsDto>,
    #[serde(rename = "perPrayer")]
    pub per_prayer: BTreeMap<Prayer, StatusCountsDto>,
    pub location: LocationSplitDto,
}

impl From<PersonalSummary> for PersonalResponse {
    fn from(summary: PersonalSummary) -> Self {
        Self {
            total: summary.total,
            counts: summary.counts.into(),
            avg_delay_min: summary.avg_delay_min,
            series: summary.series.into_iter().map(Into::into).collect(),
            per_prayer: summary
                .per_prayer
                .into_iter()
                .map(|(prayer, counts)| (prayer, counts.into()))
                .collect(),
            location: summary.location.into(),
        }
    }
}
