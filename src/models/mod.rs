//! Domain types shared across the geospatial, analytics, and persistence layers.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Error raised when constructing a [`Coordinate`] from invalid components.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CoordinateError {
    #[error("latitude {0} outside [-90, 90]")]
    LatitudeOutOfRange(f64),
    #[error("longitude {0} outside [-180, 180]")]
    LongitudeOutOfRange(f64),
    #[error("coordinate components must be finite")]
    NonFinite,
}

/// A validated geographic coordinate.
///
/// Construction is the validation boundary: a `Coordinate` always holds
/// finite values with latitude in [-90, 90] and longitude in [-180, 180],
/// so the math in [`crate::geo`] never range-checks or clamps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    /// Create a coordinate, rejecting non-finite or out-of-range components.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordinateError> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(CoordinateError::NonFinite);
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(CoordinateError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(CoordinateError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }
}

/// The five daily prayers.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Prayer {
    Fajr,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl Prayer {
    /// All prayers in canonical (daily) order.
    pub const ALL: [Prayer; 5] = [
        Prayer::Fajr,
        Prayer::Dhuhr,
        Prayer::Asr,
        Prayer::Maghrib,
        Prayer::Isha,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Prayer::Fajr => "fajr",
            Prayer::Dhuhr => "dhuhr",
            Prayer::Asr => "asr",
            Prayer::Maghrib => "maghrib",
            Prayer::Isha => "isha",
        }
    }
}

impl fmt::Display for Prayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Prayer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "fajr" => Ok(Prayer::Fajr),
            "dhuhr" => Ok(Prayer::Dhuhr),
            "asr" => Ok(Prayer::Asr),
            "maghrib" => Ok(Prayer::Maghrib),
            "isha" => Ok(Prayer::Isha),
            other => Err(format!("Unknown prayer: {}", other)),
        }
    }
}

/// Outcome recorded for a single prayer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrayerStatus {
    OnTime,
    Delayed,
    Qada,
}

impl PrayerStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrayerStatus::OnTime => "on_time",
            PrayerStatus::Delayed => "delayed",
            PrayerStatus::Qada => "qada",
        }
    }
}

impl fmt::Display for PrayerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PrayerStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "on_time" => Ok(PrayerStatus::OnTime),
            "delayed" => Ok(PrayerStatus::Delayed),
            "qada" => Ok(PrayerStatus::Qada),
            other => Err(format!("Unknown prayer status: {}", other)),
        }
    }
}

/// Where the prayer was performed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationType {
    Home,
    Masjid,
}

impl LocationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationType::Home => "home",
            LocationType::Masjid => "masjid",
        }
    }
}

impl fmt::Display for LocationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LocationType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "home" => Ok(LocationType::Home),
            "masjid" => Ok(LocationType::Masjid),
            other => Err(format!("Unknown location type: {}", other)),
        }
    }
}

/// Identifier assigned to a persisted prayer log entry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct LogId(pub i64);

impl LogId {
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    pub fn value(&self) -> i64 {
        self.0
    }
}

impl fmt::Display for LogId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A persisted prayer log entry.
///
/// The entry carries only the coarse `geohash5` bucket, never the raw
/// coordinate it was derived from; the bucket is the privacy boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrayerLogEntry {
    pub id: LogId,
    /// Opaque submitter identifier; `None` for guest submissions.
    pub submitter: Option<String>,
    pub prayer: Prayer,
    pub status: PrayerStatus,
    /// Minutes of delay; only meaningful when `status` is `Delayed`.
    pub delay_minutes: Option<i32>,
    pub location_type: LocationType,
    /// 5-character spatial bucket computed at submission time.
    pub geohash5: String,
    /// IANA timezone name reported by the client, if any.
    pub timezone: Option<String>,
    pub logged_at: DateTime<Utc>,
}

/// One prayer's worth of a submission batch, before bucketing and persistence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPrayerLog {
    pub prayer: Prayer,
    pub status: PrayerStatus,
    #[serde(default)]
    pub delay_minutes: Option<i32>,
    pub location_type: LocationType,
}

/// A fully-formed record ready for insertion, minus the assigned id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewPrayerLogRecord {
    pub submitter: Option<String>,
    pub prayer: Prayer,
    pub status: PrayerStatus,
    pub delay_minutes: Option<i32>,
    pub location_type: LocationType,
    pub geohash5: String,
    pub timezone: Option<String>,
    pub logged_at: DateTime<Utc>,
}
