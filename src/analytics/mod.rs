//! Pure aggregation over prayer log entries.
//!
//! This module owns the numbers: status counts, delay averages, per-prayer
//! breakdowns, and the k-anonymity gate that decides whether a bucket's
//! statistics may be disclosed at all. Everything here is a pure function of
//! the entries passed in; windowing and datastore access live in
//! [`crate::db::services`].

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;

use crate::models::{LocationType, Prayer, PrayerLogEntry, PrayerStatus};

/// Policy constants governing aggregation.
///
/// The thresholds are policy, not invariants of the design: they default to
/// the values the product shipped with (k >= 20, 7-365 day windows) but can
/// be overridden through the environment. The gate itself always runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationPolicy {
    /// Minimum bucket sample size before per-status counts are disclosed.
    pub k_floor: usize,
    /// Smallest accepted lookback window, in days.
    pub min_window_days: i64,
    /// Largest accepted lookback window, in days.
    pub max_window_days: i64,
    /// Window applied when the caller does not specify one.
    pub default_window_days: i64,
}

impl Default for AggregationPolicy {
    fn default() -> Self {
        Self {
            k_floor: 20,
            min_window_days: 7,
            max_window_days: 365,
            default_window_days: 30,
        }
    }
}

impl AggregationPolicy {
    /// Build a policy from environment variables, falling back to defaults.
    ///
    /// Recognized variables: `OURIBADAH_K_FLOOR`, `OURIBADAH_WINDOW_MIN_DAYS`,
    /// `OURIBADAH_WINDOW_MAX_DAYS`, `OURIBADAH_WINDOW_DEFAULT_DAYS`.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        fn parse_var<T: std::str::FromStr>(name: &str, fallback: T) -> T {
            env::var(name)
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(fallback)
        }

        Self {
            k_floor: parse_var("OURIBADAH_K_FLOOR", defaults.k_floor),
            min_window_days: parse_var("OURIBADAH_WINDOW_MIN_DAYS", defaults.min_window_days),
            max_window_days: parse_var("OURIBADAH_WINDOW_MAX_DAYS", defaults.max_window_days),
            default_window_days: parse_var(
                "OURIBADAH_WINDOW_DEFAULT_DAYS",
                defaults.default_window_days,
            ),
        }
    }

    /// Clamp a positive day count into the accepted window range.
    pub fn clamp_window(&self, days: i64) -> i64 {
        days.clamp(self.min_window_days, self.max_window_days)
    }
}

/// Counts of entries per status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCounts {
    pub on_time: usize,
    pub delayed: usize,
    pub qada: usize,
}

impl StatusCounts {
    /// Record one entry's status.
    pub fn record(&mut self, status: PrayerStatus) {
        match status {
            PrayerStatus::OnTime => self.on_time += 1,
            PrayerStatus::Delayed => self.delayed += 1,
            PrayerStatus::Qada => self.qada += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.on_time + self.delayed + self.qada
    }
}

/// Fully disclosed aggregate for one bucket and window.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketAggregate {
    /// Sample size; always equal to the sum of the three status counts.
    pub k: usize,
    pub counts: StatusCounts,
    /// Mean delay in minutes over delayed entries that recorded one;
    /// 0.0 when no such entry exists.
    pub avg_delay_min: f64,
    /// Status breakdown per prayer; always carries all five prayers.
    pub per_prayer: BTreeMap<Prayer, StatusCounts>,
}

/// Outcome of aggregating a bucket: disclosed statistics or a suppression
/// marker carrying only the sample size.
#[derive(Debug, Clone, PartialEq)]
pub enum AggregateOutcome {
    /// Sample size below the k-floor; nothing beyond `k` may be disclosed.
    Suppressed { k: usize },
    Disclosed(BucketAggregate),
}

impl AggregateOutcome {
    pub fn k(&self) -> usize {
        match self {
            AggregateOutcome::Suppressed { k } => *k,
            AggregateOutcome::Disclosed(agg) => agg.k,
        }
    }

    pub fn is_suppressed(&self) -> bool {
        matches!(self, AggregateOutcome::Suppressed { .. })
    }
}

fn empty_per_prayer() -> BTreeMap<Prayer, StatusCounts> {
    Prayer::ALL
        .iter()
        .map(|p| (*p, StatusCounts::default()))
        .collect()
}

fn mean_delay_minutes(entries: &[PrayerLogEntry]) -> f64 {
    let delays: Vec<i32> = entries
        .iter()
        .filter(|e| e.status == PrayerStatus::Delayed)
        .filter_map(|e| e.delay_minutes)
        .collect();

    if delays.is_empty() {
        0.0
    } else {
        delays.iter().map(|d| *d as f64).sum::<f64>() / delays.len() as f64
    }
}

/// Aggregate a bucket's entries, applying the k-anonymity gate.
///
/// The gate is enforced here, at the point the numbers are computed: below
/// the policy floor only the sample size leaves this function.
pub fn aggregate_entries(
    entries: &[PrayerLogEntry],
    policy: &AggregationPolicy,
) -> AggregateOutcome {
    let k = entries.len();
    if k < policy.k_floor {
        return AggregateOutcome::Suppressed { k };
    }

    let mut counts = StatusCounts::default();
    let mut per_prayer = empty_per_prayer();
    for entry in entries {
        counts.record(entry.status);
        if let Some(prayer_counts) = per_prayer.get_mut(&entry.prayer) {
            prayer_counts.record(entry.status);
        }
    }

    AggregateOutcome::Disclosed(BucketAggregate {
        k,
        counts,
        avg_delay_min: mean_delay_minutes(entries),
        per_prayer,
    })
}

/// One day of a personal series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayCounts {
    pub date: NaiveDate,
    pub counts: StatusCounts,
}

/// Home/masjid split of a submitter's entries.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationSplit {
    pub home: usize,
    pub masjid: usize,
}

/// Summary of a single submitter's own entries over a window.
///
/// No k-floor applies: this is the caller's own data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonalSummary {
    pub total: usize,
    pub counts: StatusCounts,
    pub avg_delay_min: f64,
    /// Per-day counts, sorted ascending by date.
    pub series: Vec<DayCounts>,
    pub per_prayer: BTreeMap<Prayer, StatusCounts>,
    pub location: LocationSplit,
}

/// Compute a submitter's personal summary from their entries.
pub fn personal_summary(entries: &[PrayerLogEntry]) -> PersonalSummary {
    let mut counts = StatusCounts::default();
    let mut per_prayer = empty_per_prayer();
    let mut by_day: BTreeMap<NaiveDate, StatusCounts> = BTreeMap::new();
    let mut location = LocationSplit::default();

    for entry in entries {
        counts.record(entry.status);
        if let Some(prayer_counts) = per_prayer.get_mut(&entry.prayer) {
            prayer_counts.record(entry.status);
        }
        by_day
            .entry(entry.logged_at.date_naive())
            .or_default()
            .record(entry.status);
        match entry.location_type {
            LocationType::Home => location.home += 1,
            LocationType::Masjid => location.masjid += 1,
        }
    }

    // BTreeMap iteration keeps the series date-sorted.
    let series = by_day
        .into_iter()
        .map(|(date, counts)| DayCounts { date, counts })
        .collect();

    PersonalSummary {
        total: entries.len(),
        counts,
        avg_delay_min: mean_delay_minutes(entries),
        series,
        per_prayer,
        location,
    }
}
