use chrono::{DateTime, Utc};
use diesel::prelude::*;

use super::schema::prayer_logs;

#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = prayer_logs)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct PrayerLogRow {
    pub log_id: i64,
    pub submitter: Option<String>,
    pub prayer: String,
    pub status: String,
    pub delay_minutes: Option<i32>,
    pub location_type: String,
    pub geohash5: String,
    pub timezone: Option<String>,
    pub logged_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = prayer_logs)]
pub struct NewPrayerLogRow {
    pub submitter: Option<String>,
    pub prayer: String,
    pub status: String,
    pub delay_minutes: Option<i32>,
    pub location_type: String,
    pub geohash5: String,
    pub timezone: Option<String>,
    pub logged_at: DateTime<Utc>,
}
