//! Usage interval and summary types.

use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Serialize};

/// Minutes in a calendar day.
pub const MINUTES_PER_DAY: i64 = 24 * 60;

/// One contiguous span during which a single application was in the foreground.
///
/// Times are local wall-clock times on the queried date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawInterval {
    /// Opaque application identifier (bundle ID).
    pub identifier: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    /// Rounded elapsed seconds between start and end. Always positive.
    pub duration_seconds: i64,
}

/// A [`RawInterval`] whose identifier has been resolved to a display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedInterval {
    pub name: String,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
    pub duration_seconds: i64,
    /// Minutes since local midnight, truncated.
    pub start_minutes: i64,
    /// Minutes since local midnight, truncated. Intervals that ran past
    /// midnight end at [`MINUTES_PER_DAY`].
    pub end_minutes: i64,
}

impl ResolvedInterval {
    /// Attaches a display name to a raw interval and derives its minute offsets.
    pub fn new(raw: &RawInterval, name: impl Into<String>) -> Self {
        let start_minutes = minutes_since_midnight(raw.start_time);
        let end_minutes = if raw.end_time < raw.start_time {
            MINUTES_PER_DAY
        } else {
            minutes_since_midnight(raw.end_time)
        };
        Self {
            name: name.into(),
            start_time: raw.start_time,
            end_time: raw.end_time,
            duration_seconds: raw.duration_seconds,
            start_minutes,
            end_minutes,
        }
    }

    /// The `HH:00` bucket key for the hour this interval started in.
    pub fn start_hour_key(&self) -> String {
        format!("{:02}:00", self.start_time.hour())
    }
}

/// Whole minutes since midnight for a clock time, seconds dropped.
pub fn minutes_since_midnight(time: NaiveTime) -> i64 {
    i64::from(time.hour()) * 60 + i64::from(time.minute())
}

/// An application's rounded usage in minutes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppMinutes {
    pub name: String,
    pub minutes: i64,
}

/// Per-app usage within one clock hour.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HourlyBucket {
    /// Hour key, e.g. `"09:00"`.
    pub hour: String,
    /// Ordered by minutes descending. Every entry has `minutes > 0`.
    pub apps: Vec<AppMinutes>,
}

impl HourlyBucket {
    pub fn total_minutes(&self) -> i64 {
        self.apps.iter().map(|a| a.minutes).sum()
    }
}

/// Hourly breakdown and total for a single day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailySummary {
    pub date: NaiveDate,
    /// Sorted by hour ascending.
    pub hourly: Vec<HourlyBucket>,
    /// Sum of the already-rounded per-app minutes in every bucket.
    pub total_minutes: i64,
}
