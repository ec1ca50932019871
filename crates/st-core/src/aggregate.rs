//! Hourly and daily aggregation of resolved usage intervals.
//!
//! Rounding happens once per app per hour. The daily total sums those rounded
//! values instead of rounding the raw seconds again, so on busy days it can
//! drift from a "sum seconds, round once" total by a few minutes.

use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;

use crate::usage::{AppMinutes, DailySummary, HourlyBucket, ResolvedInterval};

/// Seconds summed per app name, in first-seen order.
#[derive(Debug, Default)]
struct SecondsByApp {
    index: HashMap<String, usize>,
    totals: Vec<(String, i64)>,
}

impl SecondsByApp {
    fn add(&mut self, name: &str, seconds: i64) {
        if let Some(&slot) = self.index.get(name) {
            self.totals[slot].1 += seconds;
        } else {
            self.index.insert(name.to_string(), self.totals.len());
            self.totals.push((name.to_string(), seconds));
        }
    }

    /// Rounds to minutes, drops zero entries, sorts by minutes descending.
    ///
    /// The sort is stable so ties keep first-seen order.
    fn into_minutes(self) -> Vec<AppMinutes> {
        let mut apps: Vec<AppMinutes> = self
            .totals
            .into_iter()
            .map(|(name, seconds)| AppMinutes {
                name,
                minutes: round_to_minutes(seconds),
            })
            .filter(|app| app.minutes > 0)
            .collect();
        apps.sort_by_key(|app| std::cmp::Reverse(app.minutes));
        apps
    }
}

/// Rounds seconds to the nearest whole minute, halves rounding up.
pub const fn round_to_minutes(seconds: i64) -> i64 {
    if seconds <= 0 {
        return 0;
    }
    (seconds + 30) / 60
}

/// Groups intervals by the hour they started in and sums usage per app.
///
/// Intervals shorter than `min_duration_seconds` are discarded first. A long
/// interval is attributed entirely to its starting hour.
pub fn build_hourly(
    intervals: &[ResolvedInterval],
    min_duration_seconds: i64,
) -> Vec<HourlyBucket> {
    let mut hours: BTreeMap<String, SecondsByApp> = BTreeMap::new();

    for interval in intervals {
        if interval.duration_seconds < min_duration_seconds {
            continue;
        }
        hours
            .entry(interval.start_hour_key())
            .or_default()
            .add(&interval.name, interval.duration_seconds);
    }

    hours
        .into_iter()
        .map(|(hour, apps)| HourlyBucket {
            hour,
            apps: apps.into_minutes(),
        })
        .collect()
}

/// Wraps hourly buckets into a day summary with a total.
pub fn build_daily_summary(date: NaiveDate, hourly: Vec<HourlyBucket>) -> DailySummary {
    let total_minutes = hourly.iter().map(HourlyBucket::total_minutes).sum();
    DailySummary {
        date,
        hourly,
        total_minutes,
    }
}

/// Per-app totals for the whole day, rounded once per app.
///
/// Returns the apps sorted by minutes descending and their summed minutes.
pub fn app_totals(intervals: &[ResolvedInterval]) -> (Vec<AppMinutes>, i64) {
    let mut seconds = SecondsByApp::default();
    for interval in intervals {
        seconds.add(&interval.name, interval.duration_seconds);
    }
    let apps = seconds.into_minutes();
    let total = apps.iter().map(|a| a.minutes).sum();
    (apps, total)
}

/// Formats minutes as `"45m"`, `"2h"` or `"2h 5m"`.
pub fn format_minutes(total_minutes: i64) -> String {
    let total_minutes = total_minutes.max(0);
    if total_minutes < 60 {
        return format!("{total_minutes}m");
    }
    let hours = total_minutes / 60;
    let minutes = total_minutes % 60;
    if minutes == 0 {
        format!("{hours}h")
    } else {
        format!("{hours}h {minutes}m")
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveTime;

    use super::*;
    use crate::usage::RawInterval;

    fn interval(name: &str, start: &str, duration_seconds: i64) -> ResolvedInterval {
        let start_time = NaiveTime::parse_from_str(start, "%H:%M:%S").unwrap();
        let end_time = start_time + chrono::Duration::seconds(duration_seconds);
        let raw = RawInterval {
            identifier: format!("test.{name}"),
            start_time,
            end_time,
            duration_seconds,
        };
        ResolvedInterval::new(&raw, name)
    }

    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()
    }

    #[test]
    fn empty_input_yields_empty_output() {
        let hourly = build_hourly(&[], 60);
        assert!(hourly.is_empty());
        let summary = build_daily_summary(date(), hourly);
        assert_eq!(summary.total_minutes, 0);
    }

    #[test]
    fn single_safari_session() {
        let hourly = build_hourly(&[interval("Safari", "09:00:00", 2700)], 60);
        assert_eq!(
            hourly,
            vec![HourlyBucket {
                hour: "09:00".to_string(),
                apps: vec![AppMinutes {
                    name: "Safari".to_string(),
                    minutes: 45
                }],
            }]
        );
        assert_eq!(build_daily_summary(date(), hourly).total_minutes, 45);
    }

    #[test]
    fn seconds_are_summed_before_rounding() {
        let intervals = [
            interval("Notes", "10:00:00", 30),
            interval("Notes", "10:05:00", 40),
        ];
        let hourly = build_hourly(&intervals, 0);
        assert_eq!(hourly[0].apps[0].minutes, 1);
    }

    #[test]
    fn minimum_duration_is_inclusive() {
        let intervals = [
            interval("Mail", "08:00:00", 59),
            interval("Notes", "08:10:00", 60),
        ];
        let hourly = build_hourly(&intervals, 60);
        assert_eq!(hourly.len(), 1);
        assert_eq!(hourly[0].apps.len(), 1);
        assert_eq!(hourly[0].apps[0].name, "Notes");
    }

    #[test]
    fn entries_rounding_to_zero_are_dropped() {
        let hourly = build_hourly(&[interval("Finder", "12:00:00", 29)], 0);
        assert_eq!(hourly.len(), 1);
        assert!(hourly[0].apps.is_empty());
    }

    #[test]
    fn buckets_sorted_by_hour_and_apps_by_minutes() {
        let intervals = [
            interval("Zed", "14:10:00", 600),
            interval("Slack", "09:00:00", 120),
            interval("Safari", "09:10:00", 900),
            interval("Mail", "09:30:00", 120),
        ];
        let hourly = build_hourly(&intervals, 0);
        let hours: Vec<_> = hourly.iter().map(|b| b.hour.as_str()).collect();
        assert_eq!(hours, ["09:00", "14:00"]);
        let names: Vec<_> = hourly[0].apps.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, ["Safari", "Slack", "Mail"]);
    }

    #[test]
    fn long_interval_attributed_to_start_hour() {
        let hourly = build_hourly(&[interval("Xcode", "09:50:00", 3600)], 0);
        assert_eq!(hourly.len(), 1);
        assert_eq!(hourly[0].hour, "09:00");
        assert_eq!(hourly[0].apps[0].minutes, 60);
    }

    #[test]
    fn daily_total_sums_rounded_values() {
        // 90s in each of three hours: 2 + 2 + 2 rounded, 4.5 minutes raw.
        let intervals = [
            interval("Notes", "09:00:00", 90),
            interval("Notes", "10:00:00", 90),
            interval("Notes", "11:00:00", 90),
        ];
        let summary = build_daily_summary(date(), build_hourly(&intervals, 0));
        assert_eq!(summary.total_minutes, 6);
    }

    #[test]
    fn app_totals_round_once_per_app() {
        let intervals = [
            interval("Notes", "09:00:00", 90),
            interval("Notes", "10:00:00", 90),
            interval("Safari", "10:30:00", 20),
        ];
        let (apps, total) = app_totals(&intervals);
        assert_eq!(
            apps,
            vec![AppMinutes {
                name: "Notes".to_string(),
                minutes: 3
            }]
        );
        assert_eq!(total, 3);
    }

    #[test]
    fn round_to_minutes_half_up() {
        assert_eq!(round_to_minutes(29), 0);
        assert_eq!(round_to_minutes(30), 1);
        assert_eq!(round_to_minutes(89), 1);
        assert_eq!(round_to_minutes(90), 2);
        assert_eq!(round_to_minutes(-5), 0);
    }

    #[test]
    fn format_minutes_variants() {
        assert_eq!(format_minutes(0), "0m");
        assert_eq!(format_minutes(45), "45m");
        assert_eq!(format_minutes(60), "1h");
        assert_eq!(format_minutes(125), "2h 5m");
    }
}
