//! Query command: the raw usage intervals of one day.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use st_core::aggregate::round_to_minutes;
use st_core::format_minutes;
use st_store::{QueryRunner, UsageStore};

use super::util::format_date;

pub fn run<W: Write, R: QueryRunner>(
    writer: &mut W,
    store: &UsageStore<R>,
    date: NaiveDate,
    json: bool,
) -> Result<()> {
    let intervals = store
        .query_date(&format_date(date))
        .with_context(|| format!("failed to read usage for {date}"))?;

    if json {
        serde_json::to_writer_pretty(&mut *writer, &intervals)?;
        writeln!(writer)?;
        return Ok(());
    }

    if intervals.is_empty() {
        writeln!(writer, "No Screen Time data found for {}", format_date(date))?;
        return Ok(());
    }

    for interval in &intervals {
        writeln!(
            writer,
            "{} - {}  {:>7}  {}",
            interval.start_time.format("%H:%M:%S"),
            interval.end_time.format("%H:%M:%S"),
            format_minutes(round_to_minutes(interval.duration_seconds)),
            interval.identifier
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;

    use crate::commands::util::fixtures;

    #[test]
    fn query_lists_raw_intervals() {
        let temp = tempfile::tempdir().unwrap();
        let store = fixtures::sample_store(temp.path());

        let mut output = Vec::new();
        run(&mut output, &store, fixtures::day(), false).unwrap();

        assert_snapshot!(String::from_utf8(output).unwrap(), @r"
        09:00:00 - 09:45:00      45m  com.apple.Safari
        09:50:00 - 09:55:00       5m  com.apple.Notes
        10:00:00 - 10:00:30       1m  com.apple.mail
        10:10:00 - 11:20:00   1h 10m  com.example.fooBar
        ");
    }

    #[test]
    fn query_json_keeps_identifiers() {
        let temp = tempfile::tempdir().unwrap();
        let store = fixtures::sample_store(temp.path());

        let mut output = Vec::new();
        run(&mut output, &store, fixtures::day(), true).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&output).unwrap();
        let rows = value.as_array().unwrap();
        assert_eq!(rows.len(), 4);
        assert_eq!(rows[0]["identifier"], "com.apple.Safari");
        assert_eq!(rows[0]["start_time"], "09:00:00");
        assert_eq!(rows[0]["duration_seconds"], 2700);
    }

    #[test]
    fn query_empty_day_prints_notice() {
        let temp = tempfile::tempdir().unwrap();
        let store = fixtures::sample_store(temp.path());

        let mut output = Vec::new();
        run(&mut output, &store, NaiveDate::from_ymd_opt(2026, 1, 16).unwrap(), false).unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "No Screen Time data found for 2026-01-16\n"
        );
    }
}
