//! Summary command: hourly per-app usage for one day.

use std::io::Write;

use anyhow::Result;
use chrono::NaiveDate;

use st_core::{AppNameResolver, DailySummary, MetadataLookup, format_minutes};
use st_store::{QueryRunner, UsageStore};

use super::util::{daily_summary, format_date};

pub fn run<W: Write, R: QueryRunner, L: MetadataLookup>(
    writer: &mut W,
    store: &UsageStore<R>,
    resolver: &mut AppNameResolver<L>,
    date: NaiveDate,
    min_duration_seconds: i64,
    json: bool,
) -> Result<()> {
    let summary = daily_summary(store, resolver, date, min_duration_seconds)?;

    if json {
        serde_json::to_writer_pretty(&mut *writer, &summary)?;
        writeln!(writer)?;
        return Ok(());
    }

    write_table(writer, &summary)
}

fn write_table<W: Write>(writer: &mut W, summary: &DailySummary) -> Result<()> {
    if summary.hourly.iter().all(|bucket| bucket.apps.is_empty()) {
        writeln!(
            writer,
            "No Screen Time data found for {}",
            format_date(summary.date)
        )?;
        return Ok(());
    }

    writeln!(
        writer,
        "Screen time for {}: {}",
        format_date(summary.date),
        format_minutes(summary.total_minutes)
    )?;
    writeln!(writer)?;

    let width = summary
        .hourly
        .iter()
        .flat_map(|bucket| &bucket.apps)
        .map(|app| app.name.chars().count())
        .max()
        .unwrap_or(0);

    for bucket in &summary.hourly {
        for (i, app) in bucket.apps.iter().enumerate() {
            let hour = if i == 0 { bucket.hour.as_str() } else { "" };
            writeln!(
                writer,
                "{hour:5}  {:<width$}  {:>6}",
                app.name,
                format_minutes(app.minutes)
            )?;
        }
    }
    Ok(())
}
