//! Shared utilities for CLI commands.

use anyhow::{Context, Result};
use chrono::{Days, Local, NaiveDate};

use st_core::{
    AppNameResolver, DailySummary, MetadataLookup, NoMetadata, RawInterval, build_daily_summary,
    build_hourly,
};
use st_store::{QueryRunner, Runner, SpotlightLookup, UsageStore};

use crate::{Config, DayArgs};

/// Resolver used by the CLI: Spotlight-backed unless disabled in config.
pub type CliResolver = AppNameResolver<Box<dyn MetadataLookup>>;

/// The local calendar date.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Picks the day from `--date` / `--yesterday`, relative to `today`.
pub fn resolve_day(day: &DayArgs, today: NaiveDate) -> Result<NaiveDate> {
    if let Some(date) = &day.date {
        return Ok(st_store::parse_date(date)?);
    }
    if day.yesterday {
        return today
            .checked_sub_days(Days::new(1))
            .context("no day before the current date");
    }
    Ok(today)
}

/// Builds the store described by `config`.
pub fn open_store(config: &Config) -> UsageStore<Runner> {
    let store = UsageStore::new(Runner::from(config.backend), config.store_path())
        .with_timeout(config.query_timeout());
    tracing::debug!(backend = ?config.backend, location = ?store.location(), "opened usage store");
    store
}

/// Builds the name resolver described by `config`.
pub fn build_resolver(config: &Config) -> CliResolver {
    let lookup: Box<dyn MetadataLookup> = if config.metadata_lookup {
        Box::new(SpotlightLookup::new(config.lookup_timeout()))
    } else {
        Box::new(NoMetadata)
    };
    AppNameResolver::new(lookup)
}

/// Raw usage intervals for one day.
pub fn query_day<R: QueryRunner>(
    store: &UsageStore<R>,
    date: NaiveDate,
) -> Result<Vec<RawInterval>> {
    store
        .query_date(&format_date(date))
        .with_context(|| format!("failed to read usage for {date}"))
}

/// Resolves and aggregates already-queried intervals.
pub fn summarize<L: MetadataLookup>(
    raw: &[RawInterval],
    resolver: &mut AppNameResolver<L>,
    date: NaiveDate,
    min_duration_seconds: i64,
) -> DailySummary {
    let resolved = resolver.resolve_intervals(raw, min_duration_seconds);
    let hourly = build_hourly(&resolved, min_duration_seconds);
    build_daily_summary(date, hourly)
}

/// Queries, resolves and aggregates one day.
pub fn daily_summary<R: QueryRunner, L: MetadataLookup>(
    store: &UsageStore<R>,
    resolver: &mut AppNameResolver<L>,
    date: NaiveDate,
    min_duration_seconds: i64,
) -> Result<DailySummary> {
    let raw = query_day(store, date)?;
    Ok(summarize(&raw, resolver, date, min_duration_seconds))
}

/// `YYYY-MM-DD`.
pub fn format_date(date: NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}


#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 1).unwrap()
    }

    #[test]
    fn resolve_day_defaults_to_today() {
        assert_eq!(resolve_day(&DayArgs::default(), today()).unwrap(), today());
    }

    #[test]
    fn resolve_day_yesterday_crosses_month() {
        let day = DayArgs {
            yesterday: true,
            ..DayArgs::default()
        };
        assert_eq!(
            resolve_day(&day, today()).unwrap(),
            NaiveDate::from_ymd_opt(2026, 2, 28).unwrap()
        );
    }

    #[test]
    fn resolve_day_rejects_bad_date() {
        let day = DayArgs {
            date: Some("2026-02-30".to_string()),
            ..DayArgs::default()
        };
        let err = resolve_day(&day, today()).unwrap_err();
        assert!(err.to_string().contains("invalid date"), "{err}");
    }

    #[test]
    fn daily_summary_from_store() {
        let temp = tempfile::tempdir().unwrap();
        let store = fixtures::sample_store(temp.path());
        let mut resolver = AppNameResolver::new(NoMetadata);

        let summary = daily_summary(&store, &mut resolver, fixtures::day(), 60).unwrap();

        assert_eq!(summary.date, fixtures::day());
        assert_eq!(summary.hourly.len(), 2);
        assert_eq!(summary.hourly[0].hour, "09:00");
        assert_eq!(summary.hourly[0].apps[0].name, "Safari");
        assert_eq!(summary.hourly[1].apps[0].name, "FooBar");
        assert_eq!(summary.total_minutes, 45 + 5 + 70);
    }
}
