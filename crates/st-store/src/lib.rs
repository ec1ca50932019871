//! Usage queries against the macOS Knowledge store (`knowledgeC.db`).
//!
//! The store keeps foreground application usage in the `ZOBJECT` table under
//! the `/app/usage` stream. Timestamps are Core Data seconds, counted from
//! 2001-01-01 00:00:00 UTC.
//!
//! Queries go through a [`QueryRunner`] so the same engine works in-process
//! ([`SqliteRunner`]) or through the `sqlite3` shell ([`Sqlite3CliRunner`]),
//! and tests can substitute a fake.
//!
//! # Errors
//!
//! A malformed date is rejected with [`QueryError::InvalidInput`] before any
//! I/O. Everything else that goes wrong (missing store, SQLite errors, a hung
//! shell, unparseable rows) is reported once as [`QueryError::QueryFailed`].

mod process;
mod runner;
mod spotlight;

use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

use chrono::{NaiveDate, NaiveTime};
use regex::Regex;
use thiserror::Error;

use st_core::{RawInterval, UsageSource};

pub use process::ProcessError;
pub use runner::{
    Backend, FIELD_SEPARATOR, QueryRunner, Runner, RunnerError, Sqlite3CliRunner, SqliteRunner,
};
pub use spotlight::{DEFAULT_LOOKUP_TIMEOUT, SpotlightLookup};

/// 2001-01-01 00:00:00 UTC as a Unix timestamp.
pub const CORE_DATA_EPOCH: i64 = 978_307_200;

/// Stream holding foreground application usage.
pub const APP_USAGE_STREAM: &str = "/app/usage";

/// Default bound on a single store query.
pub const DEFAULT_QUERY_TIMEOUT: Duration = Duration::from_secs(10);

static DATE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

/// Query engine errors.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The date was not a `YYYY-MM-DD` calendar date.
    #[error("invalid date {date:?}: expected YYYY-MM-DD")]
    InvalidInput { date: String },
    /// The query could not be completed.
    #[error("failed to query usage store: {source}")]
    QueryFailed {
        #[from]
        source: QueryFailure,
    },
}

/// Underlying cause of a [`QueryError::QueryFailed`].
#[derive(Debug, Error)]
pub enum QueryFailure {
    #[error(transparent)]
    Runner(#[from] RunnerError),
    #[error("malformed row {row:?}: {reason}")]
    MalformedRow { row: String, reason: String },
    #[error("could not determine the home directory for the default store")]
    NoDefaultStore,
}

/// Location of the Knowledge store for the current user.
pub fn default_store_location() -> Option<PathBuf> {
    dirs::home_dir().map(|home| {
        home.join("Library")
            .join("Application Support")
            .join("Knowledge")
            .join("knowledgeC.db")
    })
}

/// Validates a `YYYY-MM-DD` date string.
pub fn parse_date(date: &str) -> Result<NaiveDate, QueryError> {
    let invalid = || QueryError::InvalidInput {
        date: date.to_string(),
    };
    if !DATE_RE.is_match(date) {
        return Err(invalid());
    }
    NaiveDate::parse_from_str(date, "%Y-%m-%d").map_err(|_| invalid())
}

/// SQL selecting one day's application usage in local time.
///
/// Columns: identifier, start `HH:MM:SS`, end `HH:MM:SS`, rounded seconds.
pub fn usage_sql(date: NaiveDate) -> String {
    let day = date.format("%Y-%m-%d");
    format!(
        "SELECT ZVALUESTRING, \
         strftime('%H:%M:%S', ZSTARTDATE + {CORE_DATA_EPOCH}, 'unixepoch', 'localtime'), \
         strftime('%H:%M:%S', ZENDDATE + {CORE_DATA_EPOCH}, 'unixepoch', 'localtime'), \
         CAST(ROUND(ZENDDATE - ZSTARTDATE) AS INTEGER) \
         FROM ZOBJECT \
         WHERE ZSTREAMNAME = '{APP_USAGE_STREAM}' \
         AND date(ZSTARTDATE + {CORE_DATA_EPOCH}, 'unixepoch', 'localtime') = '{day}' \
         AND ZENDDATE > ZSTARTDATE \
         ORDER BY ZSTARTDATE;\n"
    )
}

/// Parses one result row.
///
/// Rows without an identifier or with a non-positive duration are noise and
/// yield `None`.
pub fn parse_row(row: &str) -> Result<Option<RawInterval>, QueryFailure> {
    let malformed = |reason: &str| QueryFailure::MalformedRow {
        row: row.to_string(),
        reason: reason.to_string(),
    };

    // Split from the right so an identifier containing the separator survives.
    let mut fields = row.rsplitn(4, FIELD_SEPARATOR);
    let (Some(duration), Some(end), Some(start), Some(identifier)) =
        (fields.next(), fields.next(), fields.next(), fields.next())
    else {
        return Err(malformed("expected 4 fields"));
    };

    if identifier.is_empty() {
        return Ok(None);
    }
    let duration_seconds: i64 = duration
        .trim()
        .parse()
        .map_err(|_| malformed("duration is not an integer"))?;
    if duration_seconds <= 0 {
        return Ok(None);
    }
    let parse_time = |value: &str, which: &str| {
        NaiveTime::parse_from_str(value, "%H:%M:%S")
            .map_err(|_| malformed(&format!("{which} time is not HH:MM:SS")))
    };

    Ok(Some(RawInterval {
        identifier: identifier.to_string(),
        start_time: parse_time(start, "start")?,
        end_time: parse_time(end, "end")?,
        duration_seconds,
    }))
}

/// Returns the application usage intervals recorded on `date`.
///
/// `store_location` defaults to [`default_store_location`].
pub fn query_usage<R: QueryRunner + ?Sized>(
    runner: &R,
    date: &str,
    store_location: Option<&Path>,
    timeout: Duration,
) -> Result<Vec<RawInterval>, QueryError> {
    let day = parse_date(date)?;
    let store = match store_location {
        Some(path) => path.to_path_buf(),
        None => default_store_location().ok_or(QueryFailure::NoDefaultStore)?,
    };

    tracing::debug!(%day, store = %store.display(), "querying usage store");
    let rows = runner
        .run_query(&usage_sql(day), &store, timeout)
        .map_err(QueryFailure::from)?;

    let mut intervals = Vec::with_capacity(rows.len());
    for row in &rows {
        if let Some(interval) = parse_row(row)? {
            intervals.push(interval);
        }
    }
    tracing::debug!(%day, rows = rows.len(), intervals = intervals.len(), "usage query finished");
    Ok(intervals)
}

/// A configured store: runner, location and timeout.
#[derive(Debug, Clone)]
pub struct UsageStore<R> {
    runner: R,
    location: Option<PathBuf>,
    timeout: Duration,
}

impl<R: QueryRunner> UsageStore<R> {
    pub const fn new(runner: R, location: Option<PathBuf>) -> Self {
        Self {
            runner,
            location,
            timeout: DEFAULT_QUERY_TIMEOUT,
        }
    }

    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }

    /// Queries a `YYYY-MM-DD` date.
    pub fn query_date(&self, date: &str) -> Result<Vec<RawInterval>, QueryError> {
        query_usage(&self.runner, date, self.location.as_deref(), self.timeout)
    }
}

impl<R: QueryRunner> UsageSource for UsageStore<R> {
    type Error = QueryError;

    fn query_usage(&self, date: NaiveDate) -> Result<Vec<RawInterval>, QueryError> {
        self.query_date(&date.format("%Y-%m-%d").to_string())
    }
}
