//! Query runners: execute SQL against a store and return `|`-delimited rows.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use rusqlite::types::ValueRef;
use rusqlite::{Connection, OpenFlags};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::process::{self, ProcessError};

/// Separator between fields of a result row.
pub const FIELD_SEPARATOR: char = '|';

/// Runner errors.
#[derive(Debug, Error)]
pub enum RunnerError {
    #[error("store not found: {}", path.display())]
    MissingStore { path: PathBuf },
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Process(#[from] ProcessError),
}

/// Runs a read-only query and returns one text line per result row.
pub trait QueryRunner {
    fn run_query(
        &self,
        sql: &str,
        store: &Path,
        timeout: Duration,
    ) -> Result<Vec<String>, RunnerError>;
}

impl<T: QueryRunner + ?Sized> QueryRunner for &T {
    fn run_query(
        &self,
        sql: &str,
        store: &Path,
        timeout: Duration,
    ) -> Result<Vec<String>, RunnerError> {
        (**self).run_query(sql, store, timeout)
    }
}

fn require_store(store: &Path) -> Result<(), RunnerError> {
    if store.is_file() {
        Ok(())
    } else {
        Err(RunnerError::MissingStore {
            path: store.to_path_buf(),
        })
    }
}

/// Queries the store in-process with a read-only `rusqlite` connection.
///
/// The timeout bounds how long the query waits on a locked database.
#[derive(Debug, Clone, Copy, Default)]
pub struct SqliteRunner;

impl QueryRunner for SqliteRunner {
    fn run_query(
        &self,
        sql: &str,
        store: &Path,
        timeout: Duration,
    ) -> Result<Vec<String>, RunnerError> {
        require_store(store)?;
        let conn = Connection::open_with_flags(
            store,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        conn.busy_timeout(timeout)?;

        let mut stmt = conn.prepare(sql)?;
        let columns = stmt.column_count();
        let rows = stmt.query_map([], |row| {
            let fields = (0..columns)
                .map(|i| row.get_ref(i).map(render_value))
                .collect::<Result<Vec<_>, _>>()?;
            Ok(fields.join(&FIELD_SEPARATOR.to_string()))
        })?;
        Ok(rows.collect::<Result<Vec<_>, _>>()?)
    }
}

fn render_value(value: ValueRef<'_>) -> String {
    match value {
        ValueRef::Null => String::new(),
        ValueRef::Integer(i) => i.to_string(),
        ValueRef::Real(f) => f.to_string(),
        ValueRef::Text(bytes) | ValueRef::Blob(bytes) => {
            String::from_utf8_lossy(bytes).into_owned()
        }
    }
}

/// Queries the store through the `sqlite3` command-line shell.
///
/// The SQL goes through a scratch file fed to the shell's stdin. The file is
/// removed when the query returns, whatever the outcome.
#[derive(Debug, Clone)]
pub struct Sqlite3CliRunner {
    program: PathBuf,
    scratch_dir: PathBuf,
}

impl Default for Sqlite3CliRunner {
    fn default() -> Self {
        Self {
            program: PathBuf::from("sqlite3"),
            scratch_dir: std::env::temp_dir(),
        }
    }
}

impl Sqlite3CliRunner {
    pub fn new(program: impl Into<PathBuf>, scratch_dir: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            scratch_dir: scratch_dir.into(),
        }
    }
}

impl QueryRunner for Sqlite3CliRunner {
    fn run_query(
        &self,
        sql: &str,
        store: &Path,
        timeout: Duration,
    ) -> Result<Vec<String>, RunnerError> {
        // The shell would create an empty database for a missing path.
        require_store(store)?;

        let mut script = tempfile::Builder::new()
            .prefix("screentime_")
            .suffix(".sql")
            .tempfile_in(&self.scratch_dir)?;
        script.write_all(sql.as_bytes())?;
        script.flush()?;

        let mut command = Command::new(&self.program);
        command
            .arg("-readonly")
            .arg("-separator")
            .arg(FIELD_SEPARATOR.to_string())
            .arg(store);
        let stdout = process::run(command, Stdio::from(script.reopen()?), timeout)?;

        Ok(stdout
            .lines()
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect())
    }
}

/// Which runner to query the store with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// In-process `rusqlite`.
    #[default]
    Sqlite,
    /// The `sqlite3` shell.
    Sqlite3,
}

/// A runner chosen at runtime.
#[derive(Debug, Clone)]
pub enum Runner {
    Sqlite(SqliteRunner),
    Sqlite3(Sqlite3CliRunner),
}

impl From<Backend> for Runner {
    fn from(backend: Backend) -> Self {
        match backend {
            Backend::Sqlite => Self::Sqlite(SqliteRunner),
            Backend::Sqlite3 => Self::Sqlite3(Sqlite3CliRunner::default()),
        }
    }
}

impl QueryRunner for Runner {
    fn run_query(
        &self,
        sql: &str,
        store: &Path,
        timeout: Duration,
    ) -> Result<Vec<String>, RunnerError> {
        match self {
            Self::Sqlite(runner) => runner.run_query(sql, store, timeout),
            Self::Sqlite3(runner) => runner.run_query(sql, store, timeout),
        }
    }
}
