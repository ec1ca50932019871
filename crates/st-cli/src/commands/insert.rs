//! Insert command: write the day's summary into its daily note.

use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::NaiveDate;

use st_core::note::{daily_note_path, insert_section, render_markdown};
use st_core::{AppNameResolver, MetadataLookup};
use st_store::{QueryRunner, UsageStore};

use super::util::{format_date, query_day, summarize};

/// What happened to the note.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Inserted,
    NoData,
    NoteMissing,
}

pub fn run<W: Write, R: QueryRunner, L: MetadataLookup>(
    writer: &mut W,
    store: &UsageStore<R>,
    resolver: &mut AppNameResolver<L>,
    note_folder: &Path,
    date: NaiveDate,
    min_duration_seconds: i64,
) -> Result<Outcome> {
    // Checked before the minimum-duration filter.
    let raw = query_day(store, date)?;
    if raw.is_empty() {
        writeln!(writer, "No Screen Time data found for {}", format_date(date))?;
        return Ok(Outcome::NoData);
    }
    let summary = summarize(&raw, resolver, date, min_duration_seconds);

    let path = daily_note_path(note_folder, date);
    if !path.is_file() {
        writeln!(writer, "Daily note not found: {}", path.display())?;
        return Ok(Outcome::NoteMissing);
    }

    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let updated = insert_section(&content, &render_markdown(&summary));
    std::fs::write(&path, updated).with_context(|| format!("failed to write {}", path.display()))?;

    tracing::info!(path = %path.display(), %date, "inserted screen time section");
    writeln!(writer, "Screen Time inserted into {}", path.display())?;
    Ok(Outcome::Inserted)
}

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;
    use st_core::NoMetadata;

    use crate::commands::util::fixtures;

    fn note_path(folder: &Path) -> std::path::PathBuf {
        let path = folder.join("2026").join("01").join("2026-01-15.md");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        path
    }

    #[test]
    fn insert_before_tag_line() {
        let temp = tempfile::tempdir().unwrap();
        let store = fixtures::sample_store(temp.path());
        let notes = temp.path().join("daily");
        let path = note_path(&notes);
        std::fs::write(&path, "# Thursday\n\n- standup\n\n#2026-01 #daily\n").unwrap();
        let mut resolver = AppNameResolver::new(NoMetadata);

        let mut output = Vec::new();
        let outcome = run(&mut output, &store, &mut resolver, &notes, fixtures::day(), 60).unwrap();

        assert_eq!(outcome, Outcome::Inserted);
        assert_snapshot!(std::fs::read_to_string(&path).unwrap(), @r"
        # Thursday

        - standup

        ## Screen Time

        | Hour | App | Duration |
        |------|-----|----------|
        | 09:00 | Safari | 45m |
        | 09:00 | Notes | 5m |
        | 10:00 | FooBar | 1h 10m |
        | **Total** | - | **2h** |

        #2026-01 #daily
        ");
    }

    #[test]
    fn insert_replaces_existing_section() {
        let temp = tempfile::tempdir().unwrap();
        let store = fixtures::sample_store(temp.path());
        let notes = temp.path().join("daily");
        let path = note_path(&notes);
        std::fs::write(&path, "# Thursday\n\n## Screen Time\n\nstale\n\n## Journal\n\ntext\n")
            .unwrap();
        let mut resolver = AppNameResolver::new(NoMetadata);

        let mut output = Vec::new();
        run(&mut output, &store, &mut resolver, &notes, fixtures::day(), 60).unwrap();
        run(&mut output, &store, &mut resolver, &notes, fixtures::day(), 60).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.matches("## Screen Time").count(), 1);
        assert!(!content.contains("stale"));
        assert!(
            content.ends_with("| **Total** | - | **2h** |\n\n## Journal\n\ntext\n"),
            "{content}"
        );
    }

    #[test]
    fn missing_note_is_a_notice() {
        let temp = tempfile::tempdir().unwrap();
        let store = fixtures::sample_store(temp.path());
        let notes = temp.path().join("daily");
        let mut resolver = AppNameResolver::new(NoMetadata);

        let mut output = Vec::new();
        let outcome = run(&mut output, &store, &mut resolver, &notes, fixtures::day(), 60).unwrap();

        assert_eq!(outcome, Outcome::NoteMissing);
        let expected = format!(
            "Daily note not found: {}\n",
            notes.join("2026").join("01").join("2026-01-15.md").display()
        );
        assert_eq!(String::from_utf8(output).unwrap(), expected);
    }

    #[test]
    fn empty_day_leaves_note_untouched() {
        let temp = tempfile::tempdir().unwrap();
        let store = fixtures::sample_store(temp.path());
        let notes = temp.path().join("daily");
        let path = notes.join("2026").join("01").join("2026-01-16.md");
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(&path, "# Friday\n").unwrap();
        let mut resolver = AppNameResolver::new(NoMetadata);

        let mut output = Vec::new();
        let date = NaiveDate::from_ymd_opt(2026, 1, 16).unwrap();
        let outcome = run(&mut output, &store, &mut resolver, &notes, date, 60).unwrap();

        assert_eq!(outcome, Outcome::NoData);
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# Friday\n");
        assert_eq!(
            String::from_utf8(output).unwrap(),
            "No Screen Time data found for 2026-01-16\n"
        );
    }

    #[test]
    fn short_visits_still_write_a_table() {
        let temp = tempfile::tempdir().unwrap();
        let rows = [("com.apple.mail", (10, 0, 0), (10, 0, 30))];
        let path = fixtures::knowledge_store(temp.path(), &rows);
        let store = UsageStore::new(st_store::SqliteRunner, Some(path));
        let notes = temp.path().join("daily");
        let note = note_path(&notes);
        std::fs::write(&note, "# Thursday
").unwrap();
        let mut resolver = AppNameResolver::new(NoMetadata);

        let mut output = Vec::new();
        let outcome = run(&mut output, &store, &mut resolver, &notes, fixtures::day(), 60).unwrap();

        assert_eq!(outcome, Outcome::Inserted);
        assert_snapshot!(std::fs::read_to_string(&note).unwrap(), @r"
        # Thursday

        ## Screen Time

        | Hour | App | Duration |
        |------|-----|----------|
        | **Total** | - | **0m** |
        ");
    }

    #[test]
    fn query_failure_is_an_error() {
        let temp = tempfile::tempdir().unwrap();
        let store = UsageStore::new(st_store::SqliteRunner, Some(temp.path().join("missing.db")));
        let mut resolver = AppNameResolver::new(NoMetadata);

        let mut output = Vec::new();
        let err = run(
            &mut output,
            &store,
            &mut resolver,
            temp.path(),
            fixtures::day(),
            60,
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("store not found"), "{err:#}");
    }
}
