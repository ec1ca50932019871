//! Interactive terminal timeline.

mod app;
mod ui;

use anyhow::Result;
use chrono::NaiveDate;

use st_core::{AppNameResolver, MetadataLookup, TimelineSession, UsageSource};

pub use app::{App, ROW_PX};

/// Opens the timeline on `date` and runs until the user quits.
pub fn run<S: UsageSource, L: MetadataLookup>(
    source: S,
    resolver: &mut AppNameResolver<L>,
    min_duration_seconds: i64,
    date: NaiveDate,
    today: NaiveDate,
) -> Result<()> {
    let session = TimelineSession::open(source, resolver, min_duration_seconds, date);
    let mut app = App::new(session, today);
    app.run()
}
