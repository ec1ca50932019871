//! The timeline view controller.
//!
//! Every action runs a full cycle: transition the [`ViewState`], query the
//! day, resolve names, then lay out blocks. There is no caching between
//! cycles and no retry; navigating again is the retry path.

use std::fmt;

use chrono::NaiveDate;

use crate::aggregate::app_totals;
use crate::resolver::{AppNameResolver, MetadataLookup};
use crate::timeline::{
    Action, HourMark, ScrollAnchor, TimelineBlock, ViewState, hour_marks, layout, transition,
};
use crate::usage::{AppMinutes, RawInterval};

/// Source of raw usage intervals for a calendar date.
pub trait UsageSource {
    type Error: fmt::Display;

    fn query_usage(&self, date: NaiveDate) -> Result<Vec<RawInterval>, Self::Error>;
}

impl<T: UsageSource + ?Sized> UsageSource for &T {
    type Error = T::Error;

    fn query_usage(&self, date: NaiveDate) -> Result<Vec<RawInterval>, Self::Error> {
        (**self).query_usage(date)
    }
}

/// A rendered day with usage.
#[derive(Debug, Clone, PartialEq)]
pub struct DayTimeline {
    /// Per-app day totals, most used first.
    pub summary: Vec<AppMinutes>,
    pub total_minutes: i64,
    pub blocks: Vec<TimelineBlock>,
    pub hour_marks: Vec<HourMark>,
    pub height_px: f64,
}

/// What the view shows for the current date.
#[derive(Debug, Clone, PartialEq)]
pub enum DayContent {
    Loaded(DayTimeline),
    /// The query succeeded but nothing survived filtering.
    Empty,
    /// The query failed; the message is shown inline.
    Failed(String),
}

/// Owns the view state and re-renders the day on every action.
pub struct TimelineSession<'r, S, L> {
    source: S,
    resolver: &'r mut AppNameResolver<L>,
    min_duration_seconds: i64,
    state: ViewState,
    content: DayContent,
}

impl<'r, S: UsageSource, L: MetadataLookup> TimelineSession<'r, S, L> {
    /// Opens the view on `date` and renders it.
    pub fn open(
        source: S,
        resolver: &'r mut AppNameResolver<L>,
        min_duration_seconds: i64,
        date: NaiveDate,
    ) -> Self {
        let mut session = Self {
            source,
            resolver,
            min_duration_seconds,
            state: ViewState::new(date),
            content: DayContent::Empty,
        };
        session.render();
        session
    }

    pub const fn state(&self) -> &ViewState {
        &self.state
    }

    pub const fn content(&self) -> &DayContent {
        &self.content
    }

    /// Applies an action and re-renders the visible day.
    pub fn dispatch(&mut self, action: Action) -> &DayContent {
        self.state = transition(self.state, action);
        self.render();
        &self.content
    }

    /// Zooms while keeping the scroll position proportional.
    ///
    /// Takes the container's current geometry and returns the scroll offset to
    /// apply after re-rendering. `chrome_px` is any content above the grid in
    /// the same scroll container.
    pub fn zoom_anchored(
        &mut self,
        action: Action,
        scroll_top: f64,
        client_height: f64,
        chrome_px: f64,
    ) -> f64 {
        let before = self.state.timeline_height_px() + chrome_px;
        let anchor = ScrollAnchor::capture(scroll_top, before, client_height);
        let previous = self.state;
        self.dispatch(action);
        if self.state == previous {
            return scroll_top;
        }
        anchor.apply(self.state.timeline_height_px() + chrome_px, client_height)
    }

    fn render(&mut self) {
        let date = self.state.current_date;
        let raw = match self.source.query_usage(date) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(%date, error = %err, "usage query failed");
                self.content = DayContent::Failed(err.to_string());
                return;
            }
        };

        let resolved = self.resolver.resolve_intervals(&raw, self.min_duration_seconds);
        tracing::debug!(%date, raw = raw.len(), shown = resolved.len(), "rendering day");
        if resolved.is_empty() {
            self.content = DayContent::Empty;
            return;
        }

        let (summary, total_minutes) = app_totals(&resolved);
        self.content = DayContent::Loaded(DayTimeline {
            summary,
            total_minutes,
            blocks: layout(&resolved, &self.state),
            hour_marks: hour_marks(&self.state),
            height_px: self.state.timeline_height_px(),
        });
    }
}

#[cfg(test)]
mod tests {
    use std::cell::{Cell, RefCell};
    use std::collections::HashMap;

    use chrono::NaiveTime;

    use super::*;
    use crate::resolver::NoMetadata;
    use crate::timeline::{ZOOM_DEFAULT, ZOOM_STEP};

    #[derive(Default)]
    struct FakeSource {
        days: RefCell<HashMap<NaiveDate, Result<Vec<RawInterval>, String>>>,
        calls: Cell<usize>,
    }

    impl FakeSource {
        fn with(self, date: NaiveDate, result: Result<Vec<RawInterval>, String>) -> Self {
            self.days.borrow_mut().insert(date, result);
            self
        }
    }

    impl UsageSource for FakeSource {
        type Error = String;

        fn query_usage(&self, date: NaiveDate) -> Result<Vec<RawInterval>, String> {
            self.calls.set(self.calls.get() + 1);
            self.days.borrow().get(&date).cloned().unwrap_or_else(|| Ok(Vec::new()))
        }
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 1, d).unwrap()
    }

    fn safari(start: (u32, u32), end: (u32, u32)) -> RawInterval {
        let start_time = NaiveTime::from_hms_opt(start.0, start.1, 0).unwrap();
        let end_time = NaiveTime::from_hms_opt(end.0, end.1, 0).unwrap();
        RawInterval {
            identifier: "com.apple.Safari".to_string(),
            start_time,
            end_time,
            duration_seconds: (end_time - start_time).num_seconds(),
        }
    }

    #[test]
    fn loaded_day_has_summary_and_blocks() {
        let source = FakeSource::default().with(day(15), Ok(vec![safari((9, 0), (9, 45))]));
        let mut resolver = AppNameResolver::new(NoMetadata);
        let session = TimelineSession::open(&source, &mut resolver, 60, day(15));

        let DayContent::Loaded(timeline) = session.content() else {
            panic!("expected loaded content, got {:?}", session.content());
        };
        assert_eq!(timeline.total_minutes, 45);
        assert_eq!(timeline.summary[0].name, "Safari");
        assert_eq!(timeline.blocks.len(), 1);
        assert_eq!(timeline.hour_marks.len(), 19);
    }

    #[test]
    fn empty_and_failed_are_distinct() {
        let source = FakeSource::default()
            .with(day(15), Ok(Vec::new()))
            .with(day(16), Err("database is locked".to_string()));
        let mut resolver = AppNameResolver::new(NoMetadata);
        let mut session = TimelineSession::open(&source, &mut resolver, 60, day(15));
        assert_eq!(session.content(), &DayContent::Empty);

        let content = session.dispatch(Action::NextDay).clone();
        assert_eq!(content, DayContent::Failed("database is locked".to_string()));
        assert_eq!(session.state().current_date, day(16));
        assert_eq!(session.state().hour_height_px, ZOOM_DEFAULT);
    }

    #[test]
    fn short_intervals_only_render_empty() {
        let blip = RawInterval {
            duration_seconds: 10,
            ..safari((9, 0), (9, 1))
        };
        let source = FakeSource::default().with(day(15), Ok(vec![blip]));
        let mut resolver = AppNameResolver::new(NoMetadata);
        let session = TimelineSession::open(&source, &mut resolver, 60, day(15));
        assert_eq!(session.content(), &DayContent::Empty);
    }

    #[test]
    fn every_action_requeries() {
        let source = FakeSource::default();
        let mut resolver = AppNameResolver::new(NoMetadata);
        let mut session = TimelineSession::open(&source, &mut resolver, 60, day(15));
        session.dispatch(Action::ZoomIn);
        session.dispatch(Action::Refresh);
        session.dispatch(Action::PreviousDay);
        assert_eq!(source.calls.get(), 4);
    }

    #[test]
    fn zoom_anchored_keeps_ratio() {
        let source = FakeSource::default().with(day(15), Ok(vec![safari((9, 0), (9, 45))]));
        let mut resolver = AppNameResolver::new(NoMetadata);
        let mut session = TimelineSession::open(&source, &mut resolver, 60, day(15));

        // 1440px grid in a 400px viewport, scrolled halfway.
        let scroll_top = session.zoom_anchored(Action::ZoomIn, 520.0, 400.0, 0.0);
        assert_eq!(session.state().hour_height_px, ZOOM_DEFAULT + 20);
        assert!((scroll_top - 700.0).abs() < f64::EPSILON);

        let DayContent::Loaded(timeline) = session.content() else {
            panic!("expected loaded content");
        };
        assert!((timeline.blocks[0].top_px - 300.0).abs() < f64::EPSILON);
    }

    #[test]
    fn zoom_at_limit_keeps_scroll() {
        let source = FakeSource::default();
        let mut resolver = AppNameResolver::new(NoMetadata);
        let mut session = TimelineSession::open(&source, &mut resolver, 60, day(15));
        session.dispatch(Action::Zoom(1000));
        let scroll_top = session.zoom_anchored(Action::Zoom(ZOOM_STEP), 123.0, 400.0, 0.0);
        assert!((scroll_top - 123.0).abs() < f64::EPSILON);
    }
}
