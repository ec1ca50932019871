//! Timeline view state, transitions and layout.
//!
//! The view is a vertical strip covering 06:00 to 24:00 where one hour is
//! `hour_height_px` pixels tall. State changes go through [`transition`];
//! geometry comes from [`layout`] and [`hour_marks`]. Neither touches I/O.

use chrono::{Datelike, Duration, NaiveDate};

use crate::aggregate::{format_minutes, round_to_minutes};
use crate::color::{Hsl, app_color};
use crate::usage::ResolvedInterval;

/// First visible hour.
pub const WINDOW_START_HOUR: i64 = 6;
/// Hour at which the visible window ends (exclusive).
pub const WINDOW_END_HOUR: i64 = 24;

const WINDOW_START_MINUTES: i64 = WINDOW_START_HOUR * 60;
const WINDOW_END_MINUTES: i64 = WINDOW_END_HOUR * 60;

pub const ZOOM_MIN: u32 = 40;
pub const ZOOM_MAX: u32 = 240;
pub const ZOOM_STEP: i32 = 20;
pub const ZOOM_DEFAULT: u32 = 80;

/// Blocks are never drawn shorter than this.
pub const MIN_BLOCK_HEIGHT_PX: f64 = 2.0;
/// Blocks shorter than this get no inline label.
pub const LABEL_MIN_HEIGHT_PX: f64 = 16.0;

/// What the timeline is currently showing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ViewState {
    pub current_date: NaiveDate,
    /// Pixel height of one hour, always within `[ZOOM_MIN, ZOOM_MAX]`.
    pub hour_height_px: u32,
}

impl ViewState {
    pub const fn new(current_date: NaiveDate) -> Self {
        Self {
            current_date,
            hour_height_px: ZOOM_DEFAULT,
        }
    }

    /// Total height of the hour grid.
    pub fn timeline_height_px(&self) -> f64 {
        minutes_to_px(WINDOW_END_MINUTES - WINDOW_START_MINUTES, self.hour_height_px)
    }

    pub fn is_today(&self, today: NaiveDate) -> bool {
        self.current_date == today
    }

    /// Zoom relative to the default, e.g. `"125%"`.
    pub fn zoom_label(&self) -> String {
        let percent = f64::from(self.hour_height_px) / f64::from(ZOOM_DEFAULT) * 100.0;
        format!("{percent:.0}%")
    }
}

/// User intents the timeline reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    PreviousDay,
    NextDay,
    /// Jump to the given date, normally the local "today".
    Today { today: NaiveDate },
    /// Change the hour height by `delta` pixels, clamped.
    Zoom(i32),
    ZoomIn,
    ZoomOut,
    ResetZoom,
    /// Re-query the current day without changing state.
    Refresh,
}

/// Applies an action to the view state.
pub fn transition(state: ViewState, action: Action) -> ViewState {
    match action {
        Action::PreviousDay => ViewState {
            current_date: shift_day(state.current_date, -1),
            ..state
        },
        Action::NextDay => ViewState {
            current_date: shift_day(state.current_date, 1),
            ..state
        },
        Action::Today { today } => ViewState {
            current_date: today,
            ..state
        },
        Action::Zoom(delta) => ViewState {
            hour_height_px: clamp_zoom(state.hour_height_px, delta),
            ..state
        },
        Action::ZoomIn => transition(state, Action::Zoom(ZOOM_STEP)),
        Action::ZoomOut => transition(state, Action::Zoom(-ZOOM_STEP)),
        Action::ResetZoom => ViewState {
            hour_height_px: ZOOM_DEFAULT,
            ..state
        },
        Action::Refresh => state,
    }
}

fn shift_day(date: NaiveDate, days: i64) -> NaiveDate {
    date.checked_add_signed(Duration::days(days)).unwrap_or(date)
}

fn clamp_zoom(current: u32, delta: i32) -> u32 {
    let next = i64::from(current) + i64::from(delta);
    let clamped = next.clamp(i64::from(ZOOM_MIN), i64::from(ZOOM_MAX));
    u32::try_from(clamped).unwrap_or(ZOOM_DEFAULT)
}

#[expect(
    clippy::cast_precision_loss,
    reason = "minute offsets stay far below 2^52"
)]
fn minutes_to_px(minutes: i64, hour_height_px: u32) -> f64 {
    minutes as f64 / 60.0 * f64::from(hour_height_px)
}

/// A positioned, colored interval on the timeline.
#[derive(Debug, Clone, PartialEq)]
pub struct TimelineBlock {
    pub name: String,
    /// Offset from the top of the grid.
    pub top_px: f64,
    pub height_px: f64,
    pub color: Hsl,
    /// Whether the block is tall enough for an inline label.
    pub show_label: bool,
    /// Hover text: name, clock range and rounded duration.
    pub tooltip: String,
}

/// Positions intervals inside the visible window.
///
/// Intervals are clipped to the window; anything left shorter than a minute
/// is dropped.
pub fn layout(intervals: &[ResolvedInterval], state: &ViewState) -> Vec<TimelineBlock> {
    intervals
        .iter()
        .filter_map(|interval| {
            if interval.end_minutes <= WINDOW_START_MINUTES
                || interval.start_minutes >= WINDOW_END_MINUTES
            {
                return None;
            }
            let start = interval.start_minutes.max(WINDOW_START_MINUTES);
            let end = interval.end_minutes.min(WINDOW_END_MINUTES);
            let duration = end - start;
            if duration < 1 {
                return None;
            }

            let top_px = minutes_to_px(start - WINDOW_START_MINUTES, state.hour_height_px);
            let raw_height = minutes_to_px(duration, state.hour_height_px);

            Some(TimelineBlock {
                name: interval.name.clone(),
                top_px,
                height_px: raw_height.max(MIN_BLOCK_HEIGHT_PX),
                color: app_color(&interval.name),
                show_label: raw_height >= LABEL_MIN_HEIGHT_PX,
                tooltip: tooltip(interval),
            })
        })
        .collect()
}

fn tooltip(interval: &ResolvedInterval) -> String {
    format!(
        "{}\n{} - {}\n{}",
        interval.name,
        clock(interval.start_minutes),
        clock(interval.end_minutes),
        format_minutes(round_to_minutes(interval.duration_seconds)),
    )
}

fn clock(minutes: i64) -> String {
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

/// An hour gridline with its label.
#[derive(Debug, Clone, PartialEq)]
pub struct HourMark {
    pub label: String,
    pub top_px: f64,
}

/// Gridlines for every hour from the window start through its end.
pub fn hour_marks(state: &ViewState) -> Vec<HourMark> {
    (WINDOW_START_HOUR..=WINDOW_END_HOUR)
        .map(|hour| HourMark {
            label: format!("{hour:02}:00"),
            top_px: minutes_to_px((hour - WINDOW_START_HOUR) * 60, state.hour_height_px),
        })
        .collect()
}

/// Short date label, e.g. `"1/15 (Thu)"`.
pub fn date_label(date: NaiveDate) -> String {
    format!("{}/{} ({})", date.month(), date.day(), date.format("%a"))
}

/// Scroll position captured as a fraction of the scrollable range.
///
/// Captured before a zoom and applied after re-rendering, it keeps the same
/// time of day in view.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollAnchor {
    ratio: f64,
}

impl ScrollAnchor {
    /// Records `scroll_top` relative to the container's overflow.
    ///
    /// Containers without overflow anchor at the top.
    pub fn capture(scroll_top: f64, scroll_height: f64, client_height: f64) -> Self {
        let max_scroll = scroll_height - client_height;
        let ratio = if max_scroll > 0.0 {
            (scroll_top / max_scroll).clamp(0.0, 1.0)
        } else {
            0.0
        };
        Self { ratio }
    }

    pub const fn ratio(self) -> f64 {
        self.ratio
    }

    /// The scroll offset that restores the ratio in a re-rendered container.
    pub fn apply(self, scroll_height: f64, client_height: f64) -> f64 {
        let max_scroll = (scroll_height - client_height).max(0.0);
        self.ratio * max_scroll
    }
}
