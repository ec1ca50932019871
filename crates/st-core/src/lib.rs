//! Core domain logic for screen time summaries.
//!
//! This crate contains the fundamental types and logic for:
//! - Resolution: mapping bundle identifiers to display names, with caching
//! - Aggregation: hourly buckets and daily totals in whole minutes
//! - Timeline: view state transitions, block layout and colors
//! - Notes: rendering a summary as Markdown and placing it in a daily note

pub mod aggregate;
pub mod color;
pub mod note;
pub mod resolver;
pub mod timeline;
pub mod usage;
pub mod view;

pub use aggregate::{app_totals, build_daily_summary, build_hourly, format_minutes};
pub use color::{Hsl, app_color};
pub use resolver::{AppNameResolver, LookupError, MetadataLookup, NameCache, NoMetadata};
pub use timeline::{Action, ScrollAnchor, TimelineBlock, ViewState, layout, transition};
pub use usage::{AppMinutes, DailySummary, HourlyBucket, RawInterval, ResolvedInterval};
pub use view::{DayContent, DayTimeline, TimelineSession, UsageSource};
