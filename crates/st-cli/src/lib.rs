//! Screen time CLI library.
//!
//! This crate provides the `st` command-line interface and its terminal
//! timeline.

mod cli;
pub mod commands;
mod config;
pub mod tui;

pub use cli::{Cli, Commands, DayArgs};
pub use config::Config;
