//! CLI subcommand implementations.

pub mod insert;
pub mod query;
pub mod resolve;
pub mod summary;
pub mod util;
