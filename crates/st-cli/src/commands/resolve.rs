//! Resolve command: display names for bundle identifiers.

use std::io::Write;

use anyhow::Result;

use st_core::{AppNameResolver, MetadataLookup};

pub fn run<W: Write, L: MetadataLookup>(
    writer: &mut W,
    resolver: &mut AppNameResolver<L>,
    identifiers: &[String],
) -> Result<()> {
    let width = identifiers.iter().map(|id| id.chars().count()).max().unwrap_or(0);
    for identifier in identifiers {
        let name = resolver.resolve_name(identifier);
        writeln!(writer, "{identifier:<width$}  {name}")?;
    }
    Ok(())
}
