//! Application identifier to display name resolution.
//!
//! Names are resolved in tiers, first success wins:
//! 1. A static table of well-known bundle identifiers.
//! 2. A [`MetadataLookup`] (Spotlight on macOS) that finds the application
//!    bundle and reads its display name.
//! 3. The last dot-separated segment of the identifier, capitalized.
//!
//! Every result is memoized in a [`NameCache`] owned by the resolver.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::usage::{RawInterval, ResolvedInterval};

/// Well-known bundle identifiers and their display names.
const KNOWN_APPS: &[(&str, &str)] = &[
    ("com.apple.Safari", "Safari"),
    ("com.apple.finder", "Finder"),
    ("com.apple.mail", "Mail"),
    ("com.apple.MobileSMS", "Messages"),
    ("com.apple.iCal", "Calendar"),
    ("com.apple.reminders", "Reminders"),
    ("com.apple.Notes", "Notes"),
    ("com.apple.Preview", "Preview"),
    ("com.apple.Terminal", "Terminal"),
    ("com.apple.dt.Xcode", "Xcode"),
    ("com.apple.Music", "Music"),
    ("com.apple.Passwords", "Passwords"),
    ("com.apple.systempreferences", "System Settings"),
    ("com.apple.ActivityMonitor", "Activity Monitor"),
    ("com.microsoft.VSCode", "VS Code"),
    ("com.github.wez.wezterm", "WezTerm"),
    ("company.thebrowser.Browser", "Arc"),
    ("com.tinyspeck.slackmacgap", "Slack"),
    ("com.hnc.Discord", "Discord"),
    ("md.obsidian", "Obsidian"),
    ("com.ableton.live", "Ableton Live"),
    ("com.toggl.daneel", "Toggl Track"),
    ("com.spotify.client", "Spotify"),
    ("com.google.Chrome", "Chrome"),
    ("org.mozilla.firefox", "Firefox"),
    ("com.figma.Desktop", "Figma"),
    ("notion.id", "Notion"),
    ("com.linear", "Linear"),
    ("us.zoom.xos", "Zoom"),
    ("com.readdle.smartemail-macos", "Spark"),
    ("com.culturedcode.ThingsMac", "Things"),
    ("com.flexibits.fantastical2.mac", "Fantastical"),
    ("com.1password.1password", "1Password"),
    ("com.openai.chat", "ChatGPT"),
    ("dev.zed.Zed", "Zed"),
];

/// Sentinel some metadata tools print for a missing attribute.
const NULL_SENTINEL: &str = "(null)";

/// A failed metadata lookup. Never surfaced past the resolver.
#[derive(Debug, Error)]
#[error("metadata lookup failed: {0}")]
pub struct LookupError(#[source] Box<dyn std::error::Error + Send + Sync>);

impl LookupError {
    pub fn new(err: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self(err.into())
    }
}

/// Access to system metadata about installed applications.
pub trait MetadataLookup {
    /// Finds the filesystem path of the application with this identifier.
    fn locate(&self, identifier: &str) -> Result<Option<PathBuf>, LookupError>;

    /// Reads the display name recorded for the artifact at `path`.
    ///
    /// May return the `(null)` sentinel; the resolver rejects it.
    fn display_name(&self, path: &Path) -> Result<Option<String>, LookupError>;
}

impl<T: MetadataLookup + ?Sized> MetadataLookup for Box<T> {
    fn locate(&self, identifier: &str) -> Result<Option<PathBuf>, LookupError> {
        (**self).locate(identifier)
    }

    fn display_name(&self, path: &Path) -> Result<Option<String>, LookupError> {
        (**self).display_name(path)
    }
}

impl<T: MetadataLookup + ?Sized> MetadataLookup for &T {
    fn locate(&self, identifier: &str) -> Result<Option<PathBuf>, LookupError> {
        (**self).locate(identifier)
    }

    fn display_name(&self, path: &Path) -> Result<Option<String>, LookupError> {
        (**self).display_name(path)
    }
}

/// A lookup that never finds anything, for hosts without a metadata index.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoMetadata;

impl MetadataLookup for NoMetadata {
    fn locate(&self, _identifier: &str) -> Result<Option<PathBuf>, LookupError> {
        Ok(None)
    }

    fn display_name(&self, _path: &Path) -> Result<Option<String>, LookupError> {
        Ok(None)
    }
}

/// Memoized identifier → name mappings.
#[derive(Debug, Clone, Default)]
pub struct NameCache {
    entries: HashMap<String, String>,
}

impl NameCache {
    pub fn get(&self, identifier: &str) -> Option<&str> {
        self.entries.get(identifier).map(String::as_str)
    }

    pub fn insert(&mut self, identifier: impl Into<String>, name: impl Into<String>) {
        self.entries.insert(identifier.into(), name.into());
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Resolves identifiers to display names, caching every result.
///
/// Resolution takes `&mut self`, so callers sharing one resolver are
/// serialized by the borrow checker.
#[derive(Debug)]
pub struct AppNameResolver<L> {
    lookup: L,
    cache: NameCache,
}

impl<L: MetadataLookup> AppNameResolver<L> {
    pub fn new(lookup: L) -> Self {
        Self {
            lookup,
            cache: NameCache::default(),
        }
    }

    /// Returns the display name for `identifier`. Never fails.
    pub fn resolve_name(&mut self, identifier: &str) -> String {
        if let Some(cached) = self.cache.get(identifier) {
            return cached.to_string();
        }

        let name = if let Some(known) = known_name(identifier) {
            known.to_string()
        } else if let Some(found) = self.lookup_name(identifier) {
            found
        } else {
            fallback_name(identifier)
        };

        tracing::debug!(identifier, %name, "resolved application name");
        self.cache.insert(identifier, name.clone());
        name
    }

    /// Drops the minimum-duration noise, then resolves every interval.
    pub fn resolve_intervals(
        &mut self,
        intervals: &[RawInterval],
        min_duration_seconds: i64,
    ) -> Vec<ResolvedInterval> {
        intervals
            .iter()
            .filter(|raw| raw.duration_seconds >= min_duration_seconds)
            .map(|raw| {
                let name = self.resolve_name(&raw.identifier);
                ResolvedInterval::new(raw, name)
            })
            .collect()
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }

    pub const fn cache(&self) -> &NameCache {
        &self.cache
    }

    pub const fn lookup(&self) -> &L {
        &self.lookup
    }

    fn lookup_name(&self, identifier: &str) -> Option<String> {
        let path = match self.lookup.locate(identifier) {
            Ok(Some(path)) if !path.as_os_str().is_empty() => path,
            Ok(_) => return None,
            Err(err) => {
                tracing::debug!(identifier, error = %err, "application lookup failed");
                return None;
            }
        };

        let name = match self.lookup.display_name(&path) {
            Ok(Some(name)) => name,
            Ok(None) => return None,
            Err(err) => {
                tracing::debug!(
                    identifier,
                    path = %path.display(),
                    error = %err,
                    "display name lookup failed"
                );
                return None;
            }
        };

        let name = name.trim();
        if name.is_empty() || name == NULL_SENTINEL {
            return None;
        }
        Some(name.strip_suffix(".app").unwrap_or(name).to_string())
    }
}

impl Default for AppNameResolver<NoMetadata> {
    fn default() -> Self {
        Self::new(NoMetadata)
    }
}

/// Looks up an identifier in the well-known table.
pub fn known_name(identifier: &str) -> Option<&'static str> {
    KNOWN_APPS
        .iter()
        .find(|(id, _)| *id == identifier)
        .map(|(_, name)| *name)
}

/// Last dot-separated segment with its first character upper-cased.
///
/// Falls back to the whole identifier when the last segment is empty.
pub fn fallback_name(identifier: &str) -> String {
    let last = identifier.rsplit('.').next().unwrap_or(identifier);
    let segment = if last.is_empty() { identifier } else { last };

    let mut chars = segment.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}
