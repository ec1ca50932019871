//! Application metadata lookup through Spotlight (`mdfind` / `mdls`).

use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use st_core::{LookupError, MetadataLookup};

use crate::process;

/// Default bound on each Spotlight call.
pub const DEFAULT_LOOKUP_TIMEOUT: Duration = Duration::from_secs(5);

/// Finds application bundles by identifier and reads their display names.
#[derive(Debug, Clone)]
pub struct SpotlightLookup {
    mdfind: PathBuf,
    mdls: PathBuf,
    timeout: Duration,
}

impl Default for SpotlightLookup {
    fn default() -> Self {
        Self::new(DEFAULT_LOOKUP_TIMEOUT)
    }
}

impl SpotlightLookup {
    pub fn new(timeout: Duration) -> Self {
        Self {
            mdfind: PathBuf::from("mdfind"),
            mdls: PathBuf::from("mdls"),
            timeout,
        }
    }

    /// Uses the given executables instead of the system ones.
    pub fn with_programs(mut self, mdfind: impl Into<PathBuf>, mdls: impl Into<PathBuf>) -> Self {
        self.mdfind = mdfind.into();
        self.mdls = mdls.into();
        self
    }
}

/// Spotlight query matching a bundle identifier exactly.
fn bundle_query(identifier: &str) -> String {
    let escaped = identifier.replace('\\', "\\\\").replace('\'', "\\'");
    format!("kMDItemCFBundleIdentifier == '{escaped}'")
}

impl MetadataLookup for SpotlightLookup {
    fn locate(&self, identifier: &str) -> Result<Option<PathBuf>, LookupError> {
        let mut command = Command::new(&self.mdfind);
        command.arg(bundle_query(identifier));
        let stdout = process::run(command, Stdio::null(), self.timeout).map_err(LookupError::new)?;

        Ok(stdout
            .lines()
            .map(str::trim)
            .find(|line| !line.is_empty())
            .map(PathBuf::from))
    }

    fn display_name(&self, path: &Path) -> Result<Option<String>, LookupError> {
        let mut command = Command::new(&self.mdls);
        command
            .arg("-name")
            .arg("kMDItemDisplayName")
            .arg("-raw")
            .arg(path);
        let stdout = process::run(command, Stdio::null(), self.timeout).map_err(LookupError::new)?;

        let name = stdout.trim();
        Ok((!name.is_empty()).then(|| name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_quotes_identifier() {
        assert_eq!(
            bundle_query("com.apple.Safari"),
            "kMDItemCFBundleIdentifier == 'com.apple.Safari'"
        );
        assert_eq!(
            bundle_query("it's"),
            r"kMDItemCFBundleIdentifier == 'it\'s'"
        );
    }

    #[test]
    fn echo_stands_in_for_spotlight() {
        // `echo` prints its arguments, which is enough to exercise the parsing.
        let lookup = SpotlightLookup::default().with_programs("echo", "echo");
        let path = lookup.locate("com.example.app").unwrap().unwrap();
        assert_eq!(
            path,
            PathBuf::from("kMDItemCFBundleIdentifier == 'com.example.app'")
        );
        let name = lookup.display_name(Path::new("Thing.app")).unwrap();
        assert_eq!(name.as_deref(), Some("-name kMDItemDisplayName -raw Thing.app"));
    }

    #[test]
    fn missing_tool_is_a_lookup_error() {
        let lookup = SpotlightLookup::new(Duration::from_secs(1))
            .with_programs("/nonexistent/mdfind", "/nonexistent/mdls");
        assert!(lookup.locate("com.example.app").is_err());
    }

    #[test]
    fn resolver_falls_back_when_spotlight_is_missing() {
        let lookup = SpotlightLookup::new(Duration::from_secs(1))
            .with_programs("/nonexistent/mdfind", "/nonexistent/mdls");
        let mut resolver = st_core::AppNameResolver::new(lookup);
        assert_eq!(resolver.resolve_name("com.example.fooBar"), "FooBar");
    }
}
