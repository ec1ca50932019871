//! Configuration loading and management.

use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};

use st_store::Backend;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Root folder of the daily notes, laid out as `{YYYY}/{MM}/{date}.md`.
    pub note_folder: PathBuf,
    /// Intervals shorter than this are ignored everywhere.
    pub minimum_duration_seconds: i64,
    /// Knowledge store to read; empty means the system default.
    pub store_location: String,
    /// How to run queries against the store.
    pub backend: Backend,
    pub query_timeout_secs: u64,
    pub lookup_timeout_secs: u64,
    /// Ask Spotlight for display names of unknown identifiers.
    pub metadata_lookup: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            note_folder: PathBuf::from("life/daily"),
            minimum_duration_seconds: 60,
            store_location: String::new(),
            backend: Backend::default(),
            query_timeout_secs: 10,
            lookup_timeout_secs: 5,
            metadata_lookup: true,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // ST_NOTE_FOLDER, ST_BACKEND, ...
        figment = figment.merge(Env::prefixed("ST_"));

        figment.extract()
    }

    /// The configured store, or `None` for the system default.
    pub fn store_path(&self) -> Option<PathBuf> {
        let location = self.store_location.trim();
        (!location.is_empty()).then(|| PathBuf::from(location))
    }

    pub const fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }

    pub const fn lookup_timeout(&self) -> Duration {
        Duration::from_secs(self.lookup_timeout_secs)
    }
}

/// Returns the platform-specific config directory for st.
///
/// On Linux: `~/.config/screentime`
pub fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("screentime"))
}
