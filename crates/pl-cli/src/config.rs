//! Configuration loading and management.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use pl_core::LoadOptions;
use serde::{Deserialize, Serialize};

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the play event log.
    pub log_path: PathBuf,

    /// Abandon loading after this many milliseconds.
    #[serde(default)]
    pub load_timeout_ms: Option<u64>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("log_path", &self.log_path)
            .field("load_timeout_ms", &self.load_timeout_ms)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            log_path: data_dir.join("PlayEvent.dat"),
            load_timeout_ms: None,
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

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (PL_*)
        figment = figment.merge(Env::prefixed("PL_"));

        figment.extract()
    }

    /// Loader options derived from this configuration.
    pub fn load_options(&self) -> LoadOptions {
        self.load_timeout_ms
            .map(|ms| LoadOptions::with_timeout(Duration::from_millis(ms)))
            .unwrap_or_default()
    }
}

/// Returns the platform-specific config directory for pl.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("pl"))
}

/// Returns the platform-specific data directory for pl.
///
/// On Linux: `~/.local/share/pl`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("pl"))
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    #[test]
    fn test_dirs_data_path_ends_with_pl() {
        let path = dirs_data_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "pl");
    }

    #[test]
    fn test_default_config_uses_data_dir_for_log() {
        let config = Config::default();
        let data_dir = dirs_data_path().unwrap();
        assert_eq!(config.log_path, data_dir.join("PlayEvent.dat"));
        assert_eq!(config.load_timeout_ms, None);
    }

    #[test]
    fn test_config_file_overrides_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, r#"log_path = "/tmp/custom.dat""#).unwrap();
        writeln!(file, "load_timeout_ms = 250").unwrap();
        file.flush().unwrap();

        let config = Config::load_from(Some(file.path())).unwrap();
        assert_eq!(config.log_path, PathBuf::from("/tmp/custom.dat"));
        assert_eq!(config.load_timeout_ms, Some(250));
        assert!(config.load_options().deadline.is_some());
    }

    #[test]
    fn test_no_timeout_means_no_deadline() {
        assert!(Config::default().load_options().deadline.is_none());
    }
}
