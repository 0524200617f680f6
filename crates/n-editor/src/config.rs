//! User preferences, read once at startup from a TOML file.
//!
//! Location: `$N_MARK_CONFIG` if set, otherwise
//! `<config dir>/n-mark/config.toml` (`~/.config/n-mark/config.toml` on
//! Linux). Every key is optional:
//!
//! ```toml
//! tab_size = 4
//! word_wrap = 80
//! show_line_numbers = false
//! cursor_blink_ms = 500     # 0 disables blinking
//! backup = true
//! max_file_size = 10485760
//! ```
//!
//! A missing file is normal and silent. A file that can't be read or parsed
//! is logged and replaced by the defaults; it never stops the editor.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::file::{DEFAULT_MAX_BYTES, LoadLimits};

/// Environment variable that overrides the config file location.
pub const CONFIG_ENV: &str = "N_MARK_CONFIG";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Cells per tab stop in the editor view.
    pub tab_size: u8,
    /// Wrap column of the rendered preview.
    pub word_wrap: u16,
    pub show_line_numbers: bool,
    /// Cursor blink half-period in milliseconds; 0 keeps the cursor solid.
    pub cursor_blink_ms: u64,
    /// Copy the previous file to `<path>.bak` before overwriting it.
    pub backup: bool,
    /// Files larger than this many bytes are refused.
    pub max_file_size: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tab_size: 4,
            word_wrap: 80,
            show_line_numbers: false,
            cursor_blink_ms: 500,
            backup: true,
            max_file_size: DEFAULT_MAX_BYTES,
        }
    }
}

impl Config {
    /// Load from the standard location, falling back to defaults.
    #[must_use]
    pub fn load() -> Self {
        Self::config_path().map_or_else(Self::default, |path| Self::load_from(&path))
    }

    /// Load from `path`, falling back to defaults.
    #[must_use]
    pub fn load_from(path: &Path) -> Self {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no config file, using defaults");
                return Self::default();
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "cannot read config, using defaults");
                return Self::default();
            }
        };
        match Self::from_toml_str(&text) {
            Ok(config) => {
                debug!(path = %path.display(), ?config, "loaded config");
                config
            }
            Err(err) => {
                warn!(path = %path.display(), error = %err, "invalid config, using defaults");
                Self::default()
            }
        }
    }

    /// Parse a config document. Missing keys take their defaults.
    ///
    /// # Errors
    ///
    /// Returns the TOML error for malformed input or mistyped values.
    pub fn from_toml_str(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// Where [`load`](Self::load) looks.
    #[must_use]
    pub fn config_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        dirs::config_dir().map(|d| d.join("n-mark").join("config.toml"))
    }

    /// The blink half-period, or `None` when blinking is off.
    #[must_use]
    pub const fn blink_interval(&self) -> Option<Duration> {
        if self.cursor_blink_ms == 0 {
            None
        } else {
            Some(Duration::from_millis(self.cursor_blink_ms))
        }
    }

    #[must_use]
    pub const fn load_limits(&self) -> LoadLimits {
        LoadLimits::with_max_bytes(self.max_file_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_document_is_default() {
        assert_eq!(Config::from_toml_str("").unwrap(), Config::default());
    }

    #[test]
    fn partial_document_keeps_other_defaults() {
        let c = Config::from_toml_str("word_wrap = 100\nbackup = false\n").unwrap();
        assert_eq!(c.word_wrap, 100);
        assert!(!c.backup);
        assert_eq!(c.tab_size, 4);
        assert_eq!(c.cursor_blink_ms, 500);
    }

    #[test]
    fn wrong_type_is_an_error() {
        assert!(Config::from_toml_str("tab_size = \"wide\"").is_err());
        assert!(Config::from_toml_str("this is not toml").is_err());
    }

    #[test]
    fn blink_zero_disables() {
        let mut c = Config::default();
        assert_eq!(c.blink_interval(), Some(Duration::from_millis(500)));
        c.cursor_blink_ms = 0;
        assert_eq!(c.blink_interval(), None);
    }

    #[test]
    fn limits_follow_max_file_size() {
        let c = Config::from_toml_str("max_file_size = 1024").unwrap();
        assert_eq!(c.load_limits().max_bytes, 1024);
    }

    #[test]
    fn missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Config::load_from(&dir.path().join("nope.toml")), Config::default());
    }

    #[test]
    fn broken_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "tab_size = [").unwrap();
        assert_eq!(Config::load_from(&path), Config::default());
    }

    #[test]
    fn file_values_are_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "show_line_numbers = true\ncursor_blink_ms = 250\n").unwrap();
        let c = Config::load_from(&path);
        assert!(c.show_line_numbers);
        assert_eq!(c.cursor_blink_ms, 250);
    }

    #[test]
    fn defaults_round_trip_through_toml() {
        let text = toml::to_string(&Config::default()).unwrap();
        assert_eq!(Config::from_toml_str(&text).unwrap(), Config::default());
    }
}
