//! Configuration system for hclquill.
//!
//! This module provides the configuration structure for hclquill with sensible
//! defaults and support for deserialization via serde. Configuration is loaded
//! from a TOML file and merged with command-line arguments, flags winning.
//!
//! # Example
//!
//! ```
//! use hclquill::config::Config;
//!
//! // Use default configuration
//! let config = Config::default();
//! assert_eq!(config.indent_size, 2);
//! assert_eq!(config.default_type, "string");
//!
//! // Create custom configuration
//! let custom = Config {
//!     indent_size: 4,
//!     strict: true,
//!     ..Config::default()
//! };
//! assert!(custom.strict);
//! ```

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Configuration for the hclquill command.
///
/// # Fields
///
/// * `indent_size` - Number of spaces per indentation level when printing (default: 2)
/// * `default_type` - Type tag used by `set` when `--type` is not given (default: "string")
/// * `strict` - Treat a path that matches nothing as an error (default: false)
/// * `create_backup` - Create .bak files before rewriting in place (default: false)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Number of spaces per indentation level
    #[serde(default = "default_indent_size")]
    pub indent_size: usize,

    /// Type tag for `set` values: "string", "bool", "int" or "float"
    #[serde(default = "default_type")]
    pub default_type: String,

    /// Fail when a path matches nothing
    #[serde(default)]
    pub strict: bool,

    /// Create .bak files before saving
    #[serde(default)]
    pub create_backup: bool,
}

/// Returns the default indentation size.
fn default_indent_size() -> usize {
    2
}

/// Returns the default type tag for `set`.
fn default_type() -> String {
    "string".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            indent_size: default_indent_size(),
            default_type: default_type(),
            strict: false,
            create_backup: false,
        }
    }
}

impl Config {
    /// Returns the path to the config file.
    ///
    /// Uses `~/.config/hclquill/config.toml` on all platforms.
    pub fn config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|mut path| {
            path.push(".config");
            path.push("hclquill");
            path.push("config.toml");
            path
        })
    }

    /// Loads configuration from the default config file.
    ///
    /// Returns the default configuration if the file doesn't exist or can't be read.
    pub fn load() -> Self {
        match Self::config_path() {
            Some(path) => Self::load_from(&path),
            None => Self::default(),
        }
    }

    /// Loads configuration from `path`, falling back to defaults.
    ///
    /// A missing file is silent; an unreadable or invalid one is logged.
    pub fn load_from(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }

        let contents = match std::fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) => {
                log::warn!("could not read config {}: {}", path.display(), e);
                return Self::default();
            }
        };

        match toml::from_str(&contents) {
            Ok(config) => {
                log::debug!("loaded config from {}", path.display());
                config
            }
            Err(e) => {
                log::warn!("ignoring invalid config {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.indent_size, 2);
        assert_eq!(config.default_type, "string");
        assert!(!config.strict);
        assert!(!config.create_backup);
    }

    #[test]
    fn test_partial_toml_keeps_other_defaults() {
        let config: Config = toml::from_str("indent_size = 4\nstrict = true\n").unwrap();
        assert_eq!(config.indent_size, 4);
        assert!(config.strict);
        assert_eq!(config.default_type, "string");
        assert!(!config.create_backup);
    }

    #[test]
    fn test_load_from_missing_file() {
        let dir = TempDir::new().unwrap();
        assert_eq!(Config::load_from(&dir.path().join("none.toml")), Config::default());
    }

    #[test]
    fn test_load_from_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "default_type = \"int\"\ncreate_backup = true\n").unwrap();

        let config = Config::load_from(&path);
        assert_eq!(config.default_type, "int");
        assert!(config.create_backup);
        assert_eq!(config.indent_size, 2);
    }

    #[test]
    fn test_load_from_invalid_file_falls_back() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "indent_size = \"wide\"\n").unwrap();
        assert_eq!(Config::load_from(&path), Config::default());
    }

    #[test]
    fn test_config_path_location() {
        if let Some(path) = Config::config_path() {
            assert!(path.ends_with(".config/hclquill/config.toml"));
        }
    }
}
