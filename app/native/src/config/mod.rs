//! Configuration module for Trellis.
//!
//! This module provides configuration types and loading functionality. The
//! window manager core never reads configuration from disk itself: callers
//! load a [`WmConfig`] snapshot here and hand it to the bus, and reloads go
//! through the `ReloadConfig` command.
//!
//! The configuration file supports JSONC format (JSON with comments).
//! Both single-line (`//`) and multi-line (`/* */`) comments are allowed.

pub mod schema;
pub mod types;

use std::fs;
use std::path::{Path, PathBuf};

pub use schema::{generate_schema, generate_schema_json};
use thiserror::Error;
pub use types::{
    BarConfig, BarPosition, GapValue, GapsConfig, GeneralConfig, MatchPattern, MatchStrategy,
    RuleAction, RuleSubject, WindowRule, WmConfig, WorkspaceConfig,
};

/// Configuration file names to search for (in priority order).
const CONFIG_FILE_NAMES: &[&str] = &["config.jsonc", "config.json"];

/// Legacy configuration file names in home directory.
const LEGACY_CONFIG_FILE_NAMES: &[&str] = &[".trellis.jsonc", ".trellis.json"];

/// Errors that can occur when loading the configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// No configuration file was found in any of the expected locations.
    #[error(
        "No configuration file found. Expected at ~/.config/trellis/config.jsonc or ~/.trellis.jsonc"
    )]
    NotFound,
    /// The configuration file exists but could not be read.
    #[error("Failed to read configuration file: {0}")]
    IoError(#[from] std::io::Error),
    /// The configuration file contains invalid JSON.
    #[error("Failed to parse configuration file: {0}")]
    ParseError(#[from] serde_json::Error),
}

/// Returns the possible configuration file paths in priority order.
///
/// 1. `$XDG_CONFIG_HOME/trellis/config.jsonc` or `config.json`
/// 2. `~/.config/trellis/config.jsonc` or `config.json`
/// 3. The platform config directory (`dirs::config_dir`)
/// 4. `~/.trellis.jsonc` or `~/.trellis.json`
#[must_use]
pub fn config_paths() -> Vec<PathBuf> {
    let mut paths = Vec::new();
    let mut push_dir = |dir: PathBuf| {
        for filename in CONFIG_FILE_NAMES {
            let path = dir.join(filename);
            if !paths.contains(&path) {
                paths.push(path);
            }
        }
    };

    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        push_dir(PathBuf::from(xdg_config).join("trellis"));
    }

    if let Some(home) = dirs::home_dir() {
        push_dir(home.join(".config").join("trellis"));
    }

    if let Some(config_dir) = dirs::config_dir() {
        push_dir(config_dir.join("trellis"));
    }

    if let Some(home) = dirs::home_dir() {
        for filename in LEGACY_CONFIG_FILE_NAMES {
            paths.push(home.join(filename));
        }
    }

    paths
}

/// Loads and prepares the configuration from a specific file.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if the file does not exist,
/// `ConfigError::IoError` if it cannot be read and
/// `ConfigError::ParseError` if it is not valid JSONC.
pub fn load_config_from_path(path: &Path) -> Result<WmConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound);
    }

    let file = fs::File::open(path)?;
    let reader = json_comments::StripComments::new(file);
    let mut config: WmConfig = serde_json::from_reader(reader)?;
    config.prepare();
    Ok(config)
}

/// Loads the configuration from the first available config file.
///
/// # Errors
///
/// Returns `ConfigError::NotFound` if no configuration file exists in any of
/// the expected locations, or the error of the first file that fails to load.
pub fn load_config() -> Result<(WmConfig, PathBuf), ConfigError> {
    for path in config_paths() {
        if path.exists() {
            let config = load_config_from_path(&path)?;
            return Ok((config, path));
        }
    }

    Err(ConfigError::NotFound)
}

/// Loads the configuration, falling back to defaults.
///
/// When `custom_path` is given only that file is considered.
#[must_use]
pub fn load_or_default(custom_path: Option<&Path>) -> WmConfig {
    let result = custom_path.map_or_else(load_config, |path| {
        load_config_from_path(path).map(|config| (config, path.to_path_buf()))
    });

    match result {
        Ok((config, path)) => {
            tracing::info!(path = %path.display(), "loaded configuration");
            config
        }
        Err(ConfigError::NotFound) => {
            tracing::info!("no configuration file found, using defaults");
            WmConfig::default()
        }
        Err(err) => {
            tracing::warn!(error = %err, "failed to load configuration, using defaults");
            WmConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_config_paths_end_with_legacy_locations() {
        let paths = config_paths();
        if let Some(last) = paths.last() {
            assert!(last.ends_with(".trellis.json"));
        }
    }

    #[test]
    fn test_load_config_from_path_strips_comments() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{
                // gaps between windows
                "gaps": {{ "inner": 10, "outer": 5 }},
                /* bar reserved at the top */
                "bar": {{ "height": 32 }},
                "workspaces": [{{ "name": "1" }}, {{ "name": "2", "keepAlive": true }}]
            }}"#
        )
        .unwrap();

        let config = load_config_from_path(file.path()).unwrap();
        assert_eq!(config.gaps.inner, GapValue::Uniform(10));
        assert_eq!(config.bar.height, 32);
        assert_eq!(config.workspaces.len(), 2);
        assert!(config.workspaces[1].keep_alive);
    }

    #[test]
    fn test_load_config_from_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config_from_path(&dir.path().join("missing.jsonc"));
        assert!(matches!(result, Err(ConfigError::NotFound)));
    }

    #[test]
    fn test_load_config_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ \"gaps\": ").unwrap();
        let result = load_config_from_path(file.path());
        assert!(matches!(result, Err(ConfigError::ParseError(_))));
    }

    #[test]
    fn test_load_or_default_falls_back_on_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        let config = load_or_default(Some(file.path()));
        assert!(config.workspaces.is_empty());
    }

    #[test]
    fn test_config_error_display() {
        assert!(ConfigError::NotFound.to_string().contains("No configuration file found"));
    }
}
