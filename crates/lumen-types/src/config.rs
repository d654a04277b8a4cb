//! Shell configuration (`lumen.toml`).
//!
//! Distinct from [`Settings`](crate::models::Settings): settings are user
//! preferences edited from the browser UI and persisted as JSON, while the
//! shell config covers process-level knobs read once at startup.

use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{LumenError, Result};

/// Name of the config file looked up inside the data directory.
pub const CONFIG_FILE_NAME: &str = "lumen.toml";

/// Process-level configuration.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Where settings, bookmarks and history live. `None` means the
    /// platform data directory (see [`default_data_dir`]).
    pub data_dir: Option<PathBuf>,
    /// Number of background threads serving asynchronous saves.
    pub persistence_workers: usize,
    /// Default `env_logger` filter when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            data_dir: None,
            persistence_workers: 2,
            log_filter: "info".to_string(),
        }
    }
}

impl ShellConfig {
    /// Parse a config document. Absent keys keep their defaults.
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let config: Self = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Load the config at `path`. A missing file is not an error and yields
    /// the defaults; an unreadable or invalid one is.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
            .map_err(|e| LumenError::Config(format!("{}: {e}", path.display())))
    }

    /// The data directory to use, resolving the platform default.
    pub fn resolved_data_dir(&self) -> PathBuf {
        self.data_dir.clone().unwrap_or_else(default_data_dir)
    }

    fn validate(&self) -> Result<()> {
        if self.persistence_workers == 0 {
            return Err(LumenError::Config(
                "persistence_workers must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// `<platform data dir>/lumen`, or `./lumen-data` when the platform has no
/// data directory.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("lumen"))
        .unwrap_or_else(|| PathBuf::from("lumen-data"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_default() {
        let cfg = ShellConfig::from_toml_str("").unwrap();
        assert_eq!(cfg, ShellConfig::default());
        assert_eq!(cfg.persistence_workers, 2);
        assert_eq!(cfg.log_filter, "info");
    }

    #[test]
    fn partial_document_overrides_fields() {
        let cfg = ShellConfig::from_toml_str(
            r#"
            data_dir = "/tmp/lumen-test"
            log_filter = "debug"
            "#,
        )
        .unwrap();
        assert_eq!(cfg.data_dir, Some(PathBuf::from("/tmp/lumen-test")));
        assert_eq!(cfg.log_filter, "debug");
        assert_eq!(cfg.persistence_workers, 2);
        assert_eq!(cfg.resolved_data_dir(), PathBuf::from("/tmp/lumen-test"));
    }

    #[test]
    fn zero_workers_rejected() {
        let err = ShellConfig::from_toml_str("persistence_workers = 0").unwrap_err();
        assert!(matches!(err, LumenError::Config(_)));
    }

    #[test]
    fn malformed_toml_is_an_error() {
        let err = ShellConfig::from_toml_str("data_dir = [[[").unwrap_err();
        assert!(matches!(err, LumenError::TomlParse(_)));
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = ShellConfig::load(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(cfg, ShellConfig::default());
    }

    #[test]
    fn invalid_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "persistence_workers = 0").unwrap();
        let err = ShellConfig::load(&path).unwrap_err();
        assert!(format!("{err}").contains(CONFIG_FILE_NAME));
    }

    #[test]
    fn default_data_dir_ends_in_lumen() {
        let dir = default_data_dir();
        let name = dir.file_name().unwrap().to_string_lossy().into_owned();
        assert!(name.starts_with("lumen"));
    }
}
