//! Error types for Lumen.

use std::io;

use crate::models::CollectionKind;

/// Errors produced by the Lumen crates.
///
/// Address parsing never produces an error: malformed input degrades to a
/// host guess or a search query. Missing or corrupt documents on load are
/// replaced by defaults. What remains are save failures and config problems.
#[derive(Debug, thiserror::Error)]
pub enum LumenError {
    #[error("config error: {0}")]
    Config(String),

    #[error("failed to save {kind}: {message}")]
    Persistence {
        kind: CollectionKind,
        message: String,
    },

    #[error("persistence worker stopped before reporting a result")]
    WorkerGone,

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl LumenError {
    /// Wrap any error as a save failure for `kind`, keeping only its message.
    pub fn persistence(kind: CollectionKind, err: impl std::fmt::Display) -> Self {
        Self::Persistence {
            kind,
            message: err.to_string(),
        }
    }
}

/// Convenience alias.
pub type Result<T> = std::result::Result<T, LumenError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_display() {
        let e = LumenError::Config("missing key".into());
        assert_eq!(format!("{e}"), "config error: missing key");
    }

    #[test]
    fn persistence_error_display() {
        let e = LumenError::persistence(CollectionKind::History, "disk full");
        assert_eq!(format!("{e}"), "failed to save history: disk full");
    }

    #[test]
    fn worker_gone_display() {
        let msg = format!("{}", LumenError::WorkerGone);
        assert!(msg.contains("worker"));
    }

    #[test]
    fn io_error_from_conversion() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "gone");
        let e: LumenError = io_err.into();
        let msg = format!("{e}");
        assert!(msg.contains("I/O error"));
        assert!(msg.contains("gone"));
    }

    #[test]
    fn toml_error_from_conversion() {
        let toml_err = toml::from_str::<toml::Value>("this is [[[not valid toml").unwrap_err();
        let e: LumenError = toml_err.into();
        assert!(format!("{e}").contains("TOML parse error"));
    }

    #[test]
    fn json_error_from_conversion() {
        let json_err = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
        let e: LumenError = json_err.into();
        assert!(format!("{e}").contains("JSON error"));
    }

    #[test]
    fn result_alias_err() {
        let r: Result<i32> = Err(LumenError::Config("oops".into()));
        assert!(r.is_err());
    }
}
