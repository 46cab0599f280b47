//! Runtime settings that are not part of the command line.
//!
//! The command line belongs to the wrapped server apart from the control
//! flags, so the controller's own settings come from the environment.

use std::path::PathBuf;

pub const ENV_LOG_LEVEL: &str = "WARDEN_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "WARDEN_LOG_DIR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Default filter directive; `RUST_LOG` takes precedence when set.
    pub log_level: String,
    /// Directory for the rolling log file used by the background process.
    pub log_dir: Option<PathBuf>,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_dir: None,
        }
    }
}

impl RuntimeConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v: &String| !v.trim().is_empty());
        let defaults = Self::default();
        Self {
            log_level: get(ENV_LOG_LEVEL).unwrap_or(defaults.log_level),
            log_dir: get(ENV_LOG_DIR).map(PathBuf::from),
        }
    }
}
