//! Runtime configuration from environment variables.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `OPENHEADERS_STATE_DIR` | `<config dir>/openheaders` |
//! | `OPENHEADERS_HISTORY_LIMIT` | `50` |
//! | `OPENHEADERS_LOG` | `RUST_LOG`, then `info` |

use std::path::PathBuf;

use openheaders_application::MAX_HISTORY;

/// State directory variable.
pub const STATE_DIR_VAR: &str = "OPENHEADERS_STATE_DIR";
/// History capacity variable.
pub const HISTORY_LIMIT_VAR: &str = "OPENHEADERS_HISTORY_LIMIT";
/// Log filter variable.
pub const LOG_VAR: &str = "OPENHEADERS_LOG";

const DEFAULT_LOG_FILTER: &str = "info";

/// Error type for configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Could not determine config directory.
    #[error("Could not determine config directory; set {STATE_DIR_VAR}")]
    NoConfigDir,

    /// History limit is not a positive integer.
    #[error("{HISTORY_LIMIT_VAR} must be a positive integer, got {0:?}")]
    InvalidHistoryLimit(String),
}

/// Settings resolved at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Directory of the file key-value store.
    pub state_dir: PathBuf,
    /// Undo history capacity.
    pub history_limit: usize,
    /// `tracing` filter directive.
    pub log_filter: String,
}

impl RuntimeConfig {
    /// Reads the configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] for invalid values or when no state directory
    /// can be determined.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads the configuration from the process environment, with an
    /// explicit state directory taking precedence over every other source.
    ///
    /// # Errors
    ///
    /// See [`RuntimeConfig::from_env`]. The state directory cannot fail when
    /// `state_dir` is given.
    pub fn from_env_with_state_dir(state_dir: Option<PathBuf>) -> Result<Self, ConfigError> {
        Self::resolve(|name| std::env::var(name).ok(), state_dir)
    }

    /// Reads the configuration through `lookup`.
    ///
    /// # Errors
    ///
    /// See [`RuntimeConfig::from_env`].
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        Self::resolve(lookup, None)
    }

    fn resolve(
        lookup: impl Fn(&str) -> Option<String>,
        state_dir: Option<PathBuf>,
    ) -> Result<Self, ConfigError> {
        let non_empty = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let state_dir = match state_dir.or_else(|| non_empty(STATE_DIR_VAR).map(PathBuf::from)) {
            Some(dir) => dir,
            None => default_state_dir().ok_or(ConfigError::NoConfigDir)?,
        };

        let history_limit = match non_empty(HISTORY_LIMIT_VAR) {
            Some(raw) => match raw.trim().parse::<usize>() {
                Ok(limit) if limit > 0 => limit,
                _ => return Err(ConfigError::InvalidHistoryLimit(raw)),
            },
            None => MAX_HISTORY,
        };

        let log_filter = non_empty(LOG_VAR)
            .or_else(|| non_empty("RUST_LOG"))
            .unwrap_or_else(|| DEFAULT_LOG_FILTER.to_string());

        Ok(Self {
            state_dir,
            history_limit,
            log_filter,
        })
    }
}

/// Returns `<config dir>/openheaders`, if the platform has a config dir.
#[must_use]
pub fn default_state_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("openheaders"))
}
