//! User preference types.

use serde::{Deserialize, Serialize};

/// Language preference meaning "follow the browser locale".
pub const LANGUAGE_AUTO: &str = "auto";

/// Theme preference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum DarkModePreference {
    /// Always light.
    Light,
    /// Always dark.
    Dark,
    /// Follow the system theme (default).
    #[default]
    System,
}

impl DarkModePreference {
    /// Maps the legacy boolean `darkMode` flag.
    ///
    /// `true` meant an explicit dark theme; `false` never distinguished
    /// "light" from "unset", so it maps to `System`.
    #[must_use]
    pub const fn from_legacy(dark_mode: bool) -> Self {
        if dark_mode { Self::Dark } else { Self::System }
    }

    /// Returns true if dark mode should be used given the system preference.
    #[must_use]
    pub const fn is_dark(self, system_prefers_dark: bool) -> bool {
        match self {
            Self::Light => false,
            Self::Dark => true,
            Self::System => system_prefers_dark,
        }
    }
}

pub(crate) fn default_language() -> String {
    LANGUAGE_AUTO.to_string()
}
