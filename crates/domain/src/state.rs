//! Whole-application state.

use serde::{Deserialize, Serialize};

use crate::profile::{DEFAULT_PROFILE_NAME, Profile, palette_color};
use crate::settings::{DarkModePreference, default_language};

/// Everything the user can edit, persisted as one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppState {
    /// Profiles, in user order.
    pub profiles: Vec<Profile>,
    /// Id of the active profile.
    #[serde(default)]
    pub active_profile_id: Option<String>,
    /// Theme preference.
    #[serde(default)]
    pub dark_mode_preference: DarkModePreference,
    /// Language preference (`"auto"` or a locale tag).
    #[serde(default = "default_language")]
    pub language_preference: String,
    /// Opaque state of the header-name suggestion widget.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub header_suggestions_state: Option<serde_json::Value>,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            profiles: Vec::new(),
            active_profile_id: None,
            dark_mode_preference: DarkModePreference::default(),
            language_preference: default_language(),
            header_suggestions_state: None,
        }
    }
}

impl AppState {
    /// Finds a profile by id.
    #[must_use]
    pub fn profile(&self, profile_id: &str) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.id == profile_id)
    }

    /// Finds a profile by id, mutably.
    pub fn profile_mut(&mut self, profile_id: &str) -> Option<&mut Profile> {
        self.profiles.iter_mut().find(|p| p.id == profile_id)
    }

    /// Returns the active profile, if any.
    #[must_use]
    pub fn active_profile(&self) -> Option<&Profile> {
        self.active_profile_id
            .as_deref()
            .and_then(|id| self.profile(id))
    }

    /// Restores the state invariants.
    ///
    /// Creates a default profile when there are none and points the active id
    /// at the first profile when it is unset or dangling. Returns true if
    /// anything changed.
    pub fn ensure_invariants(&mut self, now_ms: i64) -> bool {
        let mut changed = false;
        if self.profiles.is_empty() {
            self.profiles
                .push(Profile::new(DEFAULT_PROFILE_NAME, palette_color(0), now_ms));
            changed = true;
        }
        if self.active_profile().is_none() {
            self.active_profile_id = self.profiles.first().map(|p| p.id.clone());
            changed = true;
        }
        changed
    }
}
