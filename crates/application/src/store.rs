//! Canonical application state and the mutations every UI action funnels
//! through.
//!
//! Mutations are synchronous and transactional: each one edits a private copy
//! and only publishes it when something actually changed. Structural edits
//! (profiles, headers, filters, imports) are recorded in the undo history;
//! navigation and preferences are persisted without being recorded. Operations
//! naming an id that no longer exists are silent no-ops.

use std::sync::Arc;

use openheaders_domain::{
    AppState, DarkModePreference, ExportFile, FilterType, HeaderOperation, HeaderRule, HeaderType,
    MatchType, Profile, UrlFilter, palette_color,
};

use crate::history::HistoryManager;
use crate::ports::{Clock, StatePersister};

/// Field updates for a profile. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfilePatch {
    /// New name.
    pub name: Option<String>,
    /// New colour.
    pub color: Option<String>,
}

/// Field updates for a header rule. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderPatch {
    /// New enabled flag.
    pub enabled: Option<bool>,
    /// New header name.
    pub name: Option<String>,
    /// New value.
    pub value: Option<String>,
    /// New comment.
    pub comment: Option<String>,
    /// New request/response side.
    pub header_type: Option<HeaderType>,
    /// New operation.
    pub operation: Option<HeaderOperation>,
}

impl HeaderPatch {
    fn apply(self, header: &mut HeaderRule) -> bool {
        let before = header.clone();
        if let Some(enabled) = self.enabled {
            header.enabled = enabled;
        }
        if let Some(name) = self.name {
            header.name = name;
        }
        if let Some(value) = self.value {
            header.value = value;
        }
        if let Some(comment) = self.comment {
            header.comment = comment;
        }
        if let Some(header_type) = self.header_type {
            header.header_type = header_type;
        }
        if let Some(operation) = self.operation {
            header.operation = operation;
        }
        *header != before
    }
}

/// Field updates for a URL filter. `None` leaves a field unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterPatch {
    /// New enabled flag.
    pub enabled: Option<bool>,
    /// New dialect.
    pub match_type: Option<MatchType>,
    /// New pattern.
    pub pattern: Option<String>,
    /// New include/exclude type.
    pub filter_type: Option<FilterType>,
}

impl FilterPatch {
    fn apply(self, filter: &mut UrlFilter) -> bool {
        let before = filter.clone();
        if let Some(enabled) = self.enabled {
            filter.enabled = enabled;
        }
        if let Some(match_type) = self.match_type {
            filter.match_type = match_type;
        }
        if let Some(pattern) = self.pattern {
            filter.pattern = pattern;
        }
        if let Some(filter_type) = self.filter_type {
            filter.filter_type = filter_type;
        }
        *filter != before
    }
}

/// Owner of the canonical [`AppState`].
pub struct StateStore<P: StatePersister, C: Clock> {
    state: Arc<AppState>,
    history: HistoryManager,
    persister: P,
    clock: C,
}

impl<P: StatePersister, C: Clock> StateStore<P, C> {
    /// Creates a store from previously loaded state (or none).
    ///
    /// Restores the state invariants, records the initial snapshot, and
    /// persists the state when bootstrapping changed it.
    pub fn new(loaded: Option<AppState>, persister: P, clock: C) -> Self {
        Self::with_history(loaded, persister, clock, HistoryManager::new())
    }

    /// Same as [`StateStore::new`] with a custom history.
    pub fn with_history(
        loaded: Option<AppState>,
        persister: P,
        clock: C,
        mut history: HistoryManager,
    ) -> Self {
        let fresh = loaded.is_none();
        let mut state = loaded.unwrap_or_default();
        let repaired = state.ensure_invariants(clock.now_millis());
        let state = Arc::new(state);

        history.clear();
        history.record(Arc::clone(&state));
        if fresh || repaired {
            tracing::info!(profiles = state.profiles.len(), "bootstrapped application state");
            persister.persist(&state);
        }

        Self {
            state,
            history,
            persister,
            clock,
        }
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> &AppState {
        &self.state
    }

    /// Returns a shared handle to the current state.
    #[must_use]
    pub fn snapshot(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    /// Returns the active profile.
    #[must_use]
    pub fn active_profile(&self) -> Option<&Profile> {
        self.state.active_profile()
    }

    /// Returns the undo history.
    #[must_use]
    pub const fn history(&self) -> &HistoryManager {
        &self.history
    }

    // --- profiles -------------------------------------------------------

    /// Adds a profile and returns its id.
    ///
    /// Without a name the profile is called `Profile N`. Colours rotate
    /// through the palette.
    pub fn add_profile(&mut self, name: Option<&str>) -> String {
        let mut new_id = String::new();
        self.transact(|state, now| {
            let index = state.profiles.len();
            let name = name.map_or_else(|| format!("Profile {}", index + 1), str::to_string);
            let profile = Profile::new(name, palette_color(index), now);
            new_id.clone_from(&profile.id);
            state.profiles.push(profile);
            true
        });
        new_id
    }

    /// Updates a profile's own fields.
    pub fn update_profile(&mut self, profile_id: &str, patch: ProfilePatch) -> bool {
        self.with_profile(profile_id, |profile| {
            let before = (profile.name.clone(), profile.color.clone());
            if let Some(name) = patch.name {
                profile.name = name;
            }
            if let Some(color) = patch.color {
                profile.color = color;
            }
            before != (profile.name.clone(), profile.color.clone())
        })
    }

    /// Removes a profile.
    ///
    /// The active id moves to the first remaining profile, and a default
    /// profile is created when the last one is removed.
    pub fn remove_profile(&mut self, profile_id: &str) -> bool {
        self.transact(|state, now| {
            let before = state.profiles.len();
            state.profiles.retain(|p| p.id != profile_id);
            if state.profiles.len() == before {
                return false;
            }
            state.ensure_invariants(now);
            true
        })
    }

    /// Copies a profile (fresh ids throughout) right after the original.
    pub fn duplicate_profile(&mut self, profile_id: &str) -> Option<String> {
        let mut new_id = None;
        self.transact(|state, now| {
            let Some(index) = state.profiles.iter().position(|p| p.id == profile_id) else {
                return false;
            };
            let mut copy = state.profiles[index].with_fresh_ids();
            copy.name = format!("{} (copy)", copy.name);
            copy.created_at = now;
            copy.updated_at = now;
            new_id = Some(copy.id.clone());
            state.profiles.insert(index + 1, copy);
            true
        });
        new_id
    }

    /// Moves a profile to `index` (clamped to the list).
    pub fn move_profile(&mut self, profile_id: &str, index: usize) -> bool {
        self.transact(|state, _| {
            let Some(from) = state.profiles.iter().position(|p| p.id == profile_id) else {
                return false;
            };
            let to = index.min(state.profiles.len() - 1);
            if from == to {
                return false;
            }
            let profile = state.profiles.remove(from);
            state.profiles.insert(to, profile);
            true
        })
    }

    // --- headers --------------------------------------------------------

    /// Appends a new header rule to a profile and returns its id.
    pub fn add_header(&mut self, profile_id: &str) -> Option<String> {
        let header = HeaderRule::new();
        let id = header.id.clone();
        self.with_profile(profile_id, |profile| {
            profile.headers.push(header);
            true
        })
        .then_some(id)
    }

    /// Updates a header rule's fields.
    pub fn update_header(&mut self, profile_id: &str, header_id: &str, patch: HeaderPatch) -> bool {
        self.with_profile(profile_id, |profile| {
            profile
                .header_mut(header_id)
                .is_some_and(|header| patch.apply(header))
        })
    }

    /// Removes a header rule.
    pub fn remove_header(&mut self, profile_id: &str, header_id: &str) -> bool {
        self.with_profile(profile_id, |profile| {
            let before = profile.headers.len();
            profile.headers.retain(|h| h.id != header_id);
            profile.headers.len() != before
        })
    }

    // --- URL filters ----------------------------------------------------

    /// Appends a new URL filter to a profile and returns its id.
    pub fn add_url_filter(&mut self, profile_id: &str) -> Option<String> {
        let filter = UrlFilter::new();
        let id = filter.id.clone();
        self.with_profile(profile_id, |profile| {
            profile.url_filters.push(filter);
            true
        })
        .then_some(id)
    }

    /// Updates a URL filter's fields.
    pub fn update_url_filter(
        &mut self,
        profile_id: &str,
        filter_id: &str,
        patch: FilterPatch,
    ) -> bool {
        self.with_profile(profile_id, |profile| {
            profile
                .url_filter_mut(filter_id)
                .is_some_and(|filter| patch.apply(filter))
        })
    }

    /// Removes a URL filter.
    pub fn remove_url_filter(&mut self, profile_id: &str, filter_id: &str) -> bool {
        self.with_profile(profile_id, |profile| {
            let before = profile.url_filters.len();
            profile.url_filters.retain(|f| f.id != filter_id);
            profile.url_filters.len() != before
        })
    }

    // --- navigation and preferences (persisted, never recorded) --------

    /// Makes a profile the active one.
    pub fn set_active_profile(&mut self, profile_id: &str) -> bool {
        if self.state.profile(profile_id).is_none() {
            return false;
        }
        self.navigate(|state| {
            if state.active_profile_id.as_deref() == Some(profile_id) {
                return false;
            }
            state.active_profile_id = Some(profile_id.to_string());
            true
        })
    }

    /// Sets the theme preference.
    pub fn set_dark_mode_preference(&mut self, preference: DarkModePreference) -> bool {
        self.navigate(|state| {
            let changed = state.dark_mode_preference != preference;
            state.dark_mode_preference = preference;
            changed
        })
    }

    /// Sets the language preference.
    pub fn set_language_preference(&mut self, language: &str) -> bool {
        self.navigate(|state| {
            let changed = state.language_preference != language;
            state.language_preference = language.to_string();
            changed
        })
    }

    /// Replaces the opaque header-suggestion state.
    pub fn set_header_suggestions_state(&mut self, value: Option<serde_json::Value>) -> bool {
        self.navigate(|state| {
            let changed = state.header_suggestions_state != value;
            state.header_suggestions_state = value;
            changed
        })
    }

    // --- history --------------------------------------------------------

    /// Restores the previous snapshot. Returns false at the start of history.
    pub fn undo(&mut self) -> bool {
        let restored = self.history.undo();
        self.restore(restored)
    }

    /// Restores the next snapshot. Returns false at the end of history.
    pub fn redo(&mut self) -> bool {
        let restored = self.history.redo();
        self.restore(restored)
    }

    /// Returns true if [`StateStore::undo`] would do something.
    #[must_use]
    pub const fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    /// Returns true if [`StateStore::redo`] would do something.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    // --- import / export -----------------------------------------------

    /// Wraps the selected profiles (all when `ids` is `None`) for export.
    #[must_use]
    pub fn export_profiles(&self, ids: Option<&[String]>) -> ExportFile {
        let profiles = self
            .state
            .profiles
            .iter()
            .filter(|p| ids.is_none_or(|ids| ids.contains(&p.id)))
            .cloned()
            .collect();
        ExportFile::new(profiles, self.clock.now_millis())
    }

    /// Appends imported profiles as one undoable action.
    ///
    /// Profiles whose id collides with an existing one get fresh ids.
    /// Returns false when there is nothing to import.
    pub fn import_profiles(&mut self, profiles: Vec<Profile>) -> bool {
        if profiles.is_empty() {
            return false;
        }
        let count = profiles.len();
        let imported = self.transact(|state, now| {
            for mut profile in profiles {
                if state.profile(&profile.id).is_some() {
                    profile = profile.with_fresh_ids();
                }
                if profile.created_at == 0 {
                    profile.created_at = now;
                }
                profile.updated_at = now;
                state.profiles.push(profile);
            }
            true
        });
        tracing::info!(count, "imported profiles");
        imported
    }

    // --- internals ------------------------------------------------------

    /// Applies `f` to a copy of the state; commits and records if it
    /// reports a change.
    fn transact(&mut self, f: impl FnOnce(&mut AppState, i64) -> bool) -> bool {
        let mut next = AppState::clone(&self.state);
        if !f(&mut next, self.clock.now_millis()) {
            return false;
        }
        self.state = Arc::new(next);
        self.history.record(Arc::clone(&self.state));
        self.persister.persist(&self.state);
        true
    }

    /// Applies `f` to one profile and refreshes its `updated_at`.
    fn with_profile(&mut self, profile_id: &str, f: impl FnOnce(&mut Profile) -> bool) -> bool {
        if self.state.profile(profile_id).is_none() {
            return false;
        }
        self.transact(|state, now| {
            let Some(profile) = state.profile_mut(profile_id) else {
                return false;
            };
            if !f(profile) {
                return false;
            }
            profile.touch(now);
            true
        })
    }

    /// Like [`StateStore::transact`] without recording history.
    fn navigate(&mut self, f: impl FnOnce(&mut AppState) -> bool) -> bool {
        let mut next = AppState::clone(&self.state);
        if !f(&mut next) {
            return false;
        }
        self.state = Arc::new(next);
        self.persister.persist(&self.state);
        true
    }

    fn restore(&mut self, snapshot: Option<Arc<AppState>>) -> bool {
        let Some(snapshot) = snapshot else {
            return false;
        };
        self.state = snapshot;
        self.persister.persist(&self.state);
        true
    }
}
