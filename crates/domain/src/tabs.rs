//! Live tab bookkeeping for the background context.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Browser tab identifier.
pub type TabId = i32;

/// A tab and its current top-level URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TabInfo {
    /// Tab id.
    pub id: TabId,
    /// Top-level URL.
    pub url: String,
}

impl TabInfo {
    /// Creates a tab record.
    #[must_use]
    pub fn new(id: TabId, url: impl Into<String>) -> Self {
        Self { id, url: url.into() }
    }
}

/// Mapping from tab id to its current top-level URL.
///
/// Ordered by id so anything derived from it is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TabRegistry {
    tabs: BTreeMap<TabId, String>,
    active: Option<TabId>,
}

impl TabRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the whole registry with a snapshot of live tabs.
    pub fn replace_all(&mut self, tabs: impl IntoIterator<Item = TabInfo>) {
        self.tabs = tabs.into_iter().map(|t| (t.id, t.url)).collect();
        if self.active.is_some_and(|id| !self.tabs.contains_key(&id)) {
            self.active = None;
        }
    }

    /// Records a tab's URL. Returns true if it changed.
    pub fn upsert(&mut self, id: TabId, url: impl Into<String>) -> bool {
        let url = url.into();
        if self.tabs.get(&id) == Some(&url) {
            return false;
        }
        self.tabs.insert(id, url);
        true
    }

    /// Forgets a tab. Returns true if it was known.
    pub fn remove(&mut self, id: TabId) -> bool {
        if self.active == Some(id) {
            self.active = None;
        }
        self.tabs.remove(&id).is_some()
    }

    /// Marks a tab as the focused one.
    pub const fn set_active(&mut self, id: TabId) {
        self.active = Some(id);
    }

    /// Returns the focused tab id.
    #[must_use]
    pub const fn active(&self) -> Option<TabId> {
        self.active
    }

    /// Returns the URL of a tab.
    #[must_use]
    pub fn url(&self, id: TabId) -> Option<&str> {
        self.tabs.get(&id).map(String::as_str)
    }

    /// Iterates tabs in ascending id order.
    pub fn iter(&self) -> impl Iterator<Item = (TabId, &str)> {
        self.tabs.iter().map(|(id, url)| (*id, url.as_str()))
    }

    /// Number of known tabs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tabs.len()
    }

    /// Returns true if no tabs are known.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tabs.is_empty()
    }
}

impl FromIterator<TabInfo> for TabRegistry {
    fn from_iter<I: IntoIterator<Item = TabInfo>>(iter: I) -> Self {
        let mut registry = Self::new();
        registry.replace_all(iter);
        registry
    }
}
