//! Undo/redo history of whole-state snapshots.
//!
//! The log is linear: recording after an undo discards the redo branch.
//! Snapshots are shared `Arc`s, so recording never copies the state itself.

use std::collections::VecDeque;
use std::sync::Arc;

use openheaders_domain::AppState;

/// Default number of snapshots kept.
pub const MAX_HISTORY: usize = 50;

/// Bounded, linear undo/redo log.
#[derive(Debug, Clone)]
pub struct HistoryManager {
    entries: VecDeque<Arc<AppState>>,
    cursor: usize,
    capacity: usize,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryManager {
    /// Creates an empty history holding up to [`MAX_HISTORY`] snapshots.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(MAX_HISTORY)
    }

    /// Creates an empty history with a custom bound (at least one entry).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            cursor: 0,
            capacity: capacity.max(1),
        }
    }

    /// Appends a snapshot, discarding any redo branch and the oldest entries
    /// beyond capacity. The cursor moves to the new snapshot.
    pub fn record(&mut self, state: Arc<AppState>) {
        if !self.entries.is_empty() && self.cursor < self.entries.len() - 1 {
            self.entries.truncate(self.cursor + 1);
        }
        self.entries.push_back(state);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        self.cursor = self.entries.len() - 1;
        tracing::debug!(entries = self.entries.len(), "history snapshot recorded");
    }

    /// Steps back one snapshot and returns it, or `None` at the start.
    pub fn undo(&mut self) -> Option<Arc<AppState>> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        self.entries.get(self.cursor).cloned()
    }

    /// Steps forward one snapshot and returns it, or `None` at the end.
    pub fn redo(&mut self) -> Option<Arc<AppState>> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        self.entries.get(self.cursor).cloned()
    }

    /// Returns true if there is an earlier snapshot.
    #[must_use]
    pub const fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// Returns true if there is a later snapshot.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len()
    }

    /// Number of retained snapshots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true if nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of retained snapshots.
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Drops every snapshot.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = 0;
    }
}
