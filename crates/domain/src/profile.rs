//! Profiles: named bundles of header rules and URL filters.

use serde::{Deserialize, Serialize};

use crate::filter::UrlFilter;
use crate::header::HeaderRule;
use crate::id::{PROFILE_PREFIX, generate_id};

/// Colours assigned to new profiles, in rotation.
pub const PROFILE_COLORS: &[&str] = &[
    "#3b82f6", "#10b981", "#f59e0b", "#ef4444", "#8b5cf6", "#ec4899", "#14b8a6", "#6b7280",
];

/// Name given to the profile created when none exist.
pub const DEFAULT_PROFILE_NAME: &str = "Default Profile";

/// A named, coloured bundle of header rules and URL filters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    /// Unique identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Display colour (CSS colour string).
    #[serde(default = "default_color")]
    pub color: String,
    /// Header rules, in user order.
    #[serde(default)]
    pub headers: Vec<HeaderRule>,
    /// URL filters, in user order.
    #[serde(default)]
    pub url_filters: Vec<UrlFilter>,
    /// Creation time, epoch milliseconds.
    #[serde(default)]
    pub created_at: i64,
    /// Last mutation time, epoch milliseconds.
    #[serde(default)]
    pub updated_at: i64,
}

fn default_color() -> String {
    PROFILE_COLORS[0].to_string()
}

/// Returns the palette colour for the `index`-th profile.
#[must_use]
pub fn palette_color(index: usize) -> &'static str {
    PROFILE_COLORS[index % PROFILE_COLORS.len()]
}

impl Profile {
    /// Creates an empty profile with a fresh id.
    #[must_use]
    pub fn new(name: impl Into<String>, color: impl Into<String>, now_ms: i64) -> Self {
        Self {
            id: generate_id(PROFILE_PREFIX),
            name: name.into(),
            color: color.into(),
            headers: Vec::new(),
            url_filters: Vec::new(),
            created_at: now_ms,
            updated_at: now_ms,
        }
    }

    /// Adds a header rule.
    #[must_use]
    pub fn with_header(mut self, header: HeaderRule) -> Self {
        self.headers.push(header);
        self
    }

    /// Adds a URL filter.
    #[must_use]
    pub fn with_filter(mut self, filter: UrlFilter) -> Self {
        self.url_filters.push(filter);
        self
    }

    /// Refreshes `updated_at`.
    pub const fn touch(&mut self, now_ms: i64) {
        self.updated_at = now_ms;
    }

    /// Finds a header rule by id.
    #[must_use]
    pub fn header(&self, header_id: &str) -> Option<&HeaderRule> {
        self.headers.iter().find(|h| h.id == header_id)
    }

    /// Finds a header rule by id, mutably.
    pub fn header_mut(&mut self, header_id: &str) -> Option<&mut HeaderRule> {
        self.headers.iter_mut().find(|h| h.id == header_id)
    }

    /// Finds a URL filter by id.
    #[must_use]
    pub fn url_filter(&self, filter_id: &str) -> Option<&UrlFilter> {
        self.url_filters.iter().find(|f| f.id == filter_id)
    }

    /// Finds a URL filter by id, mutably.
    pub fn url_filter_mut(&mut self, filter_id: &str) -> Option<&mut UrlFilter> {
        self.url_filters.iter_mut().find(|f| f.id == filter_id)
    }

    /// Returns the enabled header rules with non-blank names.
    pub fn effective_headers(&self) -> impl Iterator<Item = &HeaderRule> {
        self.headers.iter().filter(|h| h.is_effective())
    }

    /// Returns a deep copy with fresh ids for the profile and every child.
    #[must_use]
    pub fn with_fresh_ids(&self) -> Self {
        let mut copy = self.clone();
        copy.id = generate_id(PROFILE_PREFIX);
        for header in &mut copy.headers {
            header.id = HeaderRule::new().id;
        }
        for filter in &mut copy.url_filters {
            filter.id = UrlFilter::new().id;
        }
        copy
    }
}
