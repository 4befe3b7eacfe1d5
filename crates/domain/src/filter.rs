//! URL filters that scope a profile to a set of tabs.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::id::{FILTER_PREFIX, generate_id};

/// Pattern dialect of a URL filter.
///
/// Unknown dialects are kept verbatim in [`MatchType::Other`] so a state
/// written by a newer build survives a round-trip. They are evaluated as
/// [`MatchType::DnrUrlFilter`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(from = "String", into = "String")]
pub enum MatchType {
    /// Exact hostname equality.
    HostEquals,
    /// Hostname equality or subdomain of the pattern host.
    HostEndsWith,
    /// URL prefix (scheme-less unless the pattern carries a scheme).
    UrlStartsWith,
    /// URL path prefix.
    PathStartsWith,
    /// URL substring (scheme-less unless the pattern carries a scheme).
    UrlContains,
    /// `localhost` with an optional port.
    LocalhostPort,
    /// Declarative-rule style glob where `*` matches anything.
    #[default]
    DnrUrlFilter,
    /// Regular expression over the full URL.
    Regex,
    /// Dialect not known to this build.
    Other(String),
}

impl MatchType {
    /// Returns the wire name of the dialect.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::HostEquals => "host_equals",
            Self::HostEndsWith => "host_ends_with",
            Self::UrlStartsWith => "url_starts_with",
            Self::PathStartsWith => "path_starts_with",
            Self::UrlContains => "url_contains",
            Self::LocalhostPort => "localhost_port",
            Self::DnrUrlFilter => "dnr_url_filter",
            Self::Regex => "regex",
            Self::Other(raw) => raw,
        }
    }
}

impl From<String> for MatchType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "host_equals" => Self::HostEquals,
            "host_ends_with" => Self::HostEndsWith,
            "url_starts_with" => Self::UrlStartsWith,
            "path_starts_with" => Self::PathStartsWith,
            "url_contains" => Self::UrlContains,
            "localhost_port" => Self::LocalhostPort,
            "dnr_url_filter" => Self::DnrUrlFilter,
            "regex" => Self::Regex,
            _ => Self::Other(value),
        }
    }
}

impl From<MatchType> for String {
    fn from(value: MatchType) -> Self {
        match value {
            MatchType::Other(raw) => raw,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a filter widens or narrows a profile's reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum FilterType {
    /// The profile applies where at least one include matches.
    #[default]
    Include,
    /// The profile never applies where an exclude matches.
    Exclude,
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Include => write!(f, "include"),
            Self::Exclude => write!(f, "exclude"),
        }
    }
}

/// A URL filter owned by a profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UrlFilter {
    /// Unique identifier.
    pub id: String,
    /// Whether the filter participates in matching.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    /// Pattern dialect.
    #[serde(default)]
    pub match_type: MatchType,
    /// Pattern text, interpreted according to `match_type`.
    #[serde(default)]
    pub pattern: String,
    /// Include or exclude.
    #[serde(rename = "type", default)]
    pub filter_type: FilterType,
}

const fn default_enabled() -> bool {
    true
}

impl UrlFilter {
    /// Creates an enabled, empty include filter with a fresh id.
    #[must_use]
    pub fn new() -> Self {
        Self {
            id: generate_id(FILTER_PREFIX),
            enabled: true,
            match_type: MatchType::default(),
            pattern: String::new(),
            filter_type: FilterType::Include,
        }
    }

    /// Creates an enabled include filter with the given dialect and pattern.
    #[must_use]
    pub fn include(match_type: MatchType, pattern: impl Into<String>) -> Self {
        Self {
            match_type,
            pattern: pattern.into(),
            ..Self::new()
        }
    }

    /// Creates an enabled exclude filter with the given dialect and pattern.
    #[must_use]
    pub fn exclude(match_type: MatchType, pattern: impl Into<String>) -> Self {
        Self {
            filter_type: FilterType::Exclude,
            ..Self::include(match_type, pattern)
        }
    }

    /// Returns true when the filter takes part in evaluation.
    ///
    /// Disabled filters never do. A blank pattern disqualifies every dialect
    /// except `localhost_port`, where it means "any port".
    #[must_use]
    pub fn participates(&self) -> bool {
        self.enabled
            && (self.match_type == MatchType::LocalhostPort || !self.pattern.trim().is_empty())
    }
}

impl Default for UrlFilter {
    fn default() -> Self {
        Self::new()
    }
}
