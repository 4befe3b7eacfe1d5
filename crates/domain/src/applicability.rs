//! Decides whether a profile applies to a tab URL.
//!
//! Evaluation order: any matching exclude rejects the URL outright; with no
//! include filters the profile applies everywhere else; otherwise at least one
//! include has to match.

use url::Url;

use crate::filter::{FilterType, UrlFilter};
use crate::matcher::matches_url;
use crate::profile::Profile;

/// Returns true if the profile is active for `tab_url`.
///
/// An unparseable URL is never active.
#[must_use]
pub fn is_active_for_url(profile: &Profile, tab_url: &str) -> bool {
    Url::parse(tab_url).is_ok_and(|url| is_active_for(profile, &url))
}

/// Same as [`is_active_for_url`] for an already parsed URL.
#[must_use]
pub fn is_active_for(profile: &Profile, url: &Url) -> bool {
    let (excludes, includes): (Vec<&UrlFilter>, Vec<&UrlFilter>) = profile
        .url_filters
        .iter()
        .filter(|f| f.participates())
        .partition(|f| f.filter_type == FilterType::Exclude);

    if excludes.iter().any(|f| filter_matches(f, url)) {
        return false;
    }
    includes.is_empty() || includes.iter().any(|f| filter_matches(f, url))
}

/// Returns the ids of the participating filters that match `tab_url`.
#[must_use]
pub fn matching_filters<'a>(profile: &'a Profile, tab_url: &str) -> Vec<&'a str> {
    let Ok(url) = Url::parse(tab_url) else {
        return Vec::new();
    };
    profile
        .url_filters
        .iter()
        .filter(|f| f.participates() && filter_matches(f, &url))
        .map(|f| f.id.as_str())
        .collect()
}

fn filter_matches(filter: &UrlFilter, url: &Url) -> bool {
    matches_url(url, &filter.match_type, &filter.pattern)
}
