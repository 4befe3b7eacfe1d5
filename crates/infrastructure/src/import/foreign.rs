//! Mapping of the foreign profile-list format.
//!
//! Each entry looks like
//! `{title, headers: [{enabled, name, value, appendMode?, comment?}], respHeaders?, urlFilters?, excludeUrlFilters?, backgroundColor?}`
//! where URL filters are `{enabled, urlRegex}`.

use openheaders_domain::{
    HeaderOperation, HeaderRule, HeaderType, MatchType, Profile, UrlFilter, palette_color,
};
use serde::Deserialize;
use serde_json::Value;

use super::warning::ImportWarning;

/// Returns true if `entry` has the foreign `title` + `headers` shape.
pub fn is_foreign_entry(entry: &Value) -> bool {
    entry.get("title").is_some_and(Value::is_string)
        && entry.get("headers").is_some_and(Value::is_array)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ForeignProfile {
    title: String,
    headers: Vec<Value>,
    #[serde(default)]
    resp_headers: Vec<Value>,
    #[serde(default)]
    url_filters: Vec<Value>,
    #[serde(default)]
    exclude_url_filters: Vec<Value>,
    #[serde(default)]
    background_color: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ForeignHeader {
    #[serde(default = "enabled_by_default")]
    enabled: bool,
    name: String,
    #[serde(default)]
    value: String,
    #[serde(default)]
    append_mode: bool,
    #[serde(default)]
    comment: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ForeignUrlFilter {
    #[serde(default = "enabled_by_default")]
    enabled: bool,
    url_regex: String,
}

const fn enabled_by_default() -> bool {
    true
}

/// Converts one foreign entry into a profile with fresh ids.
///
/// Malformed headers and filters are skipped and reported; a malformed entry
/// yields `None`.
pub fn map_foreign_profile(
    entry: Value,
    index: usize,
    warnings: &mut Vec<ImportWarning>,
) -> Option<Profile> {
    let path = format!("[{index}]");
    let foreign: ForeignProfile = match serde_json::from_value(entry) {
        Ok(foreign) => foreign,
        Err(e) => {
            warnings.push(ImportWarning::skipped(&path, format!("malformed profile: {e}")));
            return None;
        }
    };

    let color = match foreign.background_color {
        Some(color) if !color.trim().is_empty() => color,
        Some(_) => {
            let fallback = palette_color(index).to_string();
            warnings.push(ImportWarning::info(
                format!("{path}.backgroundColor"),
                format!("blank colour replaced with {fallback}"),
            ));
            fallback
        }
        None => palette_color(index).to_string(),
    };
    // Timestamps stay zero; the state store stamps them on import.
    let mut profile = Profile::new(foreign.title, color, 0);

    let sides = [
        ("headers", HeaderType::Request, foreign.headers),
        ("respHeaders", HeaderType::Response, foreign.resp_headers),
    ];
    for (field, header_type, entries) in sides {
        for (i, raw) in entries.into_iter().enumerate() {
            match serde_json::from_value::<ForeignHeader>(raw) {
                Ok(header) => profile.headers.push(map_header(header, header_type)),
                Err(e) => warnings.push(ImportWarning::skipped(
                    format!("{path}.{field}[{i}]"),
                    format!("malformed header: {e}"),
                )),
            }
        }
    }

    let filters = [
        ("urlFilters", false, foreign.url_filters),
        ("excludeUrlFilters", true, foreign.exclude_url_filters),
    ];
    for (field, exclude, entries) in filters {
        for (i, raw) in entries.into_iter().enumerate() {
            match serde_json::from_value::<ForeignUrlFilter>(raw) {
                Ok(filter) => profile.url_filters.push(map_filter(filter, exclude)),
                Err(e) => warnings.push(ImportWarning::skipped(
                    format!("{path}.{field}[{i}]"),
                    format!("malformed URL filter: {e}"),
                )),
            }
        }
    }

    Some(profile)
}

fn map_header(header: ForeignHeader, header_type: HeaderType) -> HeaderRule {
    let operation = if header.append_mode {
        HeaderOperation::Append
    } else {
        HeaderOperation::Set
    };
    HeaderRule {
        enabled: header.enabled,
        comment: header.comment,
        ..HeaderRule::named(header.name, header.value)
            .with_type(header_type)
            .with_operation(operation)
    }
}

fn map_filter(filter: ForeignUrlFilter, exclude: bool) -> UrlFilter {
    let mut mapped = if exclude {
        UrlFilter::exclude(MatchType::Regex, filter.url_regex)
    } else {
        UrlFilter::include(MatchType::Regex, filter.url_regex)
    };
    mapped.enabled = filter.enabled;
    mapped
}
