//! Upgrades persisted state documents written by older releases.
//!
//! Legacy shapes handled:
//! - boolean `darkMode` instead of `darkModePreference`
//! - missing `languagePreference`
//! - URL filters without `matchType`

use openheaders_domain::{AppState, DarkModePreference, LANGUAGE_AUTO, MatchType};
use serde_json::{Map, Value};

/// Why a stored document could not be turned into an [`AppState`].
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    /// The document is not a JSON object.
    #[error("state document is not an object")]
    NotAnObject,

    /// The `profiles` array is missing.
    #[error("state document has no profiles array")]
    MissingProfiles,

    /// The migrated document still does not decode.
    #[error("state document is malformed: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Migrates a stored document and decodes it.
///
/// # Errors
///
/// Returns [`MigrationError`] when the document is corrupted beyond repair.
pub fn migrate_state(value: Value) -> Result<AppState, MigrationError> {
    let Value::Object(mut doc) = value else {
        return Err(MigrationError::NotAnObject);
    };
    if !doc.get("profiles").is_some_and(Value::is_array) {
        return Err(MigrationError::MissingProfiles);
    }

    if let Some(legacy) = doc.remove("darkMode") {
        if !doc.contains_key("darkModePreference") {
            let preference = DarkModePreference::from_legacy(legacy.as_bool().unwrap_or(false));
            doc.insert("darkModePreference".to_string(), serde_json::to_value(preference)?);
            tracing::debug!(?preference, "migrated legacy darkMode flag");
        }
    }

    if !doc.contains_key("languagePreference") {
        doc.insert(
            "languagePreference".to_string(),
            Value::String(LANGUAGE_AUTO.to_string()),
        );
    }

    let mut filled = 0_usize;
    if let Some(Value::Array(profiles)) = doc.get_mut("profiles") {
        for filters in profiles
            .iter_mut()
            .filter_map(|p| p.get_mut("urlFilters"))
            .filter_map(Value::as_array_mut)
        {
            for filter in filters.iter_mut().filter_map(Value::as_object_mut) {
                filled += usize::from(fill_match_type(filter));
            }
        }
    }
    if filled > 0 {
        tracing::debug!(filters = filled, "filled missing matchType");
    }

    Ok(serde_json::from_value(Value::Object(doc))?)
}

fn fill_match_type(filter: &mut Map<String, Value>) -> bool {
    if filter.get("matchType").is_some_and(Value::is_string) {
        return false;
    }
    filter.insert(
        "matchType".to_string(),
        Value::String(MatchType::DnrUrlFilter.as_str().to_string()),
    );
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use openheaders_domain::FilterType;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn legacy_dark_mode_true_becomes_dark() {
        let state = migrate_state(json!({"profiles": [], "darkMode": true})).expect("migrates");
        assert_eq!(state.dark_mode_preference, DarkModePreference::Dark);
    }

    #[test]
    fn legacy_dark_mode_false_becomes_system() {
        let state = migrate_state(json!({"profiles": [], "darkMode": false})).expect("migrates");
        assert_eq!(state.dark_mode_preference, DarkModePreference::System);
    }

    #[test]
    fn explicit_preference_wins_over_legacy_flag() {
        let state = migrate_state(json!({
            "profiles": [],
            "darkMode": true,
            "darkModePreference": "light"
        }))
        .expect("migrates");
        assert_eq!(state.dark_mode_preference, DarkModePreference::Light);
    }

    #[test]
    fn missing_language_defaults_to_auto() {
        let state = migrate_state(json!({"profiles": []})).expect("migrates");
        assert_eq!(state.language_preference, "auto");
    }

    #[test]
    fn filters_without_match_type_use_dnr_url_filter() {
        let state = migrate_state(json!({
            "profiles": [{
                "id": "p1",
                "name": "Legacy",
                "urlFilters": [
                    {"id": "f1", "pattern": "*://api.example.com/*", "type": "exclude"},
                    {"id": "f2", "pattern": "example.com", "matchType": "host_equals"}
                ]
            }]
        }))
        .expect("migrates");

        let filters = &state.profiles[0].url_filters;
        assert_eq!(filters[0].match_type, MatchType::DnrUrlFilter);
        assert_eq!(filters[0].filter_type, FilterType::Exclude);
        assert_eq!(filters[1].match_type, MatchType::HostEquals);
    }

    #[test]
    fn corrupted_documents_are_rejected() {
        assert!(matches!(migrate_state(json!([1, 2])), Err(MigrationError::NotAnObject)));
        assert!(matches!(
            migrate_state(json!({"activeProfileId": "x"})),
            Err(MigrationError::MissingProfiles)
        ));
        assert!(matches!(
            migrate_state(json!({"profiles": [{"name": "no id"}]})),
            Err(MigrationError::Malformed(_))
        ));
    }
}
