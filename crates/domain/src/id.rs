//! ID generation utilities.

use uuid::Uuid;

/// Prefix used for profile identifiers.
pub const PROFILE_PREFIX: &str = "profile";

/// Prefix used for header rule identifiers.
pub const HEADER_PREFIX: &str = "header";

/// Prefix used for URL filter identifiers.
pub const FILTER_PREFIX: &str = "filter";

/// Generates a new identifier of the form `{prefix}-{uuid-v7}`.
///
/// UUID v7 carries a timestamp, so identifiers sort by creation time.
#[must_use]
pub fn generate_id(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::now_v7())
}
