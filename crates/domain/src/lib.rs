//! OpenHeaders Domain - Core types and rule engine
//!
//! This crate defines the profile model and the pure algorithms that turn a
//! profile plus a set of open tabs into one declarative header rule.
//! All types here are pure Rust with no I/O dependencies.

pub mod applicability;
pub mod error;
pub mod export;
pub mod filter;
pub mod header;
pub mod id;
pub mod matcher;
pub mod profile;
pub mod rule;
pub mod settings;
pub mod state;
pub mod tabs;

pub use applicability::{is_active_for, is_active_for_url, matching_filters};
pub use error::{DomainError, DomainResult};
pub use export::{EXPORT_VERSION, ExportFile};
pub use filter::{FilterType, MatchType, UrlFilter};
pub use header::{HeaderOperation, HeaderRule, HeaderType};
pub use id::generate_id;
pub use matcher::{matches, matches_pattern, normalize_host};
pub use profile::{DEFAULT_PROFILE_NAME, PROFILE_COLORS, Profile, palette_color};
pub use rule::{
    DeclarativeRule, HeaderModification, RULE_ID, ResourceType, RuleAction, RuleCondition,
    build_rule, eligible_tabs, parse_http_url,
};
pub use settings::{DarkModePreference, LANGUAGE_AUTO};
pub use state::AppState;
pub use tabs::{TabId, TabInfo, TabRegistry};
