//! Declarative header-modification rule construction.
//!
//! Tab applicability depends on filter logic richer than any single
//! declarative URL condition, so eligible tabs are computed here and handed
//! to the browser as an explicit tab-id allowlist on one wildcard rule.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::applicability::is_active_for;
use crate::error::{DomainError, DomainResult};
use crate::header::{HeaderOperation, HeaderRule, HeaderType};
use crate::profile::Profile;
use crate::tabs::{TabId, TabRegistry};

/// Identifier of the single rule this system installs.
pub const RULE_ID: u32 = 1;

/// Priority of the installed rule.
pub const RULE_PRIORITY: u32 = 1;

/// URL condition matching every request.
pub const WILDCARD_URL_FILTER: &str = "*";

/// Request categories a rule can be restricted to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceType {
    /// Top-level documents.
    MainFrame,
    /// Frame documents.
    SubFrame,
    /// Stylesheets.
    Stylesheet,
    /// Scripts.
    Script,
    /// Images.
    Image,
    /// Fonts.
    Font,
    /// Plugin objects.
    Object,
    /// XHR and fetch.
    Xmlhttprequest,
    /// Pings and beacons.
    Ping,
    /// CSP violation reports.
    CspReport,
    /// Audio and video.
    Media,
    /// WebSocket handshakes.
    Websocket,
    /// WebTransport sessions.
    Webtransport,
    /// Web bundles.
    Webbundle,
    /// Anything else.
    Other,
}

impl ResourceType {
    /// Every resource type; the rule never narrows by request kind.
    pub const ALL: [Self; 15] = [
        Self::MainFrame,
        Self::SubFrame,
        Self::Stylesheet,
        Self::Script,
        Self::Image,
        Self::Font,
        Self::Object,
        Self::Xmlhttprequest,
        Self::Ping,
        Self::CspReport,
        Self::Media,
        Self::Websocket,
        Self::Webtransport,
        Self::Webbundle,
        Self::Other,
    ];
}

/// One header modification inside a rule action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeaderModification {
    /// Header name.
    pub header: String,
    /// Operation to apply.
    pub operation: HeaderOperation,
    /// Value, omitted for `remove` and for empty values.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
}

impl HeaderModification {
    fn from_rule(rule: &HeaderRule) -> Self {
        let value = (rule.operation.uses_value() && !rule.value.is_empty())
            .then(|| rule.value.clone());
        Self {
            header: rule.name.trim().to_string(),
            operation: rule.operation,
            value,
        }
    }
}

/// Kind of rule action. Only header modification is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum RuleActionType {
    /// Modify request and/or response headers.
    #[default]
    #[serde(rename = "modifyHeaders")]
    ModifyHeaders,
}

/// Action part of a declarative rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleAction {
    /// Action kind.
    #[serde(rename = "type")]
    pub action_type: RuleActionType,
    /// Request header modifications.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub request_headers: Vec<HeaderModification>,
    /// Response header modifications.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub response_headers: Vec<HeaderModification>,
}

/// Condition part of a declarative rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RuleCondition {
    /// URL filter, always the wildcard.
    pub url_filter: String,
    /// Tabs the rule is restricted to, ascending.
    pub tab_ids: Vec<TabId>,
    /// Request categories covered.
    pub resource_types: Vec<ResourceType>,
}

/// A browser-executable header-modification rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclarativeRule {
    /// Rule id.
    pub id: u32,
    /// Rule priority.
    pub priority: u32,
    /// What to do.
    pub action: RuleAction,
    /// Where to do it.
    pub condition: RuleCondition,
}

/// Builds the declarative rule for `profile` over the given tabs.
///
/// Returns `None` when the profile has no enabled, named headers or when it
/// applies to no `http`/`https` tab.
#[must_use]
pub fn build_rule(profile: &Profile, tabs: &TabRegistry) -> Option<DeclarativeRule> {
    let headers: Vec<&HeaderRule> = profile.effective_headers().collect();
    if headers.is_empty() {
        return None;
    }

    let tab_ids = eligible_tabs(profile, tabs);
    if tab_ids.is_empty() {
        return None;
    }

    let (request, response): (Vec<&HeaderRule>, Vec<&HeaderRule>) = headers
        .into_iter()
        .partition(|h| h.header_type == HeaderType::Request);
    let request_headers: Vec<_> = request.into_iter().map(HeaderModification::from_rule).collect();
    let response_headers: Vec<_> = response.into_iter().map(HeaderModification::from_rule).collect();
    if request_headers.is_empty() && response_headers.is_empty() {
        return None;
    }

    Some(DeclarativeRule {
        id: RULE_ID,
        priority: RULE_PRIORITY,
        action: RuleAction {
            action_type: RuleActionType::ModifyHeaders,
            request_headers,
            response_headers,
        },
        condition: RuleCondition {
            url_filter: WILDCARD_URL_FILTER.to_string(),
            tab_ids,
            resource_types: ResourceType::ALL.to_vec(),
        },
    })
}

/// Returns the ids of `http`/`https` tabs the profile applies to, ascending.
#[must_use]
pub fn eligible_tabs(profile: &Profile, tabs: &TabRegistry) -> Vec<TabId> {
    tabs.iter()
        .filter(|(_, url)| parse_http_url(url).is_ok_and(|u| is_active_for(profile, &u)))
        .map(|(id, _)| id)
        .collect()
}

/// Parses a URL, accepting only the `http` and `https` schemes.
///
/// # Errors
///
/// Returns [`DomainError::InvalidUrl`] for unparseable URLs and for any other
/// scheme (extension pages, `chrome://`, `file://`, ...).
pub fn parse_http_url(raw: &str) -> DomainResult<Url> {
    let url = Url::parse(raw).map_err(|e| DomainError::InvalidUrl(format!("{raw}: {e}")))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(DomainError::InvalidUrl(format!("unsupported scheme {other}"))),
    }
}
