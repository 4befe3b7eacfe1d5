//! Browser-facing ports used by the background context.

use async_trait::async_trait;
use openheaders_domain::DeclarativeRule;
use serde::{Deserialize, Serialize};

use crate::ApplicationResult;

/// Port for the browser's declarative rule table.
#[async_trait]
pub trait RuleSink: Send + Sync {
    /// Removes the rules with `remove_ids`, then installs `add`.
    ///
    /// # Errors
    ///
    /// Returns an error if the browser rejects the update.
    async fn update_rules(&self, remove_ids: &[u32], add: Vec<DeclarativeRule>)
    -> ApplicationResult<()>;

    /// Returns the currently installed rules.
    ///
    /// # Errors
    ///
    /// Returns an error if the rule table cannot be read.
    async fn installed_rules(&self) -> ApplicationResult<Vec<DeclarativeRule>>;
}

/// What the toolbar icon should show.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Appearance {
    /// Badge text; empty clears the badge.
    pub badge_text: String,
    /// Badge background colour, when a badge is shown.
    pub badge_color: Option<String>,
    /// Whether headers are being modified in the focused tab.
    pub active: bool,
}

/// Port for the toolbar icon and badge.
#[async_trait]
pub trait AppearanceSink: Send + Sync {
    /// Applies the appearance.
    ///
    /// # Errors
    ///
    /// Returns an error if the browser rejects the update.
    async fn apply(&self, appearance: &Appearance) -> ApplicationResult<()>;
}
