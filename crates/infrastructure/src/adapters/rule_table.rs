//! In-process declarative rule table.
//!
//! Mirrors the browser's session rule store: rules are keyed by id, removals
//! are applied before additions, and adding an id that is still present is
//! rejected without changing anything.

use std::collections::BTreeMap;

use async_trait::async_trait;
use openheaders_application::{ApplicationError, ApplicationResult, RuleSink};
use openheaders_domain::DeclarativeRule;
use tokio::sync::RwLock;

/// Rule table held in memory.
#[derive(Debug, Default)]
pub struct SessionRuleTable {
    rules: RwLock<BTreeMap<u32, DeclarativeRule>>,
}

impl SessionRuleTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl RuleSink for SessionRuleTable {
    async fn update_rules(&self, remove_ids: &[u32], add: Vec<DeclarativeRule>) -> ApplicationResult<()> {
        let mut rules = self.rules.write().await;
        let mut next = rules.clone();
        for id in remove_ids {
            next.remove(id);
        }
        for rule in add {
            if next.contains_key(&rule.id) {
                return Err(ApplicationError::Browser(format!(
                    "rule with id {} already exists",
                    rule.id
                )));
            }
            next.insert(rule.id, rule);
        }
        *rules = next;
        Ok(())
    }

    async fn installed_rules(&self) -> ApplicationResult<Vec<DeclarativeRule>> {
        Ok(self.rules.read().await.values().cloned().collect())
    }
}
