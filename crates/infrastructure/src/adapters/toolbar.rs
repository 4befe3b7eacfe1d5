//! Toolbar appearance holder.

use async_trait::async_trait;
use openheaders_application::{Appearance, AppearanceSink, ApplicationResult};
use tokio::sync::RwLock;

/// Keeps the last appearance applied, for display by the CLI.
#[derive(Debug, Default)]
pub struct ToolbarState {
    current: RwLock<Appearance>,
}

impl ToolbarState {
    /// Creates a cleared toolbar.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the appearance currently shown.
    pub async fn current(&self) -> Appearance {
        self.current.read().await.clone()
    }
}

#[async_trait]
impl AppearanceSink for ToolbarState {
    async fn apply(&self, appearance: &Appearance) -> ApplicationResult<()> {
        *self.current.write().await = appearance.clone();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn keeps_last_applied() {
        let toolbar = ToolbarState::new();
        let shown = Appearance {
            badge_text: "3".to_string(),
            badge_color: Some("#abc".to_string()),
            active: true,
        };
        toolbar.apply(&shown).await.expect("apply should work");
        assert_eq!(toolbar.current().await, shown);
    }
}
