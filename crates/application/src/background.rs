//! Background context: the state mirror, tab registry and sink caches the
//! update scheduler works on.

use openheaders_domain::{
    AppState, DeclarativeRule, RULE_ID, TabId, TabInfo, TabRegistry, build_rule, is_active_for,
    parse_http_url,
};

use crate::ApplicationResult;
use crate::ports::{Appearance, AppearanceSink, RuleSink};

/// Something that happened in the browser or in storage.
#[derive(Debug, Clone, PartialEq)]
pub enum BackgroundEvent {
    /// The persisted state changed.
    StateChanged(AppState),
    /// Full snapshot of open tabs, taken at startup.
    TabsSnapshot(Vec<TabInfo>),
    /// A tab was opened.
    TabCreated(TabInfo),
    /// A tab navigated.
    TabUpdated(TabInfo),
    /// A tab was closed.
    TabRemoved(TabId),
    /// Focus moved to another tab.
    TabActivated(TabId),
}

impl BackgroundEvent {
    /// Returns true if the event can change the installed rule. Every event
    /// can change the toolbar appearance.
    #[must_use]
    pub const fn affects_rules(&self) -> bool {
        !matches!(self, Self::TabActivated(_))
    }
}

/// State owned by the background scheduler.
pub struct BackgroundContext<R: RuleSink, A: AppearanceSink> {
    state: AppState,
    tabs: TabRegistry,
    rules: R,
    appearance: A,
    // `None` until the first successful write, so stale rules from an
    // earlier session are always replaced.
    installed: Option<Option<DeclarativeRule>>,
    shown: Option<Appearance>,
}

impl<R: RuleSink, A: AppearanceSink> BackgroundContext<R, A> {
    /// Creates a context over the given sinks.
    pub fn new(state: AppState, rules: R, appearance: A) -> Self {
        Self {
            state,
            tabs: TabRegistry::new(),
            rules,
            appearance,
            installed: None,
            shown: None,
        }
    }

    /// Returns the mirrored state.
    #[must_use]
    pub const fn state(&self) -> &AppState {
        &self.state
    }

    /// Returns the known tabs.
    #[must_use]
    pub const fn tabs(&self) -> &TabRegistry {
        &self.tabs
    }

    /// Returns the rule sink.
    #[must_use]
    pub const fn rule_sink(&self) -> &R {
        &self.rules
    }

    /// Returns the appearance sink.
    #[must_use]
    pub const fn appearance_sink(&self) -> &A {
        &self.appearance
    }

    /// Folds an event into the context.
    pub fn apply(&mut self, event: BackgroundEvent) {
        match event {
            BackgroundEvent::StateChanged(state) => self.state = state,
            BackgroundEvent::TabsSnapshot(tabs) => self.tabs.replace_all(tabs),
            BackgroundEvent::TabCreated(tab) | BackgroundEvent::TabUpdated(tab) => {
                self.tabs.upsert(tab.id, tab.url);
            }
            BackgroundEvent::TabRemoved(id) => {
                self.tabs.remove(id);
            }
            BackgroundEvent::TabActivated(id) => self.tabs.set_active(id),
        }
    }

    /// Computes the rule the browser should currently hold.
    #[must_use]
    pub fn desired_rule(&self) -> Option<DeclarativeRule> {
        self.state
            .active_profile()
            .and_then(|profile| build_rule(profile, &self.tabs))
    }

    /// Computes what the toolbar should currently show.
    ///
    /// The badge counts the active profile's effective headers when the
    /// profile applies to the focused tab; otherwise it is cleared.
    #[must_use]
    pub fn desired_appearance(&self) -> Appearance {
        let Some(profile) = self.state.active_profile() else {
            return Appearance::default();
        };
        let applies = self
            .tabs
            .active()
            .and_then(|id| self.tabs.url(id))
            .and_then(|url| parse_http_url(url).ok())
            .is_some_and(|url| is_active_for(profile, &url));
        let count = profile.effective_headers().count();
        if !applies || count == 0 {
            return Appearance::default();
        }
        Appearance {
            badge_text: count.to_string(),
            badge_color: Some(profile.color.clone()),
            active: true,
        }
    }

    /// Replaces the installed rule with the current one.
    ///
    /// Returns false when the browser already holds the same rule.
    ///
    /// # Errors
    ///
    /// Returns the sink's error; the cache is left untouched so the next
    /// pass retries.
    pub async fn update_rules(&mut self) -> ApplicationResult<bool> {
        let rule = self.desired_rule();
        if self.installed.as_ref() == Some(&rule) {
            return Ok(false);
        }
        let add: Vec<DeclarativeRule> = rule.iter().cloned().collect();
        self.rules.update_rules(&[RULE_ID], add).await?;
        tracing::debug!(
            installed = rule.is_some(),
            tabs = rule.as_ref().map_or(0, |r| r.condition.tab_ids.len()),
            "declarative rule updated"
        );
        self.installed = Some(rule);
        Ok(true)
    }

    /// Pushes the current appearance to the toolbar.
    ///
    /// Returns false when nothing changed.
    ///
    /// # Errors
    ///
    /// Returns the sink's error; the next pass retries.
    pub async fn update_appearance(&mut self) -> ApplicationResult<bool> {
        let appearance = self.desired_appearance();
        if self.shown.as_ref() == Some(&appearance) {
            return Ok(false);
        }
        self.appearance.apply(&appearance).await?;
        tracing::debug!(badge = %appearance.badge_text, "appearance updated");
        self.shown = Some(appearance);
        Ok(true)
    }

    /// Reads back the rules the browser currently holds.
    ///
    /// # Errors
    ///
    /// Returns the sink's error.
    pub async fn installed_rules(&self) -> ApplicationResult<Vec<DeclarativeRule>> {
        self.rules.installed_rules().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use openheaders_domain::{HeaderRule, MatchType, Profile, UrlFilter};
    use pretty_assertions::assert_eq;

    use super::*;

    #[derive(Clone, Default)]
    struct Recorder {
        rules: Arc<Mutex<Vec<Vec<DeclarativeRule>>>>,
        appearances: Arc<Mutex<Vec<Appearance>>>,
    }

    #[async_trait]
    impl RuleSink for Recorder {
        async fn update_rules(
            &self,
            remove_ids: &[u32],
            add: Vec<DeclarativeRule>,
        ) -> ApplicationResult<()> {
            assert_eq!(remove_ids, &[RULE_ID]);
            if let Ok(mut rules) = self.rules.lock() {
                rules.push(add);
            }
            Ok(())
        }

        async fn installed_rules(&self) -> ApplicationResult<Vec<DeclarativeRule>> {
            Ok(self
                .rules
                .lock()
                .ok()
                .and_then(|r| r.last().cloned())
                .unwrap_or_default())
        }
    }

    #[async_trait]
    impl AppearanceSink for Recorder {
        async fn apply(&self, appearance: &Appearance) -> ApplicationResult<()> {
            if let Ok(mut appearances) = self.appearances.lock() {
                appearances.push(appearance.clone());
            }
            Ok(())
        }
    }

    fn state() -> AppState {
        let profile = Profile::new("Dev", "#ff0000", 0)
            .with_header(HeaderRule::named("X-Env", "dev"))
            .with_header(HeaderRule::named("X-Trace", "1"))
            .with_filter(UrlFilter::include(MatchType::HostEquals, "example.com"));
        let mut state = AppState {
            profiles: vec![profile],
            ..AppState::default()
        };
        state.ensure_invariants(0);
        state
    }

    fn context() -> (BackgroundContext<Recorder, Recorder>, Recorder) {
        let recorder = Recorder::default();
        (
            BackgroundContext::new(state(), recorder.clone(), recorder.clone()),
            recorder,
        )
    }

    #[tokio::test]
    async fn first_pass_always_writes_then_skips_identical() {
        let (mut ctx, recorder) = context();
        assert!(matches!(ctx.update_rules().await, Ok(true)));
        assert!(matches!(ctx.update_rules().await, Ok(false)));

        let writes = recorder.rules.lock().map(|r| r.clone()).unwrap_or_default();
        assert_eq!(writes, vec![Vec::new()]);
    }

    #[tokio::test]
    async fn rule_follows_tab_lifecycle() {
        let (mut ctx, recorder) = context();
        ctx.apply(BackgroundEvent::TabCreated(TabInfo::new(7, "https://example.com/")));
        ctx.apply(BackgroundEvent::TabCreated(TabInfo::new(3, "https://other.org/")));
        assert!(matches!(ctx.update_rules().await, Ok(true)));

        let installed = ctx.installed_rules().await.unwrap_or_default();
        assert_eq!(installed.len(), 1);
        assert_eq!(installed[0].condition.tab_ids, vec![7]);

        ctx.apply(BackgroundEvent::TabRemoved(7));
        assert!(matches!(ctx.update_rules().await, Ok(true)));
        assert!(recorder.rules.lock().map(|r| r[1].is_empty()).unwrap_or_default());
    }

    #[tokio::test]
    async fn badge_counts_headers_for_matching_active_tab() {
        let (mut ctx, _) = context();
        ctx.apply(BackgroundEvent::TabsSnapshot(vec![
            TabInfo::new(1, "https://example.com/a"),
            TabInfo::new(2, "https://elsewhere.net/"),
        ]));

        ctx.apply(BackgroundEvent::TabActivated(1));
        assert_eq!(
            ctx.desired_appearance(),
            Appearance {
                badge_text: "2".to_string(),
                badge_color: Some("#ff0000".to_string()),
                active: true,
            }
        );

        ctx.apply(BackgroundEvent::TabActivated(2));
        assert_eq!(ctx.desired_appearance(), Appearance::default());
    }

    #[tokio::test]
    async fn excluded_active_tab_clears_badge() {
        let (mut ctx, recorder) = context();
        let mut state = state();
        state.profiles[0]
            .url_filters
            .push(UrlFilter::exclude(MatchType::PathStartsWith, "/admin"));
        ctx.apply(BackgroundEvent::StateChanged(state));
        ctx.apply(BackgroundEvent::TabUpdated(TabInfo::new(1, "https://example.com/admin")));
        ctx.apply(BackgroundEvent::TabActivated(1));

        assert!(matches!(ctx.update_appearance().await, Ok(true)));
        assert!(matches!(ctx.update_appearance().await, Ok(false)));
        let shown = recorder.appearances.lock().map(|a| a.clone()).unwrap_or_default();
        assert_eq!(shown, vec![Appearance::default()]);
    }

    #[test]
    fn activation_only_touches_appearance() {
        assert!(!BackgroundEvent::TabActivated(1).affects_rules());
        assert!(BackgroundEvent::TabRemoved(1).affects_rules());
        assert!(BackgroundEvent::StateChanged(AppState::default()).affects_rules());
    }
}
