//! Incremental update scheduler.
//!
//! A single actor task owns the [`BackgroundContext`] and consumes events from
//! an unbounded queue. Bursts are coalesced: every queued event is folded in
//! before a pass runs, and events arriving while a pass is in flight set the
//! signal's `pending` flag so exactly one more pass follows.

use openheaders_domain::{AppState, DeclarativeRule};
use serde::{Deserialize, Serialize};
use tokio::sync::{broadcast, mpsc, oneshot};
use tokio::task::JoinHandle;

use crate::background::{BackgroundContext, BackgroundEvent};
use crate::ports::{AppearanceSink, RuleSink, STATE_KEY, StorageChange};
use crate::{ApplicationError, ApplicationResult};

/// Dirty flag for one kind of recomputation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Coalescer {
    pending: bool,
    in_flight: bool,
}

impl Coalescer {
    /// Requests a pass. Returns true if no pass is currently running.
    pub const fn mark(&mut self) -> bool {
        self.pending = true;
        !self.in_flight
    }

    /// Starts a drain. Returns false if one is running or nothing is pending.
    pub const fn begin(&mut self) -> bool {
        if self.in_flight || !self.pending {
            return false;
        }
        self.in_flight = true;
        true
    }

    /// Consumes the pending flag, returning whether it was set.
    pub const fn take(&mut self) -> bool {
        let pending = self.pending;
        self.pending = false;
        pending
    }

    /// Ends a drain.
    pub const fn finish(&mut self) {
        self.in_flight = false;
    }

    /// Returns true if a pass has been requested.
    #[must_use]
    pub const fn is_pending(&self) -> bool {
        self.pending
    }

    /// Returns true while a drain is running.
    #[must_use]
    pub const fn is_in_flight(&self) -> bool {
        self.in_flight
    }
}

/// Messages other contexts send to the background context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RuntimeMessage {
    /// Returns the installed declarative rules.
    GetActiveRules,
}

type RulesReply = oneshot::Sender<ApplicationResult<Vec<DeclarativeRule>>>;

#[derive(Debug)]
enum Command {
    Event(BackgroundEvent),
    Message(RuntimeMessage, RulesReply),
}

#[derive(Debug, Clone, Copy)]
enum Signal {
    Rules,
    Appearance,
}

/// Cloneable handle for feeding the scheduler.
#[derive(Debug, Clone)]
pub struct SchedulerHandle {
    sender: mpsc::UnboundedSender<Command>,
}

impl SchedulerHandle {
    /// Queues an event.
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationError::SchedulerStopped`] if the actor has exited.
    pub fn send(&self, event: BackgroundEvent) -> ApplicationResult<()> {
        self.sender
            .send(Command::Event(event))
            .map_err(|_| ApplicationError::SchedulerStopped)
    }

    /// Handles a runtime message. The reply is sent once every event queued
    /// before it has been applied.
    ///
    /// # Errors
    ///
    /// Returns [`ApplicationError::SchedulerStopped`] if the actor has exited,
    /// or the rule sink's error.
    pub async fn request(&self, message: RuntimeMessage) -> ApplicationResult<Vec<DeclarativeRule>> {
        let (reply, receiver) = oneshot::channel();
        self.sender
            .send(Command::Message(message, reply))
            .map_err(|_| ApplicationError::SchedulerStopped)?;
        receiver
            .await
            .map_err(|_| ApplicationError::SchedulerStopped)?
    }

    /// Shorthand for [`RuntimeMessage::GetActiveRules`].
    ///
    /// # Errors
    ///
    /// See [`SchedulerHandle::request`].
    pub async fn get_active_rules(&self) -> ApplicationResult<Vec<DeclarativeRule>> {
        self.request(RuntimeMessage::GetActiveRules).await
    }
}

/// The actor that keeps the browser in sync with state and tabs.
pub struct UpdateScheduler<R: RuleSink, A: AppearanceSink> {
    context: BackgroundContext<R, A>,
    receiver: mpsc::UnboundedReceiver<Command>,
    rules: Coalescer,
    appearance: Coalescer,
    replies: Vec<(RuntimeMessage, RulesReply)>,
}

impl<R, A> UpdateScheduler<R, A>
where
    R: RuleSink + 'static,
    A: AppearanceSink + 'static,
{
    /// Creates the actor and its handle. Nothing runs until [`Self::run`].
    ///
    /// Both signals start pending so the first pass installs the rule and
    /// appearance for the initial state.
    pub fn new(context: BackgroundContext<R, A>) -> (Self, SchedulerHandle) {
        let (sender, receiver) = mpsc::unbounded_channel();
        let mut rules = Coalescer::default();
        let mut appearance = Coalescer::default();
        rules.mark();
        appearance.mark();
        let scheduler = Self {
            context,
            receiver,
            rules,
            appearance,
            replies: Vec::new(),
        };
        (scheduler, SchedulerHandle { sender })
    }

    /// Spawns the actor on the current runtime.
    pub fn spawn(context: BackgroundContext<R, A>) -> (SchedulerHandle, JoinHandle<BackgroundContext<R, A>>) {
        let (scheduler, handle) = Self::new(context);
        (handle, tokio::spawn(scheduler.run()))
    }

    /// Processes events until every handle is dropped, then returns the
    /// context.
    pub async fn run(mut self) -> BackgroundContext<R, A> {
        self.absorb_queued();
        self.settle().await;
        while let Some(command) = self.receiver.recv().await {
            self.handle(command);
            self.absorb_queued();
            self.settle().await;
        }
        tracing::debug!("update scheduler stopped");
        self.context
    }

    /// Drains both signals until neither is pending, then answers queued
    /// runtime messages.
    async fn settle(&mut self) {
        while self.rules.is_pending() || self.appearance.is_pending() {
            self.drain(Signal::Rules).await;
            self.drain(Signal::Appearance).await;
        }
        for (message, reply) in std::mem::take(&mut self.replies) {
            let result = match message {
                RuntimeMessage::GetActiveRules => self.context.installed_rules().await,
            };
            // The requester may have given up waiting.
            let _ = reply.send(result);
        }
    }

    async fn drain(&mut self, signal: Signal) {
        if !self.coalescer(signal).begin() {
            return;
        }
        let mut passes = 0_u32;
        while self.coalescer(signal).take() {
            passes += 1;
            let result = match signal {
                Signal::Rules => self.context.update_rules().await,
                Signal::Appearance => self.context.update_appearance().await,
            };
            if let Err(error) = result {
                tracing::warn!(?signal, %error, "background update failed");
            }
            self.absorb_queued();
        }
        self.coalescer(signal).finish();
        tracing::debug!(?signal, passes, "signal drained");
    }

    /// Applies every command already in the queue without yielding.
    fn absorb_queued(&mut self) {
        while let Ok(command) = self.receiver.try_recv() {
            self.handle(command);
        }
    }

    fn handle(&mut self, command: Command) {
        match command {
            Command::Event(event) => {
                if event.affects_rules() {
                    self.rules.mark();
                }
                self.appearance.mark();
                self.context.apply(event);
            }
            Command::Message(message, reply) => self.replies.push((message, reply)),
        }
    }

    const fn coalescer(&mut self, signal: Signal) -> &mut Coalescer {
        match signal {
            Signal::Rules => &mut self.rules,
            Signal::Appearance => &mut self.appearance,
        }
    }
}

/// Forwards state writes from a key-value store to the scheduler.
///
/// Undecodable values are logged and skipped. The task ends when either side
/// goes away.
pub fn forward_state_changes(
    mut changes: broadcast::Receiver<StorageChange>,
    handle: SchedulerHandle,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let change = match changes.recv().await {
                Ok(change) => change,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "storage notifications lagged");
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => break,
            };
            if change.key != STATE_KEY {
                continue;
            }
            match serde_json::from_value::<AppState>(change.value) {
                Ok(state) => {
                    if handle.send(BackgroundEvent::StateChanged(state)).is_err() {
                        break;
                    }
                }
                Err(error) => tracing::warn!(%error, "ignoring undecodable state change"),
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use openheaders_domain::{HeaderRule, Profile, TabInfo};
    use pretty_assertions::assert_eq;
    use tokio::sync::Semaphore;

    use super::*;
    use crate::ports::Appearance;

    /// Rule sink that can hold each update until the test releases it.
    #[derive(Clone)]
    struct GatedSink {
        gate: Option<Arc<Semaphore>>,
        entered: mpsc::UnboundedSender<()>,
        updates: Arc<Mutex<Vec<Vec<DeclarativeRule>>>>,
    }

    #[async_trait]
    impl RuleSink for GatedSink {
        async fn update_rules(
            &self,
            _remove_ids: &[u32],
            add: Vec<DeclarativeRule>,
        ) -> ApplicationResult<()> {
            let _ = self.entered.send(());
            if let Some(gate) = &self.gate {
                gate.acquire()
                    .await
                    .map_err(|e| ApplicationError::Browser(e.to_string()))?
                    .forget();
            }
            if let Ok(mut updates) = self.updates.lock() {
                updates.push(add);
            }
            Ok(())
        }

        async fn installed_rules(&self) -> ApplicationResult<Vec<DeclarativeRule>> {
            Ok(self
                .updates
                .lock()
                .ok()
                .and_then(|u| u.last().cloned())
                .unwrap_or_default())
        }
    }

    #[derive(Clone, Default)]
    struct CountingAppearance(Arc<AtomicUsize>);

    #[async_trait]
    impl AppearanceSink for CountingAppearance {
        async fn apply(&self, _appearance: &Appearance) -> ApplicationResult<()> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    fn state() -> AppState {
        let mut state = AppState {
            profiles: vec![Profile::new("Dev", "#00f", 0).with_header(HeaderRule::named("X-A", "1"))],
            ..AppState::default()
        };
        state.ensure_invariants(0);
        state
    }

    fn sink(gate: Option<Arc<Semaphore>>) -> (GatedSink, mpsc::UnboundedReceiver<()>) {
        let (entered, entered_rx) = mpsc::unbounded_channel();
        (
            GatedSink {
                gate,
                entered,
                updates: Arc::default(),
            },
            entered_rx,
        )
    }

    fn tab(id: i32) -> BackgroundEvent {
        BackgroundEvent::TabCreated(TabInfo::new(id, format!("https://site{id}.test/")))
    }

    #[test]
    fn coalescer_tracks_pending_and_in_flight() {
        let mut c = Coalescer::default();
        assert!(!c.begin());
        assert!(c.mark());
        assert!(c.begin());
        assert!(c.is_in_flight());
        assert!(!c.mark());
        assert!(c.take());
        assert!(!c.take());
        c.finish();
        assert!(!c.is_in_flight());
        assert!(!c.is_pending());
    }

    #[tokio::test]
    async fn burst_of_events_yields_one_rule_update() {
        let (sink, _entered) = sink(None);
        let updates = Arc::clone(&sink.updates);
        let context = BackgroundContext::new(state(), sink, CountingAppearance::default());
        let (scheduler, handle) = UpdateScheduler::new(context);

        for id in 1..=20 {
            assert!(handle.send(tab(id)).is_ok());
        }
        drop(handle);
        let context = scheduler.run().await;

        let updates = updates.lock().map(|u| u.clone()).unwrap_or_default();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0][0].condition.tab_ids, (1..=20).collect::<Vec<_>>());
        assert_eq!(context.tabs().len(), 20);
    }

    #[tokio::test]
    async fn events_during_update_trigger_exactly_one_more() {
        let gate = Arc::new(Semaphore::new(0));
        let (sink, mut entered) = sink(Some(Arc::clone(&gate)));
        let updates = Arc::clone(&sink.updates);
        let context = BackgroundContext::new(state(), sink, CountingAppearance::default());
        let (handle, task) = UpdateScheduler::spawn(context);

        assert!(handle.send(tab(1)).is_ok());
        assert!(entered.recv().await.is_some());

        for id in 2..=5 {
            assert!(handle.send(tab(id)).is_ok());
        }
        gate.add_permits(2);
        drop(handle);
        let context = task.await.ok();

        let updates = updates.lock().map(|u| u.clone()).unwrap_or_default();
        assert_eq!(updates.len(), 2);
        assert_eq!(updates[0][0].condition.tab_ids, vec![1]);
        assert_eq!(updates[1][0].condition.tab_ids, vec![1, 2, 3, 4, 5]);
        assert!(context.is_some_and(|c| c.tabs().len() == 5));
    }

    #[tokio::test]
    async fn activation_does_not_touch_rules() {
        let (sink, _entered) = sink(None);
        let updates = Arc::clone(&sink.updates);
        let appearance = CountingAppearance::default();
        let shown = Arc::clone(&appearance.0);
        let context = BackgroundContext::new(state(), sink, appearance);
        let (handle, task) = UpdateScheduler::spawn(context);

        assert!(handle.send(tab(1)).is_ok());
        assert!(handle.get_active_rules().await.is_ok());
        let before = updates.lock().map(|u| u.len()).unwrap_or_default();

        assert!(handle.send(BackgroundEvent::TabActivated(1)).is_ok());
        assert!(handle.get_active_rules().await.is_ok());
        drop(handle);
        let _ = task.await;

        assert_eq!(updates.lock().map(|u| u.len()).unwrap_or_default(), before);
        // Initial cleared badge, then the badge for the focused tab.
        assert_eq!(shown.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn get_active_rules_reflects_prior_events() {
        let (sink, _entered) = sink(None);
        let context = BackgroundContext::new(state(), sink, CountingAppearance::default());
        let (handle, task) = UpdateScheduler::spawn(context);

        assert!(handle.send(tab(4)).is_ok());
        let rules = handle.get_active_rules().await.unwrap_or_default();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].condition.tab_ids, vec![4]);

        drop(handle);
        let _ = task.await;
    }

    #[tokio::test]
    async fn stopped_scheduler_reports_error() {
        let (sink, _entered) = sink(None);
        let context = BackgroundContext::new(state(), sink, CountingAppearance::default());
        let (scheduler, handle) = UpdateScheduler::new(context);
        drop(scheduler);

        assert!(matches!(handle.send(tab(1)), Err(ApplicationError::SchedulerStopped)));
        assert!(matches!(
            handle.get_active_rules().await,
            Err(ApplicationError::SchedulerStopped)
        ));
    }

    #[tokio::test]
    async fn storage_changes_are_forwarded() {
        let (sink, _entered) = sink(None);
        let context = BackgroundContext::new(AppState::default(), sink, CountingAppearance::default());
        let (handle, task) = UpdateScheduler::spawn(context);
        let (changes, receiver) = broadcast::channel(8);
        let forwarder = forward_state_changes(receiver, handle.clone());

        let mut next = state();
        next.language_preference = "fr".to_string();
        let value = serde_json::to_value(&next).unwrap_or_default();
        assert!(changes.send(StorageChange { key: "other".to_string(), value: value.clone() }).is_ok());
        assert!(changes.send(StorageChange { key: STATE_KEY.to_string(), value }).is_ok());
        drop(changes);
        let _ = forwarder.await;

        let _ = handle.get_active_rules().await;
        drop(handle);
        let context = task.await.ok();
        assert!(context.is_some_and(|c| c.state().language_preference == "fr"));
    }
}
