//! Background writer the state store persists through.

use openheaders_application::{KeyValueStore, StatePersister};
use openheaders_domain::AppState;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use super::StateRepository;

/// Queues state snapshots for a single writer task.
///
/// Snapshots that pile up while a write is running are collapsed so only the
/// newest one is written. Dropping every writer handle lets the task finish
/// its last write and exit.
#[derive(Debug, Clone)]
pub struct QueuedStateWriter {
    sender: mpsc::UnboundedSender<AppState>,
}

impl QueuedStateWriter {
    /// Spawns the writer task on the current runtime.
    pub fn spawn<S: KeyValueStore + 'static>(repository: StateRepository<S>) -> (Self, JoinHandle<()>) {
        let (sender, mut receiver) = mpsc::unbounded_channel::<AppState>();
        let task = tokio::spawn(async move {
            while let Some(mut state) = receiver.recv().await {
                let mut collapsed = 0_usize;
                while let Ok(newer) = receiver.try_recv() {
                    state = newer;
                    collapsed += 1;
                }
                match repository.save(&state).await {
                    Ok(()) => tracing::debug!(collapsed, "state persisted"),
                    Err(error) => tracing::warn!(%error, "failed to persist state"),
                }
            }
        });
        (Self { sender }, task)
    }
}

impl StatePersister for QueuedStateWriter {
    fn persist(&self, state: &AppState) {
        if self.sender.send(state.clone()).is_err() {
            tracing::warn!("state writer has stopped; change not persisted");
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::persistence::MemoryKeyValueStore;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn newest_snapshot_is_written() {
        let store = Arc::new(MemoryKeyValueStore::new());
        let repository = StateRepository::new(Arc::clone(&store));
        let (writer, task) = QueuedStateWriter::spawn(repository.clone());

        for language in ["en", "de", "fr"] {
            writer.persist(&AppState {
                language_preference: language.to_string(),
                ..AppState::default()
            });
        }
        drop(writer);
        task.await.expect("writer task should finish");

        let loaded = repository.load().await.expect("state should be stored");
        assert_eq!(loaded.language_preference, "fr");
    }
}
