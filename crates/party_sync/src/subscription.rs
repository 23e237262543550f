use checklist_core::ChecklistDocument;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::key::PartyKey;

/// Live delivery of a party's document to a callback.
///
/// Cancelling (or dropping) stops delivery and releases the underlying
/// change feed. There is no in-flight work to abort.
pub struct Subscription {
    key: PartyKey,
    token: CancellationToken,
    task: JoinHandle<()>,
}

impl Subscription {
    pub(crate) fn spawn<F>(
        key: PartyKey,
        initial: Option<ChecklistDocument>,
        mut changes: mpsc::Receiver<ChecklistDocument>,
        mut on_change: F,
    ) -> Self
    where
        F: FnMut(ChecklistDocument) + Send + 'static,
    {
        let token = CancellationToken::new();
        let task_token = token.clone();
        let party_id = key.to_string();

        let task = tokio::spawn(async move {
            if let Some(document) = initial {
                on_change(document);
            }

            loop {
                tokio::select! {
                    biased;
                    _ = task_token.cancelled() => break,
                    change = changes.recv() => match change {
                        Some(document) => on_change(document),
                        None => break,
                    },
                }
            }

            tracing::debug!(party_id = %party_id, "Subscription closed");
        });

        Self { key, token, task }
    }

    pub fn key(&self) -> &PartyKey {
        &self.key
    }

    /// Stop delivery
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }

    /// Whether the delivery task has exited
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.token.cancel();
    }
}
