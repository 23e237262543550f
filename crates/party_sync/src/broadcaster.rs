use std::collections::HashMap;
use std::sync::Arc;

use checklist_core::ChecklistDocument;
use tokio::sync::{mpsc, RwLock};

use crate::key::PartyKey;

const CHANNEL_CAPACITY: usize = 32;

/// Fans every stored document out to the watchers of its party.
///
/// Watchers that have gone away or fallen a full channel behind are dropped
/// on the next broadcast.
#[derive(Clone, Default)]
pub struct DocumentBroadcaster {
    /// Map of party id -> list of watcher senders
    watchers: Arc<RwLock<HashMap<PartyKey, Vec<mpsc::Sender<ChecklistDocument>>>>>,
}

impl DocumentBroadcaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a watcher for `key`
    pub async fn subscribe(&self, key: &PartyKey) -> mpsc::Receiver<ChecklistDocument> {
        let (tx, rx) = mpsc::channel(CHANNEL_CAPACITY);

        let mut watchers = self.watchers.write().await;
        let senders = watchers.entry(key.clone()).or_default();
        senders.push(tx);

        tracing::debug!(
            party_id = %key,
            watcher_count = senders.len(),
            "Document watcher added"
        );

        rx
    }

    /// Deliver `document` to every live watcher of `key`
    pub async fn broadcast(&self, key: &PartyKey, document: &ChecklistDocument) {
        let mut watchers = self.watchers.write().await;

        if let Some(senders) = watchers.get_mut(key) {
            senders.retain(|sender| sender.try_send(document.clone()).is_ok());

            tracing::debug!(
                party_id = %key,
                active_watchers = senders.len(),
                "Document broadcast to watchers"
            );

            if senders.is_empty() {
                watchers.remove(key);
            }
        }
    }

    #[cfg(test)]
    async fn watcher_count(&self, key: &PartyKey) -> usize {
        let watchers = self.watchers.read().await;
        watchers
            .get(key)
            .map(|senders| senders.iter().filter(|s| !s.is_closed()).count())
            .unwrap_or(0)
    }
}
