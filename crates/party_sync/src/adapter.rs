//! Bridge between a checklist and the shared store
//!
//! All side effects of syncing live here; the checklist model never touches
//! storage. The identity is handed in explicitly rather than looked up.

use std::sync::Arc;

use checklist_core::ChecklistDocument;
use tokio::sync::mpsc;

use crate::error::Result;
use crate::identity::Identity;
use crate::key::{self, PartyKey};
use crate::storage::DocumentStore;
use crate::subscription::Subscription;

#[derive(Clone)]
pub struct SyncAdapter {
    store: Arc<dyn DocumentStore>,
    identity: Identity,
}

impl SyncAdapter {
    pub fn new(store: Arc<dyn DocumentStore>, identity: Identity) -> Self {
        Self { store, identity }
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Read the party's document, creating it from `default` when absent.
    ///
    /// Stored state is returned as-is; it is never merged with `default`.
    pub async fn ensure_document(
        &self,
        key: &PartyKey,
        default: &ChecklistDocument,
    ) -> Result<ChecklistDocument> {
        let (document, inserted) = self.store.get_or_insert(key, default).await?;

        tracing::info!(
            party_id = %key,
            session_id = %self.identity.session_id,
            created = inserted,
            "Party document ensured"
        );

        Ok(document)
    }

    /// Current value (if any) plus the change feed, registered before the
    /// read so no write between the two is missed.
    pub async fn watch(
        &self,
        key: &PartyKey,
    ) -> Result<(Option<ChecklistDocument>, mpsc::Receiver<ChecklistDocument>)> {
        let changes = self.store.watch(key).await;
        let current = self.store.get(key).await?;
        Ok((current, changes))
    }

    /// Call `on_change` with the current document (when one exists) and then
    /// with every document written under `key` until the returned handle is
    /// cancelled or dropped.
    pub async fn subscribe<F>(&self, key: &PartyKey, on_change: F) -> Result<Subscription>
    where
        F: FnMut(ChecklistDocument) + Send + 'static,
    {
        let (current, changes) = self.watch(key).await?;

        tracing::debug!(
            party_id = %key,
            session_id = %self.identity.session_id,
            exists = current.is_some(),
            "Subscribed to party document"
        );

        Ok(Subscription::spawn(key.clone(), current, changes, on_change))
    }

    /// Overwrite the party's document with `document` in full
    pub async fn publish(&self, key: &PartyKey, document: &ChecklistDocument) -> Result<()> {
        self.store.set(key, document).await?;

        tracing::debug!(
            party_id = %key,
            session_id = %self.identity.session_id,
            "Party document published"
        );

        Ok(())
    }

    pub fn new_key(&self) -> PartyKey {
        key::new_key()
    }
}
