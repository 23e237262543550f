use async_trait::async_trait;
use checklist_core::ChecklistDocument;
use tokio::sync::mpsc;

use crate::error::Result;
use crate::key::PartyKey;

/// Keyed document storage with change push.
///
/// Any backend that can get, set-if-absent, overwrite and notify satisfies
/// the sync layer. Writes are whole-document; the last one wins.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Current document, `None` when nothing was ever written under `key`
    async fn get(&self, key: &PartyKey) -> Result<Option<ChecklistDocument>>;

    /// Return the stored document, or store `default` when absent.
    ///
    /// The flag is `true` when `default` was written. Existing state always
    /// wins over the default; the two are never merged.
    async fn get_or_insert(
        &self,
        key: &PartyKey,
        default: &ChecklistDocument,
    ) -> Result<(ChecklistDocument, bool)>;

    /// Overwrite the document under `key` and notify watchers
    async fn set(&self, key: &PartyKey, document: &ChecklistDocument) -> Result<()>;

    /// Change feed for `key`. Yields each document written after the call;
    /// the current value is not replayed.
    async fn watch(&self, key: &PartyKey) -> mpsc::Receiver<ChecklistDocument>;

    /// Keys that currently hold a document
    async fn list_keys(&self) -> Result<Vec<PartyKey>>;
}
