use std::collections::HashMap;

use async_trait::async_trait;
use checklist_core::ChecklistDocument;
use tokio::sync::{mpsc, RwLock};

use super::provider::DocumentStore;
use crate::broadcaster::DocumentBroadcaster;
use crate::error::Result;
use crate::key::PartyKey;

/// In-process store; state is lost when the process exits
#[derive(Default)]
pub struct MemoryDocumentStore {
    documents: RwLock<HashMap<PartyKey, ChecklistDocument>>,
    broadcaster: DocumentBroadcaster,
}

impl MemoryDocumentStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DocumentStore for MemoryDocumentStore {
    async fn get(&self, key: &PartyKey) -> Result<Option<ChecklistDocument>> {
        Ok(self.documents.read().await.get(key).cloned())
    }

    async fn get_or_insert(
        &self,
        key: &PartyKey,
        default: &ChecklistDocument,
    ) -> Result<(ChecklistDocument, bool)> {
        let mut documents = self.documents.write().await;
        if let Some(existing) = documents.get(key) {
            return Ok((existing.clone(), false));
        }
        documents.insert(key.clone(), default.clone());

        tracing::debug!(party_id = %key, "MemoryStore: Document created from default");
        // Fan out under the write lock so watchers see writes in write order.
        self.broadcaster.broadcast(key, default).await;
        Ok((default.clone(), true))
    }

    async fn set(&self, key: &PartyKey, document: &ChecklistDocument) -> Result<()> {
        let mut documents = self.documents.write().await;
        documents.insert(key.clone(), document.clone());
        self.broadcaster.broadcast(key, document).await;
        Ok(())
    }

    async fn watch(&self, key: &PartyKey) -> mpsc::Receiver<ChecklistDocument> {
        self.broadcaster.subscribe(key).await
    }

    async fn list_keys(&self) -> Result<Vec<PartyKey>> {
        let mut keys: Vec<PartyKey> = self.documents.read().await.keys().cloned().collect();
        keys.sort();
        Ok(keys)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use checklist_core::{Section, Task, ToggleTarget};
    use std::sync::Arc;

    fn default_doc() -> ChecklistDocument {
        ChecklistDocument::new(vec![Section::new(
            "s",
            "S",
            "",
            vec![Task::new("t", "T")],
        )])
    }

    #[tokio::test]
    async fn test_get_or_insert_keeps_existing_state() {
        let store = MemoryDocumentStore::new();
        let key = PartyKey::new("p").unwrap();

        let (first, inserted) = store.get_or_insert(&key, &default_doc()).await.unwrap();
        assert!(inserted);
        assert_eq!(first, default_doc());

        let edited = default_doc().toggled(&ToggleTarget::task("s", "t"));
        store.set(&key, &edited).await.unwrap();

        let (second, inserted) = store.get_or_insert(&key, &default_doc()).await.unwrap();
        assert!(!inserted);
        assert_eq!(second, edited);
    }

    #[tokio::test]
    async fn test_set_notifies_watchers() {
        let store = MemoryDocumentStore::new();
        let key = PartyKey::new("p").unwrap();
        let mut rx = store.watch(&key).await;

        store.set(&key, &default_doc()).await.unwrap();
        assert_eq!(rx.recv().await.unwrap(), default_doc());
    }

    #[tokio::test]
    async fn test_list_keys() {
        let store = MemoryDocumentStore::new();
        assert!(store.list_keys().await.unwrap().is_empty());

        for name in ["b", "a"] {
            let key = PartyKey::new(name).unwrap();
            store.set(&key, &default_doc()).await.unwrap();
        }
        let keys: Vec<String> = store
            .list_keys()
            .await
            .unwrap()
            .into_iter()
            .map(String::from)
            .collect();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_watchers_end_on_the_stored_document() {
        let store = Arc::new(MemoryDocumentStore::new());
        let key = PartyKey::new("race").unwrap();

        for _ in 0..50 {
            let mut rx = store.watch(&key).await;
            let writers: Vec<_> = (0..8)
                .map(|i| {
                    let store = Arc::clone(&store);
                    let key = key.clone();
                    tokio::spawn(async move {
                        let document = ChecklistDocument::new(vec![Section::new(
                            format!("s{i}"),
                            "S",
                            "",
                            vec![],
                        )]);
                        store.set(&key, &document).await.unwrap();
                    })
                })
                .collect();
            for writer in writers {
                writer.await.unwrap();
            }

            let mut last = None;
            while let Ok(document) = rx.try_recv() {
                last = Some(document);
            }
            assert_eq!(last, store.get(&key).await.unwrap());
        }
    }
}
