use std::path::{Path, PathBuf};

use async_trait::async_trait;
use checklist_core::ChecklistDocument;
use tokio::fs;
use tokio::sync::{mpsc, Mutex};

use super::provider::DocumentStore;
use crate::broadcaster::DocumentBroadcaster;
use crate::error::Result;
use crate::key::PartyKey;

/// One pretty-printed `<party>.json` per document under `base_dir`.
///
/// Writes go through a single lock so set-if-absent is atomic within the
/// process, and watchers are notified before the lock is released so they
/// observe writes in the order they hit disk. Watchers are process-local.
pub struct FileDocumentStore {
    base_dir: PathBuf,
    write_lock: Mutex<()>,
    broadcaster: DocumentBroadcaster,
}

impl FileDocumentStore {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
            broadcaster: DocumentBroadcaster::new(),
        }
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    fn document_path(&self, key: &PartyKey) -> PathBuf {
        self.base_dir.join(format!("{}.json", key))
    }

    async fn read(&self, key: &PartyKey) -> Result<Option<ChecklistDocument>> {
        let path = self.document_path(key);

        if !path.exists() {
            tracing::debug!(
                party_id = %key,
                path = %path.display(),
                "FileStore: Document file does not exist"
            );
            return Ok(None);
        }

        let content = fs::read_to_string(&path).await?;
        let document: ChecklistDocument = serde_json::from_str(&content)?;

        tracing::debug!(
            party_id = %key,
            path = %path.display(),
            section_count = document.sections.len(),
            "FileStore: Document loaded"
        );

        Ok(Some(document))
    }

    async fn write(&self, key: &PartyKey, document: &ChecklistDocument) -> Result<()> {
        if !self.base_dir.exists() {
            tracing::debug!(
                path = %self.base_dir.display(),
                "FileStore: Creating base directory"
            );
            fs::create_dir_all(&self.base_dir).await?;
        }

        let path = self.document_path(key);
        let tmp_path = path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(document)?;

        fs::write(&tmp_path, &content).await?;
        fs::rename(&tmp_path, &path).await?;

        tracing::info!(
            party_id = %key,
            path = %path.display(),
            json_size = content.len(),
            "FileStore: Document written"
        );

        Ok(())
    }
}

#[async_trait]
impl DocumentStore for FileDocumentStore {
    async fn get(&self, key: &PartyKey) -> Result<Option<ChecklistDocument>> {
        self.read(key).await
    }

    async fn get_or_insert(
        &self,
        key: &PartyKey,
        default: &ChecklistDocument,
    ) -> Result<(ChecklistDocument, bool)> {
        let _guard = self.write_lock.lock().await;
        if let Some(existing) = self.read(key).await? {
            return Ok((existing, false));
        }
        self.write(key, default).await?;
        self.broadcaster.broadcast(key, default).await;
        Ok((default.clone(), true))
    }

    async fn set(&self, key: &PartyKey, document: &ChecklistDocument) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.write(key, document).await?;
        self.broadcaster.broadcast(key, document).await;
        Ok(())
    }

    async fn watch(&self, key: &PartyKey) -> mpsc::Receiver<ChecklistDocument> {
        self.broadcaster.subscribe(key).await
    }

    async fn list_keys(&self) -> Result<Vec<PartyKey>> {
        let mut keys = Vec::new();
        if !self.base_dir.exists() {
            return Ok(keys);
        }

        let mut entries = fs::read_dir(&self.base_dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
                if let Ok(key) = PartyKey::new(stem) {
                    keys.push(key);
                }
            }
        }
        keys.sort();

        tracing::debug!(
            base_dir = %self.base_dir.display(),
            document_count = keys.len(),
            "FileStore: Documents found"
        );

        Ok(keys)
    }
}
