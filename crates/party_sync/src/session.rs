//! Viewer-side checklist session
//!
//! Mirrors how a single viewer uses a party: toggles apply to the local
//! document first and are then pushed to the store in the background;
//! documents written by anyone replace the local copy when they arrive,
//! unless this viewer still has writes of its own on the way to the store.
//! Store and identity failures are logged and the session keeps working
//! locally.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};

use checklist_core::{ChecklistDocument, Progress, ToggleTarget};
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::adapter::SyncAdapter;
use crate::error::Result;
use crate::identity::Identity;
use crate::key::{self, PartyKey};
use crate::storage::DocumentStore;
use crate::subscription::Subscription;

pub struct PartySession {
    key: PartyKey,
    local: Arc<watch::Sender<ChecklistDocument>>,
    adapter: Option<SyncAdapter>,
    live: Option<LiveSync>,
}

/// Subscription plus the ordered background publisher for one party
struct LiveSync {
    _subscription: Subscription,
    pending: Arc<Mutex<PendingWrites>>,
    outbox: mpsc::UnboundedSender<(u64, ChecklistDocument)>,
    publisher: JoinHandle<()>,
}

/// Snapshots this session has queued for the store but not yet seen echoed
/// back, oldest first.
///
/// The store notifies every write in write order, so while anything is
/// pending an inbound document is either an echo of one of our own older
/// snapshots or a remote write that our queued writes will overwrite. In
/// both cases the local document is already ahead and must not be replaced.
#[derive(Debug, Default)]
struct PendingWrites {
    next_seq: u64,
    queue: VecDeque<(u64, ChecklistDocument)>,
}

impl PendingWrites {
    fn push(&mut self, document: ChecklistDocument) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push_back((seq, document));
        seq
    }

    /// Record an inbound document; returns whether it may replace local state
    fn acknowledge(&mut self, document: &ChecklistDocument) -> bool {
        if let Some(pos) = self.queue.iter().position(|(_, queued)| queued == document) {
            self.queue.drain(..=pos);
        }
        self.queue.is_empty()
    }

    /// Drop a snapshot whose write failed; it will never be echoed
    fn forget(&mut self, seq: u64) {
        self.queue.retain(|(queued, _)| *queued != seq);
    }
}

fn lock(pending: &Mutex<PendingWrites>) -> MutexGuard<'_, PendingWrites> {
    pending.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

impl PartySession {
    /// Session that never syncs
    pub fn local(key: PartyKey, document: ChecklistDocument) -> Self {
        let (local, _) = watch::channel(document);
        Self {
            key,
            local: Arc::new(local),
            adapter: None,
            live: None,
        }
    }

    /// Start a session once identity establishment has finished.
    ///
    /// A failed identity leaves the session local-only.
    pub async fn start(
        store: Arc<dyn DocumentStore>,
        identity: Result<Identity>,
        key: PartyKey,
        default: &ChecklistDocument,
    ) -> Self {
        match identity {
            Ok(identity) => Self::connect(SyncAdapter::new(store, identity), key, default).await,
            Err(e) => {
                tracing::error!(party_id = %key, error = %e, "Identity unavailable, sync disabled");
                Self::local(key, default.clone())
            }
        }
    }

    /// Bind to `key`: ensure the document exists, then follow it live
    pub async fn connect(adapter: SyncAdapter, key: PartyKey, default: &ChecklistDocument) -> Self {
        let mut session = Self::local(key, default.clone());
        session.adapter = Some(adapter);
        session.attach(default).await;
        session
    }

    async fn attach(&mut self, default: &ChecklistDocument) {
        let Some(adapter) = self.adapter.clone() else {
            return;
        };

        match adapter.ensure_document(&self.key, default).await {
            Ok(document) => {
                self.local.send_replace(document);
            }
            Err(e) => {
                tracing::error!(party_id = %self.key, error = %e, "Failed to load party document");
                return;
            }
        }

        let pending = Arc::new(Mutex::new(PendingWrites::default()));

        let local = Arc::clone(&self.local);
        let inbound = Arc::clone(&pending);
        let subscription = match adapter
            .subscribe(&self.key, move |document| {
                let mut pending = lock(&inbound);
                if pending.acknowledge(&document) {
                    local.send_replace(document);
                }
            })
            .await
        {
            Ok(subscription) => subscription,
            Err(e) => {
                tracing::error!(party_id = %self.key, error = %e, "Failed to subscribe to party");
                return;
            }
        };

        let (outbox, mut queued) = mpsc::unbounded_channel::<(u64, ChecklistDocument)>();
        let key = self.key.clone();
        let written = Arc::clone(&pending);
        let publisher = tokio::spawn(async move {
            while let Some((seq, document)) = queued.recv().await {
                if let Err(e) = adapter.publish(&key, &document).await {
                    tracing::error!(party_id = %key, error = %e, "Failed to publish toggle");
                    lock(&written).forget(seq);
                }
            }
        });

        self.live = Some(LiveSync {
            _subscription: subscription,
            pending,
            outbox,
            publisher,
        });
    }

    pub fn key(&self) -> &PartyKey {
        &self.key
    }

    /// Whether local changes are currently being pushed to the store
    pub fn is_synced(&self) -> bool {
        self.live.is_some()
    }

    pub fn document(&self) -> ChecklistDocument {
        self.local.borrow().clone()
    }

    pub fn progress(&self) -> Progress {
        self.local.borrow().progress()
    }

    /// Receiver that observes every local replacement, for re-rendering
    pub fn changes(&self) -> watch::Receiver<ChecklistDocument> {
        self.local.subscribe()
    }

    /// Flip one node locally and queue the full document for publishing.
    ///
    /// Returns `false` for ids that do not resolve; nothing is published then.
    pub fn toggle(&self, target: &ToggleTarget) -> bool {
        let Some(live) = &self.live else {
            return self.toggle_local(target);
        };

        // Held across the local flip so an inbound document cannot land
        // between the change and its registration as pending.
        let mut pending = lock(&live.pending);
        if !self.toggle_local(target) {
            return false;
        }

        let snapshot = self.local.borrow().clone();
        let seq = pending.push(snapshot.clone());
        if live.outbox.send((seq, snapshot)).is_err() {
            pending.forget(seq);
            tracing::error!(party_id = %self.key, "Publisher stopped, toggle kept locally");
        }
        true
    }

    fn toggle_local(&self, target: &ToggleTarget) -> bool {
        let changed = self.local.send_if_modified(|document| document.toggle(target));
        if !changed {
            tracing::debug!(party_id = %self.key, ?target, "Toggle target not found");
        }
        changed
    }

    /// Rebind to another party. Pending publishes for the old party still
    /// complete in the background.
    pub async fn switch_party(&mut self, key: PartyKey, default: &ChecklistDocument) {
        self.live = None;
        self.key = key;
        self.local.send_replace(default.clone());
        self.attach(default).await;
    }

    /// "New party": generate a fresh key and switch to it
    pub async fn start_new_party(&mut self, default: &ChecklistDocument) -> PartyKey {
        let key = key::new_key();
        self.switch_party(key.clone(), default).await;
        key
    }

    /// Stop following the party and wait for queued publishes to finish
    pub async fn shutdown(mut self) {
        if let Some(live) = self.live.take() {
            let LiveSync {
                _subscription,
                outbox,
                publisher,
                ..
            } = live;
            drop(_subscription);
            drop(outbox);
            if let Err(e) = publisher.await {
                tracing::error!(party_id = %self.key, error = %e, "Publisher task failed");
            }
        }
    }
}
