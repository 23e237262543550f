//! # Party Sync
//!
//! Binds checklist documents to a shared store keyed by a party id.
//! Viewers of the same party receive every full-document write; the last
//! write wins.

pub mod adapter;
pub mod broadcaster;
pub mod error;
pub mod identity;
pub mod key;
pub mod session;
pub mod storage;
pub mod subscription;

// Re-exports
pub use adapter::SyncAdapter;
pub use broadcaster::DocumentBroadcaster;
pub use error::SyncError;
pub use identity::Identity;
pub use key::{new_key, resolve_key, share_url, PartyKey, DEFAULT_PARTY_KEY, PARTY_QUERY_PARAM};
pub use session::PartySession;
pub use storage::{DocumentStore, FileDocumentStore, MemoryDocumentStore};
pub use subscription::Subscription;
