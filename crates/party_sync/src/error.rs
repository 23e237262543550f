//! Sync error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SyncError {
    #[error("Invalid party id: {0}")]
    InvalidKey(String),

    #[error("Identity error: {0}")]
    Identity(String),

    #[error("Storage error: {0}")]
    StorageError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Invalid document: {0}")]
    InvalidDocument(#[from] checklist_core::ChecklistError),
}

pub type Result<T> = std::result::Result<T, SyncError>;
