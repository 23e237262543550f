//! checklist_core - Checklist model for planning a single event
//!
//! This crate provides the data model shared by the sync layer and the web service:
//! - `checklist` - Task, Section, ChecklistDocument, toggling and progress
//! - `template` - the checklist data asset a document is seeded from
//! - `error` - validation and loading errors

pub mod checklist;
pub mod error;
pub mod template;

// Re-export commonly used types
pub use checklist::{
    compute_progress, toggle, ChecklistDocument, Progress, Section, Task, ToggleTarget,
};
pub use error::{ChecklistError, Result};
pub use template::ChecklistTemplate;
