//! Checklist tree and the two operations on it
//!
//! A document is a fixed tree: sections own tasks, tasks may own subtasks.
//! Nothing here adds or removes nodes; only completion flags change.

mod document;
mod progress;
mod section;
mod task;
mod toggle;

pub use document::ChecklistDocument;
pub use progress::{compute_progress, Progress};
pub use section::Section;
pub use task::Task;
pub use toggle::{toggle, ToggleTarget};
