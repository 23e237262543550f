//! Completion progress over all task and subtask nodes

use std::fmt;

use serde::{Deserialize, Serialize};

use super::document::ChecklistDocument;

/// Completed vs. total nodes.
///
/// A task with subtasks contributes one node for itself plus one per subtask.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
}

impl Progress {
    /// Percentage in `[0, 100]`, rounded half up; `0` for an empty document
    pub fn percent(&self) -> u8 {
        if self.total == 0 {
            return 0;
        }
        let completed = self.completed.min(self.total);
        // round(100 * c / t) == floor((200 * c + t) / (2 * t))
        ((200 * completed + self.total) / (2 * self.total)) as u8
    }

    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.completed >= self.total
    }
}

impl fmt::Display for Progress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}% Complete", self.percent())
    }
}

/// Integer completion percentage of a document
pub fn compute_progress(document: &ChecklistDocument) -> u8 {
    document.progress().percent()
}
