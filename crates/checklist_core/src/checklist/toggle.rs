use serde::{Deserialize, Serialize};

use super::document::ChecklistDocument;

/// Path to one checkable node: a task, or a subtask of that task
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq, Hash)]
#[serde(rename_all = "camelCase")]
pub struct ToggleTarget {
    pub section_id: String,
    pub task_id: String,
    #[serde(default, alias = "subTaskId", skip_serializing_if = "Option::is_none")]
    pub subtask_id: Option<String>,
}

impl ToggleTarget {
    pub fn task(section_id: impl Into<String>, task_id: impl Into<String>) -> Self {
        Self {
            section_id: section_id.into(),
            task_id: task_id.into(),
            subtask_id: None,
        }
    }

    pub fn subtask(
        section_id: impl Into<String>,
        task_id: impl Into<String>,
        subtask_id: impl Into<String>,
    ) -> Self {
        Self {
            section_id: section_id.into(),
            task_id: task_id.into(),
            subtask_id: Some(subtask_id.into()),
        }
    }
}

/// Return a new document with the targeted node flipped.
///
/// Unknown ids leave the document unchanged.
pub fn toggle(document: &ChecklistDocument, target: &ToggleTarget) -> ChecklistDocument {
    document.toggled(target)
}
