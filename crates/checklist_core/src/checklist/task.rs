//! Task - a checkable item, optionally owning subtasks

use serde::{Deserialize, Serialize};

/// A checklist item.
///
/// Subtasks use the same type. Only one level of nesting is produced by
/// templates, and toggling only reaches that first level.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    /// Unique within the owning section (or owning task, for subtasks)
    pub id: String,

    /// Human-readable description
    pub text: String,

    /// Completion flag
    #[serde(default)]
    pub is_completed: bool,

    /// Optional scheduled time, display only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,

    /// Ordered subtasks, absent for plain tasks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sub_tasks: Option<Vec<Task>>,
}

impl Task {
    /// Create an incomplete task without time or subtasks
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            is_completed: false,
            time: None,
            sub_tasks: None,
        }
    }

    pub fn with_time(mut self, time: impl Into<String>) -> Self {
        self.time = Some(time.into());
        self
    }

    pub fn with_sub_tasks(mut self, sub_tasks: Vec<Task>) -> Self {
        self.sub_tasks = Some(sub_tasks);
        self
    }

    pub fn completed(mut self) -> Self {
        self.is_completed = true;
        self
    }

    /// Subtasks as a slice, empty when the task has none
    pub fn sub_tasks(&self) -> &[Task] {
        self.sub_tasks.as_deref().unwrap_or_default()
    }

    pub fn sub_task(&self, id: &str) -> Option<&Task> {
        self.sub_tasks().iter().find(|t| t.id == id)
    }

    pub(crate) fn sub_task_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.sub_tasks
            .as_mut()
            .and_then(|subs| subs.iter_mut().find(|t| t.id == id))
    }

    /// Flip the completion flag
    pub fn toggle(&mut self) {
        self.is_completed = !self.is_completed;
    }

    /// Nodes counted for progress: the task itself plus each subtask
    pub fn node_count(&self) -> usize {
        1 + self.sub_tasks().len()
    }

    pub fn completed_count(&self) -> usize {
        usize::from(self.is_completed)
            + self.sub_tasks().iter().filter(|t| t.is_completed).count()
    }
}
