use serde::{Deserialize, Serialize};

use super::task::Task;

/// A named, time-boxed group of tasks
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    /// Unique across the document
    pub id: String,
    pub title: String,
    /// Display text such as "9 am–12 pm"
    pub timeframe: String,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Section {
    pub fn new(
        id: impl Into<String>,
        title: impl Into<String>,
        timeframe: impl Into<String>,
        tasks: Vec<Task>,
    ) -> Self {
        Self {
            id: id.into(),
            title: title.into(),
            timeframe: timeframe.into(),
            tasks,
        }
    }

    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub(crate) fn task_mut(&mut self, id: &str) -> Option<&mut Task> {
        self.tasks.iter_mut().find(|t| t.id == id)
    }
}
