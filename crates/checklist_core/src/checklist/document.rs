//! ChecklistDocument - the unit of storage and replication

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use super::progress::Progress;
use super::section::Section;
use super::task::Task;
use super::toggle::ToggleTarget;
use crate::error::{ChecklistError, Result};

/// The whole replicated state: an ordered list of sections
#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq, Eq)]
pub struct ChecklistDocument {
    #[serde(default)]
    pub sections: Vec<Section>,
}

impl ChecklistDocument {
    pub fn new(sections: Vec<Section>) -> Self {
        Self { sections }
    }

    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn task(&self, section_id: &str, task_id: &str) -> Option<&Task> {
        self.section(section_id).and_then(|s| s.task(task_id))
    }

    /// Resolve the node a toggle target points at
    pub fn node(&self, target: &ToggleTarget) -> Option<&Task> {
        let task = self.task(&target.section_id, &target.task_id)?;
        match &target.subtask_id {
            Some(subtask_id) => task.sub_task(subtask_id),
            None => Some(task),
        }
    }

    /// Flip the completion flag of exactly the targeted node.
    ///
    /// Returns `false` and leaves the document untouched when the target
    /// does not resolve.
    pub fn toggle(&mut self, target: &ToggleTarget) -> bool {
        let Some(section) = self.sections.iter_mut().find(|s| s.id == target.section_id) else {
            return false;
        };
        let Some(task) = section.task_mut(&target.task_id) else {
            return false;
        };
        let node = match &target.subtask_id {
            Some(subtask_id) => match task.sub_task_mut(subtask_id) {
                Some(sub) => sub,
                None => return false,
            },
            None => task,
        };
        node.toggle();
        true
    }

    /// Copy of the document with the targeted node flipped
    pub fn toggled(&self, target: &ToggleTarget) -> Self {
        let mut next = self.clone();
        next.toggle(target);
        next
    }

    pub fn progress(&self) -> Progress {
        self.sections
            .iter()
            .flat_map(|s| s.tasks.iter())
            .fold(Progress::default(), |acc, task| Progress {
                completed: acc.completed + task.completed_count(),
                total: acc.total + task.node_count(),
            })
    }

    /// Check id uniqueness rules: sections across the document, tasks within
    /// a section, subtasks within a task.
    pub fn validate(&self) -> Result<()> {
        let mut section_ids = HashSet::new();
        for section in &self.sections {
            if section.id.is_empty() {
                return Err(ChecklistError::EmptyId(format!(
                    "section '{}'",
                    section.title
                )));
            }
            if !section_ids.insert(section.id.as_str()) {
                return Err(ChecklistError::DuplicateSection(section.id.clone()));
            }

            let mut task_ids = HashSet::new();
            for task in &section.tasks {
                if task.id.is_empty() {
                    return Err(ChecklistError::EmptyId(format!(
                        "task in section '{}'",
                        section.id
                    )));
                }
                if !task_ids.insert(task.id.as_str()) {
                    return Err(ChecklistError::DuplicateTask {
                        section_id: section.id.clone(),
                        task_id: task.id.clone(),
                    });
                }

                let mut subtask_ids = HashSet::new();
                for sub in task.sub_tasks() {
                    if sub.id.is_empty() {
                        return Err(ChecklistError::EmptyId(format!(
                            "subtask of '{}' in section '{}'",
                            task.id, section.id
                        )));
                    }
                    if !subtask_ids.insert(sub.id.as_str()) {
                        return Err(ChecklistError::DuplicateSubtask {
                            section_id: section.id.clone(),
                            task_id: task.id.clone(),
                            subtask_id: sub.id.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }
}
