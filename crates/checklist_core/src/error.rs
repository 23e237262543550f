//! Checklist error types

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ChecklistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Unsupported template format: {0}")]
    UnsupportedFormat(String),

    #[error("Empty id in {0}")]
    EmptyId(String),

    #[error("Duplicate section id '{0}'")]
    DuplicateSection(String),

    #[error("Duplicate task id '{task_id}' in section '{section_id}'")]
    DuplicateTask { section_id: String, task_id: String },

    #[error("Duplicate subtask id '{subtask_id}' under task '{task_id}' in section '{section_id}'")]
    DuplicateSubtask {
        section_id: String,
        task_id: String,
        subtask_id: String,
    },
}

pub type Result<T> = std::result::Result<T, ChecklistError>;
