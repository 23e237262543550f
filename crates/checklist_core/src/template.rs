//! Checklist templates
//!
//! The checklist tree is a data asset rather than code. A template carries
//! the page title and footer plus the sections a new document starts with.
//! The built-in template is the party prep checklist; any JSON or TOML file
//! with the same shape can replace it.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::checklist::{ChecklistDocument, Section};
use crate::error::{ChecklistError, Result};

const BUILTIN_TEMPLATE: &str = include_str!("../assets/default_checklist.json");

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct ChecklistTemplate {
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub footer: Option<String>,
    #[serde(default)]
    pub sections: Vec<Section>,
}

impl ChecklistTemplate {
    /// The embedded party prep checklist
    pub fn builtin() -> Result<Self> {
        Self::from_json(BUILTIN_TEMPLATE)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let template: Self = serde_json::from_str(content)?;
        template.document().validate()?;
        Ok(template)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let template: Self = toml::from_str(content)?;
        template.document().validate()?;
        Ok(template)
    }

    /// Load a template file, picking the parser from the extension
    pub fn load(path: &Path) -> Result<Self> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        log::debug!("Loading checklist template from {}", path.display());
        let content = std::fs::read_to_string(path)?;
        let template = match extension.as_str() {
            "json" => Self::from_json(&content)?,
            "toml" => Self::from_toml(&content)?,
            other => return Err(ChecklistError::UnsupportedFormat(other.to_string())),
        };

        log::debug!(
            "Loaded template '{}' with {} sections",
            template.title,
            template.sections.len()
        );
        Ok(template)
    }

    /// Load from `path` when given, otherwise use the built-in template
    pub fn load_or_builtin(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Self::builtin(),
        }
    }

    /// The document a new party starts with
    pub fn document(&self) -> ChecklistDocument {
        ChecklistDocument::new(self.sections.clone())
    }
}
