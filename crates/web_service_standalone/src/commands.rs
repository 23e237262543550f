//! Local maintenance commands
//!
//! These act on the file store directly, so they work whether or not the
//! service is running. A running service picks the changes up on its next read.

use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context};
use checklist_core::{ChecklistDocument, ChecklistTemplate, ToggleTarget};
use party_sync::{
    new_key, share_url, DocumentStore, FileDocumentStore, Identity, PartyKey, PartySession,
    SyncAdapter,
};
use web_service::ServiceConfig;

pub fn new_party(config: &ServiceConfig) -> anyhow::Result<()> {
    let key = new_key();
    let url = share_url(&config.public_base_url()?, &key);
    println!("{key}");
    println!("{url}");
    Ok(())
}

pub async fn show(config: &ServiceConfig, party: &str) -> anyhow::Result<()> {
    let key = PartyKey::new(party)?;
    let template = config.load_template()?;
    let store: Arc<dyn DocumentStore> = Arc::new(FileDocumentStore::new(&config.data_dir));

    let document = SyncAdapter::new(store, Identity::anonymous())
        .ensure_document(&key, &template.document())
        .await?;

    print!("{}", format_checklist(&template.title, &key, &document));
    Ok(())
}

pub async fn toggle(
    config: &ServiceConfig,
    party: &str,
    section: String,
    task: String,
    subtask: Option<String>,
) -> anyhow::Result<()> {
    let key = PartyKey::new(party)?;
    let target = ToggleTarget {
        section_id: section,
        task_id: task,
        subtask_id: subtask,
    };
    let (document, changed) = toggle_in_store(config, key.clone(), &target).await?;
    if !changed {
        tracing::warn!(
            party_id = %key,
            section_id = %target.section_id,
            task_id = %target.task_id,
            subtask_id = ?target.subtask_id,
            "No such task, checklist left unchanged"
        );
    }
    println!("{key}: {}", document.progress());
    Ok(())
}

/// Toggle through a viewer session and wait for the write to land.
///
/// Unknown ids leave the document untouched and report `false`.
async fn toggle_in_store(
    config: &ServiceConfig,
    key: PartyKey,
    target: &ToggleTarget,
) -> anyhow::Result<(ChecklistDocument, bool)> {
    let template = config.load_template()?;
    let store: Arc<dyn DocumentStore> = Arc::new(FileDocumentStore::new(&config.data_dir));

    let session = PartySession::start(
        Arc::clone(&store),
        Ok(Identity::anonymous()),
        key.clone(),
        &template.document(),
    )
    .await;
    if !session.is_synced() {
        bail!("party store at {} is unavailable", config.data_dir.display());
    }

    let changed = session.toggle(target);
    session.shutdown().await;

    let document = store
        .get(&key)
        .await?
        .with_context(|| format!("party '{key}' vanished after toggle"))?;
    Ok((document, changed))
}

pub fn validate(path: &Path) -> anyhow::Result<()> {
    let template = ChecklistTemplate::load(path)
        .with_context(|| format!("invalid template {}", path.display()))?;
    let document = template.document();
    println!(
        "{}: {} sections, {} checkable items",
        template.title,
        document.sections.len(),
        document.progress().total
    );
    Ok(())
}

fn mark(done: bool) -> &'static str {
    if done {
        "[x]"
    } else {
        "[ ]"
    }
}

pub fn format_checklist(title: &str, key: &PartyKey, document: &ChecklistDocument) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{title} ({key})");
    let _ = writeln!(out, "{}", document.progress());

    for section in &document.sections {
        let _ = writeln!(out, "\n{} ({})", section.title, section.timeframe);
        for task in &section.tasks {
            let time = task
                .time
                .as_deref()
                .map(|t| format!("{t} "))
                .unwrap_or_default();
            let _ = writeln!(
                out,
                "  {} {time}{} [{}/{}]",
                mark(task.is_completed),
                task.text,
                section.id,
                task.id
            );
            for sub in task.sub_tasks() {
                let _ = writeln!(out, "      {} {} [{}]", mark(sub.is_completed), sub.text, sub.id);
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn config_in(dir: &Path) -> ServiceConfig {
        ServiceConfig {
            data_dir: dir.to_path_buf(),
            ..ServiceConfig::default()
        }
    }

    #[tokio::test]
    async fn test_toggle_persists_to_file_store() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        let key = PartyKey::new("cli-party").unwrap();

        let (document, changed) =
            toggle_in_store(&config, key.clone(), &ToggleTarget::task("morning", "task1"))
                .await
                .unwrap();
        assert!(changed);
        assert_eq!(document.progress().percent(), 4);

        let reopened = FileDocumentStore::new(dir.path())
            .get(&key)
            .await
            .unwrap()
            .unwrap();
        assert!(reopened.task("morning", "task1").unwrap().is_completed);
    }

    #[tokio::test]
    async fn test_toggle_unknown_target_is_noop() {
        let dir = tempdir().unwrap();
        let config = config_in(dir.path());
        let key = PartyKey::new("cli-party").unwrap();

        let (document, changed) =
            toggle_in_store(&config, key, &ToggleTarget::task("morning", "missing"))
                .await
                .unwrap();
        assert!(!changed);
        assert_eq!(document, ChecklistTemplate::builtin().unwrap().document());
    }

    #[test]
    fn test_format_checklist() {
        let template = ChecklistTemplate::builtin().unwrap();
        let document = template
            .document()
            .toggled(&ToggleTarget::subtask("morning", "task4", "sub1"));
        let text = format_checklist(&template.title, &PartyKey::default_party(), &document);

        assert!(text.starts_with("Party Prep Checklist (main-party)\n4% Complete\n"));
        assert!(text.contains("[morning/task4]"));
        assert_eq!(text.matches("[x]").count(), 1);
        assert_eq!(text.matches("[ ]").count(), 23);
    }

    #[test]
    fn test_validate_rejects_unknown_format() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("template.yaml");
        std::fs::write(&path, "title: nope").unwrap();
        assert!(validate(&path).is_err());
    }
}
