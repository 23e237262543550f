use checklist_core::{ChecklistDocument, Progress};
use party_sync::PartyKey;
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProgressDTO {
    pub completed: usize,
    pub total: usize,
    pub percent: u8,
}

impl From<Progress> for ProgressDTO {
    fn from(progress: Progress) -> Self {
        Self {
            completed: progress.completed,
            total: progress.total,
            percent: progress.percent(),
        }
    }
}

/// A party's document together with its derived progress
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct PartySnapshotDTO {
    pub party_id: String,
    pub document: ChecklistDocument,
    pub progress: ProgressDTO,
}

impl PartySnapshotDTO {
    pub fn new(key: &PartyKey, document: ChecklistDocument) -> Self {
        let progress = document.progress().into();
        Self {
            party_id: key.to_string(),
            document,
            progress,
        }
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct ToggleResponseDTO {
    #[serde(flatten)]
    pub snapshot: PartySnapshotDTO,
    /// False when the target named no node and nothing was written
    pub changed: bool,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct NewPartyDTO {
    pub party_id: String,
    pub share_url: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
pub struct SessionDTO {
    pub session_id: String,
}
