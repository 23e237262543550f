//! Anonymous per-session identity
//!
//! Identity only gates when sync starts. It is never written into a
//! document and edits are not attributed to it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{Result, SyncError};

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
pub struct Identity {
    pub session_id: Uuid,
    pub established_at: DateTime<Utc>,
}

impl Identity {
    /// Establish a fresh anonymous identity
    pub fn anonymous() -> Self {
        Self {
            session_id: Uuid::new_v4(),
            established_at: Utc::now(),
        }
    }

    /// Resume an identity from a session token previously handed out
    pub fn from_token(token: &str) -> Result<Self> {
        let session_id = Uuid::parse_str(token.trim())
            .map_err(|e| SyncError::Identity(format!("malformed session token: {e}")))?;
        Ok(Self {
            session_id,
            established_at: Utc::now(),
        })
    }

    pub fn token(&self) -> String {
        self.session_id.to_string()
    }
}
