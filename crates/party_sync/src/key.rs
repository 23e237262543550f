//! Party ids: the key a shared document is stored under

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use url::Url;
use uuid::Uuid;

use crate::error::SyncError;

/// Query parameter carrying the party id in page addresses
pub const PARTY_QUERY_PARAM: &str = "party";

/// Party used when the address names none
pub const DEFAULT_PARTY_KEY: &str = "main-party";

const KEY_PREFIX: &str = "party-";
const MAX_KEY_LEN: usize = 64;

/// Validated party id.
///
/// Keys name files in the file store, so only `[A-Za-z0-9_-]` is allowed.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PartyKey(String);

impl PartyKey {
    pub fn new(value: impl Into<String>) -> Result<Self, SyncError> {
        let value = value.into();
        if value.is_empty() || value.len() > MAX_KEY_LEN {
            return Err(SyncError::InvalidKey(value));
        }
        if !value
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
        {
            return Err(SyncError::InvalidKey(value));
        }
        Ok(Self(value))
    }

    /// The built-in default party
    pub fn default_party() -> Self {
        Self(DEFAULT_PARTY_KEY.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PartyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for PartyKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl FromStr for PartyKey {
    type Err = SyncError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for PartyKey {
    type Error = SyncError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PartyKey> for String {
    fn from(key: PartyKey) -> Self {
        key.0
    }
}

/// Pick the party a viewer is bound to.
///
/// `requested` is the value read from the page address, if any. Missing or
/// blank values use `fallback`; invalid ones are logged and use `fallback`.
pub fn resolve_key(requested: Option<&str>, fallback: &PartyKey) -> PartyKey {
    match requested.map(str::trim).filter(|s| !s.is_empty()) {
        Some(raw) => match PartyKey::new(raw) {
            Ok(key) => key,
            Err(e) => {
                tracing::warn!(requested = raw, error = %e, "Ignoring invalid party id");
                fallback.clone()
            }
        },
        None => fallback.clone(),
    }
}

/// Fresh key for a new independent party.
///
/// Time-derived prefix plus random suffix; unique for interactive use.
pub fn new_key() -> PartyKey {
    let millis = chrono::Utc::now().timestamp_millis().max(0) as u64;
    let suffix = Uuid::new_v4().simple().to_string();
    PartyKey(format!("{KEY_PREFIX}{}-{}", to_base36(millis), &suffix[..8]))
}

/// Link that opens `key` from `base`, replacing any existing party parameter
pub fn share_url(base: &Url, key: &PartyKey) -> Url {
    let mut url = base.clone();
    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(name, _)| name != PARTY_QUERY_PARAM)
        .map(|(name, value)| (name.into_owned(), value.into_owned()))
        .collect();
    url.query_pairs_mut()
        .clear()
        .extend_pairs(kept)
        .append_pair(PARTY_QUERY_PARAM, key.as_str());
    url
}

fn to_base36(mut value: u64) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    if value == 0 {
        return "0".to_string();
    }
    let mut digits = Vec::new();
    while value > 0 {
        digits.push(char::from(DIGITS[(value % 36) as usize]));
        value /= 36;
    }
    digits.iter().rev().collect()
}
