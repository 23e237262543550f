//! Configuration management for the checklist service
//!
//! Built-in defaults, then an optional TOML file, then environment variables.
//! The standalone binary applies command-line flags on top.
//!
//! Environment variables:
//! - `PARTY_BIND`: listen address (default: 127.0.0.1)
//! - `PARTY_PORT`: listen port (default: 8080)
//! - `PARTY_STORAGE`: `file` or `memory` (default: file)
//! - `PARTY_DATA_DIR`: directory for the file store (default: ~/.party-checklist/parties)
//! - `PARTY_TEMPLATE`: checklist template file, JSON or TOML (default: built-in)
//! - `PARTY_DEFAULT_KEY`: party used when the address names none (default: main-party)
//! - `PARTY_PUBLIC_URL`: base URL used in share links (default: http://<bind>:<port>/)

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;

use checklist_core::ChecklistTemplate;
use party_sync::{DocumentStore, FileDocumentStore, MemoryDocumentStore, PartyKey, DEFAULT_PARTY_KEY};
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};

pub const CONFIG_FILE_NAME: &str = "party-checklist.toml";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Memory,
    #[default]
    File,
}

impl FromStr for StorageBackend {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "file" => Ok(StorageBackend::File),
            other => Err(AppError::Config(format!("unknown storage backend '{other}'"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub bind: String,
    pub port: u16,
    pub storage: StorageBackend,
    pub data_dir: PathBuf,
    pub template_path: Option<PathBuf>,
    pub default_party: String,
    pub public_url: Option<String>,
}

/// Root for everything the service writes (~/.party-checklist)
pub fn data_root() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(".party-checklist")
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 8080,
            storage: StorageBackend::File,
            data_dir: data_root().join("parties"),
            template_path: None,
            default_party: DEFAULT_PARTY_KEY.to_string(),
            public_url: None,
        }
    }
}

impl ServiceConfig {
    /// Load configuration.
    ///
    /// An explicit `path` must exist; otherwise `party-checklist.toml` in the
    /// working directory is used when present.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None if Path::new(CONFIG_FILE_NAME).exists() => {
                Self::from_file(Path::new(CONFIG_FILE_NAME))?
            }
            None => Self::default(),
        };
        config.apply_overrides(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| AppError::Config(format!("failed to read {}: {e}", path.display())))?;
        toml::from_str(&content)
            .map_err(|e| AppError::Config(format!("failed to parse {}: {e}", path.display())))
    }

    /// Apply `PARTY_*` overrides read through `lookup`
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(bind) = lookup("PARTY_BIND") {
            self.bind = bind;
        }
        if let Some(port) = lookup("PARTY_PORT") {
            self.port = port
                .trim()
                .parse()
                .map_err(|e| AppError::Config(format!("invalid PARTY_PORT '{port}': {e}")))?;
        }
        if let Some(storage) = lookup("PARTY_STORAGE") {
            self.storage = storage.parse()?;
        }
        if let Some(dir) = lookup("PARTY_DATA_DIR") {
            self.data_dir = PathBuf::from(dir);
        }
        if let Some(template) = lookup("PARTY_TEMPLATE") {
            self.template_path = Some(PathBuf::from(template));
        }
        if let Some(key) = lookup("PARTY_DEFAULT_KEY") {
            self.default_party = key;
        }
        if let Some(url) = lookup("PARTY_PUBLIC_URL") {
            self.public_url = Some(url);
        }
        Ok(())
    }

    pub fn default_party_key(&self) -> Result<PartyKey> {
        Ok(PartyKey::new(self.default_party.as_str())?)
    }

    /// Base URL that share links are built from
    pub fn public_base_url(&self) -> Result<Url> {
        let raw = match &self.public_url {
            Some(url) => url.clone(),
            None => format!("http://{}:{}/", self.bind, self.port),
        };
        Url::parse(&raw).map_err(|e| AppError::Config(format!("invalid public url '{raw}': {e}")))
    }

    pub fn load_template(&self) -> Result<ChecklistTemplate> {
        Ok(ChecklistTemplate::load_or_builtin(self.template_path.as_deref())?)
    }

    pub fn build_store(&self) -> Arc<dyn DocumentStore> {
        match self.storage {
            StorageBackend::Memory => Arc::new(MemoryDocumentStore::new()),
            StorageBackend::File => Arc::new(FileDocumentStore::new(&self.data_dir)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults_are_usable() {
        let config = ServiceConfig::default();
        assert_eq!(config.port, 8080);
        assert_eq!(config.storage, StorageBackend::File);
        assert_eq!(config.default_party_key().unwrap().as_str(), "main-party");
        assert_eq!(
            config.public_base_url().unwrap().as_str(),
            "http://127.0.0.1:8080/"
        );
        assert_eq!(config.load_template().unwrap().sections.len(), 5);
    }

    #[test]
    fn test_env_overrides() {
        let env: HashMap<&str, &str> = [
            ("PARTY_PORT", "9090"),
            ("PARTY_STORAGE", "Memory"),
            ("PARTY_DEFAULT_KEY", "bday"),
            ("PARTY_PUBLIC_URL", "https://party.example.com/"),
        ]
        .into_iter()
        .collect();

        let mut config = ServiceConfig::default();
        config
            .apply_overrides(|name| env.get(name).map(|v| v.to_string()))
            .unwrap();

        assert_eq!(config.port, 9090);
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.default_party, "bday");
        assert_eq!(
            config.public_base_url().unwrap().as_str(),
            "https://party.example.com/"
        );
    }

    #[test]
    fn test_bad_overrides_are_errors() {
        let mut config = ServiceConfig::default();
        assert!(config
            .apply_overrides(|name| (name == "PARTY_PORT").then(|| "eighty".to_string()))
            .is_err());
        assert!(config
            .apply_overrides(|name| (name == "PARTY_STORAGE").then(|| "redis".to_string()))
            .is_err());
    }

    #[test]
    fn test_partial_toml_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("party.toml");
        std::fs::write(&path, "port = 3000\nstorage = \"memory\"\n").unwrap();

        let config = ServiceConfig::from_file(&path).unwrap();
        assert_eq!(config.port, 3000);
        assert_eq!(config.storage, StorageBackend::Memory);
        assert_eq!(config.bind, "127.0.0.1");
        assert_eq!(config.default_party, DEFAULT_PARTY_KEY);
    }

    #[test]
    fn test_invalid_default_party() {
        let config = ServiceConfig {
            default_party: "no spaces".to_string(),
            ..ServiceConfig::default()
        };
        assert!(matches!(
            config.default_party_key(),
            Err(AppError::InvalidPartyId(_))
        ));
    }
}
