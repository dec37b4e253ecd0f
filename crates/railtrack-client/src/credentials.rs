//! # Credential Store
//!
//! Durable holder for the single session token.
//!
//! ## File Format
//! ```json
//! { "token": "eyJhbGciOi..." }
//! ```
//!
//! Stored as `credentials.json` in the platform data directory unless
//! `[storage] credentials_path` points elsewhere. A missing file, an empty
//! token and an explicit `null` all read as "no token".

use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::ClientConfig;
use crate::error::{ClientError, ClientResult};

const CREDENTIALS_FILE_NAME: &str = "credentials.json";

/// Persistence for the session token.
pub trait CredentialStore: Send + Sync {
    /// Reads the stored token, if any.
    fn load(&self) -> ClientResult<Option<String>>;

    /// Replaces the stored token.
    fn save(&self, token: &str) -> ClientResult<()>;

    /// Removes the stored token. Clearing an empty store succeeds.
    fn clear(&self) -> ClientResult<()>;
}

#[derive(Debug, Serialize, Deserialize)]
struct CredentialFile {
    #[serde(default)]
    token: Option<String>,
}

// =============================================================================
// File Store
// =============================================================================

/// Token persisted as a small JSON file.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        FileCredentialStore { path: path.into() }
    }

    /// Uses the configured path, falling back to the platform data directory.
    pub fn from_config(config: &ClientConfig) -> ClientResult<Self> {
        let path = match &config.storage.credentials_path {
            Some(path) => path.clone(),
            None => Self::default_path().ok_or_else(|| {
                ClientError::Storage("No data directory available for credentials".into())
            })?,
        };
        Ok(Self::new(path))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn default_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("org", "railtrack", "railtrack")
            .map(|dirs| dirs.data_dir().join(CREDENTIALS_FILE_NAME))
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> ClientResult<Option<String>> {
        if !self.path.exists() {
            debug!(path = ?self.path, "No credential file");
            return Ok(None);
        }

        let contents = std::fs::read_to_string(&self.path)?;
        let file: CredentialFile = serde_json::from_str(&contents)?;
        Ok(file.token.filter(|t| !t.is_empty()))
    }

    fn save(&self, token: &str) -> ClientResult<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = serde_json::to_string(&CredentialFile {
            token: Some(token.to_string()),
        })?;
        std::fs::write(&self.path, contents)?;

        info!(path = ?self.path, "Session token stored");
        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = ?self.path, "Session token removed");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

// =============================================================================
// Memory Store
// =============================================================================

/// Token kept in memory only. Used by tests and ephemeral sessions.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    token: RwLock<Option<String>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with `token` already stored.
    pub fn with_token(token: impl Into<String>) -> Self {
        MemoryCredentialStore {
            token: RwLock::new(Some(token.into())),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> ClientResult<Option<String>> {
        self.token
            .read()
            .map(|t| t.clone().filter(|t| !t.is_empty()))
            .map_err(|_| ClientError::Storage("credential lock poisoned".into()))
    }

    fn save(&self, token: &str) -> ClientResult<()> {
        let mut slot = self
            .token
            .write()
            .map_err(|_| ClientError::Storage("credential lock poisoned".into()))?;
        *slot = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> ClientResult<()> {
        let mut slot = self
            .token
            .write()
            .map_err(|_| ClientError::Storage("credential lock poisoned".into()))?;
        *slot = None;
        Ok(())
    }
}
