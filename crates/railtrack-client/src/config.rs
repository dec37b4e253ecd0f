//! # Client Configuration
//!
//! Where the inventory API lives, how many rows a page shows, and where the
//! credential file is kept.
//!
//! ## Configuration Sources
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Configuration Priority                               │
//! │                                                                         │
//! │  1. Environment Variables (highest priority)                           │
//! │     RAILTRACK_API_URL=https://inventory.example.org/api                │
//! │     RAILTRACK_PAGE_SIZE=25                                             │
//! │     RAILTRACK_CREDENTIALS_PATH=/tmp/railtrack/credentials.json         │
//! │     RAILTRACK_REQUEST_TIMEOUT_SECS=30                                  │
//! │                                                                         │
//! │  2. TOML Config File                                                   │
//! │     ~/.config/railtrack/client.toml (Linux)                            │
//! │     ~/Library/Application Support/org.railtrack.railtrack/client.toml  │
//! │                                                                         │
//! │  3. Default Values (lowest priority)                                   │
//! │     http://localhost:8000/api, 10 rows, no timeout                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Configuration File Format
//! ```toml
//! # client.toml
//! [api]
//! base_url = "http://localhost:8000/api"
//! request_timeout_secs = 30   # omit for no timeout
//!
//! [table]
//! page_size = 10
//!
//! [storage]
//! credentials_path = "/var/lib/railtrack/credentials.json"   # optional
//! ```

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::error::{ClientError, ClientResult};

const CONFIG_FILE_NAME: &str = "client.toml";

// =============================================================================
// API Settings
// =============================================================================

/// Inventory API connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiSettings {
    /// Base URL every endpoint path is appended to.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Per-request timeout (seconds). `None` waits indefinitely.
    #[serde(default)]
    pub request_timeout_secs: Option<u64>,
}

fn default_base_url() -> String {
    "http://localhost:8000/api".to_string()
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            base_url: default_base_url(),
            request_timeout_secs: None,
        }
    }
}

// =============================================================================
// Table Settings
// =============================================================================

/// Inventory table presentation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableSettings {
    /// Rows per page.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
}

fn default_page_size() -> usize {
    railtrack_core::DEFAULT_PAGE_SIZE
}

impl Default for TableSettings {
    fn default() -> Self {
        TableSettings {
            page_size: default_page_size(),
        }
    }
}

// =============================================================================
// Storage Settings
// =============================================================================

/// Local persistence settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageSettings {
    /// Credential file location. Defaults to the platform data directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials_path: Option<PathBuf>,
}

// =============================================================================
// Main Client Configuration
// =============================================================================

/// Complete client configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    #[serde(default)]
    pub api: ApiSettings,

    #[serde(default)]
    pub table: TableSettings,

    #[serde(default)]
    pub storage: StorageSettings,
}

impl ClientConfig {
    /// Loads configuration from file, environment, and defaults.
    ///
    /// ## Load Order (later overrides earlier)
    /// 1. Default values
    /// 2. Config file (client.toml)
    /// 3. Environment variables
    pub fn load(config_path: Option<PathBuf>) -> ClientResult<Self> {
        let mut config = Self::default();

        if let Some(path) = config_path.or_else(Self::default_config_path) {
            if path.exists() {
                info!(?path, "Loading client config from file");
                let contents = std::fs::read_to_string(&path)
                    .map_err(|e| ClientError::Config(format!("{}: {}", path.display(), e)))?;
                config = toml::from_str(&contents)?;
            } else {
                debug!(?path, "Config file not found, using defaults");
            }
        }

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// Loads config or returns default if load fails.
    pub fn load_or_default(config_path: Option<PathBuf>) -> Self {
        Self::load(config_path).unwrap_or_else(|e| {
            warn!("Failed to load client config: {}. Using defaults.", e);
            Self::default()
        })
    }

    /// Saves configuration to file.
    pub fn save(&self, config_path: Option<PathBuf>) -> ClientResult<()> {
        let path = config_path
            .or_else(Self::default_config_path)
            .ok_or_else(|| ClientError::Config("No config path available".into()))?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| ClientError::Config(format!("{}: {}", parent.display(), e)))?;
        }

        let contents = toml::to_string_pretty(self)?;
        std::fs::write(&path, contents)
            .map_err(|e| ClientError::Config(format!("{}: {}", path.display(), e)))?;

        info!(?path, "Client config saved");
        Ok(())
    }

    /// Validates the configuration.
    pub fn validate(&self) -> ClientResult<()> {
        let url = url::Url::parse(&self.api.base_url)?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ClientError::InvalidUrl(format!(
                "API URL must start with http:// or https://, got: {}",
                self.api.base_url
            )));
        }

        if self.table.page_size == 0 {
            return Err(ClientError::Config(
                "page_size must be greater than 0".into(),
            ));
        }

        if self.api.request_timeout_secs == Some(0) {
            return Err(ClientError::Config(
                "request_timeout_secs must be greater than 0 when set".into(),
            ));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var("RAILTRACK_API_URL") {
            debug!(url = %url, "Overriding API URL from environment");
            self.api.base_url = url;
        }

        if let Ok(size) = std::env::var("RAILTRACK_PAGE_SIZE") {
            match size.parse::<usize>() {
                Ok(n) => self.table.page_size = n,
                Err(_) => warn!(value = %size, "Ignoring non-numeric RAILTRACK_PAGE_SIZE"),
            }
        }

        if let Ok(path) = std::env::var("RAILTRACK_CREDENTIALS_PATH") {
            debug!(path = %path, "Overriding credentials path from environment");
            self.storage.credentials_path = Some(PathBuf::from(path));
        }

        if let Ok(secs) = std::env::var("RAILTRACK_REQUEST_TIMEOUT_SECS") {
            match secs.parse::<u64>() {
                Ok(n) => self.api.request_timeout_secs = Some(n),
                Err(_) => warn!(value = %secs, "Ignoring non-numeric RAILTRACK_REQUEST_TIMEOUT_SECS"),
            }
        }
    }

    fn default_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("org", "railtrack", "railtrack")
            .map(|dirs| dirs.config_dir().join(CONFIG_FILE_NAME))
    }

    // =========================================================================
    // Convenience Methods
    // =========================================================================

    pub fn base_url(&self) -> &str {
        &self.api.base_url
    }

    pub fn page_size(&self) -> usize {
        self.table.page_size
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.api.request_timeout_secs.map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url(), "http://localhost:8000/api");
        assert_eq!(config.page_size(), 10);
        assert_eq!(config.request_timeout(), None);
        assert!(config.storage.credentials_path.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_validation() {
        let mut config = ClientConfig::default();

        config.api.base_url = "ws://localhost:8000/api".into();
        assert!(matches!(config.validate(), Err(ClientError::InvalidUrl(_))));

        config.api.base_url = "not a url".into();
        assert!(config.validate().is_err());

        config.api.base_url = "https://inventory.example.org/api".into();
        assert!(config.validate().is_ok());

        config.table.page_size = 0;
        assert!(matches!(config.validate(), Err(ClientError::Config(_))));

        config.table.page_size = 25;
        config.api.request_timeout_secs = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: ClientConfig = toml::from_str(
            r#"
            [table]
            page_size = 25
            "#,
        )
        .unwrap();

        assert_eq!(config.page_size(), 25);
        assert_eq!(config.base_url(), "http://localhost:8000/api");
    }

    #[test]
    fn test_save_then_load_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("client.toml");

        let mut config = ClientConfig::default();
        config.api.request_timeout_secs = Some(15);
        config.storage.credentials_path = Some(dir.path().join("credentials.json"));
        config.save(Some(path.clone())).unwrap();

        let contents = std::fs::read_to_string(&path).unwrap();
        assert!(contents.contains("[api]"));
        assert!(contents.contains("[table]"));

        let loaded: ClientConfig = toml::from_str(&contents).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_malformed_file_falls_back_to_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("client.toml");
        std::fs::write(&path, "[table\npage_size = ").unwrap();

        assert!(matches!(
            ClientConfig::load(Some(path.clone())),
            Err(ClientError::Config(_))
        ));
        assert_eq!(
            ClientConfig::load_or_default(Some(path)).page_size(),
            ClientConfig::default().page_size()
        );
    }
}
