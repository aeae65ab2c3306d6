use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::{DEFAULT_API_BASE_URL, NOTIFICATION_TTL_MS};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

/// Names under which the session is persisted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageKeys {
    pub token: String,
    pub username: String,
    pub role: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            token: "jwtToken".to_string(),
            username: "username".to_string(),
            role: "role".to_string(),
        }
    }
}

/// Durable backend for the credential store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Keyring,
    File,
    Memory,
}

impl std::str::FromStr for StorageBackend {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "keyring" => Ok(StorageBackend::Keyring),
            "file" => Ok(StorageBackend::File),
            "memory" => Ok(StorageBackend::Memory),
            other => Err(ConfigError::Invalid {
                field: "storage",
                reason: format!("unknown backend '{}'", other),
            }),
        }
    }
}

/// Client configuration, resolved from defaults, an optional JSON file and the environment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub api_base_url: String,
    pub storage_keys: StorageKeys,
    pub notification_ttl_ms: u64,
    pub storage: StorageBackend,
    pub storage_path: PathBuf,
    pub keyring_service: String,
    pub request_timeout_secs: Option<u64>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            storage_keys: StorageKeys::default(),
            notification_ttl_ms: NOTIFICATION_TTL_MS,
            storage: StorageBackend::Keyring,
            storage_path: PathBuf::from("session.json"),
            keyring_service: "urban-client".to_string(),
            request_timeout_secs: None,
        }
    }
}

impl ClientConfig {
    /// Load configuration: defaults, then the file (if any), then environment overrides
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply_env(|name| std::env::var(name).ok())?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let data = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&data).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply `URBAN_*` overrides read through `lookup`
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("URBAN_API_BASE_URL") {
            self.api_base_url = url;
        }
        if let Some(backend) = lookup("URBAN_STORAGE") {
            self.storage = backend.parse()?;
        }
        if let Some(path) = lookup("URBAN_STORAGE_PATH") {
            self.storage_path = PathBuf::from(path);
        }
        if let Some(timeout) = lookup("URBAN_REQUEST_TIMEOUT_SECS") {
            let secs = timeout.trim().parse::<u64>().map_err(|e| ConfigError::Invalid {
                field: "request_timeout_secs",
                reason: e.to_string(),
            })?;
            self.request_timeout_secs = Some(secs);
        }
        Ok(())
    }

    /// Check the base URL and normalize it to have no trailing slash
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        let trimmed = self.api_base_url.trim().trim_end_matches('/').to_string();
        let url = reqwest::Url::parse(&trimmed).map_err(|e| ConfigError::Invalid {
            field: "api_base_url",
            reason: e.to_string(),
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::Invalid {
                field: "api_base_url",
                reason: format!("unsupported scheme '{}'", url.scheme()),
            });
        }
        self.api_base_url = trimmed;

        let keys = &self.storage_keys;
        if keys.token.is_empty() || keys.username.is_empty() || keys.role.is_empty() {
            return Err(ConfigError::Invalid {
                field: "storage_keys",
                reason: "storage key names must not be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn notification_ttl(&self) -> Duration {
        Duration::from_millis(self.notification_ttl_ms)
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }
}
