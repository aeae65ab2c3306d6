use log::warn;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::modules::config::StorageKeys;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("corrupt session file: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("keyring error: {0}")]
    Keyring(String),
}

/// Durable string key-value storage backing the session
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
    fn remove(&self, key: &str) -> Result<(), StoreError>;
}

/// Process-local storage, lost on exit
#[derive(Default)]
pub struct MemoryStore {
    values: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        self.values.lock().remove(key);
        Ok(())
    }
}

/// JSON file holding a flat string map.
///
/// The file is re-read on every access so that several processes sharing it
/// observe each other's writes; concurrent writers are not coordinated and
/// the last one wins.
pub struct FileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<HashMap<String, String>, StoreError> {
        match std::fs::read_to_string(&self.path) {
            Ok(data) if data.trim().is_empty() => Ok(HashMap::new()),
            Ok(data) => Ok(serde_json::from_str(&data)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(HashMap::new()),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, values: &HashMap<String, String>) -> Result<(), StoreError> {
        let dir = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;
        let data = serde_json::to_string_pretty(values)?;

        // Readers see either the old file or the new one, never a partial write
        let mut staged = NamedTempFile::new_in(dir)?;
        staged.write_all(data.as_bytes())?;
        staged.as_file().sync_all()?;
        staged.persist(&self.path).map_err(|e| e.error)?;
        Ok(())
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let _guard = self.lock.lock();
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock();
        let mut values = self.load()?;
        values.insert(key.to_string(), value.to_string());
        self.save(&values)
    }

    fn remove(&self, key: &str) -> Result<(), StoreError> {
        let _guard = self.lock.lock();
        let mut values = self.load()?;
        if values.remove(key).is_some() {
            self.save(&values)?;
        }
        Ok(())
    }
}

/// Persists the session (token, username, role) under the configured key names
pub struct CredentialStore {
    backend: Box<dyn KeyValueStore>,
    keys: StorageKeys,
}

impl CredentialStore {
    pub fn new(backend: Box<dyn KeyValueStore>, keys: StorageKeys) -> Self {
        Self { backend, keys }
    }

    pub fn keys(&self) -> &StorageKeys {
        &self.keys
    }

    /// Persist a session. The role is cleared when `role` is `None`.
    pub fn save(&self, token: &str, username: &str, role: Option<&str>) -> Result<(), StoreError> {
        self.backend.set(&self.keys.token, token)?;
        self.backend.set(&self.keys.username, username)?;
        match role {
            Some(role) => self.save_role(role),
            None => self.clear_role(),
        }
    }

    pub fn save_role(&self, role: &str) -> Result<(), StoreError> {
        self.backend.set(&self.keys.role, role)
    }

    pub fn clear_role(&self) -> Result<(), StoreError> {
        self.backend.remove(&self.keys.role)
    }

    /// Remove all three values, attempting every key even if one fails
    pub fn clear(&self) -> Result<(), StoreError> {
        let mut first_error = None;
        for key in [&self.keys.token, &self.keys.username, &self.keys.role] {
            if let Err(e) = self.backend.remove(key) {
                warn!("Failed to clear stored '{}': {}", key, e);
                first_error.get_or_insert(e);
            }
        }
        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    pub fn get_token(&self) -> Option<String> {
        self.read(&self.keys.token)
    }

    pub fn get_username(&self) -> Option<String> {
        self.read(&self.keys.username)
    }

    pub fn get_role(&self) -> Option<String> {
        self.read(&self.keys.role)
    }

    // Unreadable storage is treated as an absent value
    fn read(&self, key: &str) -> Option<String> {
        match self.backend.get(key) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to read stored '{}': {}", key, e);
                None
            }
        }
    }
}
