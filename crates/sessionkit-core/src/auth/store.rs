//! Persistent slot holding at most one bearer credential.
//!
//! No validation happens here. Writers are assumed to be serialized by the
//! caller; concurrent `set` calls are last-write-wins.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use keyring::Entry;
use thiserror::Error;
use tracing::debug;

use crate::config::{Config, APP_NAME};

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Keychain error: {0}")]
    Keyring(#[from] keyring::Error),

    #[error("Token file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Token store unavailable: {0}")]
    Unavailable(String),
}

/// Storage backend for the single credential slot.
pub trait TokenStore: Send + Sync {
    fn get(&self) -> Result<Option<String>, StoreError>;
    fn set(&self, token: &str) -> Result<(), StoreError>;
    fn clear(&self) -> Result<(), StoreError>;
}

/// In-process slot. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryTokenStore {
    slot: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_token(token: impl Into<String>) -> Self {
        Self {
            slot: Mutex::new(Some(token.into())),
        }
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Option<String>>, StoreError> {
        self.slot
            .lock()
            .map_err(|_| StoreError::Unavailable("memory slot poisoned".to_string()))
    }
}

impl TokenStore for MemoryTokenStore {
    fn get(&self) -> Result<Option<String>, StoreError> {
        Ok(self.lock()?.clone())
    }

    fn set(&self, token: &str) -> Result<(), StoreError> {
        *self.lock()? = Some(token.to_string());
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        *self.lock()? = None;
        Ok(())
    }
}

/// Slot in the OS keychain, keyed by service name and slot name.
pub struct KeyringTokenStore {
    entry: Entry,
}

impl KeyringTokenStore {
    pub fn new(service: &str, slot: &str) -> Result<Self, StoreError> {
        debug!(service = service, slot = slot, "Opening keychain token slot");
        let entry = Entry::new(service, slot)?;
        Ok(Self { entry })
    }

    /// Keychain slot under the application service name
    pub fn from_config(config: &Config) -> Result<Self, StoreError> {
        Self::new(APP_NAME, &config.token_slot)
    }
}

impl TokenStore for KeyringTokenStore {
    fn get(&self) -> Result<Option<String>, StoreError> {
        match self.entry.get_password() {
            Ok(token) => Ok(Some(token)),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, token: &str) -> Result<(), StoreError> {
        self.entry.set_password(token)?;
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        match self.entry.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// Slot persisted as a plain file named after the slot.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(dir: impl AsRef<Path>, slot: &str) -> Self {
        Self {
            path: dir.as_ref().join(slot),
        }
    }

    /// File slot in the platform data directory
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Ok(Self::new(Config::data_dir()?, &config.token_slot))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn get(&self) -> Result<Option<String>, StoreError> {
        if !self.path.exists() {
            return Ok(None);
        }
        let contents = std::fs::read_to_string(&self.path)?;
        let token = contents.trim();
        if token.is_empty() {
            Ok(None)
        } else {
            Ok(Some(token.to_string()))
        }
    }

    fn set(&self, token: &str) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut options = OpenOptions::new();
        options.write(true).create(true).truncate(true);
        #[cfg(unix)]
        {
            use std::os::unix::fs::OpenOptionsExt;
            options.mode(0o600);
        }
        let mut file = options.open(&self.path)?;
        // The mode above only applies when the file is created
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            file.set_permissions(std::fs::Permissions::from_mode(0o600))?;
        }
        file.write_all(token.as_bytes())?;
        debug!(path = %self.path.display(), "Token written");
        Ok(())
    }

    fn clear(&self) -> Result<(), StoreError> {
        if self.path.exists() {
            std::fs::remove_file(&self.path)?;
        }
        Ok(())
    }
}
