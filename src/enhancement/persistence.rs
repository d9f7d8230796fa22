use super::ledger::Ledger;
use super::types::{LEDGER_BACKUP_KEY, LEDGER_STORAGE_KEY};
use crate::error::StoreError;
use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::PathBuf;

/// String key-value storage the simulator persists through.
pub trait KeyValueStore: Send {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError>;
    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError>;
}

/// Default storage directory (~/.armory).
pub fn default_store_dir() -> Result<PathBuf, StoreError> {
    let home_dir = dirs::home_dir().ok_or(StoreError::NoHomeDir)?;
    Ok(home_dir.join(".armory"))
}

/// One `<key>.json` file per key inside a directory.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    dir: PathBuf,
}

impl JsonFileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Store rooted at [`default_store_dir`].
    pub fn in_home() -> Result<Self, StoreError> {
        Ok(Self::new(default_store_dir()?))
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStore for JsonFileStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(json) => Ok(Some(json)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), value)?;
        Ok(())
    }
}

/// In-memory store for tests and throwaway sessions.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    values: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn read(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values.get(key).cloned())
    }

    fn write(&mut self, key: &str, value: &str) -> Result<(), StoreError> {
        self.values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// Restore the ledger, falling back to an empty one when nothing usable is
/// stored. An unreadable ledger is copied to [`LEDGER_BACKUP_KEY`] first, since
/// the next save overwrites it.
pub fn load_ledger(store: &mut dyn KeyValueStore) -> Ledger {
    match store.read(LEDGER_STORAGE_KEY) {
        Ok(Some(json)) => match serde_json::from_str(&json) {
            Ok(ledger) => ledger,
            Err(e) => {
                tracing::warn!("stored ledger is unreadable, starting fresh: {}", e);
                match store.write(LEDGER_BACKUP_KEY, &json) {
                    Ok(()) => tracing::warn!("previous ledger kept under {}", LEDGER_BACKUP_KEY),
                    Err(e) => tracing::warn!("failed to back up unreadable ledger: {}", e),
                }
                Ledger::default()
            }
        },
        Ok(None) => Ledger::default(),
        Err(e) => {
            tracing::warn!("failed to read ledger: {}", e);
            Ledger::default()
        }
    }
}

pub fn save_ledger(store: &mut dyn KeyValueStore, ledger: &Ledger) -> Result<(), StoreError> {
    let json = serde_json::to_string_pretty(ledger)?;
    store.write(LEDGER_STORAGE_KEY, &json)
}
