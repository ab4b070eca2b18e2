//! Persistence layer for the session and metadata records
//!
//! A [`Store`] is a tiny key-value contract in the shape of browser local
//! storage: whole JSON records are written and read back by key. Reads never
//! fail; anything missing or unparsable reads as absent.

use crate::error::{Result, TrackerError};
use crate::logging::{LogContext, StructuredLogger, get_logger_with_context};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Key-value store holding whole JSON records
pub trait Store {
    /// Read a record; missing or malformed data is `None`
    fn get(&self, key: &str) -> Option<Value>;

    /// Replace the record under `key`
    fn set(&mut self, key: &str, value: &Value) -> Result<()>;

    /// Delete the record under `key`; removing a missing key is not an error
    fn remove(&mut self, key: &str) -> Result<()>;
}

/// Read a typed record; a record that does not decode reads as absent
pub fn load_record<T: DeserializeOwned, S: Store + ?Sized>(store: &S, key: &str) -> Option<T> {
    store
        .get(key)
        .and_then(|value| serde_json::from_value(value).ok())
}

/// Serialize and write a typed record
pub fn save_record<T: Serialize, S: Store + ?Sized>(store: &mut S, key: &str, record: &T) -> Result<()> {
    let value = serde_json::to_value(record)?;
    store.set(key, &value)
}

/// In-memory store keeping serialized JSON text per key
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Store raw text under a key without validating it
    pub fn insert_raw(&mut self, key: &str, text: &str) {
        self.entries.insert(key.to_string(), text.to_string());
    }

    /// Raw text stored under a key
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Whether anything is stored under a key
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Option<Value> {
        self.entries
            .get(key)
            .and_then(|text| serde_json::from_str(text).ok())
    }

    fn set(&mut self, key: &str, value: &Value) -> Result<()> {
        let text = serde_json::to_string(value)?;
        self.entries.insert(key.to_string(), text);
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// File-backed store writing one `<key>.json` file per record
pub struct FileStore {
    dir: PathBuf,
    logger: StructuredLogger,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir).map_err(|e| {
            TrackerError::storage(format!(
                "Failed to create store directory {}: {e}",
                dir.display()
            ))
        })?;
        let logger = get_logger_with_context(
            LogContext::new("store").with_field("dir", dir.display().to_string()),
        );
        logger.debug("Opened file store");
        Ok(Self { dir, logger })
    }

    /// Directory holding the record files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl Store for FileStore {
    fn get(&self, key: &str) -> Option<Value> {
        let path = self.path_for(key);
        let contents = std::fs::read_to_string(&path).ok()?;
        match serde_json::from_str(&contents) {
            Ok(value) => Some(value),
            Err(e) => {
                self.logger
                    .warn(&format!("Ignoring unreadable record '{key}': {e}"));
                None
            }
        }
    }

    fn set(&mut self, key: &str, value: &Value) -> Result<()> {
        let path = self.path_for(key);
        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        let contents = serde_json::to_string_pretty(value)?;
        std::fs::write(&tmp, contents)
            .and_then(|()| std::fs::rename(&tmp, &path))
            .map_err(|e| TrackerError::storage(format!("Failed to write '{key}': {e}")))?;
        self.logger.trace(&format!("Saved record '{key}'"));
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        match std::fs::remove_file(self.path_for(key)) {
            Ok(()) => {
                self.logger.trace(&format!("Removed record '{key}'"));
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(TrackerError::storage(format!(
                "Failed to remove '{key}': {e}"
            ))),
        }
    }
}
