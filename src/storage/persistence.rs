//! File-backed settings store

use super::SettingsStore;
use crate::core::{OptionValue, Result, SettingsError};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tempfile::NamedTempFile;

// ============================================================================
// On-disk format
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum StoreFormat {
    #[default]
    Json,
    /// Compact binary encoding
    MessagePack,
}

impl StoreFormat {
    /// Pick a format from the file extension (`.msgpack`/`.mp` → MessagePack, anything else → JSON)
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some("msgpack") | Some("mp") => StoreFormat::MessagePack,
            _ => StoreFormat::Json,
        }
    }

    fn encode(&self, options: &BTreeMap<String, OptionValue>) -> Result<Vec<u8>> {
        match self {
            StoreFormat::Json => serde_json::to_vec_pretty(options).map_err(SettingsError::from),
            StoreFormat::MessagePack => rmp_serde::to_vec_named(options).map_err(|e| {
                SettingsError::Serialization(format!("Failed to encode settings: {}", e))
            }),
        }
    }

    fn decode(&self, data: &[u8]) -> Result<BTreeMap<String, OptionValue>> {
        match self {
            StoreFormat::Json => serde_json::from_slice(data).map_err(SettingsError::from),
            StoreFormat::MessagePack => rmp_serde::from_slice(data).map_err(|e| {
                SettingsError::Serialization(format!("Failed to decode settings: {}", e))
            }),
        }
    }
}

// ============================================================================
// File Settings Store
// ============================================================================

/// Settings store persisted to a single file.
///
/// The whole option table lives in memory and is written back after every
/// mutation. Writes go to a temporary file in the same directory which is
/// then renamed over the target, so a crash never leaves a torn file behind.
pub struct FileSettingsStore {
    path: PathBuf,
    format: StoreFormat,
    options: RwLock<BTreeMap<String, OptionValue>>,
}

impl FileSettingsStore {
    /// Open a store, inferring the format from the file extension
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let format = StoreFormat::from_path(path.as_ref());
        Self::open_with_format(path, format)
    }

    /// Open a store with an explicit format. A missing file is an empty store.
    pub fn open_with_format<P: AsRef<Path>>(path: P, format: StoreFormat) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let options = load(&path, format)?;
        debug!("Opened settings store {} ({} options)", path.display(), options.len());
        Ok(Self {
            path,
            format,
            options: RwLock::new(options),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn format(&self) -> StoreFormat {
        self.format
    }

    /// Re-read the file, discarding the in-memory view
    pub fn reload(&self) -> Result<()> {
        let options = load(&self.path, self.format)?;
        *self.options.write()? = options;
        Ok(())
    }

    fn save(&self, options: &BTreeMap<String, OptionValue>) -> Result<()> {
        let parent = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
            _ => PathBuf::from("."),
        };
        fs::create_dir_all(&parent).map_err(|e| {
            SettingsError::IoError(format!("Failed to create settings directory: {}", e))
        })?;

        let data = self.format.encode(options)?;
        let mut temp = NamedTempFile::new_in(&parent)
            .map_err(|e| SettingsError::IoError(format!("Failed to create temp file: {}", e)))?;
        temp.write_all(&data)
            .map_err(|e| SettingsError::IoError(format!("Failed to write settings: {}", e)))?;
        temp.as_file()
            .sync_all()
            .map_err(|e| SettingsError::IoError(format!("Failed to sync settings: {}", e)))?;
        temp.persist(&self.path).map_err(|e| {
            SettingsError::IoError(format!("Failed to replace settings file: {}", e.error))
        })?;
        Ok(())
    }
}

fn load(path: &Path, format: StoreFormat) -> Result<BTreeMap<String, OptionValue>> {
    if !path.exists() {
        return Ok(BTreeMap::new());
    }
    let data = fs::read(path)
        .map_err(|e| SettingsError::IoError(format!("Failed to read settings: {}", e)))?;
    if data.is_empty() {
        warn!("Settings file {} is empty, starting from an empty store", path.display());
        return Ok(BTreeMap::new());
    }
    format.decode(&data)
}

impl SettingsStore for FileSettingsStore {
    fn get(&self, key: &str) -> Result<Option<OptionValue>> {
        Ok(self.options.read()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: OptionValue) -> Result<()> {
        let mut options = self.options.write()?;
        let mut updated = options.clone();
        updated.insert(key.to_string(), value);
        self.save(&updated)?;
        *options = updated;
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool> {
        let mut options = self.options.write()?;
        if !options.contains_key(key) {
            return Ok(false);
        }
        let mut updated = options.clone();
        updated.remove(key);
        self.save(&updated)?;
        *options = updated;
        Ok(true)
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.options.read()?.keys().cloned().collect())
    }
}
