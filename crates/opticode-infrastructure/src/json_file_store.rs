//! Durable file-backed KeyValueStore implementation.
//!
//! One JSON file per key under a base directory. Writes go through a
//! temporary file with an explicit fsync and an atomic rename, guarded by an
//! advisory lock, so a crash mid-write never leaves a half-written
//! collection behind.

use async_trait::async_trait;
use fs2::FileExt;
use opticode_core::error::{OpticodeError, Result};
use opticode_core::storage::{KeyValueStore, StoreChange};
use std::fs::{self, File};
use std::io::Write as IoWrite;
use std::path::PathBuf;
use tokio::sync::broadcast;

use crate::paths::OpticodePaths;

const CHANGE_CHANNEL_CAPACITY: usize = 64;

/// A durable key-value store, one file per key.
#[derive(Clone)]
pub struct JsonFileStore {
    base_dir: PathBuf,
    events: broadcast::Sender<StoreChange>,
}

impl JsonFileStore {
    /// Creates a store rooted at `base_dir`, creating the directory if
    /// needed.
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir)?;

        let (events, _) = broadcast::channel(CHANGE_CHANNEL_CAPACITY);
        Ok(Self { base_dir, events })
    }

    /// Creates a store at the default platform data location.
    pub fn default_location() -> Result<Self> {
        let dir = OpticodePaths::store_dir()
            .map_err(|e| OpticodeError::config(e.to_string()))?;
        Self::new(dir)
    }

    fn file_path(&self, key: &str) -> PathBuf {
        self.base_dir.join(format!("{key}.json"))
    }

    fn lock_path(&self) -> PathBuf {
        self.base_dir.join(".lock")
    }

    fn notify(&self, key: &str) {
        let _ = self.events.send(StoreChange {
            key: key.to_string(),
        });
    }

    fn write_atomic(&self, key: &str, value: &str) -> Result<()> {
        let path = self.file_path(key);
        let tmp_path = self.base_dir.join(format!("{key}.json.tmp"));

        let lock_file = File::create(self.lock_path())?;
        lock_file
            .lock_exclusive()
            .map_err(|e| OpticodeError::storage(format!("failed to lock store: {e}")))?;

        let result = (|| -> Result<()> {
            let mut tmp_file = File::create(&tmp_path)?;
            tmp_file.write_all(value.as_bytes())?;
            tmp_file.sync_all()?;
            drop(tmp_file);

            fs::rename(&tmp_path, &path)?;
            Ok(())
        })();

        let _ = fs2::FileExt::unlock(&lock_file);
        result
    }
}

#[async_trait]
impl KeyValueStore for JsonFileStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        match fs::read_to_string(self.file_path(key)) {
            Ok(content) => Ok(Some(content)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        self.write_atomic(key, &value)?;
        self.notify(key);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<()> {
        match fs::remove_file(self.file_path(key)) {
            Ok(()) => {
                self.notify(key);
                Ok(())
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    fn watch(&self) -> broadcast::Receiver<StoreChange> {
        self.events.subscribe()
    }
}
