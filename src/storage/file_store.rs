use std::path::PathBuf;

use anyhow::Result;
use tracing::warn;

use crate::fs::operations::{read_locked, write_locked};

use super::{KeyValueStore, StorageKey};

/// The main realization of [KeyValueStore]. Every key maps to a JSON file below `root`:
/// ```text
/// root/custom-tasks.json
/// root/daily-activities/2025-03-15.json
/// root/day-summary/2025-03-15.json
/// ```
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&root)?;

        Ok(Self { root })
    }

    fn path(&self, key: &StorageKey) -> PathBuf {
        self.root.join(key.relative_path())
    }
}

impl KeyValueStore for FileStore {
    async fn get(&self, key: &StorageKey) -> Result<Option<String>> {
        let path = self.path(key);
        let Some(bytes) = read_locked(&path).await? else {
            return Ok(None);
        };

        match String::from_utf8(bytes) {
            Ok(v) => Ok(Some(v)),
            Err(e) => {
                warn!("File {path:?} is not valid UTF-8, ignoring it: {e}");
                Ok(None)
            }
        }
    }

    async fn set(&self, key: &StorageKey, value: String) -> Result<()> {
        write_locked(&self.path(key), value.as_bytes()).await?;
        Ok(())
    }
}
