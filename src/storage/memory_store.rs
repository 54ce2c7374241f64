use std::{collections::HashMap, sync::Mutex};

use anyhow::{anyhow, Result};

use super::{KeyValueStore, StorageKey};

/// Keeps documents in memory. Used by tests and whenever nothing should touch the disk.
#[derive(Default)]
pub struct MemoryStore {
    documents: Mutex<HashMap<StorageKey, String>>,
}

impl MemoryStore {
    pub fn len(&self) -> usize {
        self.documents.lock().map(|v| v.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    async fn get(&self, key: &StorageKey) -> Result<Option<String>> {
        let documents = self
            .documents
            .lock()
            .map_err(|_| anyhow!("Memory store lock was poisoned"))?;
        Ok(documents.get(key).cloned())
    }

    async fn set(&self, key: &StorageKey, value: String) -> Result<()> {
        let mut documents = self
            .documents
            .lock()
            .map_err(|_| anyhow!("Memory store lock was poisoned"))?;
        documents.insert(*key, value);
        Ok(())
    }
}
