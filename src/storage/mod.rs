//! Storage is a flat key-value space of JSON documents.
//!  - [StorageKey] names every document the application writes.
//!  - [KeyValueStore] moves raw documents in and out. [file_store::FileStore] keeps one file per
//!    key, [memory_store::MemoryStore] keeps them in memory.
//!  - [load] and [save] add typed serialization on top. A document that doesn't parse reads as
//!    absent, callers fall back to defaults.

pub mod file_store;
pub mod memory_store;

use std::{fmt::Display, future::Future, ops::Deref, path::PathBuf};

use anyhow::Result;
use chrono::NaiveDate;
use serde::{de::DeserializeOwned, Serialize};
use tracing::warn;

use crate::utils::time::date_to_record_name;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageKey {
    /// The activity catalog.
    Catalog,
    /// Completion state of every activity for one day.
    DailyActivities(NaiveDate),
    /// Snapshot written when a day is closed out.
    DaySummary(NaiveDate),
    Theme,
    ColorTheme,
    /// Dates that already got the 100% celebration.
    Celebrations,
}

impl StorageKey {
    pub fn relative_path(&self) -> PathBuf {
        match self {
            StorageKey::Catalog => PathBuf::from("custom-tasks.json"),
            StorageKey::DailyActivities(date) => {
                PathBuf::from("daily-activities").join(format!("{}.json", date_to_record_name(*date)))
            }
            StorageKey::DaySummary(date) => {
                PathBuf::from("day-summary").join(format!("{}.json", date_to_record_name(*date)))
            }
            StorageKey::Theme => PathBuf::from("theme.json"),
            StorageKey::ColorTheme => PathBuf::from("color-theme.json"),
            StorageKey::Celebrations => PathBuf::from("celebrations.json"),
        }
    }
}

impl Display for StorageKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StorageKey::Catalog => write!(f, "custom-tasks"),
            StorageKey::DailyActivities(date) => {
                write!(f, "daily-activities-{}", date_to_record_name(*date))
            }
            StorageKey::DaySummary(date) => write!(f, "day-summary-{}", date_to_record_name(*date)),
            StorageKey::Theme => write!(f, "theme"),
            StorageKey::ColorTheme => write!(f, "color-theme"),
            StorageKey::Celebrations => write!(f, "celebrations"),
        }
    }
}

/// Interface for abstracting storage of documents.
pub trait KeyValueStore {
    /// Returns the raw document, or `None` if nothing was stored under `key`.
    fn get(&self, key: &StorageKey) -> impl Future<Output = Result<Option<String>>>;

    /// Stores a document, replacing any previous one.
    fn set(&self, key: &StorageKey, value: String) -> impl Future<Output = Result<()>>;
}

impl<T: Deref> KeyValueStore for T
where
    T::Target: KeyValueStore,
{
    fn get(&self, key: &StorageKey) -> impl Future<Output = Result<Option<String>>> {
        self.deref().get(key)
    }

    fn set(&self, key: &StorageKey, value: String) -> impl Future<Output = Result<()>> {
        self.deref().set(key, value)
    }
}

/// Reads and parses a document. Illegal documents are logged and treated as missing.
pub async fn load<T: DeserializeOwned>(
    store: &impl KeyValueStore,
    key: &StorageKey,
) -> Result<Option<T>> {
    let Some(raw) = store.get(key).await? else {
        return Ok(None);
    };

    match serde_json::from_str::<T>(&raw) {
        Ok(v) => Ok(Some(v)),
        Err(e) => {
            warn!("Document {key} is malformed, ignoring it: {e}");
            Ok(None)
        }
    }
}

pub async fn save<T: Serialize + ?Sized>(
    store: &impl KeyValueStore,
    key: &StorageKey,
    value: &T,
) -> Result<()> {
    let raw = serde_json::to_string_pretty(value)?;
    store.set(key, raw).await
}
