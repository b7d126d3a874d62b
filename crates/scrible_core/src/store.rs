//! crates/scrible_core/src/store.rs
//!
//! The record store: one named slot holding a JSON array of records, read and
//! written as a whole on every access.

use serde::{de::DeserializeOwned, Serialize};
use std::collections::HashMap;
use std::marker::PhantomData;
use std::sync::{Arc, Mutex};
use tracing::warn;

use crate::ports::{PortError, PortResult, SlotStorage};

pub const NOTEBOOKS_SLOT: &str = "scrible_notebooks";
pub const USERS_SLOT: &str = "scrible_users";
pub const CURRENT_USER_SLOT: &str = "scrible_user";

//=========================================================================================
// RecordStore
//=========================================================================================

/// A whole-collection view over a single slot.
///
/// There is no locking here: callers that run read-modify-write cycles from more
/// than one thread must serialize them.
pub struct RecordStore<T> {
    storage: Arc<dyn SlotStorage>,
    slot: String,
    _records: PhantomData<fn() -> T>,
}

impl<T> Clone for RecordStore<T> {
    fn clone(&self) -> Self {
        Self {
            storage: self.storage.clone(),
            slot: self.slot.clone(),
            _records: PhantomData,
        }
    }
}

impl<T> RecordStore<T>
where
    T: Serialize + DeserializeOwned,
{
    pub fn new(storage: Arc<dyn SlotStorage>, slot: impl Into<String>) -> Self {
        Self {
            storage,
            slot: slot.into(),
            _records: PhantomData,
        }
    }

    /// Returns the stored collection. A missing or undecodable slot reads as empty.
    pub fn read_all(&self) -> PortResult<Vec<T>> {
        let Some(raw) = self.storage.get(&self.slot)? else {
            return Ok(Vec::new());
        };
        match serde_json::from_str(&raw) {
            Ok(records) => Ok(records),
            Err(e) => {
                warn!(slot = %self.slot, "Discarding malformed records: {}", e);
                Ok(Vec::new())
            }
        }
    }

    /// Replaces the stored collection with `records`.
    pub fn write_all(&self, records: &[T]) -> PortResult<()> {
        let raw = serde_json::to_string(records)
            .map_err(|e| PortError::Unexpected(format!("Failed to encode {}: {}", self.slot, e)))?;
        self.storage.set(&self.slot, &raw)
    }

    pub fn clear(&self) -> PortResult<()> {
        self.storage.remove(&self.slot)
    }
}

//=========================================================================================
// MemoryStorage
//=========================================================================================

/// Slots kept in process memory. Nothing survives a restart.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    slots: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    fn slots(&self) -> PortResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.slots
            .lock()
            .map_err(|_| PortError::Unavailable("memory storage mutex poisoned".to_string()))
    }
}

impl SlotStorage for MemoryStorage {
    fn get(&self, slot: &str) -> PortResult<Option<String>> {
        Ok(self.slots()?.get(slot).cloned())
    }

    fn set(&self, slot: &str, value: &str) -> PortResult<()> {
        self.slots()?.insert(slot.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, slot: &str) -> PortResult<()> {
        self.slots()?.remove(slot);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Item {
        name: String,
    }

    fn item(name: &str) -> Item {
        Item { name: name.into() }
    }

    #[test]
    fn empty_slot_reads_as_empty() {
        let store: RecordStore<Item> = RecordStore::new(Arc::new(MemoryStorage::new()), "items");
        assert!(store.read_all().unwrap().is_empty());
    }

    #[test]
    fn write_all_replaces_previous_contents() {
        let store = RecordStore::new(Arc::new(MemoryStorage::new()), "items");
        store.write_all(&[item("a"), item("b")]).unwrap();
        store.write_all(&[item("c")]).unwrap();
        assert_eq!(store.read_all().unwrap(), vec![item("c")]);
    }

    #[test]
    fn malformed_slot_reads_as_empty_and_heals_on_write() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set("items", "{not json").unwrap();
        let store = RecordStore::new(storage.clone(), "items");

        assert!(store.read_all().unwrap().is_empty());

        store.write_all(&[item("fresh")]).unwrap();
        assert_eq!(store.read_all().unwrap(), vec![item("fresh")]);
    }

    #[test]
    fn wrong_shape_reads_as_empty() {
        let storage = Arc::new(MemoryStorage::new());
        storage.set("items", r#"{"name":"not an array"}"#).unwrap();
        let store: RecordStore<Item> = RecordStore::new(storage, "items");
        assert!(store.read_all().unwrap().is_empty());
    }

    #[test]
    fn clear_removes_the_slot() {
        let storage = Arc::new(MemoryStorage::new());
        let store = RecordStore::new(storage.clone(), "items");
        store.write_all(&[item("a")]).unwrap();
        store.clear().unwrap();
        assert_eq!(storage.get("items").unwrap(), None);
    }
}
