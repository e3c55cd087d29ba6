//! Key-value stores holding the application state
//!
//! The state is kept as JSON text under a handful of string keys (see
//! [`chatport_common::keys`]). A missing key is distinct from a key holding
//! an empty array.

mod fjall_store;
mod memory_store;

pub use fjall_store::FjallStore;
pub use memory_store::MemoryStore;

use chatport_common::{ChatportError, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// String-keyed storage of JSON-encoded values
pub trait Store {
    /// Read the raw value under `key`, `None` when absent
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write the raw value under `key`
    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    /// Get the store name
    fn name(&self) -> &str;

    /// Whether writes outlive the process
    fn is_persistent(&self) -> bool {
        true
    }
}

/// Read the collection under `key`
///
/// Absent keys and stored `null` both read as `None`.
pub fn load_collection<T: DeserializeOwned>(store: &dyn Store, key: &str) -> Result<Option<Vec<T>>> {
    let Some(raw) = store.get(key)? else {
        return Ok(None);
    };

    match serde_json::from_str::<Value>(&raw)? {
        Value::Null => Ok(None),
        value => serde_json::from_value(value)
            .map(Some)
            .map_err(|e| ChatportError::Malformed(format!("stored {}: {}", key, e))),
    }
}

/// Serialize `value` to JSON and write it under `key`
pub fn save_json<T: Serialize + ?Sized>(store: &mut dyn Store, key: &str, value: &T) -> Result<()> {
    let encoded = serde_json::to_string(value)?;
    store.set(key, &encoded)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Conversation;

    #[test]
    fn test_load_absent_and_null() {
        let mut store = MemoryStore::new();
        let loaded: Option<Vec<Conversation>> = load_collection(&store, "history").unwrap();
        assert!(loaded.is_none());

        store.set("history", "null").unwrap();
        let loaded: Option<Vec<Conversation>> = load_collection(&store, "history").unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_load_empty_is_present() {
        let mut store = MemoryStore::new();
        store.set("history", "[]").unwrap();

        let loaded: Option<Vec<Conversation>> = load_collection(&store, "history").unwrap();
        assert_eq!(loaded, Some(Vec::new()));
    }

    #[test]
    fn test_load_wrong_shape_is_malformed() {
        let mut store = MemoryStore::new();
        store.set("history", "{\"id\": \"a\"}").unwrap();

        let err = load_collection::<Conversation>(&store, "history").unwrap_err();
        assert!(matches!(err, ChatportError::Malformed(_)));

        store.set("history", "not json").unwrap();
        let err = load_collection::<Conversation>(&store, "history").unwrap_err();
        assert!(matches!(err, ChatportError::Serde(_)));
    }

    #[test]
    fn test_save_then_load() {
        let mut store = MemoryStore::new();
        let history = vec![Conversation::with_id("a"), Conversation::with_id("b")];
        save_json(&mut store, "history", &history).unwrap();

        let loaded: Option<Vec<Conversation>> = load_collection(&store, "history").unwrap();
        assert_eq!(loaded, Some(history));
    }
}
