//! Key/value store collaborators.
//!
//! The engine persists everything through two narrow traits: a site-wide
//! [`Store`] and a per-document [`DocumentMetaStore`]. Values are untyped
//! [`serde_json::Value`] trees. Writes are last-write-wins; a store only has to
//! guarantee read-after-write within one process.

use std::collections::HashMap;

use serde_json::Value;

use crate::error::Result;

/// Site-wide key/value store.
pub trait Store: Send + Sync {
    /// Read the value under `key`, if any.
    fn get(&self, key: &str) -> Result<Option<Value>>;

    /// Replace the value under `key`.
    fn put(&mut self, key: &str, value: Value) -> Result<()>;

    /// Read the value under `key`, falling back to `default`.
    fn get_or(&self, key: &str, default: Value) -> Result<Value> {
        Ok(self.get(key)?.unwrap_or(default))
    }
}

/// Per-document key/value store.
pub trait DocumentMetaStore: Send + Sync {
    fn get(&self, document: &str, key: &str) -> Result<Option<Value>>;

    fn put(&mut self, document: &str, key: &str, value: Value) -> Result<()>;

    fn get_or(&self, document: &str, key: &str, default: Value) -> Result<Value> {
        Ok(self.get(document, key)?.unwrap_or(default))
    }
}

/// In-memory [`Store`]. Contents are lost when dropped.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    values: HashMap<String, Value>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Store for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Value>> {
        Ok(self.values.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: Value) -> Result<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}

/// In-memory [`DocumentMetaStore`].
#[derive(Debug, Default, Clone)]
pub struct MemoryMetaStore {
    documents: HashMap<String, HashMap<String, Value>>,
}

impl MemoryMetaStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Documents with at least one stored key.
    pub fn documents(&self) -> Vec<&str> {
        let mut ids: Vec<&str> = self.documents.keys().map(String::as_str).collect();
        ids.sort_unstable();
        ids
    }
}

impl DocumentMetaStore for MemoryMetaStore {
    fn get(&self, document: &str, key: &str) -> Result<Option<Value>> {
        Ok(self
            .documents
            .get(document)
            .and_then(|meta| meta.get(key))
            .cloned())
    }

    fn put(&mut self, document: &str, key: &str, value: Value) -> Result<()> {
        self.documents
            .entry(document.to_string())
            .or_default()
            .insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn memory_store_get_put() {
        let mut store = MemoryStore::new();
        assert!(store.is_empty());
        assert_eq!(store.get("k").unwrap(), None);
        store.put("k", json!({"a": 1})).unwrap();
        assert_eq!(store.get("k").unwrap(), Some(json!({"a": 1})));
        store.put("k", json!(2)).unwrap();
        assert_eq!(store.get("k").unwrap(), Some(json!(2)));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn get_or_falls_back() {
        let store = MemoryStore::new();
        assert_eq!(store.get_or("missing", json!([])).unwrap(), json!([]));
    }

    #[test]
    fn meta_store_is_per_document() {
        let mut meta = MemoryMetaStore::new();
        meta.put("7", "values", json!({"x": 1})).unwrap();
        meta.put("9", "values", json!({"x": 2})).unwrap();
        assert_eq!(meta.get("7", "values").unwrap(), Some(json!({"x": 1})));
        assert_eq!(meta.get("9", "values").unwrap(), Some(json!({"x": 2})));
        assert_eq!(meta.get("8", "values").unwrap(), None);
        assert_eq!(meta.get_or("8", "values", json!({})).unwrap(), json!({}));
        assert_eq!(meta.documents(), vec!["7", "9"]);
    }
}
