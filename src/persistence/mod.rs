//! Key-value persistence
//!
//! Features:
//! - `KeyValueStore` seam over browser LocalStorage
//! - In-memory store for native runs and tests
//! - Storage failures surface as `StorageError`; callers decide whether
//!   they matter

use std::collections::HashMap;

use thiserror::Error;

#[cfg(target_arch = "wasm32")]
pub mod local;

#[cfg(target_arch = "wasm32")]
pub use local::LocalStorage;

/// Storage failures
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StorageError {
    /// No storage backend (private mode, no window, disabled by the user)
    #[error("storage unavailable")]
    Unavailable,
    /// The backend rejected the operation (quota, security error)
    #[error("storage error: {0}")]
    Backend(String),
}

/// String key-value store
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// HashMap-backed store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    unavailable: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store that fails every operation with `Unavailable`
    pub fn unavailable() -> Self {
        Self {
            entries: HashMap::new(),
            unavailable: true,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        if self.unavailable {
            return Err(StorageError::Unavailable);
        }
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if self.unavailable {
            return Err(StorageError::Unavailable);
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        assert_eq!(store.get("a"), Ok(None));
        store.set("a", "1").unwrap();
        store.set("a", "2").unwrap();
        assert_eq!(store.get("a"), Ok(Some("2".to_string())));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_unavailable_store() {
        let mut store = MemoryStore::unavailable();
        assert_eq!(store.get("a"), Err(StorageError::Unavailable));
        assert_eq!(store.set("a", "1"), Err(StorageError::Unavailable));
        assert!(store.is_empty());
    }
}
