//! # Key-Value Store
//!
//! The storage seam the cart persists through. Modeled on browser local
//! storage: string keys, string values, whole-value overwrites.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        KeyValueStore                                    │
//! │                                                                         │
//! │   get_item(key)         → Option<String>                               │
//! │   set_item(key, value)  → overwrite, last writer wins                  │
//! │                                                                         │
//! │   Backends:                                                            │
//! │   ├── LocalStorage (SQLite, durable)   repository/local_storage.rs     │
//! │   └── MemoryStore  (process-local)     this file                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;

use crate::error::{DbError, DbResult};

/// Durable string key-value storage.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    /// Reads the value stored under `key`.
    async fn get_item(&self, key: &str) -> DbResult<Option<String>>;

    /// Stores `value` under `key`, replacing any previous value.
    async fn set_item(&self, key: &str, value: &str) -> DbResult<()>;
}

/// Process-local store. Contents are lost when the value is dropped.
#[derive(Debug, Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with one entry.
    pub fn with_item(key: impl Into<String>, value: impl Into<String>) -> Self {
        let store = Self::new();
        if let Ok(mut items) = store.items.lock() {
            items.insert(key.into(), value.into());
        }
        store
    }

    fn lock(&self) -> DbResult<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.items
            .lock()
            .map_err(|_| DbError::Internal("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl KeyValueStore for MemoryStore {
    async fn get_item(&self, key: &str) -> DbResult<Option<String>> {
        Ok(self.lock()?.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> DbResult<()> {
        self.lock()?.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
