use std::collections::HashMap;
use std::fmt::Display;

use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::RwLock;

use crate::error::{AppError, AppResult};

/// Fixed keys for persisted application state
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum StoreKey {
    Sources,
    ActiveSource,
    Theme,
    ViewingHistory,
    Preferences,
}

impl Display for StoreKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StoreKey::Sources => "sources",
            StoreKey::ActiveSource => "active_source",
            StoreKey::Theme => "theme",
            StoreKey::ViewingHistory => "viewing_history",
            StoreKey::Preferences => "preferences",
        };
        write!(f, "cinemaview:{}", name)
    }
}

/// Key-value persistence for small JSON documents
#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get_raw(&self, key: &StoreKey) -> AppResult<Option<String>>;

    async fn put_raw(&self, key: &StoreKey, value: String) -> AppResult<()>;

    /// Backend name for logging
    fn name(&self) -> &'static str;
}

impl dyn KeyValueStore {
    /// Reads and deserializes a value, `None` when the key has never been written
    pub async fn load<T: DeserializeOwned>(&self, key: &StoreKey) -> AppResult<Option<T>> {
        match self.get_raw(key).await? {
            Some(json) => {
                let value = serde_json::from_str(&json).map_err(|e| {
                    AppError::Internal(format!("Stored value for {} is corrupt: {}", key, e))
                })?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    pub async fn save<T: Serialize + ?Sized>(&self, key: &StoreKey, value: &T) -> AppResult<()> {
        let json = serde_json::to_string(value)
            .map_err(|e| AppError::Internal(format!("Serialization error: {}", e)))?;
        self.put_raw(key, json).await
    }
}

/// Process-local store used when no Redis URL is configured, and in tests
#[derive(Default)]
pub struct MemoryStore {
    values: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait::async_trait]
impl KeyValueStore for MemoryStore {
    async fn get_raw(&self, key: &StoreKey) -> AppResult<Option<String>> {
        Ok(self.values.read().await.get(&key.to_string()).cloned())
    }

    async fn put_raw(&self, key: &StoreKey, value: String) -> AppResult<()> {
        self.values.write().await.insert(key.to_string(), value);
        Ok(())
    }

    fn name(&self) -> &'static str {
        "memory"
    }
}
