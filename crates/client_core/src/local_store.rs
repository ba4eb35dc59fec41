use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use storage::Storage;
use tokio::sync::Mutex;

/// String key/value persistence used by the selection store.
#[async_trait]
pub trait LocalStore: Send + Sync {
    async fn get_item(&self, key: &str) -> Result<Option<String>>;
    async fn set_item(&self, key: &str, value: &str) -> Result<()>;
}

#[async_trait]
impl LocalStore for Storage {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        Storage::get_item(self, key).await
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        Storage::set_item(self, key, value).await
    }
}

/// Process-local store; nothing survives a restart.
#[derive(Default)]
pub struct MemoryStore {
    items: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item(key: impl Into<String>, value: impl Into<String>) -> Self {
        let mut items = HashMap::new();
        items.insert(key.into(), value.into());
        Self {
            items: Mutex::new(items),
        }
    }
}

#[async_trait]
impl LocalStore for MemoryStore {
    async fn get_item(&self, key: &str) -> Result<Option<String>> {
        Ok(self.items.lock().await.get(key).cloned())
    }

    async fn set_item(&self, key: &str, value: &str) -> Result<()> {
        self.items
            .lock()
            .await
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}
