//! In-memory settings store implementation

use async_trait::async_trait;
use bridge_traits::{error::Result, settings::SettingsStore};
use std::collections::HashMap;
use tokio::sync::Mutex;

/// Typed value as stored.
#[derive(Debug, Clone, PartialEq)]
enum Setting {
    Text(String),
    Flag(bool),
    Integer(i64),
}

/// HashMap-backed [`SettingsStore`] for tests and local development.
#[derive(Default)]
pub struct MemorySettingsStore {
    values: Mutex<HashMap<String, Setting>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SettingsStore for MemorySettingsStore {
    async fn set_string(&self, key: &str, value: &str) -> Result<()> {
        self.values
            .lock()
            .await
            .insert(key.to_string(), Setting::Text(value.to_string()));
        Ok(())
    }

    async fn get_string(&self, key: &str) -> Result<Option<String>> {
        Ok(match self.values.lock().await.get(key) {
            Some(Setting::Text(s)) => Some(s.clone()),
            _ => None,
        })
    }

    async fn set_bool(&self, key: &str, value: bool) -> Result<()> {
        self.values
            .lock()
            .await
            .insert(key.to_string(), Setting::Flag(value));
        Ok(())
    }

    async fn get_bool(&self, key: &str) -> Result<Option<bool>> {
        Ok(match self.values.lock().await.get(key) {
            Some(Setting::Flag(b)) => Some(*b),
            _ => None,
        })
    }

    async fn set_i64(&self, key: &str, value: i64) -> Result<()> {
        self.values
            .lock()
            .await
            .insert(key.to_string(), Setting::Integer(value));
        Ok(())
    }

    async fn get_i64(&self, key: &str) -> Result<Option<i64>> {
        Ok(match self.values.lock().await.get(key) {
            Some(Setting::Integer(i)) => Some(*i),
            _ => None,
        })
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.values.lock().await.remove(key);
        Ok(())
    }

    async fn has_key(&self, key: &str) -> Result<bool> {
        Ok(self.values.lock().await.contains_key(key))
    }

    async fn list_keys(&self) -> Result<Vec<String>> {
        Ok(self.values.lock().await.keys().cloned().collect())
    }

    async fn clear_all(&self) -> Result<()> {
        self.values.lock().await.clear();
        Ok(())
    }
}
