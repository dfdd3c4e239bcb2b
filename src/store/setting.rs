use std::{collections::HashMap, sync::{Arc, Mutex}};

use super::lock;
use crate::Result;

/// Whether the frontend renders per-path SEO entries; stored as `1` or `0`.
pub const ENABLE_DYNAMIC_SEO: &str = "enable_dynamic_seo";

pub trait SettingStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&self, key: &str, value: String) -> Result<()>;

    fn get_or(&self, key: &str, default: &str) -> Result<String> {
        Ok(self.get(key)?.unwrap_or_else(|| default.to_string()))
    }
}

pub type SettingStoreService = Arc<dyn SettingStore>;

#[derive(Debug, Default)]
pub struct InMemorySettingStore {
    values: Mutex<HashMap<String, String>>,
}

impl InMemorySettingStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SettingStore for InMemorySettingStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(lock(&self.values, "setting")?.get(key).cloned())
    }

    fn set(&self, key: &str, value: String) -> Result<()> {
        lock(&self.values, "setting")?.insert(key.to_string(), value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn falls_back_to_default_until_set() {
        let store = InMemorySettingStore::new();
        assert_eq!(store.get_or(ENABLE_DYNAMIC_SEO, "1").unwrap(), "1");
        store.set(ENABLE_DYNAMIC_SEO, "0".to_string()).unwrap();
        assert_eq!(store.get_or(ENABLE_DYNAMIC_SEO, "1").unwrap(), "0");
    }
}
