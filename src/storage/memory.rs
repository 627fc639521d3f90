use super::SettingsStore;
use crate::core::{OptionValue, Result};
use std::collections::BTreeMap;
use std::sync::RwLock;

/// Settings store held entirely in memory.
///
/// Used for tests and for hosts that hand over a pre-loaded option table.
pub struct MemorySettingsStore {
    options: RwLock<BTreeMap<String, OptionValue>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self {
            options: RwLock::new(BTreeMap::new()),
        }
    }

    /// Create a store pre-populated with options
    pub fn with_options<I, K>(options: I) -> Self
    where
        I: IntoIterator<Item = (K, OptionValue)>,
        K: Into<String>,
    {
        Self {
            options: RwLock::new(options.into_iter().map(|(k, v)| (k.into(), v)).collect()),
        }
    }

    /// Copy of every stored option
    pub fn snapshot(&self) -> Result<BTreeMap<String, OptionValue>> {
        Ok(self.options.read()?.clone())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.options.read()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.options.read()?.is_empty())
    }
}

impl Default for MemorySettingsStore {
    fn default() -> Self {
        Self::new()
    }
}

impl SettingsStore for MemorySettingsStore {
    fn get(&self, key: &str) -> Result<Option<OptionValue>> {
        Ok(self.options.read()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: OptionValue) -> Result<()> {
        self.options.write()?.insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&self, key: &str) -> Result<bool> {
        Ok(self.options.write()?.remove(key).is_some())
    }

    fn keys(&self) -> Result<Vec<String>> {
        Ok(self.options.read()?.keys().cloned().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_set_get_delete() {
        let store = MemorySettingsStore::new();
        assert!(store.get("a").unwrap().is_none());

        store.set("a", json!(true)).unwrap();
        assert_eq!(store.get("a").unwrap(), Some(json!(true)));
        assert!(store.contains("a").unwrap());

        assert!(store.delete("a").unwrap());
        assert!(!store.delete("a").unwrap());
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn test_keys_are_sorted() {
        let store = MemorySettingsStore::with_options([("b", json!(1)), ("a", json!(2))]);
        assert_eq!(store.keys().unwrap(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(store.len().unwrap(), 2);
    }
}
