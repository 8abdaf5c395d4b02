use std::collections::HashMap;

use super::{KeyValueStore, StorageError};

/// In-process store with an optional byte quota, like a browser's local storage.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
    quota: Option<usize>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_quota(bytes: usize) -> Self {
        Self {
            entries: HashMap::new(),
            quota: Some(bytes),
        }
    }

    pub fn set_quota(&mut self, quota: Option<usize>) {
        self.quota = quota;
    }

    fn used_excluding(&self, key: &str) -> usize {
        self.entries
            .iter()
            .filter(|(k, _)| k.as_str() != key)
            .map(|(k, v)| k.len() + v.len())
            .sum()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        if let Some(capacity) = self.quota {
            let needed = self.used_excluding(key) + key.len() + value.len();
            if needed > capacity {
                return Err(StorageError::QuotaExceeded { needed, capacity });
            }
        }
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quota_counts_keys_and_values() {
        let mut store = MemoryStore::with_quota(10);
        store.set("a", "123456789").unwrap();
        assert!(matches!(
            store.set("b", "1"),
            Err(StorageError::QuotaExceeded { needed: 12, capacity: 10 })
        ));
        // Replacing a value only counts the new one.
        store.set("a", "12345678").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("12345678"));
    }

    #[test]
    fn lifting_quota_allows_writes() {
        let mut store = MemoryStore::with_quota(1);
        assert!(store.set("key", "value").is_err());
        store.set_quota(None);
        store.set("key", "value").unwrap();
    }
}
