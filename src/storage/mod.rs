pub mod file;
pub mod memory;
pub mod snapshot;

pub use file::FileStore;
pub use memory::MemoryStore;

use crate::core::section::Section;
use snapshot::StoredSection;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("failed to read snapshot: {0}")]
    Read(#[source] std::io::Error),
    #[error("failed to write snapshot: {0}")]
    Write(#[source] std::io::Error),
    #[error("stored snapshot is corrupt: {0}")]
    Corrupt(#[source] serde_json::Error),
    #[error("failed to encode snapshot: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("storage quota exceeded: {needed} bytes needed, {capacity} available")]
    QuotaExceeded { needed: usize, capacity: usize },
}

/// A persistent string-to-string store, one value per key.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError>;
}

/// Reads and writes the whole section snapshot under a single key.
pub struct StorageAdapter<K> {
    store: K,
    key: String,
}

impl<K: KeyValueStore> StorageAdapter<K> {
    pub fn new(store: K, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn store(&self) -> &K {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut K {
        &mut self.store
    }

    /// An absent key is an empty snapshot; anything unparseable is `Corrupt`.
    pub fn load(&self) -> Result<Vec<Section>, StorageError> {
        let Some(raw) = self.store.get(&self.key)? else {
            log::debug!("No snapshot under {}", self.key);
            return Ok(Vec::new());
        };
        let stored: Vec<StoredSection> = serde_json::from_str(&raw).map_err(StorageError::Corrupt)?;
        let sections: Vec<Section> = stored.into_iter().map(Section::from).collect();
        log::info!(
            "Loaded {} sections, {} tasks",
            sections.len(),
            sections.iter().map(|s| s.tasks.len()).sum::<usize>()
        );
        Ok(sections)
    }

    /// Overwrite the snapshot. Summary handles are not part of it.
    pub fn save(&mut self, sections: &[Section]) -> Result<(), StorageError> {
        let stored: Vec<StoredSection> = sections.iter().map(StoredSection::from).collect();
        let json = serde_json::to_string(&stored).map_err(StorageError::Encode)?;
        self.store.set(&self.key, &json)?;
        log::debug!("Saved {} sections ({} bytes)", sections.len(), json.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::resource::{ResourceHandle, SummaryDocument};
    use crate::core::task::Task;
    use chrono::NaiveDate;
    use uuid::Uuid;

    fn sample() -> Vec<Section> {
        let mut reading = Section::new("Reading");
        reading.tasks.push(Task::new(
            "Example A",
            "https://a.example/",
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        ));
        let mut done = Task::new(
            "Example B",
            "https://b.example/",
            NaiveDate::from_ymd_opt(2024, 12, 31).unwrap(),
        );
        done.completed = true;
        reading.tasks.push(done);

        let mut later = Section::new("Later");
        later.expanded = false;
        later.summary = Some(SummaryDocument {
            file_name: "later.pdf".into(),
            handle: ResourceHandle::new(Uuid::new_v4(), "file:///tmp/later.pdf"),
        });
        vec![reading, later]
    }

    #[test]
    fn absent_key_loads_empty() {
        let adapter = StorageAdapter::new(MemoryStore::new(), "todoSections");
        assert!(adapter.load().unwrap().is_empty());
    }

    #[test]
    fn save_then_load_reproduces_sections() {
        let sections = sample();
        let mut adapter = StorageAdapter::new(MemoryStore::new(), "todoSections");
        adapter.save(&sections).unwrap();

        let loaded = adapter.load().unwrap();
        assert_eq!(loaded.len(), sections.len());
        for (a, b) in loaded.iter().zip(&sections) {
            assert_eq!(a.id, b.id);
            assert_eq!(a.title, b.title);
            assert_eq!(a.expanded, b.expanded);
            assert_eq!(a.tasks, b.tasks);
            assert!(a.summary.is_none());
        }
    }

    #[test]
    fn snapshot_omits_summary() {
        let mut adapter = StorageAdapter::new(MemoryStore::new(), "todoSections");
        adapter.save(&sample()).unwrap();

        let raw = adapter.store().get("todoSections").unwrap().unwrap();
        assert!(!raw.contains("later.pdf"));
        assert!(!raw.contains("file://"));
        assert!(raw.contains("\"dueDate\":\"2024-01-01\""));
        assert!(raw.contains("\"isExpanded\":false"));
    }

    #[test]
    fn malformed_snapshot_is_corrupt() {
        let mut store = MemoryStore::new();
        store.set("todoSections", "[{\"id\": 3").unwrap();
        let adapter = StorageAdapter::new(store, "todoSections");
        assert!(matches!(adapter.load(), Err(StorageError::Corrupt(_))));
    }

    #[test]
    fn wrong_shape_is_corrupt() {
        let mut store = MemoryStore::new();
        store.set("todoSections", "{\"sections\": []}").unwrap();
        let adapter = StorageAdapter::new(store, "todoSections");
        assert!(matches!(adapter.load(), Err(StorageError::Corrupt(_))));
    }

    #[test]
    fn quota_failure_is_reported() {
        let mut adapter = StorageAdapter::new(MemoryStore::with_quota(16), "todoSections");
        let err = adapter.save(&sample()).unwrap_err();
        assert!(matches!(err, StorageError::QuotaExceeded { capacity: 16, .. }));
        assert!(adapter.store().get("todoSections").unwrap().is_none());
    }
}
