use serde::de::Error as _;
use std::path::{Path, PathBuf};

use super::{KeyValueStore, StorageError};

/// One JSON file per key under a data directory.
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{}.json", key))
    }
}

impl KeyValueStore for FileStore {
    /// A file that exists but is not UTF-8 is a corrupt snapshot, not a read failure.
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let bytes = match std::fs::read(self.path_for(key)) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(StorageError::Read(e)),
        };
        String::from_utf8(bytes)
            .map(Some)
            .map_err(|e| StorageError::Corrupt(serde_json::Error::custom(e)))
    }

    /// Writes a sibling temp file and renames it over the old value, so a
    /// failed write leaves the previous snapshot intact.
    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        std::fs::create_dir_all(&self.dir).map_err(StorageError::Write)?;
        let path = self.path_for(key);
        let tmp = self.dir.join(format!(".{}.json.tmp", key));
        std::fs::write(&tmp, value).map_err(StorageError::Write)?;
        std::fs::rename(&tmp, &path).map_err(StorageError::Write)
    }
}
