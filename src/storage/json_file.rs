//! Durable storage adapter: one JSON file per collection.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::Storage;
use crate::error::AppResult;

/// Stores each collection as `<data_dir>/<collection>.json`.
pub struct JsonFileStorage {
    dir: PathBuf,
}

impl JsonFileStorage {
    /// Open (creating if needed) the data directory.
    pub fn open(dir: impl AsRef<Path>) -> AppResult<Self> {
        let dir = dir.as_ref().to_path_buf();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    fn path(&self, collection: &str) -> PathBuf {
        self.dir.join(format!("{}.json", collection))
    }
}

impl Storage for JsonFileStorage {
    fn load(&self, collection: &str) -> AppResult<Option<String>> {
        match fs::read_to_string(self.path(collection)) {
            Ok(document) => Ok(Some(document)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn save(&self, collection: &str, document: &str) -> AppResult<()> {
        fs::write(self.path(collection), document)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_returns_none_before_first_save() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::open(dir.path()).unwrap();
        assert!(storage.load("students").unwrap().is_none());
    }

    #[test]
    fn save_then_load_roundtrips_and_replaces() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::open(dir.path()).unwrap();

        storage.save("equipment", "[1]").unwrap();
        assert_eq!(storage.load("equipment").unwrap().as_deref(), Some("[1]"));

        storage.save("equipment", "[1,2]").unwrap();
        assert_eq!(storage.load("equipment").unwrap().as_deref(), Some("[1,2]"));

        assert!(dir.path().join("equipment.json").exists());
    }
}
