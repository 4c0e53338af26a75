//! JSON file that remembers the best wave reached per save key.
//!
//! The file holds one record per level save key so several levels can share
//! a single save location. A missing or unreadable file is treated as a fresh
//! profile rather than an error.

use std::{
    collections::BTreeMap,
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
struct SaveRecord {
    best_wave: u32,
}

type SaveFile = BTreeMap<String, SaveRecord>;

/// Best-wave persistence backed by a JSON file.
#[derive(Clone, Debug)]
pub(crate) struct SaveStore {
    path: PathBuf,
}

impl SaveStore {
    pub(crate) fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub(crate) fn path(&self) -> &Path {
        &self.path
    }

    /// Best wave stored under `key`, or 0 when nothing usable is stored.
    pub(crate) fn load_best_wave(&self, key: &str) -> u32 {
        self.read()
            .get(key)
            .map_or(0, |record| record.best_wave)
    }

    /// Records `wave` under `key` unless a higher wave is already stored.
    ///
    /// Returns whether the file changed.
    pub(crate) fn store_best_wave(&self, key: &str, wave: u32) -> Result<bool> {
        let mut file = self.read();
        let record = file.entry(key.to_owned()).or_default();
        if record.best_wave >= wave {
            return Ok(false);
        }
        record.best_wave = wave;

        let json = serde_json::to_string_pretty(&file).context("failed to encode save file")?;
        fs::write(&self.path, json)
            .with_context(|| format!("failed to write save file {}", self.path.display()))?;
        tracing::info!(path = %self.path.display(), key, wave, "best wave saved");
        Ok(true)
    }

    fn read(&self) -> SaveFile {
        let contents = match fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(error) if error.kind() == ErrorKind::NotFound => return SaveFile::new(),
            Err(error) => {
                tracing::warn!(path = %self.path.display(), %error, "save file unreadable");
                return SaveFile::new();
            }
        };

        serde_json::from_str(&contents).unwrap_or_else(|error| {
            tracing::warn!(path = %self.path.display(), %error, "save file corrupt, ignoring it");
            SaveFile::new()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_reads_as_zero() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = SaveStore::new(dir.path().join("save.json"));
        assert_eq!(store.load_best_wave("td_save_v1"), 0);
    }

    #[test]
    fn corrupt_file_reads_as_zero_and_is_replaced() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("save.json");
        fs::write(&path, "{ not json").expect("write corrupt save");

        let store = SaveStore::new(&path);
        assert_eq!(store.load_best_wave("td_save_v1"), 0);
        assert!(store.store_best_wave("td_save_v1", 1).expect("store"));
        assert_eq!(store.load_best_wave("td_save_v1"), 1);
    }

    #[test]
    fn only_improvements_are_written() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = SaveStore::new(dir.path().join("save.json"));

        assert!(store.store_best_wave("td_save_v1", 2).expect("store"));
        assert!(!store.store_best_wave("td_save_v1", 1).expect("store"));
        assert!(!store.store_best_wave("td_save_v1", 2).expect("store"));
        assert_eq!(store.load_best_wave("td_save_v1"), 2);
    }

    #[test]
    fn keys_are_kept_apart() {
        let dir = tempfile::tempdir().expect("temp dir");
        let store = SaveStore::new(dir.path().join("save.json"));

        assert!(store.store_best_wave("meadow", 3).expect("store"));
        assert!(store.store_best_wave("canyon", 1).expect("store"));

        assert_eq!(store.load_best_wave("meadow"), 3);
        assert_eq!(store.load_best_wave("canyon"), 1);
        assert_eq!(store.load_best_wave("td_save_v1"), 0);

        let raw = fs::read_to_string(store.path()).expect("read save");
        let parsed: serde_json::Value = serde_json::from_str(&raw).expect("valid json");
        assert_eq!(parsed["meadow"]["best_wave"], 3);
    }
}
