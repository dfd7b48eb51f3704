use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::{HashSet, VecDeque};
use std::path::Path;

use super::JsonFile;
use crate::core::paths::{defaults, files};
use crate::error::CursorError;

/// Seen transaction hashes, oldest first.
///
/// Order is insertion order (processing order), which eviction relies on;
/// the set index keeps membership tests O(1).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TxCursor {
    order: VecDeque<String>,
    index: HashSet<String>,
}

impl TxCursor {
    pub fn new() -> Self { Self::default() }

    pub fn contains(&self, hash: &str) -> bool {
        self.index.contains(hash)
    }

    /// Append `hash` as the most recent entry. Returns false if already known.
    pub fn record(&mut self, hash: impl Into<String>) -> bool {
        let hash = hash.into();
        if self.index.contains(&hash) {
            return false;
        }
        self.index.insert(hash.clone());
        self.order.push_back(hash);
        true
    }

    pub fn len(&self) -> usize { self.order.len() }

    pub fn is_empty(&self) -> bool { self.order.is_empty() }

    /// Oldest to newest.
    pub fn hashes(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Keep only the `cap` most recently recorded hashes.
    pub fn truncate_to(&mut self, cap: usize) {
        while self.order.len() > cap {
            if let Some(evicted) = self.order.pop_front() {
                self.index.remove(&evicted);
            }
        }
    }
}

impl FromIterator<String> for TxCursor {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut cursor = TxCursor::new();
        for hash in iter {
            cursor.record(hash);
        }
        cursor
    }
}

impl Serialize for TxCursor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(self.order.iter())
    }
}

impl<'de> Deserialize<'de> for TxCursor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Vec::<String>::deserialize(deserializer)?.into_iter().collect())
    }
}

/// Transaction cursor persisted as a JSON array, capped at `cap` entries.
#[derive(Debug, Clone)]
pub struct TxCursorStore {
    file: JsonFile,
    cap: usize,
}

impl TxCursorStore {
    /// `cap` must be at least the feed's page size: a hash evicted while it
    /// is still on the page looks unseen on the next fetch.
    pub fn new(data_dir: &Path, cap: usize) -> Self {
        debug_assert!(cap > 0, "transaction cursor cap must be positive");
        Self { file: JsonFile::new(data_dir.join(files::TX_CACHE)), cap }
    }

    pub fn with_defaults(data_dir: &Path) -> Self {
        Self::new(data_dir, defaults::TX_CACHE_CAP)
    }

    pub fn cap(&self) -> usize { self.cap }

    pub fn path(&self) -> &Path { self.file.path() }

    pub fn load(&self) -> TxCursor {
        self.file.load_or_init()
    }

    pub fn peek(&self) -> Option<TxCursor> {
        self.file.peek()
    }

    /// Evicts the oldest hashes beyond the cap, then writes.
    pub fn save(&self, cursor: &mut TxCursor) -> Result<(), CursorError> {
        cursor.truncate_to(self.cap);
        self.file.store(cursor)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn record_is_idempotent_and_ordered() {
        let mut cursor = TxCursor::new();
        assert!(cursor.record("a"));
        assert!(cursor.record("b"));
        assert!(!cursor.record("a"));
        assert_eq!(cursor.hashes().collect::<Vec<_>>(), vec!["a", "b"]);
    }

    #[test]
    fn save_keeps_the_tail() {
        let dir = TempDir::new().unwrap();
        let store = TxCursorStore::new(dir.path(), 3);

        let mut cursor = store.load();
        for hash in ["h1", "h2", "h3", "h4", "h5"] {
            cursor.record(hash);
        }
        store.save(&mut cursor).unwrap();

        assert_eq!(cursor.len(), 3);
        assert!(!cursor.contains("h1"));
        assert!(!cursor.contains("h2"));
        let raw: Vec<String> = serde_json::from_str(&fs::read_to_string(store.path()).unwrap()).unwrap();
        assert_eq!(raw, vec!["h3", "h4", "h5"]);
    }

    #[test]
    fn never_exceeds_cap_across_many_saves() {
        let dir = TempDir::new().unwrap();
        let store = TxCursorStore::new(dir.path(), 100);

        for round in 0..7 {
            let mut cursor = store.load();
            for i in 0..40 {
                cursor.record(format!("r{round}-{i}"));
            }
            store.save(&mut cursor).unwrap();

            let reloaded = store.load();
            assert!(reloaded.len() <= 100);
            assert_eq!(reloaded.hashes().last(), Some(format!("r{round}-39").as_str()));
        }

        let last = store.load();
        assert_eq!(last.len(), 100);
        assert_eq!(last.hashes().next(), Some("r4-20"));
    }

    #[test]
    fn corrupt_file_loads_empty_and_recovers() {
        let dir = TempDir::new().unwrap();
        let store = TxCursorStore::with_defaults(dir.path());
        fs::write(store.path(), "\"not json").unwrap();

        let mut cursor = store.load();
        assert!(cursor.is_empty());

        cursor.record("fresh");
        store.save(&mut cursor).unwrap();
        assert_eq!(store.load().hashes().collect::<Vec<_>>(), vec!["fresh"]);
    }

    #[test]
    fn wrong_shape_is_treated_as_corruption() {
        let dir = TempDir::new().unwrap();
        let store = TxCursorStore::with_defaults(dir.path());
        fs::write(store.path(), "\"not json\"").unwrap();
        assert!(store.load().is_empty());

        fs::write(store.path(), r#"{"last": "0xabc"}"#).unwrap();
        assert!(store.load().is_empty());
    }
}
