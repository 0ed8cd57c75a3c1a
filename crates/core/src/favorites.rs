//! Favorite conditions.
//!
//! Favorites are a set of condition ids persisted under a single storage key as a JSON array of
//! strings. The set is loaded once at startup and fully rewritten on every toggle.
//!
//! ## Storage
//!
//! [`KeyValueStorage`] is the persistence seam. Two backends ship with the crate:
//!
//! - [`JsonFileStorage`]: one file per key under a directory, replaced atomically via rename
//! - [`MemoryStorage`]: in-process only, used by tests and ephemeral sessions
//!
//! ## Failure semantics
//!
//! Unreadable or malformed persisted data loads as an empty set. A failed write during
//! [`Favorites::toggle`] is logged, rolled back in memory and returned to the caller, so the
//! in-memory set never drifts from what is stored.

use crate::constants::FAVORITES_STORAGE_KEY;
use crate::error::{CatalogError, CatalogResult};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

/// String key-value persistence.
pub trait KeyValueStorage {
    /// Returns the stored value, or `None` when the key has never been written.
    fn get(&self, key: &str) -> CatalogResult<Option<String>>;

    /// Replaces the value stored under `key`.
    fn set(&self, key: &str, value: &str) -> CatalogResult<()>;
}

impl<T: KeyValueStorage + ?Sized> KeyValueStorage for Box<T> {
    fn get(&self, key: &str) -> CatalogResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> CatalogResult<()> {
        (**self).set(key, value)
    }
}

/// Stores each key as `<dir>/<key>.json`.
#[derive(Clone, Debug)]
pub struct JsonFileStorage {
    dir: PathBuf,
}

impl JsonFileStorage {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }
}

impl KeyValueStorage for JsonFileStorage {
    fn get(&self, key: &str) -> CatalogResult<Option<String>> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(contents) => Ok(Some(contents)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(CatalogError::FavoritesRead(e)),
        }
    }

    fn set(&self, key: &str, value: &str) -> CatalogResult<()> {
        fs::create_dir_all(&self.dir).map_err(CatalogError::FavoritesWrite)?;

        let path = self.path_for(key);
        let tmp = self.dir.join(format!(".{key}.json.tmp"));
        fs::write(&tmp, value).map_err(CatalogError::FavoritesWrite)?;
        fs::rename(&tmp, &path).map_err(|e| {
            let _ = fs::remove_file(&tmp);
            CatalogError::FavoritesWrite(e)
        })
    }
}

#[derive(Debug, Default)]
pub struct MemoryStorage {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStorage for MemoryStorage {
    fn get(&self, key: &str) -> CatalogResult<Option<String>> {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        Ok(values.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> CatalogResult<()> {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// The user's favorite condition ids backed by a [`KeyValueStorage`].
#[derive(Debug)]
pub struct Favorites<S> {
    storage: S,
    ids: BTreeSet<String>,
}

impl<S: KeyValueStorage> Favorites<S> {
    /// Loads the persisted set.
    ///
    /// Never fails: a missing key, a read error or a value that is not a JSON array of strings
    /// all yield an empty set.
    pub fn load(storage: S) -> Self {
        let ids = match storage.get(FAVORITES_STORAGE_KEY) {
            Ok(Some(raw)) => match serde_json::from_str::<Vec<String>>(&raw) {
                Ok(ids) => ids.into_iter().collect(),
                Err(e) => {
                    tracing::warn!("ignoring malformed persisted favorites: {}", e);
                    BTreeSet::new()
                }
            },
            Ok(None) => BTreeSet::new(),
            Err(e) => {
                tracing::warn!("could not read persisted favorites: {}", e);
                BTreeSet::new()
            }
        };

        Self { storage, ids }
    }

    /// Flips membership of `condition_id` and persists the full set.
    ///
    /// # Returns
    ///
    /// `true` if the condition is a favorite after the call.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::FavoritesSerialization` or `CatalogError::FavoritesWrite` if the
    /// set could not be stored. The membership change is undone before returning.
    pub fn toggle(&mut self, condition_id: &str) -> CatalogResult<bool> {
        let now_favorite = if self.ids.remove(condition_id) {
            false
        } else {
            self.ids.insert(condition_id.to_string());
            true
        };

        if let Err(e) = self.persist() {
            tracing::error!("failed to persist favorites, rolling back: {}", e);
            if now_favorite {
                self.ids.remove(condition_id);
            } else {
                self.ids.insert(condition_id.to_string());
            }
            return Err(e);
        }

        Ok(now_favorite)
    }

    pub fn count(&self) -> usize {
        self.ids.len()
    }

    pub fn contains(&self, condition_id: &str) -> bool {
        self.ids.contains(condition_id)
    }

    pub fn ids(&self) -> &BTreeSet<String> {
        &self.ids
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn persist(&self) -> CatalogResult<()> {
        let ids: Vec<&str> = self.ids.iter().map(String::as_str).collect();
        let raw = serde_json::to_string(&ids).map_err(CatalogError::FavoritesSerialization)?;
        self.storage.set(FAVORITES_STORAGE_KEY, &raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    /// Storage whose writes always fail.
    struct ReadOnlyStorage(Option<String>);

    impl KeyValueStorage for ReadOnlyStorage {
        fn get(&self, _key: &str) -> CatalogResult<Option<String>> {
            Ok(self.0.clone())
        }

        fn set(&self, _key: &str, _value: &str) -> CatalogResult<()> {
            Err(CatalogError::FavoritesWrite(std::io::Error::new(
                ErrorKind::PermissionDenied,
                "read-only",
            )))
        }
    }

    fn stored_ids<S: KeyValueStorage>(storage: &S) -> Vec<String> {
        let raw = storage
            .get(FAVORITES_STORAGE_KEY)
            .expect("get should succeed")
            .expect("value should exist");
        serde_json::from_str(&raw).expect("stored value should be a JSON array")
    }

    #[test]
    fn test_load_missing_key_is_empty() {
        let favorites = Favorites::load(MemoryStorage::new());
        assert_eq!(favorites.count(), 0);
    }

    #[test]
    fn test_load_malformed_value_is_empty() {
        let storage = MemoryStorage::new();
        storage
            .set(FAVORITES_STORAGE_KEY, "{not json")
            .expect("set should succeed");
        assert_eq!(Favorites::load(storage).count(), 0);

        let storage = MemoryStorage::new();
        storage
            .set(FAVORITES_STORAGE_KEY, "{\"asma\": true}")
            .expect("set should succeed");
        assert_eq!(Favorites::load(storage).count(), 0);
    }

    #[test]
    fn test_toggle_adds_and_persists() {
        let mut favorites = Favorites::load(MemoryStorage::new());

        assert!(favorites.toggle("asma").expect("toggle should succeed"));
        assert!(favorites.contains("asma"));
        assert_eq!(favorites.count(), 1);
        assert_eq!(stored_ids(favorites.storage()), vec!["asma"]);
    }

    #[test]
    fn test_toggle_twice_restores_original_state() {
        let storage = MemoryStorage::new();
        storage
            .set(FAVORITES_STORAGE_KEY, "[\"rinite\"]")
            .expect("set should succeed");
        let mut favorites = Favorites::load(storage);

        favorites.toggle("asma").expect("first toggle should succeed");
        favorites.toggle("asma").expect("second toggle should succeed");

        assert!(!favorites.contains("asma"));
        assert_eq!(favorites.count(), 1);
        assert_eq!(stored_ids(favorites.storage()), vec!["rinite"]);
    }

    #[test]
    fn test_failed_write_rolls_back() {
        let mut favorites = Favorites::load(ReadOnlyStorage(Some("[\"rinite\"]".into())));

        let err = favorites.toggle("asma").expect_err("toggle should fail");
        assert!(matches!(err, CatalogError::FavoritesWrite(_)));
        assert!(!favorites.contains("asma"));

        favorites.toggle("rinite").expect_err("toggle should fail");
        assert!(favorites.contains("rinite"));
        assert_eq!(favorites.count(), 1);
    }

    #[test]
    fn test_file_storage_survives_reload() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let data_dir = temp_dir.path().join("nested").join("data");

        let mut favorites = Favorites::load(JsonFileStorage::new(&data_dir));
        favorites.toggle("asma").expect("toggle should succeed");
        favorites.toggle("azia").expect("toggle should succeed");

        let storage = JsonFileStorage::new(&data_dir);
        assert!(storage.path_for(FAVORITES_STORAGE_KEY).is_file());

        let reloaded = Favorites::load(storage);
        assert_eq!(reloaded.count(), 2);
        assert!(reloaded.contains("asma"));
        assert!(reloaded.contains("azia"));
    }

    #[test]
    fn test_file_storage_missing_file_reads_none() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let storage = JsonFileStorage::new(temp_dir.path());

        assert_eq!(storage.get("absent").expect("get should succeed"), None);
    }
}
