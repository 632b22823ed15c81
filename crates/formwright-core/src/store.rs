#![forbid(unsafe_code)]

//! Key/value persistence for the field and response collections.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                          Store<B>                             │
//! │   - load::<T>(key) -> Vec<T>   (JSON array)                   │
//! │   - save::<T>(key, &[T])                                      │
//! │   - wipe()                     (whole backend)                │
//! └──────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌──────────────────────────────────────────────────────────────┐
//! │                     StorageBackend                            │
//! │   - MemoryStorage: in-memory (testing, headless hosts)        │
//! │   - FileStorage: JSON file (requires file-storage)            │
//! │   - WebStorage: localStorage / sessionStorage (wasm32)        │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! The store is a durability shadow: the in-memory models are the source of
//! truth and every mutation rewrites the affected collection in full.
//!
//! # Failure Modes
//!
//! | Failure | Cause | Behavior |
//! |---------|-------|----------|
//! | Missing key, `""`, `null` | First run, wiped store | Empty collection |
//! | `StorageError::Corruption` | Stored text is not a JSON array of `T` | Returned to caller |
//! | `StorageError::Io` | File backend I/O failure | Returned to caller |
//! | `StorageError::Unavailable` | Host has no storage | Returned to caller |

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;

// ─────────────────────────────────────────────────────────────────────────────
// Error Types
// ─────────────────────────────────────────────────────────────────────────────

/// Errors that can occur during storage operations.
#[derive(Debug)]
pub enum StorageError {
    /// I/O error during file operations.
    Io(std::io::Error),
    /// A collection could not be encoded.
    Serialization(String),
    /// Stored data is not valid for the expected collection.
    Corruption { key: String, message: String },
    /// The backend is not usable in this host.
    Unavailable(String),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageError::Io(e) => write!(f, "I/O error: {e}"),
            StorageError::Serialization(msg) => write!(f, "serialization error: {msg}"),
            StorageError::Corruption { key, message } => {
                write!(f, "storage corruption under {key:?}: {message}")
            }
            StorageError::Unavailable(msg) => write!(f, "storage unavailable: {msg}"),
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StorageError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e)
    }
}

/// Result type for storage operations.
pub type StorageResult<T> = Result<T, StorageError>;

// ─────────────────────────────────────────────────────────────────────────────
// Storage Backend Trait
// ─────────────────────────────────────────────────────────────────────────────

/// A string key/value store, shaped after the browser `Storage` API.
///
/// Backends are single-threaded; the builder never touches storage from more
/// than one place at a time.
pub trait StorageBackend {
    /// Human-readable name for logging.
    fn name(&self) -> &str;

    /// Read the raw value under `key`.
    fn get(&self, key: &str) -> StorageResult<Option<String>>;

    /// Write `value` under `key`, replacing any previous value.
    fn set(&self, key: &str, value: &str) -> StorageResult<()>;

    /// Remove the value under `key`. Missing keys are not an error.
    fn remove(&self, key: &str) -> StorageResult<()>;

    /// Remove every key held by this backend.
    fn clear(&self) -> StorageResult<()>;

    /// Check if the backend is available and functional.
    fn is_available(&self) -> bool {
        true
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Memory Storage (always available)
// ─────────────────────────────────────────────────────────────────────────────

/// In-memory storage backend.
///
/// Clones share the same underlying map, so a test can keep a handle while a
/// session owns another, or reopen a session over the same data to simulate
/// a page reload.
#[derive(Clone, Default)]
pub struct MemoryStorage {
    data: Rc<RefCell<BTreeMap<String, String>>>,
}

impl MemoryStorage {
    /// Create a new empty memory storage.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create memory storage pre-populated with raw entries.
    #[must_use]
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let data = entries
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self {
            data: Rc::new(RefCell::new(data)),
        }
    }

    /// Number of stored keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.borrow().len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.borrow().is_empty()
    }
}

impl StorageBackend for MemoryStorage {
    fn name(&self) -> &str {
        "MemoryStorage"
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        Ok(self.data.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.data
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.data.borrow_mut().remove(key);
        Ok(())
    }

    fn clear(&self) -> StorageResult<()> {
        self.data.borrow_mut().clear();
        Ok(())
    }
}

impl fmt::Debug for MemoryStorage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryStorage")
            .field("entries", &self.len())
            .finish()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// File Storage (requires file-storage feature)
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(feature = "file-storage")]
mod file_storage {
    use super::*;
    use std::fs::{self, File};
    use std::io::{BufReader, BufWriter, Write};
    use std::path::{Path, PathBuf};

    /// File-based backend holding every key in one JSON object.
    ///
    /// # File Format
    ///
    /// ```json
    /// {
    ///   "formFields": "[{\"id\":\"text-1\",...}]",
    ///   "formResponses": "[]"
    /// }
    /// ```
    ///
    /// Values are the same raw strings a browser store would hold. Writes go
    /// to `{path}.tmp` first and are renamed into place.
    pub struct FileStorage {
        path: PathBuf,
    }

    impl FileStorage {
        /// Create a file storage at the given path.
        ///
        /// The file does not need to exist; it will be created on first write.
        #[must_use]
        pub fn new(path: impl AsRef<Path>) -> Self {
            Self {
                path: path.as_ref().to_path_buf(),
            }
        }

        #[must_use]
        pub fn path(&self) -> &Path {
            &self.path
        }

        fn temp_path(&self) -> PathBuf {
            let mut tmp = self.path.clone();
            tmp.set_extension("json.tmp");
            tmp
        }

        fn read_map(&self) -> StorageResult<BTreeMap<String, String>> {
            if !self.path.exists() {
                return Ok(BTreeMap::new());
            }
            let reader = BufReader::new(File::open(&self.path)?);
            serde_json::from_reader(reader).map_err(|e| StorageError::Corruption {
                key: self.path.display().to_string(),
                message: format!("failed to parse store file: {e}"),
            })
        }

        fn write_map(&self, map: &BTreeMap<String, String>) -> StorageResult<()> {
            if let Some(parent) = self.path.parent() {
                fs::create_dir_all(parent)?;
            }
            let tmp_path = self.temp_path();
            {
                let mut writer = BufWriter::new(File::create(&tmp_path)?);
                serde_json::to_writer_pretty(&mut writer, map).map_err(|e| {
                    StorageError::Serialization(format!("failed to write store file: {e}"))
                })?;
                writer.flush()?;
                writer.get_ref().sync_all()?;
            }
            fs::rename(&tmp_path, &self.path)?;
            tracing::debug!(path = %self.path.display(), keys = map.len(), "store file written");
            Ok(())
        }
    }

    impl StorageBackend for FileStorage {
        fn name(&self) -> &str {
            "FileStorage"
        }

        fn get(&self, key: &str) -> StorageResult<Option<String>> {
            Ok(self.read_map()?.remove(key))
        }

        fn set(&self, key: &str, value: &str) -> StorageResult<()> {
            let mut map = self.read_map()?;
            map.insert(key.to_owned(), value.to_owned());
            self.write_map(&map)
        }

        fn remove(&self, key: &str) -> StorageResult<()> {
            let mut map = self.read_map()?;
            if map.remove(key).is_some() {
                self.write_map(&map)?;
            }
            Ok(())
        }

        fn clear(&self) -> StorageResult<()> {
            if self.path.exists() {
                fs::remove_file(&self.path)?;
            }
            Ok(())
        }

        fn is_available(&self) -> bool {
            match self.path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => {
                    parent.exists() || fs::create_dir_all(parent).is_ok()
                }
                _ => true,
            }
        }
    }

    impl fmt::Debug for FileStorage {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("FileStorage")
                .field("path", &self.path)
                .finish()
        }
    }
}

#[cfg(feature = "file-storage")]
pub use file_storage::FileStorage;

// ─────────────────────────────────────────────────────────────────────────────
// Typed Store
// ─────────────────────────────────────────────────────────────────────────────

/// Typed view over a backend: each key holds one JSON array.
#[derive(Debug, Clone)]
pub struct Store<B: StorageBackend> {
    backend: B,
}

impl<B: StorageBackend> Store<B> {
    #[must_use]
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    /// Load the collection under `key`.
    ///
    /// Absent keys, empty strings and JSON `null` read as an empty
    /// collection. Anything else that is not a JSON array of `T` is
    /// [`StorageError::Corruption`].
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> StorageResult<Vec<T>> {
        let Some(raw) = self.backend.get(key)? else {
            return Ok(Vec::new());
        };
        if raw.trim().is_empty() {
            return Ok(Vec::new());
        }
        let items: Option<Vec<T>> =
            serde_json::from_str(&raw).map_err(|e| StorageError::Corruption {
                key: key.to_owned(),
                message: e.to_string(),
            })?;
        let items = items.unwrap_or_default();
        tracing::debug!(backend = %self.backend.name(), key, count = items.len(), "collection loaded");
        Ok(items)
    }

    /// Replace the collection under `key`.
    pub fn save<T: Serialize>(&self, key: &str, items: &[T]) -> StorageResult<()> {
        let raw = serde_json::to_string(items)
            .map_err(|e| StorageError::Serialization(format!("{key}: {e}")))?;
        self.backend.set(key, &raw)?;
        tracing::trace!(backend = %self.backend.name(), key, count = items.len(), "collection saved");
        Ok(())
    }

    /// Wipe the whole backend, not just this store's keys.
    pub fn wipe(&self) -> StorageResult<()> {
        self.backend.clear()?;
        tracing::info!(backend = %self.backend.name(), "store wiped");
        Ok(())
    }

    #[must_use]
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Unwrap the backend.
    #[must_use]
    pub fn into_backend(self) -> B {
        self.backend
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn init_test_logging() {
        let _ = tracing_subscriber::fmt()
            .with_test_writer()
            .with_max_level(tracing::Level::TRACE)
            .try_init();
    }

    #[test]
    fn memory_storage_basic_operations() {
        let storage = MemoryStorage::new();
        assert_eq!(storage.get("k").unwrap(), None);

        storage.set("k", "v").unwrap();
        assert_eq!(storage.get("k").unwrap().as_deref(), Some("v"));

        storage.remove("k").unwrap();
        storage.remove("k").unwrap();
        assert!(storage.is_empty());
    }

    #[test]
    fn memory_storage_clones_share_data() {
        let a = MemoryStorage::new();
        let b = a.clone();
        a.set("x", "1").unwrap();
        assert_eq!(b.get("x").unwrap().as_deref(), Some("1"));
        b.clear().unwrap();
        assert!(a.is_empty());
    }

    #[test]
    fn load_treats_missing_empty_and_null_as_empty() {
        let store = Store::new(MemoryStorage::with_entries([("blank", ""), ("nil", "null")]));
        assert!(store.load::<String>("absent").unwrap().is_empty());
        assert!(store.load::<String>("blank").unwrap().is_empty());
        assert!(store.load::<String>("nil").unwrap().is_empty());
    }

    #[test]
    fn load_rejects_malformed_json() {
        init_test_logging();
        let store = Store::new(MemoryStorage::with_entries([("bad", "[1, 2")]));
        let err = store.load::<u32>("bad").unwrap_err();
        assert!(matches!(err, StorageError::Corruption { ref key, .. } if key == "bad"));
        assert!(err.to_string().contains("corruption"));
    }

    #[test]
    fn load_rejects_wrong_shape() {
        let store = Store::new(MemoryStorage::with_entries([("obj", r#"{"a":1}"#)]));
        assert!(store.load::<u32>("obj").is_err());
    }

    #[test]
    fn save_then_load() {
        let store = Store::new(MemoryStorage::new());
        store.save("nums", &[1u32, 2, 3]).unwrap();
        assert_eq!(store.backend().get("nums").unwrap().as_deref(), Some("[1,2,3]"));
        assert_eq!(store.load::<u32>("nums").unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn wipe_clears_foreign_keys_too() {
        let storage = MemoryStorage::with_entries([("other", "x")]);
        let store = Store::new(storage.clone());
        store.save("nums", &[1u32]).unwrap();
        store.wipe().unwrap();
        assert!(storage.is_empty());
    }

    #[test]
    fn storage_error_display() {
        let io_err = StorageError::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "missing"));
        assert!(io_err.to_string().contains("I/O error"));
        assert!(std::error::Error::source(&io_err).is_some());

        let unavail = StorageError::Unavailable("no window".into());
        assert!(unavail.to_string().contains("unavailable"));
    }
}
