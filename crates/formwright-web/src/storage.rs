#![forbid(unsafe_code)]

//! `localStorage` / `sessionStorage` backend.

use formwright_core::{StorageBackend, StorageError, StorageResult};
use formwright_runtime::StorageArea;
use wasm_bindgen::JsValue;
use web_sys::Storage;

use crate::WebBackendError;

/// Browser `Storage` area as a [`StorageBackend`].
#[derive(Debug, Clone)]
pub struct WebStorage {
    storage: Storage,
    area: StorageArea,
}

impl WebStorage {
    /// Open the given storage area of the current window.
    pub fn open(area: StorageArea) -> Result<Self, WebBackendError> {
        let window = web_sys::window()
            .ok_or_else(|| WebBackendError::StorageUnavailable("no window".into()))?;
        let storage = match area {
            StorageArea::Local => window.local_storage(),
            StorageArea::Session => window.session_storage(),
        }
        .map_err(|e| WebBackendError::StorageUnavailable(describe(&e)))?
        .ok_or_else(|| WebBackendError::StorageUnavailable(format!("{area:?} storage disabled")))?;
        Ok(Self { storage, area })
    }
}

fn describe(e: &JsValue) -> String {
    e.as_string().unwrap_or_else(|| format!("{e:?}"))
}

fn unavailable(e: JsValue) -> StorageError {
    StorageError::Unavailable(describe(&e))
}

impl StorageBackend for WebStorage {
    fn name(&self) -> &str {
        match self.area {
            StorageArea::Local => "localStorage",
            StorageArea::Session => "sessionStorage",
        }
    }

    fn get(&self, key: &str) -> StorageResult<Option<String>> {
        self.storage.get_item(key).map_err(unavailable)
    }

    fn set(&self, key: &str, value: &str) -> StorageResult<()> {
        self.storage.set_item(key, value).map_err(unavailable)
    }

    fn remove(&self, key: &str) -> StorageResult<()> {
        self.storage.remove_item(key).map_err(unavailable)
    }

    fn clear(&self) -> StorageResult<()> {
        self.storage.clear().map_err(unavailable)
    }

    fn is_available(&self) -> bool {
        self.storage.length().is_ok()
    }
}
