use reso_core::{BlobStore, StorageError};
use web_sys as web;

/// `window.localStorage` as a blob backend.
pub struct LocalStorage;

impl LocalStorage {
    fn storage() -> Result<web::Storage, StorageError> {
        web::window()
            .and_then(|w| w.local_storage().ok().flatten())
            .ok_or_else(|| StorageError::Backend("localStorage unavailable".into()))
    }
}

impl BlobStore for LocalStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Self::storage()?
            .get_item(key)
            .map_err(|e| StorageError::Backend(format!("{e:?}")))
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        Self::storage()?
            .set_item(key, &value)
            .map_err(|e| StorageError::Backend(format!("{e:?}")))
    }
}
