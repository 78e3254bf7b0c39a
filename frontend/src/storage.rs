use gloo_utils::window;
use web_sys::Storage;
use workout_tracker_lib::storage::{KeyValueStorage, MemoryStorage, StorageError};

/// The browser's local storage, or memory when the browser refuses it
/// (private windows, disabled cookies).
pub enum BrowserStorage {
    Local(Storage),
    Memory(MemoryStorage),
}

impl BrowserStorage {
    pub fn open() -> Self {
        match window().local_storage() {
            Ok(Some(storage)) => Self::Local(storage),
            _ => {
                tracing::warn!("Local storage unavailable, workouts will not survive a reload");
                Self::Memory(MemoryStorage::new())
            }
        }
    }
}

impl KeyValueStorage for BrowserStorage {
    fn get(&self, key: &str) -> Option<String> {
        match self {
            Self::Local(storage) => storage.get_item(key).ok().flatten(),
            Self::Memory(storage) => storage.get(key),
        }
    }

    fn set(&mut self, key: &str, value: String) -> Result<(), StorageError> {
        match self {
            Self::Local(storage) => {
                storage.set_item(key, &value).map_err(|err| StorageError::WriteFailed {
                    key: key.to_owned(),
                    reason: format!("{err:?}"),
                })
            }
            Self::Memory(storage) => storage.set(key, value),
        }
    }

    fn remove(&mut self, key: &str) {
        match self {
            Self::Local(storage) => {
                if let Err(err) = storage.remove_item(key) {
                    tracing::error!("Failed to remove {key}: {err:?}");
                }
            }
            Self::Memory(storage) => storage.remove(key),
        }
    }
}
