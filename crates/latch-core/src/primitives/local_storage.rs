use std::rc::Rc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::cell::StateCell;
use crate::error::StorageError;
use crate::hooks::{hook_scope, use_cell, with_key};
use crate::store::KeyValueStore;

/// State mirrored into a key-value store under a fixed key.
pub struct StoredState<T> {
    value: T,
    cell: StateCell<T>,
    store: Rc<dyn KeyValueStore>,
    key: Rc<str>,
}

/// Create or retrieve state backed by `store[key]`.
///
/// The stored JSON is read when the slot is created; a missing key or an
/// unparsable value falls back to `initial`. The slot belongs to `key`, so
/// passing a different key starts over from that key's stored value. Every
/// write through the returned handle is persisted synchronously under the key
/// it was read from. A failed write is logged and the in-memory value is kept.
///
/// ```ignore
/// let theme = use_local_storage(&store, "theme", || Theme::Light);
/// theme.set(Theme::Dark);
/// ```
#[track_caller]
pub fn use_local_storage<T>(
    store: &Rc<dyn KeyValueStore>,
    key: &str,
    initial: impl FnOnce() -> T,
) -> StoredState<T>
where
    T: Serialize + DeserializeOwned + Clone + 'static,
{
    hook_scope(|| {
        with_key(key, || {
            let cell = use_cell(|| load_or_default(store.as_ref(), key, initial));
            StoredState {
                value: cell.get(),
                cell,
                store: Rc::clone(store),
                key: Rc::from(key),
            }
        })
    })
}

/// Read and parse `key`, falling back to `default` on any failure.
pub fn load_or_default<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    key: &str,
    default: impl FnOnce() -> T,
) -> T {
    let parsed = store.get(key).and_then(|raw| {
        serde_json::from_str(&raw).map_err(|e| StorageError::Parse {
            key: key.to_string(),
            message: e.to_string(),
        })
    });

    match parsed {
        Ok(value) => value,
        Err(StorageError::NotFound { .. }) => {
            tracing::debug!(key, "nothing stored, using default");
            default()
        }
        Err(err) => {
            tracing::warn!(key, "unreadable stored value, using default: {}", err);
            default()
        }
    }
}

impl<T> StoredState<T>
where
    T: Serialize + Clone + 'static,
{
    /// The value for this render.
    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Replace the value and persist it.
    pub fn set(&self, value: T) {
        self.cell.set(value);
        self.persist();
    }

    /// Compute the next value from the latest one and persist it.
    pub fn update(&self, f: impl FnOnce(&T) -> T) {
        self.cell.update(f);
        self.persist();
    }

    /// Delete the key from the store. The in-memory value is unchanged.
    pub fn remove(&self) {
        if let Err(err) = self.store.remove(&self.key) {
            tracing::warn!(key = %self.key, "failed to remove stored value: {}", err);
        }
    }

    fn persist(&self) {
        let latest = self.cell.latest();
        let result = serde_json::to_string(&latest)
            .map_err(|e| StorageError::Write {
                key: self.key.to_string(),
                message: e.to_string(),
            })
            .and_then(|raw| self.store.set(&self.key, &raw));

        if let Err(err) = result {
            tracing::warn!(key = %self.key, "failed to persist value: {}", err);
        }
    }
}

impl<T: Clone> Clone for StoredState<T> {
    fn clone(&self) -> Self {
        Self {
            value: self.value.clone(),
            cell: self.cell.clone(),
            store: Rc::clone(&self.store),
            key: Rc::clone(&self.key),
        }
    }
}
