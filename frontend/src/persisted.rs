use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::Rc;

use log::warn;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::DashboardError;

pub const THEME_KEY: &str = "theme";
pub const FAVORITE_USERS_KEY: &str = "favUsers";

/// String key-value capability, e.g. browser `localStorage`.
pub trait KeyValue {
    fn get_item(&self, key: &str) -> Result<Option<String>, String>;
    fn set_item(&self, key: &str, value: &str) -> Result<(), String>;
}

/// Typed JSON access on top of a [`KeyValue`] capability.
#[derive(Clone)]
pub struct PersistentStore {
    backend: Rc<dyn KeyValue>,
}

impl PersistentStore {
    pub fn new(backend: Rc<dyn KeyValue>) -> Self {
        PersistentStore { backend }
    }

    /// Returns the value stored under `key`, or `default` when it is missing,
    /// unreadable or not valid JSON for `T`.
    pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        let raw = match self.backend.get_item(key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return default,
            Err(cause) => {
                warn!("reading {:?} failed, using default: {}", key, cause);
                return default;
            }
        };

        // a stored `null` counts as missing
        match serde_json::from_str::<Option<T>>(&raw) {
            Ok(Some(value)) => value,
            Ok(None) => default,
            Err(err) => {
                let corrupt = DashboardError::StorageCorrupt { key: key.to_owned() };
                warn!("{} ({}), using default", corrupt, err);
                default
            }
        }
    }

    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<(), DashboardError> {
        let write_failed = |cause: String| DashboardError::StorageWriteFailed {
            key: key.to_owned(),
            cause,
        };

        let encoded = serde_json::to_string(value).map_err(|err| write_failed(err.to_string()))?;
        self.backend.set_item(key, &encoded).map_err(write_failed)
    }
}

/// In-memory [`KeyValue`] for headless sessions and tests.
#[derive(Default)]
pub struct MemoryStore {
    items: RefCell<HashMap<String, String>>,
    fail_writes: Cell<bool>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items<'a>(items: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let store = Self::default();
        store.items.borrow_mut().extend(
            items
                .into_iter()
                .map(|(key, value)| (key.to_owned(), value.to_owned())),
        );
        store
    }

    /// Makes every following write fail, like a full browser quota.
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.set(fail);
    }

    pub fn raw(&self, key: &str) -> Option<String> {
        self.items.borrow().get(key).cloned()
    }
}

impl KeyValue for MemoryStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, String> {
        Ok(self.raw(key))
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), String> {
        if self.fail_writes.get() {
            return Err("quota exceeded".into());
        }
        self.items.borrow_mut().insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}
