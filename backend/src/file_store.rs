use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};

use dashboard_frontend::KeyValue;

/// Key-value storage kept in a single JSON object on disk.
///
/// The whole file is rewritten on every write.
pub struct FileStore {
    path: PathBuf,
    items: RefCell<BTreeMap<String, String>>,
}

impl FileStore {
    /// Opens `path`. A missing or unreadable file starts an empty store.
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();

        let items = match fs::read_to_string(&path) {
            Ok(raw) => serde_json::from_str(&raw).unwrap_or_else(|err| {
                warn!("ignoring unreadable store {}: {}", path.display(), err);
                BTreeMap::new()
            }),
            Err(_) => {
                info!("starting a new store at {}", path.display());
                BTreeMap::new()
            }
        };

        FileStore {
            path,
            items: RefCell::new(items),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn write(&self, items: &BTreeMap<String, String>) -> Result<(), String> {
        let encoded = serde_json::to_string_pretty(items).map_err(|err| err.to_string())?;
        fs::write(&self.path, encoded).map_err(|err| err.to_string())
    }
}

impl KeyValue for FileStore {
    fn get_item(&self, key: &str) -> Result<Option<String>, String> {
        Ok(self.items.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> Result<(), String> {
        let mut items = self.items.borrow().clone();
        items.insert(key.to_owned(), value.to_owned());
        self.write(&items)?;
        *self.items.borrow_mut() = items;
        Ok(())
    }
}
