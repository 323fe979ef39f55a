use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use futures_util::FutureExt;
use log::{debug, warn};

use crate::connection::{decode_entities, FetchCollection, ParentFilter};
use crate::entities::{Entity, Id};
use crate::error::DashboardError;
use crate::load_slot::{Begin, LoadFuture, LoadSlot, LoadState};

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expansion<T> {
    Expanded(Vec<T>),
    Collapsed,
}

struct Entry<T> {
    slot: LoadSlot<Rc<Vec<T>>>,
    items: Rc<Vec<T>>,
    expanded: bool,
}

struct Inner<T> {
    entries: HashMap<Id, Entry<T>>,
    generations: u64,
}

/// Dependents of parent entities (comments of a post), fetched on the first
/// expand of each parent and kept for the rest of the session.
pub struct SubResourceLoader<T: Entity> {
    inner: RefCell<Inner<T>>,
    fetcher: Rc<dyn FetchCollection>,
    parent_field: &'static str,
    preview: Option<usize>,
}

impl<T: Entity> SubResourceLoader<T> {
    pub fn new(
        fetcher: Rc<dyn FetchCollection>,
        parent_field: &'static str,
        preview: Option<usize>,
    ) -> Self {
        SubResourceLoader {
            inner: RefCell::new(Inner {
                entries: HashMap::new(),
                generations: 0,
            }),
            fetcher,
            parent_field,
            preview,
        }
    }

    pub fn load_state(&self, parent: Id) -> LoadState {
        self.inner
            .borrow()
            .entries
            .get(&parent)
            .map_or(LoadState::NotLoaded, |entry| entry.slot.state())
    }

    pub fn any_loading(&self) -> bool {
        self.inner
            .borrow()
            .entries
            .values()
            .any(|entry| entry.slot.state() == LoadState::Loading)
    }

    pub fn is_expanded(&self, parent: Id) -> bool {
        self.inner
            .borrow()
            .entries
            .get(&parent)
            .map_or(false, |entry| entry.expanded)
    }

    /// Parents currently shown expanded, in ascending id order.
    pub fn expanded(&self) -> Vec<Id> {
        let mut ids: Vec<Id> = self
            .inner
            .borrow()
            .entries
            .iter()
            .filter(|(_, entry)| entry.expanded)
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        ids
    }

    pub fn cached(&self, parent: Id) -> Option<Vec<T>> {
        let inner = self.inner.borrow();
        let entry = inner.entries.get(&parent)?;
        match entry.slot.state() {
            LoadState::Loaded => Some(entry.items.to_vec()),
            _ => None,
        }
    }

    /// Shows the dependents of `parent`, fetching them on first use.
    pub async fn expand(&self, parent: Id) -> Result<Vec<T>, DashboardError> {
        let (generation, pending) = {
            let mut inner = self.inner.borrow_mut();
            let Inner {
                entries,
                generations,
            } = &mut *inner;
            let entry = entries.entry(parent).or_insert_with(|| Entry {
                slot: LoadSlot::NotLoaded,
                items: Rc::new(Vec::new()),
                expanded: false,
            });

            match entry.slot.begin(generations, || self.start_fetch(parent)) {
                Begin::Ready => {
                    entry.expanded = true;
                    return Ok(entry.items.to_vec());
                }
                Begin::Wait {
                    generation, pending, ..
                } => (generation, pending),
            }
        };

        let outcome = pending.await;

        let mut inner = self.inner.borrow_mut();
        let Some(entry) = inner.entries.get_mut(&parent) else {
            return Err(DashboardError::NotFound(parent));
        };
        match outcome {
            Ok(items) => {
                if entry.slot.settle(generation, true) {
                    debug!("cached {} {} for {}", items.len(), T::KIND, parent);
                    entry.items = items;
                }
                entry.expanded = true;
                Ok(entry.items.to_vec())
            }
            Err(err) => {
                if entry.slot.settle(generation, false) {
                    warn!("{}", err);
                }
                Err(err)
            }
        }
    }

    /// Hides the dependents of `parent`. The cache is kept.
    pub fn collapse(&self, parent: Id) {
        if let Some(entry) = self.inner.borrow_mut().entries.get_mut(&parent) {
            entry.expanded = false;
        }
    }

    pub async fn toggle(&self, parent: Id) -> Result<Expansion<T>, DashboardError> {
        if self.is_expanded(parent) {
            self.collapse(parent);
            return Ok(Expansion::Collapsed);
        }
        self.expand(parent).await.map(Expansion::Expanded)
    }

    fn start_fetch(&self, parent: Id) -> LoadFuture<Rc<Vec<T>>> {
        let resource = T::KIND.resource_name();
        let filter = ParentFilter {
            field: self.parent_field,
            id: parent,
        };
        let request = self.fetcher.fetch_collection(resource, Some(filter));
        let preview = self.preview;

        async move {
            let payload = request
                .await
                .map_err(|err| DashboardError::fetch_failed(resource, err))?;
            let mut items = decode_entities::<T>(resource, payload)?;
            if let Some(preview) = preview {
                items.truncate(preview);
            }
            Ok(Rc::new(items))
        }
        .boxed_local()
    }
}
