use std::cell::RefCell;
use std::rc::Rc;

use futures_util::FutureExt;
use log::{debug, info, warn};

use crate::connection::{decode_entities, FetchCollection};
use crate::entities::{Creatable, Editable, Entity, Id};
use crate::error::DashboardError;
use crate::load_slot::{Begin, LoadFuture, LoadSlot, LoadState};
use crate::overlay::Overlay;

#[derive(Clone)]
struct Baseline<T> {
    items: Rc<Vec<T>>,
    // length before the display cap was applied
    remote_total: usize,
}

struct Inner<T> {
    slot: LoadSlot<Baseline<T>>,
    // count-only loads for the dashboard; never settles `slot`
    count_slot: LoadSlot<usize>,
    generations: u64,
    overlay: Overlay<T>,
    remote_total: Option<usize>,
}

/// One remote collection, fetched at most once per session, with the local
/// overlay applied on top.
pub struct RemoteCollection<T: Entity> {
    inner: RefCell<Inner<T>>,
    fetcher: Rc<dyn FetchCollection>,
    limit: Option<usize>,
}

impl<T: Entity> RemoteCollection<T> {
    /// `limit` caps how many fetched entities are kept.
    pub fn new(fetcher: Rc<dyn FetchCollection>, limit: Option<usize>, local_id_seed: Id) -> Self {
        RemoteCollection {
            inner: RefCell::new(Inner {
                slot: LoadSlot::NotLoaded,
                count_slot: LoadSlot::NotLoaded,
                generations: 0,
                overlay: Overlay::new(local_id_seed),
                remote_total: None,
            }),
            fetcher,
            limit,
        }
    }

    pub fn load_state(&self) -> LoadState {
        self.inner.borrow().slot.state()
    }

    /// State of the count-only load started by [`Self::ensure_counted`].
    pub fn count_state(&self) -> LoadState {
        self.inner.borrow().count_slot.state()
    }

    /// Number of entities the remote reported, before the cap.
    pub fn remote_total(&self) -> Option<usize> {
        self.inner.borrow().remote_total
    }

    /// The current sequence, if the baseline has been loaded.
    pub fn cached(&self) -> Option<Vec<T>> {
        let inner = self.inner.borrow();
        match inner.slot.state() {
            LoadState::Loaded => Some(inner.overlay.items().to_vec()),
            _ => None,
        }
    }

    /// The current sequence whatever the load state.
    pub fn snapshot(&self) -> Vec<T> {
        self.inner.borrow().overlay.items().to_vec()
    }

    pub fn find(&self, id: Id) -> Option<T> {
        self.inner.borrow().overlay.find(id).cloned()
    }

    /// Returns the collection, fetching it first if it was never loaded.
    ///
    /// Callers arriving while a fetch is in flight share its outcome. A
    /// failed fetch leaves the collection `NotLoaded` so a later call retries.
    pub async fn ensure_loaded(&self) -> Result<Vec<T>, DashboardError> {
        let begin = {
            let mut inner = self.inner.borrow_mut();
            let Inner {
                slot, generations, ..
            } = &mut *inner;
            slot.begin(generations, || self.start_fetch())
        };

        let (generation, pending) = match begin {
            Begin::Ready => return Ok(self.snapshot()),
            Begin::Wait {
                generation,
                pending,
                started,
            } => {
                if started {
                    debug!("fetching {}", T::KIND);
                } else {
                    debug!("{} already in flight, waiting", T::KIND);
                }
                (generation, pending)
            }
        };

        let outcome = pending.await;

        let mut inner = self.inner.borrow_mut();
        match outcome {
            Ok(baseline) => {
                if inner.slot.settle(generation, true) {
                    inner.remote_total = Some(baseline.remote_total);
                    inner.overlay.extend_baseline(baseline.items.iter().cloned());
                    info!(
                        "loaded {} {} ({} remote)",
                        baseline.items.len(),
                        T::KIND,
                        baseline.remote_total
                    );
                }
                Ok(inner.overlay.items().to_vec())
            }
            Err(err) => {
                if inner.slot.settle(generation, false) {
                    warn!("{}", err);
                }
                Err(err)
            }
        }
    }

    /// Returns the remote total, fetching the collection only to count it
    /// when no total is known yet.
    ///
    /// The fetched entities are not kept, so the collection stays
    /// `NotLoaded` and its first [`Self::ensure_loaded`] still fetches.
    pub async fn ensure_counted(&self) -> Result<usize, DashboardError> {
        let begin = {
            let mut inner = self.inner.borrow_mut();
            if let Some(total) = inner.remote_total {
                return Ok(total);
            }
            let Inner {
                count_slot,
                generations,
                ..
            } = &mut *inner;
            count_slot.begin(generations, || self.start_count())
        };

        let (generation, pending) = match begin {
            Begin::Ready => return Ok(self.remote_total().unwrap_or_default()),
            Begin::Wait {
                generation, pending, ..
            } => (generation, pending),
        };

        let outcome = pending.await;

        let mut inner = self.inner.borrow_mut();
        let settled = inner.count_slot.settle(generation, outcome.is_ok());
        match outcome {
            Ok(total) => {
                // a baseline that landed meanwhile already knows the total
                let total = *inner.remote_total.get_or_insert(total);
                if settled {
                    debug!("counted {} {}", total, T::KIND);
                }
                Ok(total)
            }
            Err(err) => {
                if settled {
                    warn!("{}", err);
                }
                Err(err)
            }
        }
    }

    fn start_count(&self) -> LoadFuture<usize> {
        let resource = T::KIND.resource_name();
        let request = self.fetcher.fetch_collection(resource, None);

        async move {
            let payload = request
                .await
                .map_err(|err| DashboardError::fetch_failed(resource, err))?;
            Ok(decode_entities::<T>(resource, payload)?.len())
        }
        .boxed_local()
    }

    fn start_fetch(&self) -> LoadFuture<Baseline<T>> {
        let resource = T::KIND.resource_name();
        let request = self.fetcher.fetch_collection(resource, None);
        let limit = self.limit;

        async move {
            let payload = request
                .await
                .map_err(|err| DashboardError::fetch_failed(resource, err))?;
            let mut items = decode_entities::<T>(resource, payload)?;
            let remote_total = items.len();
            if let Some(limit) = limit {
                items.truncate(limit);
            }
            Ok(Baseline {
                items: Rc::new(items),
                remote_total,
            })
        }
        .boxed_local()
    }

    pub fn delete(&self, id: Id) -> bool {
        self.inner.borrow_mut().overlay.delete(id)
    }
}

impl<T: Editable> RemoteCollection<T> {
    pub fn edit(&self, id: Id, patch: T::Patch) -> Result<(), DashboardError> {
        self.inner.borrow_mut().overlay.edit(id, patch)
    }
}

impl<T: Creatable> RemoteCollection<T> {
    pub fn add(&self, draft: T::Draft) -> Id {
        self.inner.borrow_mut().overlay.add(draft)
    }
}
