use futures_util::future::{LocalBoxFuture, Shared};
use futures_util::FutureExt;

use crate::error::DashboardError;

pub type LoadFuture<V> = LocalBoxFuture<'static, Result<V, DashboardError>>;
pub type PendingLoad<V> = Shared<LoadFuture<V>>;

#[derive(Hash, Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoadState {
    NotLoaded,
    Loading,
    Loaded,
}

/// Load-once state for a single key.
///
/// While `Loading` the slot keeps the shared pending future, so every caller
/// that arrives before it resolves awaits the same request.
pub(crate) enum LoadSlot<V> {
    NotLoaded,
    Loading { generation: u64, pending: PendingLoad<V> },
    Loaded,
}

pub(crate) enum Begin<V> {
    /// Already loaded, nothing to await.
    Ready,
    Wait {
        generation: u64,
        pending: PendingLoad<V>,
        /// True for the caller that issued the request.
        started: bool,
    },
}

impl<V: Clone> LoadSlot<V> {
    pub fn state(&self) -> LoadState {
        match self {
            LoadSlot::NotLoaded => LoadState::NotLoaded,
            LoadSlot::Loading { .. } => LoadState::Loading,
            LoadSlot::Loaded => LoadState::Loaded,
        }
    }

    /// Joins the in-flight load, or calls `start` when idle. `counter` hands
    /// out generations and is shared by every slot of one owner.
    pub fn begin(&mut self, counter: &mut u64, start: impl FnOnce() -> LoadFuture<V>) -> Begin<V> {
        match self {
            LoadSlot::Loaded => Begin::Ready,
            LoadSlot::Loading { generation, pending } => Begin::Wait {
                generation: *generation,
                pending: pending.clone(),
                started: false,
            },
            LoadSlot::NotLoaded => {
                *counter += 1;
                let pending = start().shared();
                *self = LoadSlot::Loading {
                    generation: *counter,
                    pending: pending.clone(),
                };
                Begin::Wait {
                    generation: *counter,
                    pending,
                    started: true,
                }
            }
        }
    }

    /// Applies the outcome of load `generation`. Only the first waiter of the
    /// current load gets `true` and must store the loaded data; stale waiters
    /// leave the slot alone.
    pub fn settle(&mut self, generation: u64, succeeded: bool) -> bool {
        match self {
            LoadSlot::Loading { generation: current, .. } if *current == generation => {
                *self = if succeeded {
                    LoadSlot::Loaded
                } else {
                    LoadSlot::NotLoaded
                };
                true
            }
            _ => false,
        }
    }
}
