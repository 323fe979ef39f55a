use std::collections::HashSet;

use log::{info, warn};

use crate::entities::{Creatable, Editable, Entity, Id};
use crate::error::DashboardError;

/// First id handed out to locally created entities, well above any id the
/// placeholder API uses.
pub const LOCAL_ID_SEED: Id = 100_000;

/// A collection plus the local edits applied to it.
///
/// Nothing here is written back to the network.
#[derive(Clone, Debug)]
pub struct Overlay<T> {
    items: Vec<T>,
    next_local_id: Id,
}

impl<T: Entity> Overlay<T> {
    pub fn new(seed: Id) -> Self {
        Overlay {
            items: Vec::new(),
            next_local_id: seed,
        }
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn find(&self, id: Id) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Removes the entity with `id`. Deleting an id that is not present is a
    /// no-op and returns `false`.
    pub fn delete(&mut self, id: Id) -> bool {
        let before = self.items.len();
        self.items.retain(|item| item.id() != id);
        before != self.items.len()
    }

    /// Appends a fetched baseline after any entities created before it landed.
    ///
    /// Everything already held is local. A local entity whose id shows up in
    /// the baseline is renumbered above it, and the counter moves past every
    /// remote id. A remote id of `Id::MAX` leaves no room for local ids and
    /// is dropped, as are repeated remote ids.
    pub(crate) fn extend_baseline(&mut self, baseline: impl IntoIterator<Item = T>) {
        let mut remote = Vec::new();
        let mut remote_ids = HashSet::new();

        for item in baseline {
            let id = item.id();
            let Some(above) = id.checked_add(1) else {
                warn!("dropping {} id {}: no local ids left above it", T::KIND, id);
                continue;
            };
            if !remote_ids.insert(id) {
                warn!("dropping duplicate {} id {}", T::KIND, id);
                continue;
            }
            self.next_local_id = self.next_local_id.max(above);
            remote.push(item);
        }

        for item in self.items.iter_mut() {
            let id = item.id();
            if remote_ids.contains(&id) {
                let renumbered = self.next_local_id;
                self.next_local_id = renumbered.saturating_add(1);
                item.set_id(renumbered);
                info!("local {} {} renumbered to {}", T::KIND, id, renumbered);
            }
        }

        self.items.extend(remote);
    }
}

impl<T: Editable> Overlay<T> {
    pub fn edit(&mut self, id: Id, patch: T::Patch) -> Result<(), DashboardError> {
        let item = self
            .items
            .iter_mut()
            .find(|item| item.id() == id)
            .ok_or(DashboardError::NotFound(id))?;
        item.apply_patch(patch);
        Ok(())
    }
}

impl<T: Creatable> Overlay<T> {
    /// Creates an entity with the next local id and puts it first.
    pub fn add(&mut self, draft: T::Draft) -> Id {
        let id = self.next_local_id;
        self.next_local_id = id.saturating_add(1);
        self.items.insert(0, T::from_draft(id, draft));
        id
    }
}
