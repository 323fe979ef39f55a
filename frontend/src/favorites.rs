use indexmap::IndexSet;
use log::debug;

use crate::entities::{Entity, Id};
use crate::error::DashboardError;
use crate::persisted::PersistentStore;

#[derive(Hash, Clone, Copy, Debug, PartialEq, Eq)]
pub enum Toggled {
    Added,
    Removed,
}

/// Result of narrowing a collection down to favorites.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FavoritesView<T> {
    /// No favorites are set, so there is nothing to narrow to.
    NothingToFilter,
    Matches(Vec<T>),
}

/// Favorite entity ids, written through to storage on every change.
pub struct FavoriteSet {
    ids: IndexSet<Id>,
    store: PersistentStore,
    key: &'static str,
}

impl FavoriteSet {
    pub fn load(store: PersistentStore, key: &'static str) -> Self {
        let stored: Vec<Id> = store.get(key, Vec::new());
        FavoriteSet {
            ids: stored.into_iter().collect(),
            store,
            key,
        }
    }

    pub fn contains(&self, id: Id) -> bool {
        self.ids.contains(&id)
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Ids in stored order.
    pub fn ids(&self) -> Vec<Id> {
        self.ids.iter().copied().collect()
    }

    /// Adds or removes `id` in constant time. A removal moves the last id
    /// into the freed position. Membership and order are left untouched when
    /// the new set cannot be saved.
    pub fn toggle(&mut self, id: Id) -> Result<Toggled, DashboardError> {
        let removed_at = self.ids.swap_remove_full(&id).map(|(index, _)| index);
        let toggled = match removed_at {
            Some(_) => Toggled::Removed,
            None => {
                self.ids.insert(id);
                Toggled::Added
            }
        };

        if let Err(err) = self.persist() {
            match removed_at {
                Some(index) => {
                    let (last, _) = self.ids.insert_full(id);
                    self.ids.swap_indices(index, last);
                }
                None => {
                    self.ids.pop();
                }
            }
            return Err(err);
        }

        debug!("favorite {} {:?}", id, toggled);
        Ok(toggled)
    }

    pub fn clear(&mut self) -> Result<(), DashboardError> {
        let previous = std::mem::take(&mut self.ids);
        if let Err(err) = self.persist() {
            self.ids = previous;
            return Err(err);
        }
        Ok(())
    }

    pub fn filter_by_favorites<T: Entity>(&self, items: &[T]) -> FavoritesView<T> {
        if self.ids.is_empty() {
            return FavoritesView::NothingToFilter;
        }
        FavoritesView::Matches(
            items
                .iter()
                .filter(|item| self.contains(item.id()))
                .cloned()
                .collect(),
        )
    }

    fn persist(&self) -> Result<(), DashboardError> {
        self.store.set(self.key, &self.ids())
    }
}
