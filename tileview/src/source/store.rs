//! Append-only tile set history.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::TileError;
use crate::grid::{TileSet, TileSetId};

/// Every tile set a source has produced, plus the active one.
///
/// Sets are never removed, so an id stays valid for the life of the store.
/// Memory grows with each assembly; long-running callers that care can
/// watch [`len`](Self::len).
#[derive(Debug, Default)]
pub struct TileSetStore {
    sets: RwLock<Vec<Arc<TileSet>>>,
    active: RwLock<Option<Arc<TileSet>>>,
}

impl TileSetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a set and assigns its id (the previous length).
    ///
    /// Id assignment and the append happen under one write lock, so
    /// concurrent pushes receive distinct, increasing ids.
    pub fn push(&self, mut set: TileSet) -> Arc<TileSet> {
        let mut sets = self.sets.write();
        set.id = sets.len();
        let set = Arc::new(set);
        sets.push(Arc::clone(&set));
        set
    }

    pub fn get(&self, id: TileSetId) -> Option<Arc<TileSet>> {
        self.sets.read().get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.sets.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sets.read().is_empty()
    }

    pub fn active(&self) -> Option<Arc<TileSet>> {
        self.active.read().clone()
    }

    /// Makes the set with `id` active and returns it.
    pub fn set_active(&self, id: TileSetId) -> Result<Arc<TileSet>, TileError> {
        let set = self.get(id).ok_or_else(|| TileError::UnknownTileSet {
            id,
            count: self.len(),
        })?;
        *self.active.write() = Some(Arc::clone(&set));
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::coord::Coordinate;
    use crate::grid::{plan_grid, TileImage, Viewport};

    fn empty_set() -> TileSet {
        let plan = plan_grid(Coordinate::new(0.0, 0.0), 2, Viewport::uniform(10)).unwrap();
        TileSet::assemble(plan, "test", |_| TileImage::Unavailable)
    }

    #[test]
    fn test_push_assigns_sequential_ids() {
        let store = TileSetStore::new();
        assert!(store.is_empty());
        assert_eq!(store.push(empty_set()).id(), 0);
        assert_eq!(store.push(empty_set()).id(), 1);
        assert_eq!(store.len(), 2);
        assert_eq!(store.get(1).unwrap().id(), 1);
    }

    #[test]
    fn test_set_active() {
        let store = TileSetStore::new();
        assert!(store.active().is_none());

        store.push(empty_set());
        store.push(empty_set());
        store.set_active(1).unwrap();
        assert_eq!(store.active().unwrap().id(), 1);
    }

    #[test]
    fn test_set_active_unknown_id() {
        let store = TileSetStore::new();
        store.push(empty_set());
        let err = store.set_active(5).unwrap_err();
        assert!(matches!(err, TileError::UnknownTileSet { id: 5, count: 1 }));
        assert!(store.active().is_none());
    }

    #[test]
    fn test_concurrent_pushes_get_unique_ids() {
        let store = Arc::new(TileSetStore::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    (0..25).map(|_| store.push(empty_set()).id()).collect::<Vec<_>>()
                })
            })
            .collect();

        let mut ids: Vec<_> = handles
            .into_iter()
            .flat_map(|h| h.join().unwrap())
            .collect();
        ids.sort_unstable();
        assert_eq!(ids, (0..200).collect::<Vec<_>>());
    }
}
