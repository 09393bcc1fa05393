//! Dense per-type component storage.

use std::any::Any;

use slotmap::SecondaryMap;

use super::EntityId;

/// Type-erased surface of a [`ComponentStore`], so the registry can hold
/// stores of arbitrary component types in one map and clear an entity's
/// slot in every store on destruction.
pub(crate) trait AnyStore {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    /// Drops the entity's component if present. Returns whether one existed.
    fn remove_entity(&mut self, id: EntityId) -> bool;
    fn contains(&self, id: EntityId) -> bool;
}

/// Packed storage for a single component type.
///
/// Components live in a dense `Vec` in insertion order, with a sparse
/// entity-to-slot map on the side. Removal is `swap_remove`, so iteration
/// order is insertion order but not stable across removals.
pub struct ComponentStore<T> {
    entities: Vec<EntityId>,
    data: Vec<T>,
    sparse: SecondaryMap<EntityId, usize>,
}

impl<T> Default for ComponentStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ComponentStore<T> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            data: Vec::new(),
            sparse: SecondaryMap::new(),
        }
    }

    /// Inserts the component for `id`, replacing any previous value.
    /// Returns a reference to the stored component.
    pub fn insert(&mut self, id: EntityId, value: T) -> &mut T {
        if let Some(&slot) = self.sparse.get(id) {
            self.data[slot] = value;
            &mut self.data[slot]
        } else {
            let slot = self.data.len();
            self.entities.push(id);
            self.data.push(value);
            self.sparse.insert(id, slot);
            &mut self.data[slot]
        }
    }

    pub fn remove(&mut self, id: EntityId) -> Option<T> {
        let slot = self.sparse.remove(id)?;
        self.entities.swap_remove(slot);
        let value = self.data.swap_remove(slot);
        // The former tail now occupies `slot`.
        if slot < self.data.len() {
            let moved = self.entities[slot];
            self.sparse.insert(moved, slot);
        }
        Some(value)
    }

    #[inline]
    #[must_use]
    pub fn get(&self, id: EntityId) -> Option<&T> {
        self.sparse.get(id).map(|&slot| &self.data[slot])
    }

    #[inline]
    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut T> {
        self.sparse.get(id).map(|&slot| &mut self.data[slot])
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.sparse.contains_key(id)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Entities owning this component, in iteration order.
    #[inline]
    #[must_use]
    pub fn entities(&self) -> &[EntityId] {
        &self.entities
    }

    pub fn iter(&self) -> impl Iterator<Item = (EntityId, &T)> {
        self.entities.iter().copied().zip(self.data.iter())
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (EntityId, &mut T)> {
        self.entities.iter().copied().zip(self.data.iter_mut())
    }
}

impl<T: 'static> AnyStore for ComponentStore<T> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn remove_entity(&mut self, id: EntityId) -> bool {
        self.remove(id).is_some()
    }

    fn contains(&self, id: EntityId) -> bool {
        ComponentStore::contains(self, id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slotmap::SlotMap;

    fn keys(n: usize) -> Vec<EntityId> {
        let mut arena: SlotMap<EntityId, ()> = SlotMap::with_key();
        (0..n).map(|_| arena.insert(())).collect()
    }

    #[test]
    fn insert_get_remove() {
        let ids = keys(3);
        let mut store = ComponentStore::new();
        store.insert(ids[0], 10u32);
        store.insert(ids[1], 20u32);
        store.insert(ids[2], 30u32);

        assert_eq!(store.get(ids[1]), Some(&20));
        assert_eq!(store.remove(ids[1]), Some(20));
        assert!(!store.contains(ids[1]));
        // Swap-removed tail must still resolve.
        assert_eq!(store.get(ids[2]), Some(&30));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn insert_replaces_existing() {
        let ids = keys(1);
        let mut store = ComponentStore::new();
        store.insert(ids[0], 1u32);
        store.insert(ids[0], 2u32);
        assert_eq!(store.len(), 1);
        assert_eq!(store.get(ids[0]), Some(&2));
    }

    #[test]
    fn iteration_is_insertion_order() {
        let ids = keys(4);
        let mut store = ComponentStore::new();
        for (i, id) in ids.iter().enumerate() {
            store.insert(*id, i);
        }
        let order: Vec<_> = store.iter().map(|(id, _)| id).collect();
        assert_eq!(order, ids);
    }
}
