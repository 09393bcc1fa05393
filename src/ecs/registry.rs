//! Entity lifetime tracking and the per-type store map.

use std::any::TypeId;

use rustc_hash::FxHashMap;
use slotmap::SlotMap;

use super::storage::{AnyStore, ComponentStore};
use super::view::{View, View2, View3, ViewMut};
use super::{EntityId, entity_index};

/// Owns every entity and every component store.
///
/// Entities are generational keys into an arena; components live in dense
/// per-type stores keyed by `TypeId`. All access goes through entity ids;
/// a destroyed id fails every lookup from then on.
///
/// # Contract
///
/// Adding a component twice for the same entity is a programmer error: it
/// asserts in debug builds and replaces the value in release builds.
/// Destroying an entity frees its slot in every store; nothing cascades to
/// other entities at this layer (the scene tree drives subtree destruction).
#[derive(Default)]
pub struct Registry {
    entities: SlotMap<EntityId, ()>,
    stores: FxHashMap<TypeId, Box<dyn AnyStore>>,
    by_index: FxHashMap<u32, EntityId>,
}

impl Registry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // ========================================================================
    // Entity lifetime
    // ========================================================================

    pub fn create(&mut self) -> EntityId {
        let id = self.entities.insert(());
        self.by_index.insert(entity_index(id), id);
        id
    }

    /// Destroys the entity and frees its component slot in every store.
    /// Returns whether the id was live.
    pub fn destroy(&mut self, id: EntityId) -> bool {
        if self.entities.remove(id).is_none() {
            debug_assert!(false, "destroy on a dead entity id");
            log::warn!("Registry::destroy: stale entity id {id:?}");
            return false;
        }
        self.by_index.remove(&entity_index(id));
        for store in self.stores.values_mut() {
            store.remove_entity(id);
        }
        true
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, id: EntityId) -> bool {
        self.entities.contains_key(id)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entities.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    /// All live entities, in arena order.
    pub fn entities(&self) -> impl Iterator<Item = EntityId> + '_ {
        self.entities.keys()
    }

    /// Resolves a packed pick-buffer index back to a live entity.
    ///
    /// Returns `None` for indices whose entity has been destroyed, so stale
    /// pixels in the entity-ID attachment never resurrect a dead id.
    #[must_use]
    pub fn entity_from_index(&self, index: u32) -> Option<EntityId> {
        self.by_index.get(&index).copied()
    }

    // ========================================================================
    // Components
    // ========================================================================

    /// Adds a component, returning a reference to the stored value.
    ///
    /// Adding to a dead entity or adding a duplicate asserts in debug
    /// builds; release builds store (or replace) the value unchecked.
    pub fn add<T: 'static>(&mut self, id: EntityId, value: T) -> &mut T {
        debug_assert!(self.entities.contains_key(id), "add on a dead entity id");
        let store = self
            .stores
            .entry(TypeId::of::<T>())
            .or_insert_with(|| Box::new(ComponentStore::<T>::new()));
        debug_assert!(!store.contains(id), "component added twice for one entity");
        store
            .as_any_mut()
            .downcast_mut::<ComponentStore<T>>()
            .expect("store registered under a mismatched TypeId")
            .insert(id, value)
    }

    pub fn remove<T: 'static>(&mut self, id: EntityId) -> Option<T> {
        self.store_mut::<T>()?.remove(id)
    }

    #[must_use]
    pub fn get<T: 'static>(&self, id: EntityId) -> Option<&T> {
        self.store::<T>()?.get(id)
    }

    pub fn get_mut<T: 'static>(&mut self, id: EntityId) -> Option<&mut T> {
        self.store_mut::<T>()?.get_mut(id)
    }

    #[must_use]
    pub fn has<T: 'static>(&self, id: EntityId) -> bool {
        self.store::<T>().is_some_and(|s| s.contains(id))
    }

    // ========================================================================
    // Views
    // ========================================================================

    /// Iterates `(entity, &T)` in the store's insertion order.
    #[must_use]
    pub fn view<T: 'static>(&self) -> View<'_, T> {
        View {
            store: self.store::<T>(),
            cursor: 0,
        }
    }

    /// Iterates `(entity, &mut T)` in the store's insertion order.
    pub fn view_mut<T: 'static>(&mut self) -> ViewMut<'_, T> {
        match self.store_mut::<T>() {
            Some(s) => ViewMut {
                inner: Some(Box::new(s.iter_mut())),
            },
            None => ViewMut { inner: None },
        }
    }

    /// Iterates entities owning both `A` and `B`, in `A`'s insertion order.
    #[must_use]
    pub fn view2<A: 'static, B: 'static>(&self) -> View2<'_, A, B> {
        View2 {
            a: self.store::<A>(),
            b: self.store::<B>(),
            cursor: 0,
        }
    }

    /// Iterates entities owning `A`, `B` and `C`, in `A`'s insertion order.
    #[must_use]
    pub fn view3<A: 'static, B: 'static, C: 'static>(&self) -> View3<'_, A, B, C> {
        View3 {
            a: self.store::<A>(),
            b: self.store::<B>(),
            c: self.store::<C>(),
            cursor: 0,
        }
    }

    // ========================================================================
    // Store plumbing
    // ========================================================================

    fn store<T: 'static>(&self) -> Option<&ComponentStore<T>> {
        self.stores
            .get(&TypeId::of::<T>())
            .and_then(|s| s.as_any().downcast_ref())
    }

    fn store_mut<T: 'static>(&mut self) -> Option<&mut ComponentStore<T>> {
        self.stores
            .get_mut(&TypeId::of::<T>())
            .and_then(|s| s.as_any_mut().downcast_mut())
    }
}
