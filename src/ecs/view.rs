//! Multi-component views.
//!
//! A view iterates the entities owning every requested component type.
//! Iteration is driven by the first listed type's store, so the order is
//! that store's insertion order; the remaining stores only filter.

use super::EntityId;
use super::storage::ComponentStore;

/// Iterator over `(EntityId, &A)`.
pub struct View<'a, A> {
    pub(crate) store: Option<&'a ComponentStore<A>>,
    pub(crate) cursor: usize,
}

impl<'a, A> Iterator for View<'a, A> {
    type Item = (EntityId, &'a A);

    fn next(&mut self) -> Option<Self::Item> {
        let store = self.store?;
        let id = *store.entities().get(self.cursor)?;
        self.cursor += 1;
        let value = store.get(id)?;
        Some((id, value))
    }
}

/// Iterator over `(EntityId, &mut A)`.
pub struct ViewMut<'a, A> {
    pub(crate) inner: Option<Box<dyn Iterator<Item = (EntityId, &'a mut A)> + 'a>>,
}

impl<'a, A> Iterator for ViewMut<'a, A> {
    type Item = (EntityId, &'a mut A);

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.as_mut()?.next()
    }
}

/// Iterator over `(EntityId, &A, &B)` for entities owning both types.
pub struct View2<'a, A, B> {
    pub(crate) a: Option<&'a ComponentStore<A>>,
    pub(crate) b: Option<&'a ComponentStore<B>>,
    pub(crate) cursor: usize,
}

impl<'a, A, B> Iterator for View2<'a, A, B> {
    type Item = (EntityId, &'a A, &'a B);

    fn next(&mut self) -> Option<Self::Item> {
        let a = self.a?;
        let b = self.b?;
        loop {
            let id = *a.entities().get(self.cursor)?;
            self.cursor += 1;
            if let (Some(ca), Some(cb)) = (a.get(id), b.get(id)) {
                return Some((id, ca, cb));
            }
        }
    }
}

/// Iterator over `(EntityId, &A, &B, &C)` for entities owning all three.
pub struct View3<'a, A, B, C> {
    pub(crate) a: Option<&'a ComponentStore<A>>,
    pub(crate) b: Option<&'a ComponentStore<B>>,
    pub(crate) c: Option<&'a ComponentStore<C>>,
    pub(crate) cursor: usize,
}

impl<'a, A, B, C> Iterator for View3<'a, A, B, C> {
    type Item = (EntityId, &'a A, &'a B, &'a C);

    fn next(&mut self) -> Option<Self::Item> {
        let a = self.a?;
        let b = self.b?;
        let c = self.c?;
        loop {
            let id = *a.entities().get(self.cursor)?;
            self.cursor += 1;
            if let (Some(ca), Some(cb), Some(cc)) = (a.get(id), b.get(id), c.get(id)) {
                return Some((id, ca, cb, cc));
            }
        }
    }
}
