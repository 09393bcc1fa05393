//! Parent and sibling links forming the scene forest.

use crate::ecs::EntityId;

/// Hierarchy component: intrusive links into the scene forest.
///
/// A child list is a doubly linked list threaded through the children's
/// `prev`/`next` fields, headed by the parent's `first`. Links are only
/// mutated by [`SceneTree`] operations, which keep the forest invariant:
/// no cycles, one parent per entity, sibling lists consistent with parent
/// pointers.
///
/// [`SceneTree`]: crate::scene::SceneTree
#[derive(Debug, Clone, Copy, Default)]
pub struct Hierarchy {
    /// Owning parent, or `None` for a root.
    pub parent: Option<EntityId>,
    /// Head of this entity's child list.
    pub first: Option<EntityId>,
    /// Next sibling under the same parent.
    pub next: Option<EntityId>,
    /// Previous sibling under the same parent.
    pub prev: Option<EntityId>,
}

impl Hierarchy {
    #[inline]
    #[must_use]
    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    #[inline]
    #[must_use]
    pub fn has_children(&self) -> bool {
        self.first.is_some()
    }
}
