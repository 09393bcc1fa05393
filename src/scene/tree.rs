//! Scene tree: forest maintenance and world-transform propagation.
//!
//! Owns the root list and every mutation of the hierarchy links. Decoupled
//! from `Scene` so it only borrows the registry, which keeps the borrow
//! surface small and the traversal testable on a bare registry.

use glam::Mat4;
use smallvec::SmallVec;

use crate::ecs::{EntityId, Registry};
use crate::scene::hierarchy::Hierarchy;
use crate::scene::transform::Transform;

/// Maintains the scene forest and recomputes world transforms once per
/// frame, parents strictly before children.
#[derive(Debug, Default)]
pub struct SceneTree {
    roots: Vec<EntityId>,
}

impl SceneTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Root entities in insertion order.
    #[inline]
    #[must_use]
    pub fn roots(&self) -> &[EntityId] {
        &self.roots
    }

    /// Registers a freshly created entity as a root. The entity must already
    /// carry a [`Hierarchy`] component.
    pub(crate) fn track_root(&mut self, id: EntityId) {
        self.roots.push(id);
    }

    // ========================================================================
    // Reparenting
    // ========================================================================

    /// Moves `child` under `new_parent`, or to the root set for `None`.
    ///
    /// The child is unlinked from its old sibling list and prepended to the
    /// new parent's child list (it becomes the parent's `first`). Attaching
    /// an entity to itself or below one of its own descendants would create
    /// a cycle; that is a programmer error, rejected here with a warning
    /// (and an assert in debug builds). Returns whether the move happened.
    pub fn set_parent(
        &mut self,
        registry: &mut Registry,
        child: EntityId,
        new_parent: Option<EntityId>,
    ) -> bool {
        if !registry.has::<Hierarchy>(child) {
            log::warn!("SceneTree::set_parent: {child:?} has no hierarchy link");
            return false;
        }
        if let Some(parent) = new_parent {
            if parent == child {
                log::warn!("SceneTree::set_parent: cannot attach {child:?} to itself");
                return false;
            }
            if !registry.has::<Hierarchy>(parent) {
                log::warn!("SceneTree::set_parent: parent {parent:?} has no hierarchy link");
                return false;
            }
            if creates_cycle(registry, child, parent) {
                debug_assert!(false, "reparent would create a hierarchy cycle");
                log::warn!(
                    "SceneTree::set_parent: attaching {child:?} under {parent:?} would create a cycle"
                );
                return false;
            }
        }

        self.unlink(registry, child);

        match new_parent {
            Some(parent) => {
                // Prepend at the parent's first-child slot.
                let old_first = registry
                    .get::<Hierarchy>(parent)
                    .and_then(|h| h.first);
                if let Some(first) = old_first {
                    if let Some(h) = registry.get_mut::<Hierarchy>(first) {
                        h.prev = Some(child);
                    }
                }
                if let Some(h) = registry.get_mut::<Hierarchy>(parent) {
                    h.first = Some(child);
                }
                if let Some(h) = registry.get_mut::<Hierarchy>(child) {
                    h.parent = Some(parent);
                    h.prev = None;
                    h.next = old_first;
                }
            }
            None => {
                if let Some(h) = registry.get_mut::<Hierarchy>(child) {
                    h.parent = None;
                    h.prev = None;
                    h.next = None;
                }
                self.roots.push(child);
            }
        }

        // The subtree's world matrices are stale until the next update.
        if let Some(t) = registry.get_mut::<Transform>(child) {
            t.mark_dirty();
        }
        true
    }

    /// Detaches `child` from its parent, making it a root.
    pub fn detach(&mut self, registry: &mut Registry, child: EntityId) -> bool {
        self.set_parent(registry, child, None)
    }

    /// Unlinks `child` from its sibling list and the root set, leaving its
    /// own `parent`/`prev`/`next` fields to be rewritten by the caller.
    fn unlink(&mut self, registry: &mut Registry, child: EntityId) {
        let Some(links) = registry.get::<Hierarchy>(child).copied() else {
            return;
        };

        match links.prev {
            Some(prev) => {
                if let Some(h) = registry.get_mut::<Hierarchy>(prev) {
                    h.next = links.next;
                }
            }
            None => {
                // Child headed its parent's list.
                if let Some(parent) = links.parent {
                    if let Some(h) = registry.get_mut::<Hierarchy>(parent) {
                        h.first = links.next;
                    }
                }
            }
        }
        if let Some(next) = links.next {
            if let Some(h) = registry.get_mut::<Hierarchy>(next) {
                h.prev = links.prev;
            }
        }
        if links.parent.is_none() {
            self.roots.retain(|&e| e != child);
        }
    }

    // ========================================================================
    // Destruction
    // ========================================================================

    /// Destroys `id` and every descendant reachable through hierarchy links.
    ///
    /// The entity is unlinked from its siblings first, so no surviving link
    /// references a destroyed id afterwards.
    pub fn destroy_recursive(&mut self, registry: &mut Registry, id: EntityId) {
        if !registry.contains(id) {
            log::warn!("SceneTree::destroy_recursive: stale entity id {id:?}");
            return;
        }
        self.unlink(registry, id);

        for entity in collect_subtree(registry, id) {
            registry.destroy(entity);
        }
    }

    // ========================================================================
    // World-transform propagation
    // ========================================================================

    /// Recomputes world matrices for the whole forest, parents strictly
    /// before children. Roots compose against the identity matrix.
    ///
    /// Uses an explicit stack instead of recursion so deep chains cannot
    /// overflow the call stack. A subtree is recomputed when its own TRS
    /// changed or any ancestor's world matrix changed this frame.
    pub fn update(&self, registry: &mut Registry) {
        // Work stack: (entity, parent world matrix, parent changed).
        let mut stack: Vec<(EntityId, Mat4, bool)> = Vec::with_capacity(64);

        for &root in self.roots.iter().rev() {
            stack.push((root, Mat4::IDENTITY, false));
        }

        while let Some((entity, parent_world, parent_changed)) = stack.pop() {
            // 1. Collect children before taking the transform borrow.
            let mut children: SmallVec<[EntityId; 8]> = SmallVec::new();
            if let Some(h) = registry.get::<Hierarchy>(entity) {
                let mut cursor = h.first;
                while let Some(c) = cursor {
                    children.push(c);
                    cursor = registry.get::<Hierarchy>(c).and_then(|h| h.next);
                }
            }

            // 2. Refresh local and world matrices.
            let (world, changed) = match registry.get_mut::<Transform>(entity) {
                Some(transform) => {
                    let local_changed = transform.update_local_matrix();
                    let changed = local_changed || parent_changed;
                    if changed {
                        transform.update_world(&parent_world);
                    }
                    (transform.world, changed)
                }
                // No transform: pass the parent's matrix through unchanged.
                None => (parent_world, parent_changed),
            };

            // 3. Push children in reverse to keep first-child-first order.
            for &child in children.iter().rev() {
                stack.push((child, world, changed));
            }
        }
    }
}

/// Would attaching `child` under `parent` close a cycle? Walks `parent`'s
/// ancestor chain to the root.
fn creates_cycle(registry: &Registry, child: EntityId, parent: EntityId) -> bool {
    ancestors(registry, parent).any(|a| a == child)
}

/// Iterator over an entity's children, first to last.
pub struct Children<'a> {
    registry: &'a Registry,
    cursor: Option<EntityId>,
}

impl Iterator for Children<'_> {
    type Item = EntityId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor?;
        self.cursor = self.registry.get::<Hierarchy>(id).and_then(|h| h.next);
        Some(id)
    }
}

/// Children of `parent`, first to last.
#[must_use]
pub fn children(registry: &Registry, parent: EntityId) -> Children<'_> {
    Children {
        registry,
        cursor: registry.get::<Hierarchy>(parent).and_then(|h| h.first),
    }
}

/// Iterator over an entity's ancestors, nearest first.
pub struct Ancestors<'a> {
    registry: &'a Registry,
    cursor: Option<EntityId>,
}

impl Iterator for Ancestors<'_> {
    type Item = EntityId;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cursor?;
        self.cursor = self.registry.get::<Hierarchy>(id).and_then(|h| h.parent);
        Some(id)
    }
}

/// Ancestors of `id`, nearest first.
#[must_use]
pub fn ancestors(registry: &Registry, id: EntityId) -> Ancestors<'_> {
    Ancestors {
        registry,
        cursor: registry.get::<Hierarchy>(id).and_then(|h| h.parent),
    }
}

/// Depth-first list of `root` and all entities below it.
#[must_use]
pub fn collect_subtree(registry: &Registry, root: EntityId) -> Vec<EntityId> {
    let mut out = Vec::new();
    let mut stack = vec![root];
    while let Some(entity) = stack.pop() {
        out.push(entity);
        for child in children(registry, entity) {
            stack.push(child);
        }
    }
    out
}
