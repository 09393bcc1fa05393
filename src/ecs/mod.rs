//! Entity-component registry
//!
//! Storage and query layer for scene data:
//! - `EntityId`: generational handle identifying a bag of components
//! - `Registry`: per-type component stores plus entity lifetime tracking
//! - `View` family: filtered iteration over entities owning a set of types
//!
//! Components are plain data. The registry owns every store; systems borrow
//! the registry and address components through entity ids.

pub mod registry;
pub mod storage;
pub mod view;

pub use registry::Registry;
pub use storage::ComponentStore;
pub use view::{View, View2, View3, ViewMut};

use slotmap::{Key, new_key_type};

new_key_type! {
    /// Generational entity handle. Stale ids fail lookups instead of
    /// aliasing a reused slot.
    pub struct EntityId;
}

/// Slot index of an entity id, without the generation bits.
///
/// This is the value byte-packed into the entity-ID render attachment for
/// picking. Unique among live entities; reused after destruction, which is
/// why pick readback resolves it back through
/// [`Registry::entity_from_index`] instead of trusting the raw value.
#[inline]
#[must_use]
pub fn entity_index(id: EntityId) -> u32 {
    // KeyData::as_ffi puts the slot index in the low 32 bits.
    (id.data().as_ffi() & 0xffff_ffff) as u32
}
