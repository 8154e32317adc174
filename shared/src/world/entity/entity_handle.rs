use std::{cell::RefCell, fmt, rc::Rc};

use crate::{
    types::{EntityId, InterfaceId},
    ComponentRef,
};

struct EntityCache {
    id: EntityId,
    interfaces: RefCell<Box<[Option<ComponentRef>]>>,
}

/// Cheap, cloneable handle to an entity with an O(1) per-interface lookup
/// cache.
///
/// The cache is sized when the entity is allocated, from the number of
/// interfaces registered at that moment; it never grows. Slot 0 is the
/// invalid interface and always empty.
#[derive(Clone)]
pub struct EntityHandle(Rc<EntityCache>);

impl EntityHandle {
    pub(crate) fn allocate(id: EntityId, interface_count: usize) -> Self {
        let slots = vec![None; interface_count + 1].into_boxed_slice();
        Self(Rc::new(EntityCache {
            id,
            interfaces: RefCell::new(slots),
        }))
    }

    pub fn id(&self) -> EntityId {
        self.0.id
    }

    /// Number of slots, including the invalid slot 0.
    pub fn cache_size(&self) -> usize {
        self.0.interfaces.borrow().len()
    }

    pub fn query_interface(&self, interface: InterfaceId) -> Option<ComponentRef> {
        self.0
            .interfaces
            .borrow()
            .get(interface as usize)
            .and_then(Clone::clone)
    }

    pub(crate) fn has_slot(&self, interface: InterfaceId) -> bool {
        interface != 0 && (interface as usize) < self.cache_size()
    }

    /// Fills or clears one slot. Returns false if the slot is outside the
    /// cache.
    pub(crate) fn set(&self, interface: InterfaceId, component: Option<ComponentRef>) -> bool {
        match self.0.interfaces.borrow_mut().get_mut(interface as usize) {
            Some(slot) => {
                *slot = component;
                true
            }
            None => false,
        }
    }

    pub(crate) fn clear(&self) {
        for slot in self.0.interfaces.borrow_mut().iter_mut() {
            *slot = None;
        }
    }

    pub fn ptr_eq(&self, other: &EntityHandle) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for EntityHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EntityHandle")
            .field("id", &self.0.id)
            .field("cache_size", &self.cache_size())
            .finish()
    }
}
