use std::{
    cell::{BorrowError, BorrowMutError, Ref, RefCell, RefMut},
    fmt,
    rc::Rc,
};

use crate::{
    types::{ComponentKey, ComponentTypeId, EntityId, InterfaceId},
    Component,
};

/// A constructed component together with where it lives.
///
/// Instances are shared between the by-interface index, the by-type index
/// and the entity cache; the component itself sits behind a `RefCell` so a
/// handler may run while other code holds the same [`ComponentRef`].
pub struct ComponentInstance {
    entity: EntityId,
    component_type: ComponentTypeId,
    interface: InterfaceId,
    component: RefCell<Box<dyn Component>>,
}

pub type ComponentRef = Rc<ComponentInstance>;

impl ComponentInstance {
    pub(crate) fn new(
        entity: EntityId,
        component_type: ComponentTypeId,
        interface: InterfaceId,
        component: Box<dyn Component>,
    ) -> Self {
        Self {
            entity,
            component_type,
            interface,
            component: RefCell::new(component),
        }
    }

    pub fn entity(&self) -> EntityId {
        self.entity
    }

    pub fn component_type(&self) -> ComponentTypeId {
        self.component_type
    }

    pub fn interface(&self) -> InterfaceId {
        self.interface
    }

    pub fn key(&self) -> ComponentKey {
        ComponentKey::new(self.entity, self.component_type)
    }

    /// Panics if the component is being mutated, e.g. from inside its own
    /// message handler.
    pub fn borrow(&self) -> Ref<'_, dyn Component + 'static> {
        Ref::map(self.component.borrow(), |component| &**component)
    }

    pub fn borrow_mut(&self) -> RefMut<'_, dyn Component + 'static> {
        RefMut::map(self.component.borrow_mut(), |component| &mut **component)
    }

    pub fn try_borrow(&self) -> Result<Ref<'_, dyn Component + 'static>, BorrowError> {
        self.component
            .try_borrow()
            .map(|component| Ref::map(component, |component| &**component))
    }

    pub fn try_borrow_mut(&self) -> Result<RefMut<'_, dyn Component + 'static>, BorrowMutError> {
        self.component
            .try_borrow_mut()
            .map(|component| RefMut::map(component, |component| &mut **component))
    }

    /// Runs `f` on the component if it is a `C`.
    pub fn with<C: Component, R>(&self, f: impl FnOnce(&C) -> R) -> Option<R> {
        let component = self.component.borrow();
        (**component).downcast_ref::<C>().map(f)
    }

    pub fn with_mut<C: Component, R>(&self, f: impl FnOnce(&mut C) -> R) -> Option<R> {
        let mut component = self.component.borrow_mut();
        (**component).downcast_mut::<C>().map(f)
    }
}

impl fmt::Debug for ComponentInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComponentInstance")
            .field("entity", &self.entity)
            .field("component_type", &self.component_type)
            .field("interface", &self.interface)
            .finish()
    }
}
