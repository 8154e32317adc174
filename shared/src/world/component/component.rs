use std::any::Any;

use simcore_serde::{SerdeErr, StateDeserializer, StateSerializer};

use crate::{
    types::{ComponentKey, ComponentTypeId, EntityId},
    world::ComponentManager,
    Message, ParamNode, ScriptHandler, ScriptObject,
};

pub trait AsAny: Any {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: Any> AsAny for T {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// What a component knows about where it lives, passed to every lifecycle
/// call. The manager reference lets handlers query other components, post
/// messages or queue destruction.
#[derive(Clone, Copy)]
pub struct ComponentContext<'a> {
    manager: &'a ComponentManager,
    entity: EntityId,
    component_type: ComponentTypeId,
}

impl<'a> ComponentContext<'a> {
    pub fn new(
        manager: &'a ComponentManager,
        entity: EntityId,
        component_type: ComponentTypeId,
    ) -> Self {
        Self {
            manager,
            entity,
            component_type,
        }
    }

    pub fn manager(&self) -> &'a ComponentManager {
        self.manager
    }

    pub fn entity(&self) -> EntityId {
        self.entity
    }

    pub fn component_type(&self) -> ComponentTypeId {
        self.component_type
    }

    pub fn key(&self) -> ComponentKey {
        ComponentKey::new(self.entity, self.component_type)
    }
}

/// A component instance: per-entity state plus behavior for one interface.
///
/// Native components implement this directly; script components are wrapped
/// by [`ScriptedComponent`](crate::ScriptedComponent).
pub trait Component: AsAny {
    /// Called once after construction with the component's template node.
    fn init(&mut self, ctx: &ComponentContext, param: &ParamNode);

    /// Called once before the component is destroyed.
    fn deinit(&mut self, _ctx: &ComponentContext) {}

    /// `global` is true when delivered through a global subscription.
    fn handle_message(&mut self, _ctx: &ComponentContext, _message: &dyn Message, _global: bool) {}

    fn serialize(&self, ctx: &ComponentContext, serializer: &mut dyn StateSerializer);

    /// Restores state written by [`serialize`](Component::serialize). Called
    /// instead of `init` when loading a saved state.
    fn deserialize(
        &mut self,
        ctx: &ComponentContext,
        param: &ParamNode,
        deserializer: &mut dyn StateDeserializer,
    ) -> Result<(), SerdeErr>;

    /// The script object backing this component, if any.
    fn script_object(&self) -> Option<ScriptObject> {
        None
    }

    /// Message handlers that run without a borrow of this component. The
    /// manager prefers this over [`handle_message`](Component::handle_message).
    fn script_handler(&self) -> Option<ScriptHandler> {
        None
    }
}

impl dyn Component {
    pub fn downcast_ref<C: Component>(&self) -> Option<&C> {
        self.as_any().downcast_ref::<C>()
    }

    pub fn downcast_mut<C: Component>(&mut self) -> Option<&mut C> {
        self.as_any_mut().downcast_mut::<C>()
    }
}
