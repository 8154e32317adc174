use std::{
    collections::{BTreeMap, HashMap},
    rc::Rc,
};

use log::error;

use crate::{
    types::{ComponentTypeId, EntityId, InterfaceId},
    world::{component::ComponentInstance, entity::EntityHandle},
    ComponentContext, ComponentError, ComponentManager, ComponentRef, ComponentTypeTag,
    EntityError, ParamNode,
};

/// The three views of the live components, kept in lock step: by interface
/// (O(1) queries), by type (ordered iteration) and the per-entity caches.
#[derive(Default)]
pub(super) struct ComponentStorage {
    by_interface: Vec<HashMap<EntityId, ComponentRef>>,
    by_type: BTreeMap<ComponentTypeId, BTreeMap<EntityId, ComponentRef>>,
    entities: HashMap<EntityId, EntityHandle>,
}

impl ComponentStorage {
    pub(super) fn ensure_interface_count(&mut self, interface_count: usize) {
        if self.by_interface.len() < interface_count + 1 {
            self.by_interface.resize_with(interface_count + 1, HashMap::new);
        }
    }

    pub(super) fn entity(&self, entity: EntityId) -> Option<&EntityHandle> {
        self.entities.get(&entity)
    }

    pub(super) fn insert_entity(&mut self, handle: EntityHandle) {
        self.entities.insert(handle.id(), handle);
    }

    pub(super) fn remove_entity(&mut self, entity: EntityId) -> Option<EntityHandle> {
        self.entities.remove(&entity)
    }

    pub(super) fn component(
        &self,
        component_type: ComponentTypeId,
        entity: EntityId,
    ) -> Option<ComponentRef> {
        self.by_type.get(&component_type)?.get(&entity).cloned()
    }

    pub(super) fn has_interface(&self, interface: InterfaceId, entity: EntityId) -> bool {
        self.by_interface
            .get(interface as usize)
            .is_some_and(|components| components.contains_key(&entity))
    }

    /// Instances of one type in ascending entity order.
    pub(super) fn components_of_type(&self, component_type: ComponentTypeId) -> Vec<ComponentRef> {
        self.by_type
            .get(&component_type)
            .map(|components| components.values().cloned().collect())
            .unwrap_or_default()
    }

    /// Instances attached to one entity in ascending type order.
    pub(super) fn components_of_entity(&self, entity: EntityId) -> Vec<ComponentRef> {
        self.by_type
            .values()
            .filter_map(|components| components.get(&entity).cloned())
            .collect()
    }

    pub(super) fn non_empty_types(&self) -> Vec<ComponentTypeId> {
        self.by_type
            .iter()
            .filter(|(_, components)| !components.is_empty())
            .map(|(component_type, _)| *component_type)
            .collect()
    }

    /// Registers `instance` in all three views, or in none.
    pub(super) fn insert(
        &mut self,
        handle: &EntityHandle,
        instance: ComponentRef,
    ) -> Result<(), ComponentError> {
        let entity = handle.id();
        let interface = instance.interface();
        if self.has_interface(interface, entity) {
            return Err(ComponentError::MultipleComponentsForInterface { interface });
        }
        if !handle.has_slot(interface) || (interface as usize) >= self.by_interface.len() {
            return Err(ComponentError::InterfaceOutsideEntityCache {
                interface,
                entity,
                cache_size: handle.cache_size(),
            });
        }

        handle.set(interface, Some(instance.clone()));
        self.by_interface[interface as usize].insert(entity, instance.clone());
        self.by_type
            .entry(instance.component_type())
            .or_default()
            .insert(entity, instance);
        Ok(())
    }

    pub(super) fn remove(&mut self, instance: &ComponentInstance) {
        let entity = instance.entity();
        if let Some(components) = self.by_type.get_mut(&instance.component_type()) {
            components.remove(&entity);
        }
        if let Some(components) = self.by_interface.get_mut(instance.interface() as usize) {
            components.remove(&entity);
        }
        if let Some(handle) = self.entities.get(&entity) {
            handle.set(instance.interface(), None);
        }
    }

    pub(super) fn all_components_reversed(&self) -> Vec<ComponentRef> {
        self.by_type
            .values()
            .rev()
            .flat_map(|components| components.values().cloned())
            .collect()
    }

    pub(super) fn clear(&mut self) {
        for components in &mut self.by_interface {
            components.clear();
        }
        self.by_type.clear();
        for handle in self.entities.values() {
            handle.clear();
        }
        self.entities.clear();
    }
}

impl ComponentManager {
    // Entities

    /// Creates the handle and interface cache of a new entity.
    pub fn allocate_entity_handle(&self, entity: EntityId) -> Result<EntityHandle, EntityError> {
        let interface_count = self.registry.borrow().interface_count();
        let mut storage = self.storage.borrow_mut();
        if storage.entity(entity).is_some() {
            return Err(EntityError::EntityAlreadyExists { entity });
        }
        storage.ensure_interface_count(interface_count);
        let handle = EntityHandle::allocate(entity, interface_count);
        storage.insert_entity(handle.clone());
        Ok(handle)
    }

    /// The handle of `entity`, created on demand if `allow_create` is set.
    pub fn lookup_entity_handle(&self, entity: EntityId, allow_create: bool) -> Option<EntityHandle> {
        if let Some(handle) = self.storage.borrow().entity(entity) {
            return Some(handle.clone());
        }
        if !allow_create {
            return None;
        }
        self.allocate_entity_handle(entity).ok()
    }

    pub fn entity_exists(&self, entity: EntityId) -> bool {
        self.storage.borrow().entity(entity).is_some()
    }

    // Components

    /// Constructs a component without initializing it. On failure nothing is
    /// registered.
    pub fn construct_component(
        &self,
        handle: &EntityHandle,
        component_type: ComponentTypeId,
    ) -> Result<ComponentRef, ComponentError> {
        let record = self.registry.borrow().component_type(component_type).cloned();
        let Some(record) = record else {
            error!("Invalid component id {}", component_type);
            return Err(ComponentError::UnknownComponentType { component_type });
        };

        let entity = handle.id();
        if self.storage.borrow().has_interface(record.interface, entity) {
            error!("Multiple components for interface {}", record.interface);
            return Err(ComponentError::MultipleComponentsForInterface {
                interface: record.interface,
            });
        }
        if !handle.has_slot(record.interface) {
            error!(
                "Interface {} was registered after entity {} was allocated",
                record.interface, entity
            );
            return Err(ComponentError::InterfaceOutsideEntityCache {
                interface: record.interface,
                entity,
                cache_size: handle.cache_size(),
            });
        }

        let script_object = if record.tag == ComponentTypeTag::Script {
            let Some(constructor) = record.constructor else {
                error!("Script component type '{}' has no constructor", record.name);
                return Err(ComponentError::MissingScriptConstructor { name: record.name });
            };
            match self.script_runtime.construct(self, constructor) {
                Ok(object) => Some(object),
                Err(source) => {
                    error!("Script component constructor failed for '{}': {}", record.name, source);
                    return Err(ComponentError::ScriptConstructorFailed {
                        name: record.name,
                        source,
                    });
                }
            }
        } else {
            None
        };

        let component = (record.alloc)(&self.script_runtime, script_object);
        let instance = Rc::new(ComponentInstance::new(
            entity,
            component_type,
            record.interface,
            component,
        ));

        // The script constructor may have re-entered the manager, so the
        // checks are repeated under the mutable borrow.
        if let Err(err) = self.storage.borrow_mut().insert(handle, instance.clone()) {
            error!("{}", err);
            return Err(err);
        }
        Ok(instance)
    }

    /// Constructs a component and initializes it from `param`.
    pub fn add_component(
        &self,
        handle: &EntityHandle,
        component_type: ComponentTypeId,
        param: &ParamNode,
    ) -> Result<ComponentRef, ComponentError> {
        let instance = self.construct_component(handle, component_type)?;
        let ctx = ComponentContext::new(self, instance.entity(), component_type);
        instance.borrow_mut().init(&ctx, param);
        Ok(instance)
    }

    // Queries

    /// The component of `entity` implementing `interface`. Absence is a
    /// normal outcome, including for unknown ids.
    pub fn query_interface(&self, entity: EntityId, interface: InterfaceId) -> Option<ComponentRef> {
        self.storage
            .borrow()
            .by_interface
            .get(interface as usize)?
            .get(&entity)
            .cloned()
    }

    pub fn query_interface_by_handle(
        &self,
        handle: &EntityHandle,
        interface: InterfaceId,
    ) -> Option<ComponentRef> {
        handle.query_interface(interface)
    }

    /// Every `(entity, component)` implementing `interface`, ascending by
    /// entity id.
    pub fn get_entities_with_interface(
        &self,
        interface: InterfaceId,
    ) -> Vec<(EntityId, ComponentRef)> {
        let mut entities = self.get_entities_with_interface_unordered(interface);
        entities.sort_unstable_by_key(|(entity, _)| *entity);
        entities
    }

    /// Like [`get_entities_with_interface`](Self::get_entities_with_interface)
    /// in unspecified order.
    pub fn get_entities_with_interface_unordered(
        &self,
        interface: InterfaceId,
    ) -> Vec<(EntityId, ComponentRef)> {
        self.storage
            .borrow()
            .by_interface
            .get(interface as usize)
            .map(|components| {
                components
                    .iter()
                    .map(|(entity, component)| (*entity, component.clone()))
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Every instance of `component_type`, ascending by entity id.
    pub fn get_components_of_type(&self, component_type: ComponentTypeId) -> Vec<ComponentRef> {
        self.storage.borrow().components_of_type(component_type)
    }
}
