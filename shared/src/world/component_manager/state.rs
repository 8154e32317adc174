use std::collections::BTreeMap;

use log::error;
use simcore_serde::{
    DebugSerializer, HashSerializer, SerdeErr, StateDeserializer, StateHash, StateSerializer,
    StdDeserializer, StdSerializer,
};

use crate::{
    types::{is_local_entity, ComponentTypeId, EntityId, SYSTEM_ENTITY},
    world::entity::EntityHandle,
    ComponentContext, ComponentManager, ComponentRef, EntityError, ParamNode, StateError,
};

pub(crate) const MAX_COMPONENT_NAME_LENGTH: usize = 255;
const MAX_RNG_STATE_LENGTH: usize = 32;

impl ComponentManager {
    /// The canonical binary state: RNG state, next entity id, the system
    /// entity's components, then every other non-local component grouped by
    /// type. Types and entities appear in ascending id order and types are
    /// identified by name.
    pub fn serialize_state(&self) -> Result<Vec<u8>, StateError> {
        let pending = self.pending_destructions();
        if pending > 0 {
            error!("Cannot serialize state with {} entities pending destruction", pending);
            return Err(StateError::PendingDestructions { count: pending });
        }

        let mut serializer = StdSerializer::new();
        self.serialize_rng(&mut serializer);
        serializer.number_u32_unbounded("next entity id", self.next_entity_id());

        let component_types = self.storage.borrow().non_empty_types();

        let mut system_components = Vec::new();
        let mut general_components = Vec::new();
        for component_type in component_types {
            let name = self.component_type_name_or_empty(component_type);
            let instances = self.storage.borrow().components_of_type(component_type);
            let mut replicated = Vec::new();
            for instance in instances {
                if instance.entity() == SYSTEM_ENTITY {
                    system_components.push((name.clone(), instance));
                } else if !is_local_entity(instance.entity()) {
                    replicated.push(instance);
                }
            }
            if !replicated.is_empty() {
                general_components.push((name, replicated));
            }
        }

        serializer.number_u32_unbounded("num system component types", system_components.len() as u32);
        for (name, instance) in &system_components {
            serializer.string_ascii("name", name, 0, MAX_COMPONENT_NAME_LENGTH);
            self.serialize_component(instance, &mut serializer)?;
        }

        serializer.number_u32_unbounded("num component types", general_components.len() as u32);
        for (name, instances) in &general_components {
            serializer.string_ascii("name", name, 0, MAX_COMPONENT_NAME_LENGTH);
            serializer.number_u32_unbounded("num entities", instances.len() as u32);
            for instance in instances {
                serializer.number_u32_unbounded("entity id", instance.entity());
                self.serialize_component(instance, &mut serializer)?;
            }
        }

        Ok(serializer.into_bytes())
    }

    /// Hash of the synchronized state. Local entities never contribute. In
    /// quick mode only the configured quick-hash component types are
    /// included.
    pub fn compute_state_hash(&self, quick: bool) -> Result<StateHash, StateError> {
        let mut serializer = HashSerializer::new();
        self.serialize_rng(&mut serializer);
        serializer.number_u32_unbounded("next entity id", self.next_entity_id());

        let component_types = self.storage.borrow().non_empty_types();
        for component_type in component_types {
            if quick {
                let name = self.component_type_name_or_empty(component_type);
                if !self.quick_hash_component_types.borrow().contains(&name) {
                    continue;
                }
            }
            let instances: Vec<ComponentRef> = self
                .storage
                .borrow()
                .components_of_type(component_type)
                .into_iter()
                .filter(|instance| !is_local_entity(instance.entity()))
                .collect();
            if instances.is_empty() {
                continue;
            }
            serializer.number_i32_unbounded("component type id", component_type as i32);
            for instance in &instances {
                serializer.number_u32_unbounded("entity id", instance.entity());
                self.serialize_component(instance, &mut serializer)?;
            }
        }

        Ok(serializer.compute_hash())
    }

    /// Human-readable dump grouped by entity, local entities included.
    pub fn dump_debug_state(&self, include_debug_info: bool) -> Result<String, StateError> {
        let mut serializer = DebugSerializer::new(include_debug_info);
        self.serialize_rng(&mut serializer);
        serializer.text_line("entities:");

        let mut by_entity: BTreeMap<EntityId, Vec<ComponentRef>> = BTreeMap::new();
        let component_types = self.storage.borrow().non_empty_types();
        for component_type in component_types {
            for instance in self.storage.borrow().components_of_type(component_type) {
                by_entity.entry(instance.entity()).or_default().push(instance);
            }
        }

        for (entity, instances) in &by_entity {
            serializer.text_line(&format!("- id: {}", entity));
            if is_local_entity(*entity) {
                serializer.text_line("  type: local");
            }
            for instance in instances {
                let name = self.component_type_name_or_empty(instance.component_type());
                serializer.text_line(&format!("  {}:", name));
                serializer.indent(4);
                self.serialize_component(instance, &mut serializer)?;
                serializer.dedent(4);
            }
            serializer.text_line("");
        }

        Ok(serializer.into_string())
    }

    /// Replaces all state with the stream produced by
    /// [`serialize_state`](Self::serialize_state).
    ///
    /// Registrations must match the serializing manager's. On error, what
    /// was restored so far stays in place; reset before reusing the manager.
    pub fn deserialize_state(&self, bytes: &[u8]) -> Result<(), StateError> {
        self.reset_state();
        let system_handle = self.init_system_entity()?;

        let mut deserializer = StdDeserializer::new(bytes);

        let rng_state = deserializer.string_ascii("rng", 0, MAX_RNG_STATE_LENGTH)?;
        let Ok(seed) = rng_state.parse::<u64>() else {
            error!("Invalid RNG state '{}'", rng_state);
            return Err(StateError::InvalidRngState { value: rng_state });
        };
        self.set_rng_seed(seed);

        let next_entity_id = deserializer.number_u32_unbounded("next entity id")?;
        self.entity_ids
            .borrow_mut()
            .set_next_entity_id(next_entity_id);

        let empty = ParamNode::new();
        let num_system_types = deserializer.number_u32_unbounded("num system component types")?;
        for _ in 0..num_system_types {
            let component_type = self.read_component_type(&mut deserializer)?;
            let instance = self.construct_for_state(&system_handle, component_type)?;
            self.deserialize_component(&instance, &empty, &mut deserializer)?;
        }

        let num_types = deserializer.number_u32_unbounded("num component types")?;
        for _ in 0..num_types {
            let component_type = self.read_component_type(&mut deserializer)?;
            let name = self.component_type_name_or_empty(component_type);
            let num_entities = deserializer.number_u32_unbounded("num entities")?;
            for _ in 0..num_entities {
                let entity = deserializer.number_u32_unbounded("entity id")?;
                let Some(handle) = self.lookup_entity_handle(entity, true) else {
                    return Err(StateError::Entity(EntityError::EntityDoesNotExist {
                        entity,
                    }));
                };
                let instance = self.construct_for_state(&handle, component_type)?;
                let template = self
                    .template_manager()
                    .and_then(|templates| templates.load_latest_template(entity));
                let param = template
                    .as_deref()
                    .and_then(|template| template.child(&name))
                    .unwrap_or(&empty);
                self.deserialize_component(&instance, param, &mut deserializer)?;
            }
        }

        if !deserializer.is_at_end() {
            let remaining = deserializer.remaining();
            error!("Deserialization didn't reach the end of the stream ({} bytes left)", remaining);
            return Err(StateError::Serde(SerdeErr::TrailingBytes { remaining }));
        }
        Ok(())
    }

    fn serialize_rng(&self, serializer: &mut dyn StateSerializer) {
        let state = self.rng.borrow().get_seed().to_string();
        serializer.string_ascii("rng", &state, 0, MAX_RNG_STATE_LENGTH);
    }

    fn component_type_name_or_empty(&self, component_type: ComponentTypeId) -> String {
        self.registry
            .borrow()
            .component_type_name(component_type)
            .unwrap_or_default()
            .to_string()
    }

    fn serialize_component(
        &self,
        instance: &ComponentRef,
        serializer: &mut dyn StateSerializer,
    ) -> Result<(), StateError> {
        let ctx = ComponentContext::new(self, instance.entity(), instance.component_type());
        let Ok(component) = instance.try_borrow() else {
            return Err(StateError::ComponentInUse {
                name: self.component_type_name_or_empty(instance.component_type()),
                entity: instance.entity(),
            });
        };
        component.serialize(&ctx, serializer);
        Ok(())
    }

    fn read_component_type(
        &self,
        deserializer: &mut dyn StateDeserializer,
    ) -> Result<ComponentTypeId, StateError> {
        let name = deserializer.string_ascii("name", 0, MAX_COMPONENT_NAME_LENGTH)?;
        match self.lookup_component_type_id(&name) {
            Some(component_type) => Ok(component_type),
            None => {
                error!("Deserialization saw unrecognised component type '{}'", name);
                Err(StateError::UnknownComponentType { name })
            }
        }
    }

    fn construct_for_state(
        &self,
        handle: &EntityHandle,
        component_type: ComponentTypeId,
    ) -> Result<ComponentRef, StateError> {
        self.construct_component(handle, component_type)
            .map_err(|source| StateError::ComponentConstruction {
                name: self.component_type_name_or_empty(component_type),
                entity: handle.id(),
                source,
            })
    }

    fn deserialize_component(
        &self,
        instance: &ComponentRef,
        param: &ParamNode,
        deserializer: &mut dyn StateDeserializer,
    ) -> Result<(), StateError> {
        let ctx = ComponentContext::new(self, instance.entity(), instance.component_type());
        instance
            .borrow_mut()
            .deserialize(&ctx, param, deserializer)?;
        Ok(())
    }
}
