use std::{collections::BTreeMap, rc::Rc};

use log::error;

use crate::{
    messages::MessageKinds,
    types::{ComponentTypeId, InterfaceId, MessageTypeId, INVALID_INTERFACE},
    world::ComponentManager,
    Component, RegistryError, ScriptConstructor, ScriptObject, ScriptRuntime,
};

/// Builds the native half of a component. Script-tagged and wrapper types
/// receive the freshly constructed script object.
pub type AllocFn = fn(&Rc<dyn ScriptRuntime>, Option<ScriptObject>) -> Box<dyn Component>;

/// Per-type registration hook, run while the type is the current component
/// type so it can subscribe to messages.
pub type ClassInitFn = fn(&ComponentManager) -> Result<(), RegistryError>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComponentTypeTag {
    /// Implemented in Rust
    Native,
    /// Rust adapter that hosts a script implementation of its interface
    ScriptWrapper,
    /// Implemented by a script, hosted by its interface's wrapper
    Script,
}

/// Registration record of one component type.
#[derive(Clone)]
pub struct ComponentType {
    pub tag: ComponentTypeTag,
    pub interface: InterfaceId,
    pub alloc: AllocFn,
    pub name: String,
    pub schema: String,
    pub constructor: Option<ScriptConstructor>,
}

/// Names and ids of interfaces, component types and message types, plus the
/// registration context.
pub struct ComponentTypeRegistry {
    types_by_id: BTreeMap<ComponentTypeId, ComponentType>,
    type_ids_by_name: BTreeMap<String, ComponentTypeId>,
    interface_ids_by_name: BTreeMap<String, InterfaceId>,
    interface_names: Vec<String>,
    script_wrappers: BTreeMap<InterfaceId, ComponentTypeId>,
    message_kinds: MessageKinds,
    next_script_component_type_id: ComponentTypeId,
    native_system_components: Vec<ComponentTypeId>,
    scripted_system_components: Vec<ComponentTypeId>,
    current_component: Option<ComponentTypeId>,
    currently_hotloading: bool,
}

impl Default for ComponentTypeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ComponentTypeRegistry {
    pub fn new() -> Self {
        Self {
            types_by_id: BTreeMap::new(),
            type_ids_by_name: BTreeMap::new(),
            interface_ids_by_name: BTreeMap::new(),
            interface_names: Vec::new(),
            script_wrappers: BTreeMap::new(),
            message_kinds: MessageKinds::new(),
            next_script_component_type_id: 1,
            native_system_components: Vec::new(),
            scripted_system_components: Vec::new(),
            current_component: None,
            currently_hotloading: false,
        }
    }

    // Interfaces

    /// Allocates the next interface id. A known name is accepted (returning
    /// its id) only while hot-loading.
    pub fn add_interface(&mut self, name: &str) -> Result<InterfaceId, RegistryError> {
        if let Some(id) = self.interface_ids_by_name.get(name) {
            if self.currently_hotloading {
                return Ok(*id);
            }
            return Err(RegistryError::DuplicateInterface {
                name: name.to_string(),
            });
        }
        self.interface_names.push(name.to_string());
        let id = self.interface_names.len() as InterfaceId;
        self.interface_ids_by_name.insert(name.to_string(), id);
        Ok(id)
    }

    pub fn interface_count(&self) -> usize {
        self.interface_names.len()
    }

    pub fn interface_id(&self, name: &str) -> Option<InterfaceId> {
        self.interface_ids_by_name.get(name).copied()
    }

    pub fn interface_name(&self, interface: InterfaceId) -> Option<&str> {
        if interface == INVALID_INTERFACE {
            return None;
        }
        self.interface_names
            .get(interface as usize - 1)
            .map(String::as_str)
    }

    pub fn interfaces(&self) -> impl Iterator<Item = (InterfaceId, &str)> {
        self.interface_names
            .iter()
            .enumerate()
            .map(|(index, name)| (index as InterfaceId + 1, name.as_str()))
    }

    // Message types

    pub fn add_message_type(&mut self, name: &str) -> Result<MessageTypeId, RegistryError> {
        let (id, inserted) = self.message_kinds.add_message_type(name);
        if !inserted && !self.currently_hotloading {
            return Err(RegistryError::DuplicateMessageType {
                name: name.to_string(),
            });
        }
        Ok(id)
    }

    pub fn message_kinds(&self) -> &MessageKinds {
        &self.message_kinds
    }

    // Component types

    /// Inserts a Native or ScriptWrapper type under a fixed id, or a Script
    /// type under an id from [`allocate_script_component_type_id`].
    ///
    /// [`allocate_script_component_type_id`]: Self::allocate_script_component_type_id
    pub fn add_component_type(
        &mut self,
        component_type: ComponentTypeId,
        record: ComponentType,
    ) -> Result<(), RegistryError> {
        if self.interface_name(record.interface).is_none() {
            return Err(RegistryError::UnknownInterface {
                interface: record.interface,
            });
        }
        if let Some(existing) = self.types_by_id.get(&component_type) {
            if existing.tag == record.tag {
                return Err(RegistryError::DuplicateComponentType { component_type });
            }
            return Err(RegistryError::ComponentTypeTagConflict {
                component_type,
                existing: existing.tag,
                requested: record.tag,
            });
        }
        if self.type_ids_by_name.contains_key(&record.name) {
            return Err(RegistryError::DuplicateComponentName { name: record.name });
        }
        if record.tag == ComponentTypeTag::ScriptWrapper {
            if self.script_wrappers.contains_key(&record.interface) {
                return Err(RegistryError::DuplicateScriptWrapper {
                    interface: record.interface,
                });
            }
            self.script_wrappers.insert(record.interface, component_type);
        }

        self.type_ids_by_name.insert(record.name.clone(), component_type);
        self.types_by_id.insert(component_type, record);
        self.next_script_component_type_id =
            self.next_script_component_type_id.max(component_type + 1);
        Ok(())
    }

    pub fn allocate_script_component_type_id(&mut self) -> ComponentTypeId {
        let id = self.next_script_component_type_id;
        self.next_script_component_type_id += 1;
        id
    }

    /// Swaps the record of an existing type during hot reload. The name is
    /// kept.
    pub fn replace_component_type(
        &mut self,
        component_type: ComponentTypeId,
        record: ComponentType,
    ) {
        match self.types_by_id.get_mut(&component_type) {
            Some(existing) => *existing = record,
            None => error!("Replacing unknown component type {}", component_type),
        }
    }

    pub fn component_type(&self, component_type: ComponentTypeId) -> Option<&ComponentType> {
        self.types_by_id.get(&component_type)
    }

    pub fn component_type_id(&self, name: &str) -> Option<ComponentTypeId> {
        self.type_ids_by_name.get(name).copied()
    }

    pub fn component_type_name(&self, component_type: ComponentTypeId) -> Option<&str> {
        self.types_by_id
            .get(&component_type)
            .map(|record| record.name.as_str())
    }

    /// All component types in ascending id order.
    pub fn component_types(&self) -> impl Iterator<Item = (ComponentTypeId, &ComponentType)> {
        self.types_by_id.iter().map(|(id, record)| (*id, record))
    }

    pub fn script_wrapper(&self, interface: InterfaceId) -> Option<ComponentTypeId> {
        self.script_wrappers.get(&interface).copied()
    }

    // System components

    pub fn mark_native_system_component(&mut self, component_type: ComponentTypeId) {
        if !self.native_system_components.contains(&component_type) {
            self.native_system_components.push(component_type);
        }
    }

    pub fn mark_scripted_system_component(&mut self, component_type: ComponentTypeId) {
        if !self.scripted_system_components.contains(&component_type) {
            self.scripted_system_components.push(component_type);
        }
    }

    pub fn native_system_components(&self) -> &[ComponentTypeId] {
        &self.native_system_components
    }

    pub fn scripted_system_components(&self) -> &[ComponentTypeId] {
        &self.scripted_system_components
    }

    // Registration context

    pub fn current_component(&self) -> Option<ComponentTypeId> {
        self.current_component
    }

    pub fn set_current_component(&mut self, component_type: Option<ComponentTypeId>) {
        self.current_component = component_type;
    }

    pub fn currently_hotloading(&self) -> bool {
        self.currently_hotloading
    }

    pub fn set_currently_hotloading(&mut self, hotloading: bool) {
        self.currently_hotloading = hotloading;
    }
}
