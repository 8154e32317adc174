use log::{error, info};

use super::state::MAX_COMPONENT_NAME_LENGTH;
use crate::{
    types::{ComponentTypeId, InterfaceId, MessageTypeId},
    AllocFn, ComponentManager, ComponentType, ComponentTypeTag, NativeCatalog, RegistryError,
    ScriptConstructor, ScriptError, ScriptValue,
};

/// Interface whose script wrapper hosts script types of interfaces that
/// have no wrapper of their own.
pub const UNKNOWN_SCRIPT_INTERFACE: &str = "UnknownScript";

/// How a script asks for a component type to be registered.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ScriptRegistration {
    Normal,
    System,
    ReRegister,
}

fn log_err<T>(result: Result<T, RegistryError>) -> Result<T, RegistryError> {
    if let Err(err) = &result {
        error!("{}", err);
    }
    result
}

// Names are written to the state stream as short ASCII strings.
fn check_component_type_name(name: &str) -> Result<(), RegistryError> {
    if name.is_ascii() && name.len() <= MAX_COMPONENT_NAME_LENGTH {
        return Ok(());
    }
    log_err(Err(RegistryError::InvalidComponentTypeName {
        name: name.to_string(),
    }))
}

impl ComponentManager {
    /// Registers the native catalog: interfaces and message types in list
    /// order, then component types with ids 1, 2, ... in list order, running
    /// each type's class init with that type as the current component type.
    pub fn load_component_types(&self, catalog: &NativeCatalog) -> Result<(), RegistryError> {
        for name in catalog.interfaces() {
            self.register_interface(name)?;
        }
        for name in catalog.message_types() {
            self.register_message_type(name)?;
        }

        for (index, entry) in catalog.component_types().iter().enumerate() {
            let component_type = index as ComponentTypeId + 1;
            check_component_type_name(entry.name)?;
            let interface = self.registry.borrow().interface_id(entry.interface);
            let Some(interface) = interface else {
                error!(
                    "Component type '{}' names unknown interface '{}'",
                    entry.name, entry.interface
                );
                return Err(RegistryError::UnknownInterface { interface: 0 });
            };
            let record = ComponentType {
                tag: entry.tag,
                interface,
                alloc: entry.alloc,
                name: entry.name.to_string(),
                schema: entry.schema.to_string(),
                constructor: None,
            };
            log_err(self.registry.borrow_mut().add_component_type(component_type, record))?;
            if entry.system {
                self.registry
                    .borrow_mut()
                    .mark_native_system_component(component_type);
            }

            if let Some(class_init) = entry.class_init {
                self.registry
                    .borrow_mut()
                    .set_current_component(Some(component_type));
                let result = class_init(self);
                self.registry.borrow_mut().set_current_component(None);
                log_err(result)?;
            }
        }
        Ok(())
    }

    /// Registers a native component type under a fixed id.
    pub fn register_component_type(
        &self,
        interface: InterfaceId,
        component_type: ComponentTypeId,
        alloc: AllocFn,
        name: &str,
        schema: &str,
    ) -> Result<(), RegistryError> {
        self.register_fixed(ComponentTypeTag::Native, interface, component_type, alloc, name, schema)
    }

    /// Registers the adapter hosting script implementations of `interface`.
    pub fn register_component_type_script_wrapper(
        &self,
        interface: InterfaceId,
        component_type: ComponentTypeId,
        alloc: AllocFn,
        name: &str,
        schema: &str,
    ) -> Result<(), RegistryError> {
        self.register_fixed(
            ComponentTypeTag::ScriptWrapper,
            interface,
            component_type,
            alloc,
            name,
            schema,
        )
    }

    fn register_fixed(
        &self,
        tag: ComponentTypeTag,
        interface: InterfaceId,
        component_type: ComponentTypeId,
        alloc: AllocFn,
        name: &str,
        schema: &str,
    ) -> Result<(), RegistryError> {
        check_component_type_name(name)?;
        let record = ComponentType {
            tag,
            interface,
            alloc,
            name: name.to_string(),
            schema: schema.to_string(),
            constructor: None,
        };
        log_err(self.registry.borrow_mut().add_component_type(component_type, record))
    }

    /// Allocates the next interface id and publishes it as `IID_<name>`.
    /// Redefinitions are accepted only while hot-loading.
    pub fn register_interface(&self, name: &str) -> Result<InterfaceId, RegistryError> {
        let interface = log_err(self.registry.borrow_mut().add_interface(name))?;
        let interface_count = self.registry.borrow().interface_count();
        self.storage
            .borrow_mut()
            .ensure_interface_count(interface_count);
        self.script_runtime
            .set_global(&format!("IID_{}", name), ScriptValue::Int(interface as i32));
        Ok(interface)
    }

    /// Allocates the next message type id and publishes it as `MT_<name>`.
    pub fn register_message_type(&self, name: &str) -> Result<MessageTypeId, RegistryError> {
        let message_type = log_err(self.registry.borrow_mut().add_message_type(name))?;
        self.script_runtime
            .set_global(&format!("MT_{}", name), ScriptValue::Int(message_type as i32));
        Ok(message_type)
    }

    pub fn register_script_component_type(
        &self,
        interface: InterfaceId,
        name: &str,
        constructor: ScriptConstructor,
    ) -> Result<ComponentTypeId, RegistryError> {
        self.register_script_common(interface, name, constructor, ScriptRegistration::Normal)
    }

    /// Like [`register_script_component_type`], and the type is added to the
    /// system entity by [`add_system_components`].
    ///
    /// [`register_script_component_type`]: Self::register_script_component_type
    /// [`add_system_components`]: Self::add_system_components
    pub fn register_system_component_type(
        &self,
        interface: InterfaceId,
        name: &str,
        constructor: ScriptConstructor,
    ) -> Result<ComponentTypeId, RegistryError> {
        self.register_script_common(interface, name, constructor, ScriptRegistration::System)
    }

    /// Replaces an existing script component type, as a hot reload does.
    pub fn reregister_component_type(
        &self,
        interface: InterfaceId,
        name: &str,
        constructor: ScriptConstructor,
    ) -> Result<ComponentTypeId, RegistryError> {
        self.register_script_common(interface, name, constructor, ScriptRegistration::ReRegister)
    }

    fn register_script_common(
        &self,
        interface: InterfaceId,
        name: &str,
        constructor: ScriptConstructor,
        mode: ScriptRegistration,
    ) -> Result<ComponentTypeId, RegistryError> {
        check_component_type_name(name)?;
        let (wrapper, existing, hotloading) = {
            let registry = self.registry.borrow();
            let wrapper = registry.script_wrapper(interface).or_else(|| {
                registry
                    .interface_id(UNKNOWN_SCRIPT_INTERFACE)
                    .and_then(|fallback| registry.script_wrapper(fallback))
            });
            let Some(wrapper) = wrapper else {
                return log_err(Err(RegistryError::NoScriptWrapper { interface }));
            };
            let wrapper = registry.component_type(wrapper).cloned();
            let existing = registry
                .component_type_id(name)
                .and_then(|id| registry.component_type(id).map(|record| (id, record.clone())));
            (wrapper, existing, registry.currently_hotloading())
        };
        let Some(wrapper) = wrapper else {
            return log_err(Err(RegistryError::NoScriptWrapper { interface }));
        };

        let reload = existing.is_some();
        if mode == ScriptRegistration::ReRegister && !reload {
            return log_err(Err(RegistryError::ReRegisteringUnknownComponentType {
                name: name.to_string(),
            }));
        }

        let component_type = match &existing {
            None => self.registry.borrow_mut().allocate_script_component_type_id(),
            Some((id, record)) => {
                if !hotloading && mode != ScriptRegistration::ReRegister {
                    return log_err(Err(RegistryError::AlreadyRegistered {
                        name: name.to_string(),
                    }));
                }
                if record.tag != ComponentTypeTag::Script {
                    return log_err(Err(RegistryError::ReplacingNativeComponentType {
                        name: name.to_string(),
                    }));
                }
                if record.interface != interface
                    && !self.storage.borrow().components_of_type(*id).is_empty()
                {
                    return log_err(Err(RegistryError::HotloadInterfaceChange {
                        name: name.to_string(),
                    }));
                }
                self.subscriptions.borrow_mut().remove_component_type(*id);
                *id
            }
        };

        let schema = match self.script_runtime.prototype_property(constructor, "Schema") {
            Some(ScriptValue::String(schema)) => schema,
            _ => "<empty/>".to_string(),
        };
        let record = ComponentType {
            tag: ComponentTypeTag::Script,
            interface,
            alloc: wrapper.alloc,
            name: name.to_string(),
            schema,
            constructor: Some(constructor),
        };
        if reload {
            self.registry
                .borrow_mut()
                .replace_component_type(component_type, record);
        } else {
            log_err(self.registry.borrow_mut().add_component_type(component_type, record))?;
        }
        if mode == ScriptRegistration::System {
            self.registry
                .borrow_mut()
                .mark_scripted_system_component(component_type);
        }

        self.subscribe_from_prototype(component_type, constructor)?;

        if reload {
            info!("Hotloading component type '{}'", name);
            let instances = self.storage.borrow().components_of_type(component_type);
            for instance in instances {
                let object = match instance.try_borrow() {
                    Ok(component) => component.script_object(),
                    Err(_) => None,
                };
                match object {
                    Some(object) => self.script_runtime.set_prototype(object, constructor),
                    None => error!(
                        "Could not hotload component type '{}' on entity {}",
                        name,
                        instance.entity()
                    ),
                }
            }
        }
        Ok(component_type)
    }

    /// `On<Message>` methods subscribe locally, `OnGlobal<Message>` globally.
    fn subscribe_from_prototype(
        &self,
        component_type: ComponentTypeId,
        constructor: ScriptConstructor,
    ) -> Result<(), RegistryError> {
        let methods = log_err(
            self.script_runtime
                .prototype_method_names(constructor)
                .map_err(RegistryError::from),
        )?;
        for method in methods {
            let (message_name, global) = if let Some(rest) = method.strip_prefix("OnGlobal") {
                (rest, true)
            } else if let Some(rest) = method.strip_prefix("On") {
                (rest, false)
            } else {
                continue;
            };
            let message_type = self.registry.borrow().message_kinds().id_by_name(message_name);
            let Some(message_type) = message_type else {
                return log_err(Err(RegistryError::UnrecognizedMessageHandler { method }));
            };
            let mut subscriptions = self.subscriptions.borrow_mut();
            if global {
                subscriptions.subscribe_global(message_type, component_type);
            } else {
                subscriptions.subscribe_local(message_type, component_type);
            }
        }
        Ok(())
    }

    /// Subscribes the component type currently being registered.
    pub fn subscribe_to_message_type(&self, message_type: MessageTypeId) -> Result<(), RegistryError> {
        let component_type = self.checked_current_component(message_type)?;
        self.subscriptions
            .borrow_mut()
            .subscribe_local(message_type, component_type);
        Ok(())
    }

    pub fn subscribe_globally_to_message_type(
        &self,
        message_type: MessageTypeId,
    ) -> Result<(), RegistryError> {
        let component_type = self.checked_current_component(message_type)?;
        self.subscriptions
            .borrow_mut()
            .subscribe_global(message_type, component_type);
        Ok(())
    }

    fn checked_current_component(
        &self,
        message_type: MessageTypeId,
    ) -> Result<ComponentTypeId, RegistryError> {
        let registry = self.registry.borrow();
        let Some(component_type) = registry.current_component() else {
            return log_err(Err(RegistryError::NoCurrentComponentType));
        };
        if !registry.message_kinds().contains(message_type) {
            return log_err(Err(RegistryError::UnknownMessageType { message_type }));
        }
        Ok(component_type)
    }

    /// Evaluates a script. With `hotload` set, re-registration of known names
    /// replaces the existing definitions.
    pub fn load_script(&self, path: &str, source: &str, hotload: bool) -> Result<(), ScriptError> {
        self.registry.borrow_mut().set_currently_hotloading(hotload);
        let result = self.script_runtime.load_script(self, path, source);
        self.registry.borrow_mut().set_currently_hotloading(false);
        if let Err(err) = &result {
            error!("Failed to load script '{}': {}", path, err);
        }
        result
    }

    // Lookups

    pub fn lookup_interface_id(&self, name: &str) -> Option<InterfaceId> {
        self.registry.borrow().interface_id(name)
    }

    pub fn lookup_component_type_id(&self, name: &str) -> Option<ComponentTypeId> {
        self.registry.borrow().component_type_id(name)
    }

    pub fn lookup_component_type_name(&self, component_type: ComponentTypeId) -> Option<String> {
        self.registry
            .borrow()
            .component_type_name(component_type)
            .map(str::to_string)
    }

    pub fn lookup_message_type_id(&self, name: &str) -> Option<MessageTypeId> {
        self.registry.borrow().message_kinds().id_by_name(name)
    }

    pub fn lookup_message_type_name(&self, message_type: MessageTypeId) -> Option<String> {
        self.registry
            .borrow()
            .message_kinds()
            .name_by_id(message_type)
            .map(str::to_string)
    }

    /// `(id, name)` of every component type, ascending by id.
    pub fn get_all_component_types(&self) -> Vec<(ComponentTypeId, String)> {
        self.registry
            .borrow()
            .component_types()
            .map(|(id, record)| (id, record.name.clone()))
            .collect()
    }

    pub fn generate_schema(&self) -> String {
        self.registry.borrow().generate_schema()
    }
}
