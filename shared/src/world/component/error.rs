use thiserror::Error;

use crate::{
    types::{ComponentTypeId, EntityId, InterfaceId, MessageTypeId},
    ComponentTypeTag, ScriptError,
};

/// Errors that can occur while constructing a component instance
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ComponentError {
    #[error("Invalid component id {component_type}")]
    UnknownComponentType { component_type: ComponentTypeId },

    /// The entity already has a component implementing this interface
    #[error("Multiple components for interface {interface}")]
    MultipleComponentsForInterface { interface: InterfaceId },

    /// The interface was registered after the entity's cache was sized
    #[error("Interface {interface} is outside the cache of entity {entity} (size {cache_size})")]
    InterfaceOutsideEntityCache {
        interface: InterfaceId,
        entity: EntityId,
        cache_size: usize,
    },

    #[error("Script component constructor failed for '{name}': {source}")]
    ScriptConstructorFailed { name: String, source: ScriptError },

    #[error("Script component type '{name}' has no constructor")]
    MissingScriptConstructor { name: String },

    #[error("Entity {entity} does not exist")]
    EntityDoesNotExist { entity: EntityId },
}

/// Errors that can occur while registering interfaces, message types and
/// component types
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Registering interface with already-registered name '{name}'")]
    DuplicateInterface { name: String },

    #[error("Registering message type with already-registered name '{name}'")]
    DuplicateMessageType { name: String },

    #[error("Invalid interface id {interface}")]
    UnknownInterface { interface: InterfaceId },

    #[error("Component type {component_type} is already registered")]
    DuplicateComponentType { component_type: ComponentTypeId },

    /// The same id was registered twice under different kinds
    #[error("Component type {component_type} is already registered as {existing:?}, not {requested:?}")]
    ComponentTypeTagConflict {
        component_type: ComponentTypeId,
        existing: ComponentTypeTag,
        requested: ComponentTypeTag,
    },

    /// Component type names must be ASCII and at most 255 bytes long
    #[error("Invalid component type name '{name}'")]
    InvalidComponentTypeName { name: String },

    #[error("Component type name '{name}' is already registered")]
    DuplicateComponentName { name: String },

    #[error("Interface {interface} already has a script wrapper")]
    DuplicateScriptWrapper { interface: InterfaceId },

    #[error("No script wrapper found for interface id {interface}")]
    NoScriptWrapper { interface: InterfaceId },

    #[error("ReRegistering component type that was not registered before '{name}'")]
    ReRegisteringUnknownComponentType { name: String },

    /// Registering an existing name outside hot reload and without asking to
    /// re-register
    #[error("Registering component type with already-registered name '{name}'")]
    AlreadyRegistered { name: String },

    #[error("Loading script component type with same name '{name}' as native component")]
    ReplacingNativeComponentType { name: String },

    #[error("Hotloading script component type '{name}' with different interface id while instances exist")]
    HotloadInterfaceChange { name: String },

    /// Subscriptions are only accepted while a component type is being
    /// registered
    #[error("Subscribing to a message type outside of component type registration")]
    NoCurrentComponentType,

    #[error("Unknown message type {message_type}")]
    UnknownMessageType { message_type: MessageTypeId },

    #[error("Registered component has unrecognized '{method}' message handler method")]
    UnrecognizedMessageHandler { method: String },

    #[error("Script error during registration: {0}")]
    Script(#[from] ScriptError),
}
