//! # Simcore Shared
//! The deterministic entity-component core: entity identity, the component
//! type registry, the component manager with its message routing, and the
//! collaborator interfaces (script runtime, template manager) it consumes.

#![deny(trivial_numeric_casts, unstable_features, unused_import_braces)]

pub use simcore_serde::{
    DebugSerializer, HashSerializer, SerdeErr, StateDeserializer, StateHash, StateSerializer,
    StdDeserializer, StdSerializer,
};

mod messages;
mod param_node;
mod script;
mod template;
mod types;
mod world;

pub use messages::{
    DynamicSubscription, DynamicSubscriptionTable, Message, MessageCreate, MessageDestroy,
    MessageInterpolate, MessageKinds, MessageRenderSubmit, MessageSubscriptions,
    MessageTurnStart, MessageUpdate, MessageUpdateFinal, MessageUpdateMotionFormation,
    MessageUpdateMotionUnit, ScriptedMessage, MT_CREATE, MT_DESTROY, MT_INTERPOLATE,
    MT_RENDER_SUBMIT, MT_TURN_START, MT_UPDATE, MT_UPDATE_FINAL, MT_UPDATE_MOTION_FORMATION,
    MT_UPDATE_MOTION_UNIT, NATIVE_MESSAGE_TYPES,
};
pub use param_node::ParamNode;
pub use script::{
    deserialize_script_value, serialize_script_value, ScriptConstructor, ScriptError,
    ScriptObject, ScriptRuntime, ScriptValue,
};
pub use template::TemplateManager;
pub use types::{
    is_local_entity, ComponentKey, ComponentTypeId, EntityId, Fixed, InterfaceId, MessageTypeId,
    FIRST_LOCAL_ENTITY, INVALID_COMPONENT_TYPE, INVALID_ENTITY, INVALID_INTERFACE,
    INVALID_MESSAGE_TYPE, SYSTEM_ENTITY,
};
pub use world::{
    component::{
        alloc_scripted_component, AllocFn, AsAny, CatalogPlugin, ClassInitFn, Component,
        ComponentContext, ComponentError, ComponentInstance, ComponentRef, ComponentType,
        ComponentTypeRegistry, ComponentTypeTag, NativeCatalog, NativeComponentType,
        RegistryError, ScriptHandler, ScriptedComponent,
    },
    component_manager::{DEFAULT_QUICK_HASH_COMPONENT_TYPES, UNKNOWN_SCRIPT_INTERFACE},
    entity::{EntityError, EntityHandle, EntityIdGenerator},
    ComponentManager, StateError,
};
