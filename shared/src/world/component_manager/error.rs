use simcore_serde::SerdeErr;
use thiserror::Error;

use crate::{types::EntityId, ComponentError, EntityError};

/// Errors that can occur while serializing or restoring the manager's state
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StateError {
    /// State is only well defined once queued destructions are flushed
    #[error("Cannot serialize state with {count} entities pending destruction")]
    PendingDestructions { count: usize },

    #[error("Deserialization saw unrecognised component type '{name}'")]
    UnknownComponentType { name: String },

    #[error("Invalid RNG state '{value}'")]
    InvalidRngState { value: String },

    #[error("Failed to construct component '{name}' on entity {entity}: {source}")]
    ComponentConstruction {
        name: String,
        entity: EntityId,
        source: ComponentError,
    },

    /// A component was mutably borrowed (running a handler) when its state was
    /// requested
    #[error("Component '{name}' on entity {entity} is busy")]
    ComponentInUse { name: String, entity: EntityId },

    #[error(transparent)]
    Serde(#[from] SerdeErr),

    #[error(transparent)]
    Entity(#[from] EntityError),
}
