use thiserror::Error as ThisError;

use crate::{types::EntityId, ComponentError};

/// Errors that can occur while allocating, building or destroying entities
#[derive(Debug, Clone, ThisError, PartialEq, Eq)]
pub enum EntityError {
    /// An entity cache already exists for this id
    #[error("Entity {entity} already exists")]
    EntityAlreadyExists { entity: EntityId },

    #[error("Entity {entity} does not exist")]
    EntityDoesNotExist { entity: EntityId },

    /// The id counter ran into the local (or past the local) id range
    #[error("Ran out of entity ids (local: {local})")]
    IdSpaceExhausted { local: bool },

    /// A preferred id must be a valid, replicated (non-local) id
    #[error("Entity id {entity} cannot be requested")]
    InvalidPreferredId { entity: EntityId },

    #[error("No template manager is available to build entity from '{template}'")]
    NoTemplateManager { template: String },

    #[error("Failed to load entity template '{template}'")]
    TemplateNotFound { template: String },

    #[error("Unrecognized component type name '{name}' in entity template '{template}'")]
    UnrecognizedComponentType { name: String, template: String },

    /// A component named by the template could not be constructed. Components
    /// added before the failure stay on the entity.
    #[error("Failed to construct component type name '{name}' in entity template '{template}': {source}")]
    ComponentConstructionFailed {
        name: String,
        template: String,
        source: ComponentError,
    },

    #[error("The system entity has already been initialized")]
    SystemEntityAlreadyInitialized,

    #[error("The system entity has not been initialized")]
    SystemEntityNotInitialized,
}
