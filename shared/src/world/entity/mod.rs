mod entity_handle;
mod entity_id_generator;
mod error;

pub use entity_handle::EntityHandle;
pub use entity_id_generator::EntityIdGenerator;
pub use error::EntityError;
