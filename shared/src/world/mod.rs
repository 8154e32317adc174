pub mod component;
pub mod component_manager;
pub mod entity;

pub use component_manager::{ComponentManager, StateError};
