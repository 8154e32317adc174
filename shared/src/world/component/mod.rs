mod component;
mod error;
mod instance;
mod native_catalog;
mod registry;
mod schema;
mod scripted_component;

pub use component::{AsAny, Component, ComponentContext};
pub use error::{ComponentError, RegistryError};
pub use instance::{ComponentInstance, ComponentRef};
pub use native_catalog::{CatalogPlugin, NativeCatalog, NativeComponentType};
pub use registry::{AllocFn, ClassInitFn, ComponentType, ComponentTypeRegistry, ComponentTypeTag};
pub use scripted_component::{alloc_scripted_component, ScriptHandler, ScriptedComponent};
