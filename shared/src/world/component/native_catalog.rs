use crate::{
    world::component::registry::{AllocFn, ClassInitFn},
    ComponentTypeTag,
};

/// Adds a related group of interfaces and component types to a catalog.
pub trait CatalogPlugin {
    fn build(&self, catalog: &mut NativeCatalog);
}

/// One native entry of a [`NativeCatalog`].
#[derive(Clone)]
pub struct NativeComponentType {
    pub name: &'static str,
    pub interface: &'static str,
    pub tag: ComponentTypeTag,
    pub schema: &'static str,
    pub alloc: AllocFn,
    pub class_init: Option<ClassInitFn>,
    /// Added to the system entity by `add_system_components`
    pub system: bool,
}

impl NativeComponentType {
    pub fn native(name: &'static str, interface: &'static str, alloc: AllocFn) -> Self {
        Self {
            name,
            interface,
            tag: ComponentTypeTag::Native,
            schema: "<empty/>",
            alloc,
            class_init: None,
            system: false,
        }
    }

    pub fn script_wrapper(name: &'static str, interface: &'static str, alloc: AllocFn) -> Self {
        Self {
            tag: ComponentTypeTag::ScriptWrapper,
            ..Self::native(name, interface, alloc)
        }
    }

    pub fn with_schema(mut self, schema: &'static str) -> Self {
        self.schema = schema;
        self
    }

    pub fn with_class_init(mut self, class_init: ClassInitFn) -> Self {
        self.class_init = Some(class_init);
        self
    }

    pub fn system(mut self) -> Self {
        self.system = true;
        self
    }
}

/// The canonical, ordered list of native interfaces, message types and
/// component types. Ids are assigned in list order, so the order is part of
/// the determinism contract: every replica must load the same catalog.
#[derive(Clone, Default)]
pub struct NativeCatalog {
    interfaces: Vec<&'static str>,
    message_types: Vec<&'static str>,
    component_types: Vec<NativeComponentType>,
}

impl NativeCatalog {
    pub fn builder() -> Self {
        Self::default()
    }

    pub fn add_plugin<P: CatalogPlugin>(&mut self, plugin: P) -> &mut Self {
        plugin.build(self);
        self
    }

    pub fn add_interface(&mut self, name: &'static str) -> &mut Self {
        self.interfaces.push(name);
        self
    }

    pub fn add_message_type(&mut self, name: &'static str) -> &mut Self {
        self.message_types.push(name);
        self
    }

    pub fn add_component_type(&mut self, component_type: NativeComponentType) -> &mut Self {
        self.component_types.push(component_type);
        self
    }

    pub fn build(&mut self) -> Self {
        std::mem::take(self)
    }

    pub fn interfaces(&self) -> &[&'static str] {
        &self.interfaces
    }

    pub fn message_types(&self) -> &[&'static str] {
        &self.message_types
    }

    pub fn component_types(&self) -> &[NativeComponentType] {
        &self.component_types
    }
}
