//! The component manager: owner of every component instance, of the type
//! registry and of message routing.
//!
//! All operations take `&self`. Component handlers receive the manager and
//! call back into it (post messages, add or destroy entities, register
//! script types) while a dispatch is in progress, so state lives in
//! `RefCell`s whose borrows never span a call into component or script code.

mod dispatch;
mod error;
mod lifecycle;
mod registration;
mod state;
mod storage;

use std::{
    cell::RefCell,
    collections::BTreeSet,
    rc::Rc,
};

pub use error::StateError;
pub use registration::UNKNOWN_SCRIPT_INTERFACE;

use crate::{
    messages::{DynamicSubscriptionTable, MessageSubscriptions, NATIVE_MESSAGE_TYPES},
    types::EntityId,
    world::entity::{EntityHandle, EntityIdGenerator},
    ComponentTypeRegistry, ScriptRuntime, ScriptValue, TemplateManager,
};
use storage::ComponentStorage;

/// Component types included in the quick state hash unless configured
/// otherwise.
pub const DEFAULT_QUICK_HASH_COMPONENT_TYPES: [&str; 1] = ["Position"];

pub struct ComponentManager {
    registry: RefCell<ComponentTypeRegistry>,
    subscriptions: RefCell<MessageSubscriptions>,
    dynamic_subscriptions: RefCell<DynamicSubscriptionTable>,
    storage: RefCell<ComponentStorage>,
    entity_ids: RefCell<EntityIdGenerator>,
    destruction_queue: RefCell<Vec<EntityId>>,
    system_entity: RefCell<Option<EntityHandle>>,
    rng: RefCell<fastrand::Rng>,
    quick_hash_component_types: RefCell<BTreeSet<String>>,
    script_runtime: Rc<dyn ScriptRuntime>,
    template_manager: RefCell<Option<Rc<dyn TemplateManager>>>,
}

impl ComponentManager {
    /// A manager with the built-in message types registered and published to
    /// `script_runtime` as `MT_<name>` globals.
    pub fn new(script_runtime: Rc<dyn ScriptRuntime>) -> Self {
        for (id, name) in NATIVE_MESSAGE_TYPES {
            script_runtime.set_global(&format!("MT_{}", name), ScriptValue::Int(id as i32));
        }
        Self {
            registry: RefCell::new(ComponentTypeRegistry::new()),
            subscriptions: RefCell::new(MessageSubscriptions::default()),
            dynamic_subscriptions: RefCell::new(DynamicSubscriptionTable::default()),
            storage: RefCell::new(ComponentStorage::default()),
            entity_ids: RefCell::new(EntityIdGenerator::new()),
            destruction_queue: RefCell::new(Vec::new()),
            system_entity: RefCell::new(None),
            rng: RefCell::new(fastrand::Rng::with_seed(0)),
            quick_hash_component_types: RefCell::new(
                DEFAULT_QUICK_HASH_COMPONENT_TYPES
                    .iter()
                    .map(|name| name.to_string())
                    .collect(),
            ),
            script_runtime,
            template_manager: RefCell::new(None),
        }
    }

    pub fn script_runtime(&self) -> &Rc<dyn ScriptRuntime> {
        &self.script_runtime
    }

    pub fn set_template_manager(&self, template_manager: Rc<dyn TemplateManager>) {
        *self.template_manager.borrow_mut() = Some(template_manager);
    }

    pub fn template_manager(&self) -> Option<Rc<dyn TemplateManager>> {
        self.template_manager.borrow().clone()
    }

    /// Read access to the registry. Do not hold the guard across calls back
    /// into the manager.
    pub fn registry(&self) -> std::cell::Ref<'_, ComponentTypeRegistry> {
        self.registry.borrow()
    }

    // Simulation RNG

    pub fn set_rng_seed(&self, seed: u64) {
        self.rng.borrow_mut().seed(seed);
    }

    /// Draws from the simulation RNG. Every replica draws in the same order,
    /// so results are part of the synchronized state.
    pub fn with_rng<R>(&self, f: impl FnOnce(&mut fastrand::Rng) -> R) -> R {
        f(&mut self.rng.borrow_mut())
    }

    pub fn set_quick_hash_component_types<I, S>(&self, names: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        *self.quick_hash_component_types.borrow_mut() =
            names.into_iter().map(Into::into).collect();
    }
}
