use log::warn;

use crate::{
    types::{is_local_entity, ComponentKey, EntityId, MessageTypeId},
    ComponentContext, ComponentManager, ComponentRef, ComponentTypeTag, Message,
};

impl ComponentManager {
    /// Delivers `message` to the local subscribers attached to `entity`, in
    /// ascending component type order, then to global and dynamic
    /// subscribers.
    pub fn post_message(&self, entity: EntityId, message: &dyn Message) {
        let message_type = message.message_type();
        let local_types = self
            .subscriptions
            .borrow()
            .local_subscribers(message_type)
            .to_vec();
        for component_type in local_types {
            let target = self.storage.borrow().component(component_type, entity);
            if let Some(instance) = target {
                self.deliver(&instance, message, false);
            }
        }

        self.send_global_message(Some(entity), message);
    }

    /// Delivers `message` to every instance of every local subscriber type,
    /// then to global and dynamic subscribers.
    pub fn broadcast_message(&self, message: &dyn Message) {
        let message_type = message.message_type();
        let local_types = self
            .subscriptions
            .borrow()
            .local_subscribers(message_type)
            .to_vec();
        for component_type in local_types {
            let targets = self.storage.borrow().components_of_type(component_type);
            for instance in targets {
                self.deliver(&instance, message, false);
            }
        }

        self.send_global_message(None, message);
    }

    fn send_global_message(&self, target: Option<EntityId>, message: &dyn Message) {
        let message_type = message.message_type();
        let global_types = self
            .subscriptions
            .borrow()
            .global_subscribers(message_type)
            .to_vec();
        for component_type in global_types {
            let is_script = self
                .registry
                .borrow()
                .component_type(component_type)
                .is_some_and(|record| record.tag == ComponentTypeTag::Script);

            // Script handlers must not observe local entities.
            if is_script && target.is_some_and(is_local_entity) {
                continue;
            }

            let targets = self.storage.borrow().components_of_type(component_type);
            for instance in targets {
                if is_script && target.is_none() && is_local_entity(instance.entity()) {
                    continue;
                }
                self.deliver(&instance, message, true);
            }
        }

        self.send_dynamic_message(message_type, message);
    }

    fn send_dynamic_message(&self, message_type: MessageTypeId, message: &dyn Message) {
        let subscribers = self
            .dynamic_subscriptions
            .borrow_mut()
            .flatten_and_snapshot(message_type);
        for key in subscribers {
            let target = self.storage.borrow().component(key.component_type, key.entity);
            if let Some(instance) = target {
                self.deliver(&instance, message, false);
            }
        }
    }

    fn deliver(&self, instance: &ComponentRef, message: &dyn Message, global: bool) {
        let ctx = ComponentContext::new(self, instance.entity(), instance.component_type());

        // Script state lives in the runtime, so a script component may be
        // reentered while one of its handlers is still running.
        let handler = match instance.try_borrow() {
            Ok(component) => component.script_handler(),
            Err(_) => {
                warn_busy(instance, message);
                return;
            }
        };
        if let Some(handler) = handler {
            handler.handle_message(&ctx, message, global);
            return;
        }

        match instance.try_borrow_mut() {
            Ok(mut component) => component.handle_message(&ctx, message, global),
            Err(_) => warn_busy(instance, message),
        }
    }

    /// Subscribes or unsubscribes one component instance at runtime. Takes
    /// effect at the next delivery of `message_type`. Not part of the
    /// synchronized state.
    pub fn dynamic_subscription_nonsync(
        &self,
        message_type: MessageTypeId,
        component: ComponentKey,
        enabled: bool,
    ) {
        self.dynamic_subscriptions
            .borrow_mut()
            .set(message_type, component, enabled);
    }
}

fn warn_busy(instance: &ComponentRef, message: &dyn Message) {
    warn!(
        "Skipping reentrant delivery of {} to component type {} on entity {}",
        message.name(),
        instance.component_type(),
        instance.entity()
    );
}
