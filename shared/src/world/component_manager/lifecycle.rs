use log::{error, warn};

use crate::{
    param_node::is_attribute_name,
    types::{EntityId, INVALID_ENTITY, SYSTEM_ENTITY},
    world::entity::EntityHandle,
    ComponentContext, ComponentManager, ComponentRef, EntityError, MessageCreate, MessageDestroy,
    ParamNode,
};

impl ComponentManager {
    // Entity ids

    pub fn allocate_new_entity(&self) -> Result<EntityId, EntityError> {
        self.entity_ids.borrow_mut().allocate_new_entity()
    }

    pub fn allocate_new_entity_with_id(&self, preferred: EntityId) -> Result<EntityId, EntityError> {
        self.entity_ids
            .borrow_mut()
            .allocate_new_entity_with_id(preferred)
    }

    pub fn allocate_new_local_entity(&self) -> Result<EntityId, EntityError> {
        self.entity_ids.borrow_mut().allocate_new_local_entity()
    }

    pub fn next_entity_id(&self) -> EntityId {
        self.entity_ids.borrow().next_entity_id()
    }

    // Entities

    /// Builds `entity` from the named template: one component per top-level
    /// child (attributes excluded), in name order, then posts `Create`.
    ///
    /// A failure part way leaves the components constructed so far attached.
    pub fn add_entity(&self, template_name: &str, entity: EntityId) -> Result<EntityId, EntityError> {
        if entity == INVALID_ENTITY {
            return Err(EntityError::InvalidPreferredId { entity });
        }
        let Some(template_manager) = self.template_manager() else {
            error!("No template manager is available to build '{}'", template_name);
            return Err(EntityError::NoTemplateManager {
                template: template_name.to_string(),
            });
        };
        let Some(template) = template_manager.load_template(entity, template_name, -1) else {
            error!("Failed to load entity template '{}'", template_name);
            return Err(EntityError::TemplateNotFound {
                template: template_name.to_string(),
            });
        };

        let handle = self.allocate_entity_handle(entity).map_err(|err| {
            error!("{}", err);
            err
        })?;

        for (name, param) in template.children() {
            if is_attribute_name(name) {
                continue;
            }
            let component_type = self.registry.borrow().component_type_id(name);
            let Some(component_type) = component_type else {
                error!(
                    "Unrecognized component type name '{}' in entity template '{}'",
                    name, template_name
                );
                return Err(EntityError::UnrecognizedComponentType {
                    name: name.to_string(),
                    template: template_name.to_string(),
                });
            };
            if let Err(source) = self.add_component(&handle, component_type, param) {
                error!(
                    "Failed to construct component type name '{}' in entity template '{}'",
                    name, template_name
                );
                return Err(EntityError::ComponentConstructionFailed {
                    name: name.to_string(),
                    template: template_name.to_string(),
                    source,
                });
            }
        }

        self.post_message(entity, &MessageCreate { entity });
        Ok(entity)
    }

    /// Builds an entity with a freshly allocated replicated id.
    pub fn add_entity_auto(&self, template_name: &str) -> Result<EntityId, EntityError> {
        let entity = self.allocate_new_entity()?;
        self.add_entity(template_name, entity)
    }

    /// Builds an entity with a freshly allocated local id.
    pub fn add_local_entity(&self, template_name: &str) -> Result<EntityId, EntityError> {
        let entity = self.allocate_new_local_entity()?;
        self.add_entity(template_name, entity)
    }

    /// Queues `entity` for destruction at the next flush. Queuing an entity
    /// twice, or one that is already gone, is harmless.
    pub fn destroy_components_soon(&self, entity: EntityId) {
        self.destruction_queue.borrow_mut().push(entity);
    }

    pub fn pending_destructions(&self) -> usize {
        self.destruction_queue.borrow().len()
    }

    /// Destroys every queued entity. Entities queued by `Destroy` handlers
    /// are destroyed in the same call.
    pub fn flush_destroyed_components(&self) {
        loop {
            let queue = std::mem::take(&mut *self.destruction_queue.borrow_mut());
            if queue.is_empty() {
                break;
            }
            for entity in queue {
                self.destroy_entity_now(entity);
            }
        }
    }

    fn destroy_entity_now(&self, entity: EntityId) {
        if !self.entity_exists(entity) {
            return;
        }

        self.post_message(entity, &MessageDestroy { entity });

        // Purge pending subscription edits before instances disappear.
        self.dynamic_subscriptions.borrow_mut().flatten_all();

        let components = self.storage.borrow().components_of_entity(entity);
        for instance in components {
            self.deinit_component(&instance);
            self.dynamic_subscriptions
                .borrow_mut()
                .remove_component(instance.key());
            self.storage.borrow_mut().remove(&instance);
        }

        if let Some(handle) = self.storage.borrow_mut().remove_entity(entity) {
            handle.clear();
        }
    }

    fn deinit_component(&self, instance: &ComponentRef) {
        let ctx = ComponentContext::new(self, instance.entity(), instance.component_type());
        match instance.try_borrow_mut() {
            Ok(mut component) => component.deinit(&ctx),
            Err(_) => warn!(
                "Component type {} on entity {} is busy and was not deinitialized",
                instance.component_type(),
                instance.entity()
            ),
        }
    }

    /// Destroys everything: components (deinitialized in reverse type
    /// order), entities, subscriptions made at runtime and pending
    /// destructions. Registrations are kept.
    pub fn reset_state(&self) {
        self.dynamic_subscriptions.borrow_mut().clear();

        let components = self.storage.borrow().all_components_reversed();
        for instance in &components {
            self.deinit_component(instance);
        }

        self.storage.borrow_mut().clear();
        *self.system_entity.borrow_mut() = None;
        self.destruction_queue.borrow_mut().clear();
        self.entity_ids.borrow_mut().reset();
    }

    // System entity

    pub fn init_system_entity(&self) -> Result<EntityHandle, EntityError> {
        if self.system_entity.borrow().is_some() {
            return Err(EntityError::SystemEntityAlreadyInitialized);
        }
        let handle = self.allocate_entity_handle(SYSTEM_ENTITY)?;
        *self.system_entity.borrow_mut() = Some(handle.clone());
        Ok(handle)
    }

    pub fn system_entity(&self) -> Option<EntityHandle> {
        self.system_entity.borrow().clone()
    }

    /// Adds the native system components, then (unless `skip_scripted`) the
    /// script system components, each in registration order.
    pub fn add_system_components(&self, skip_scripted: bool) -> Result<(), EntityError> {
        let Some(handle) = self.system_entity() else {
            return Err(EntityError::SystemEntityNotInitialized);
        };
        let mut component_types = self.registry.borrow().native_system_components().to_vec();
        if !skip_scripted {
            component_types.extend_from_slice(self.registry.borrow().scripted_system_components());
        }

        let empty = ParamNode::new();
        for component_type in component_types {
            if let Err(source) = self.add_component(&handle, component_type, &empty) {
                let name = self
                    .registry
                    .borrow()
                    .component_type_name(component_type)
                    .unwrap_or_default()
                    .to_string();
                return Err(EntityError::ComponentConstructionFailed {
                    name,
                    template: String::new(),
                    source,
                });
            }
        }
        Ok(())
    }
}
