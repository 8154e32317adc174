use crate::{
    types::{EntityId, FIRST_LOCAL_ENTITY, INVALID_ENTITY, SYSTEM_ENTITY},
    EntityError,
};

/// Hands out entity ids. Replicated and local ids come from separate
/// monotonic counters and are never reused.
pub struct EntityIdGenerator {
    next_entity_id: EntityId,
    next_local_entity_id: EntityId,
}

impl Default for EntityIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityIdGenerator {
    pub fn new() -> Self {
        Self {
            next_entity_id: SYSTEM_ENTITY + 1,
            next_local_entity_id: FIRST_LOCAL_ENTITY,
        }
    }

    pub fn allocate_new_entity(&mut self) -> Result<EntityId, EntityError> {
        let entity = self.next_entity_id;
        if entity >= FIRST_LOCAL_ENTITY {
            return Err(EntityError::IdSpaceExhausted { local: false });
        }
        self.next_entity_id += 1;
        Ok(entity)
    }

    /// Allocates `preferred` verbatim. The counter moves past it when needed,
    /// so later automatic ids never collide with it.
    pub fn allocate_new_entity_with_id(
        &mut self,
        preferred: EntityId,
    ) -> Result<EntityId, EntityError> {
        if preferred == INVALID_ENTITY || preferred >= FIRST_LOCAL_ENTITY {
            return Err(EntityError::InvalidPreferredId { entity: preferred });
        }
        if preferred >= self.next_entity_id {
            self.next_entity_id = preferred + 1;
        }
        Ok(preferred)
    }

    pub fn allocate_new_local_entity(&mut self) -> Result<EntityId, EntityError> {
        let entity = self.next_local_entity_id;
        if entity == EntityId::MAX {
            return Err(EntityError::IdSpaceExhausted { local: true });
        }
        self.next_local_entity_id += 1;
        Ok(entity)
    }

    pub fn next_entity_id(&self) -> EntityId {
        self.next_entity_id
    }

    /// Restores the replicated counter from a saved state.
    pub fn set_next_entity_id(&mut self, next_entity_id: EntityId) {
        self.next_entity_id = next_entity_id;
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}
