use std::collections::BTreeMap;

use crate::{messages::NATIVE_MESSAGE_TYPES, types::MessageTypeId};

/// Bidirectional name/id table of message types.
///
/// Native types occupy the first ids; each newly registered name gets the
/// next id.
pub struct MessageKinds {
    ids_by_name: BTreeMap<String, MessageTypeId>,
    names_by_id: BTreeMap<MessageTypeId, String>,
}

impl Default for MessageKinds {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageKinds {
    pub fn new() -> Self {
        let mut kinds = Self {
            ids_by_name: BTreeMap::new(),
            names_by_id: BTreeMap::new(),
        };
        for (id, name) in NATIVE_MESSAGE_TYPES {
            kinds.insert(id, name);
        }
        kinds
    }

    /// Registers `name` and returns its id, or the existing id if the name is
    /// already known.
    pub fn add_message_type(&mut self, name: &str) -> (MessageTypeId, bool) {
        if let Some(id) = self.ids_by_name.get(name) {
            return (*id, false);
        }
        let id = self.names_by_id.len() as MessageTypeId + 1;
        self.insert(id, name);
        (id, true)
    }

    fn insert(&mut self, id: MessageTypeId, name: &str) {
        self.ids_by_name.insert(name.to_string(), id);
        self.names_by_id.insert(id, name.to_string());
    }

    pub fn id_by_name(&self, name: &str) -> Option<MessageTypeId> {
        self.ids_by_name.get(name).copied()
    }

    pub fn name_by_id(&self, id: MessageTypeId) -> Option<&str> {
        self.names_by_id.get(&id).map(String::as_str)
    }

    pub fn contains(&self, id: MessageTypeId) -> bool {
        self.names_by_id.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.names_by_id.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names_by_id.is_empty()
    }
}
