use std::collections::BTreeMap;

use crate::types::{ComponentTypeId, MessageTypeId};

/// Static per-type subscriptions: which component types receive a message
/// type locally (posted to their own entity, or broadcast) and which receive
/// it globally (posted to any entity).
///
/// Subscriber lists are sorted ascending and free of duplicates, which fixes
/// delivery order.
#[derive(Default)]
pub struct MessageSubscriptions {
    local: BTreeMap<MessageTypeId, Vec<ComponentTypeId>>,
    global: BTreeMap<MessageTypeId, Vec<ComponentTypeId>>,
}

fn insert_sorted(list: &mut Vec<ComponentTypeId>, component_type: ComponentTypeId) {
    if let Err(index) = list.binary_search(&component_type) {
        list.insert(index, component_type);
    }
}

impl MessageSubscriptions {
    pub fn subscribe_local(&mut self, message_type: MessageTypeId, component_type: ComponentTypeId) {
        insert_sorted(self.local.entry(message_type).or_default(), component_type);
    }

    pub fn subscribe_global(
        &mut self,
        message_type: MessageTypeId,
        component_type: ComponentTypeId,
    ) {
        insert_sorted(self.global.entry(message_type).or_default(), component_type);
    }

    pub fn local_subscribers(&self, message_type: MessageTypeId) -> &[ComponentTypeId] {
        self.local
            .get(&message_type)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn global_subscribers(&self, message_type: MessageTypeId) -> &[ComponentTypeId] {
        self.global
            .get(&message_type)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Drops every subscription of `component_type`, in both tables.
    pub fn remove_component_type(&mut self, component_type: ComponentTypeId) {
        for list in self.local.values_mut().chain(self.global.values_mut()) {
            list.retain(|subscriber| *subscriber != component_type);
        }
    }
}
