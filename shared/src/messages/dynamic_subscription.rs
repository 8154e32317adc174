use std::collections::{BTreeMap, BTreeSet};

use crate::types::{ComponentKey, MessageTypeId};

/// A subscriber set that tolerates edits while it is being iterated.
///
/// Adds and removes are buffered; [`flatten`](Self::flatten) folds them into
/// the sorted subscriber list. Delivery iterates a snapshot of that list, so
/// edits made by handlers take effect on the next flatten.
#[derive(Clone, Debug)]
pub struct DynamicSubscription<T: Ord + Clone> {
    components: Vec<T>,
    added: BTreeSet<T>,
    removed: BTreeSet<T>,
}

impl<T: Ord + Clone> Default for DynamicSubscription<T> {
    fn default() -> Self {
        Self {
            components: Vec::new(),
            added: BTreeSet::new(),
            removed: BTreeSet::new(),
        }
    }
}

impl<T: Ord + Clone> DynamicSubscription<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, item: T) {
        self.removed.remove(&item);
        self.added.insert(item);
    }

    pub fn remove(&mut self, item: T) {
        self.added.remove(&item);
        self.removed.insert(item);
    }

    /// Applies pending edits. Afterwards the list is sorted, unique, and
    /// equals the previous list plus pending adds minus pending removes.
    pub fn flatten(&mut self) {
        if self.added.is_empty() && self.removed.is_empty() {
            return;
        }
        let added = std::mem::take(&mut self.added);
        let removed = std::mem::take(&mut self.removed);
        let mut merged: BTreeSet<T> = self.components.drain(..).collect();
        merged.extend(added);
        self.components = merged
            .into_iter()
            .filter(|item| !removed.contains(item))
            .collect();
    }

    /// The flattened subscriber list, ignoring pending edits.
    pub fn components(&self) -> &[T] {
        &self.components
    }

    pub fn has_pending_edits(&self) -> bool {
        !self.added.is_empty() || !self.removed.is_empty()
    }

    pub fn clear(&mut self) {
        self.components.clear();
        self.added.clear();
        self.removed.clear();
    }
}

/// Dynamic subscriptions of every message type, plus a reverse index so a
/// destroyed component can drop all of its subscriptions at once.
#[derive(Default)]
pub struct DynamicSubscriptionTable {
    by_message: BTreeMap<MessageTypeId, DynamicSubscription<ComponentKey>>,
    by_component: BTreeMap<ComponentKey, BTreeSet<MessageTypeId>>,
}

impl DynamicSubscriptionTable {
    pub fn set(&mut self, message_type: MessageTypeId, key: ComponentKey, enabled: bool) {
        let subscription = self.by_message.entry(message_type).or_default();
        if enabled {
            subscription.add(key);
            self.by_component.entry(key).or_default().insert(message_type);
        } else {
            subscription.remove(key);
            if let Some(message_types) = self.by_component.get_mut(&key) {
                message_types.remove(&message_type);
                if message_types.is_empty() {
                    self.by_component.remove(&key);
                }
            }
        }
    }

    /// Flattens the ledger of `message_type` and returns its subscribers.
    pub fn flatten_and_snapshot(&mut self, message_type: MessageTypeId) -> Vec<ComponentKey> {
        match self.by_message.get_mut(&message_type) {
            Some(subscription) => {
                subscription.flatten();
                subscription.components().to_vec()
            }
            None => Vec::new(),
        }
    }

    pub fn flatten_all(&mut self) {
        for subscription in self.by_message.values_mut() {
            subscription.flatten();
        }
    }

    /// Removes every subscription held by `key` and flattens the affected
    /// ledgers.
    pub fn remove_component(&mut self, key: ComponentKey) {
        let Some(message_types) = self.by_component.remove(&key) else {
            return;
        };
        for message_type in message_types {
            if let Some(subscription) = self.by_message.get_mut(&message_type) {
                subscription.remove(key);
                subscription.flatten();
            }
        }
    }

    pub fn subscribers(&self, message_type: MessageTypeId) -> &[ComponentKey] {
        self.by_message
            .get(&message_type)
            .map(DynamicSubscription::components)
            .unwrap_or_default()
    }

    pub fn clear(&mut self) {
        self.by_message.clear();
        self.by_component.clear();
    }
}
