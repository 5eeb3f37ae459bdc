//! # Subscriber Queue Registry
//!
//! One bounded link queue per subscribed address. The registry owns the
//! sending halves; dropping one (via [`QueueRegistry::remove`]) closes the
//! queue once the poller's in-flight snapshot is gone, which is what stops
//! that address's checker.

use parking_lot::RwLock;
use std::collections::BTreeMap;
use tokio::sync::mpsc;

use crate::ports::{LinkSender, LinkTargets};
use shared_types::Address;

/// Default queue capacity per subscriber.
pub const DEFAULT_QUEUE_CAPACITY: usize = 250;

/// Address → queue sender map shared by the poller and the runtime.
pub struct QueueRegistry {
    queues: RwLock<BTreeMap<Address, LinkSender>>,
    capacity: usize,
}

impl QueueRegistry {
    /// Registry whose queues hold `capacity` links each.
    pub fn new(capacity: usize) -> Self {
        Self {
            queues: RwLock::new(BTreeMap::new()),
            capacity: capacity.max(1),
        }
    }

    /// Create the queue for `address`.
    ///
    /// Returns `None` if the address already has one.
    pub fn register(&self, address: &Address) -> Option<mpsc::Receiver<String>> {
        let mut queues = self.queues.write();
        if queues.contains_key(address) {
            return None;
        }
        let (tx, rx) = mpsc::channel(self.capacity);
        queues.insert(address.clone(), tx);
        Some(rx)
    }

    /// Drop the queue for `address`. Returns whether one existed.
    pub fn remove(&self, address: &Address) -> bool {
        self.queues.write().remove(address).is_some()
    }

    /// Whether `address` has a queue.
    pub fn contains(&self, address: &Address) -> bool {
        self.queues.read().contains_key(address)
    }

    /// Registered addresses, sorted.
    pub fn addresses(&self) -> Vec<Address> {
        self.queues.read().keys().cloned().collect()
    }

    /// Number of queues.
    pub fn len(&self) -> usize {
        self.queues.read().len()
    }

    /// Whether there are no queues.
    pub fn is_empty(&self) -> bool {
        self.queues.read().is_empty()
    }

    /// Capacity of each queue.
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for QueueRegistry {
    fn default() -> Self {
        Self::new(DEFAULT_QUEUE_CAPACITY)
    }
}

impl LinkTargets for QueueRegistry {
    fn snapshot(&self) -> Vec<(Address, LinkSender)> {
        self.queues
            .read()
            .iter()
            .map(|(address, tx)| (address.clone(), tx.clone()))
            .collect()
    }
}
