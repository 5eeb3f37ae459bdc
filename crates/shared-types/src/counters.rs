//! # Unread Counters
//!
//! Address → unread-message count. Every mutation takes the lock; readers
//! (status displays) may observe slightly stale values.

use crate::entities::Address;
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap};

/// Thread-safe unread-mail counters.
#[derive(Debug, Default)]
pub struct UnreadCounters {
    counts: Mutex<HashMap<Address, u64>>,
}

impl UnreadCounters {
    /// Create an empty counter map.
    pub fn new() -> Self {
        Self::default()
    }

    /// Start tracking an address at zero. Existing counts are reset.
    pub fn register(&self, address: &Address) {
        self.counts.lock().insert(address.clone(), 0);
    }

    /// Stop tracking an address.
    pub fn remove(&self, address: &Address) {
        self.counts.lock().remove(address);
    }

    /// Atomically increment the count for `address`, returning the new value.
    pub fn increment(&self, address: &Address) -> u64 {
        let mut counts = self.counts.lock();
        let count = counts.entry(address.clone()).or_insert(0);
        *count += 1;
        *count
    }

    /// Current count, zero when untracked.
    pub fn get(&self, address: &Address) -> u64 {
        self.counts.lock().get(address).copied().unwrap_or(0)
    }

    /// Sorted copy of every count.
    pub fn snapshot(&self) -> BTreeMap<Address, u64> {
        self.counts
            .lock()
            .iter()
            .map(|(address, count)| (address.clone(), *count))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn test_register_and_increment() {
        let counters = UnreadCounters::new();
        let addr = Address::new("mAddr");

        counters.register(&addr);
        assert_eq!(counters.get(&addr), 0);
        assert_eq!(counters.increment(&addr), 1);
        assert_eq!(counters.increment(&addr), 2);
        assert_eq!(counters.snapshot().get(&addr), Some(&2));

        counters.remove(&addr);
        assert_eq!(counters.get(&addr), 0);
    }

    #[tokio::test]
    async fn test_concurrent_increments_are_not_lost() {
        let counters = Arc::new(UnreadCounters::new());
        let addr = Address::new("mShared");
        counters.register(&addr);

        let mut handles = Vec::new();
        for _ in 0..8 {
            let counters = Arc::clone(&counters);
            let addr = addr.clone();
            handles.push(tokio::spawn(async move {
                for _ in 0..100 {
                    counters.increment(&addr);
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(counters.get(&addr), 800);
    }
}
