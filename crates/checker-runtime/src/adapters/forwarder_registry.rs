//! # Forwarder Registry
//!
//! Named forwarders and the address → forwarder assignments. Resolution
//! happens per message, so changes apply to the next delivered link.

use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use pm_05_address_checker::ForwarderResolver;
use shared_types::{Address, MailForwarder};

use crate::errors::RuntimeError;

/// Registry of named forwarders.
#[derive(Default)]
pub struct ForwarderRegistry {
    forwarders: RwLock<BTreeMap<String, Arc<dyn MailForwarder>>>,
    assignments: RwLock<HashMap<Address, String>>,
}

impl ForwarderRegistry {
    /// Empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a forwarder. Existing assignments keep the name and
    /// pick up the replacement.
    pub fn insert(&self, name: impl Into<String>, forwarder: Arc<dyn MailForwarder>) {
        self.forwarders.write().insert(name.into(), forwarder);
    }

    /// Drop a forwarder; returns the addresses that were assigned to it.
    pub fn remove(&self, name: &str) -> Option<Vec<Address>> {
        self.forwarders.write().remove(name)?;

        let mut assignments = self.assignments.write();
        let mut orphaned: Vec<Address> = assignments
            .iter()
            .filter(|(_, assigned)| assigned.as_str() == name)
            .map(|(address, _)| address.clone())
            .collect();
        orphaned.sort();
        for address in &orphaned {
            assignments.remove(address);
        }
        Some(orphaned)
    }

    /// Point `address` at the forwarder called `name`.
    pub fn assign(&self, address: &Address, name: &str) -> Result<(), RuntimeError> {
        if !self.forwarders.read().contains_key(name) {
            return Err(RuntimeError::UnknownForwarder(name.to_string()));
        }
        self.assignments
            .write()
            .insert(address.clone(), name.to_string());
        Ok(())
    }

    /// Forget the assignment for `address`.
    pub fn unassign(&self, address: &Address) {
        self.assignments.write().remove(address);
    }

    /// Name assigned to `address`.
    pub fn assignment(&self, address: &Address) -> Option<String> {
        self.assignments.read().get(address).cloned()
    }

    /// Any registered name; the first in sort order.
    pub fn any_name(&self) -> Option<String> {
        self.forwarders.read().keys().next().cloned()
    }

    /// Registered names, sorted.
    pub fn names(&self) -> Vec<String> {
        self.forwarders.read().keys().cloned().collect()
    }

    /// Number of registered forwarders.
    pub fn len(&self) -> usize {
        self.forwarders.read().len()
    }

    /// True when no forwarder is registered.
    pub fn is_empty(&self) -> bool {
        self.forwarders.read().is_empty()
    }
}

impl ForwarderResolver for ForwarderRegistry {
    fn resolve(&self, address: &Address) -> Option<Arc<dyn MailForwarder>> {
        let name = self.assignments.read().get(address).cloned()?;
        self.forwarders.read().get(&name).cloned()
    }
}
