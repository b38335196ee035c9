//! # Registry Adapter
//!
//! In-memory ownership registry.

use crate::domain::value_objects::{Address, U256};
use crate::errors::RegistryError;
use crate::ports::outbound::OwnershipRegistry;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

/// In-memory asset -> owner table.
#[derive(Debug, Default)]
pub struct InMemoryRegistry {
    /// Owners keyed by `(registry, asset_id)`.
    owners: RwLock<HashMap<(Address, U256), Address>>,
    /// Simulate an unreachable registry.
    unavailable: AtomicBool,
    /// Number of `owner_of` calls served.
    queries: AtomicUsize,
}

impl InMemoryRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `owner` as the owner of `asset_id`. Also models transfers.
    pub fn set_owner(&self, registry: Address, asset_id: U256, owner: Address) {
        self.owners.write().insert((registry, asset_id), owner);
    }

    /// Burn the asset: it no longer exists.
    pub fn remove(&self, registry: Address, asset_id: U256) {
        self.owners.write().remove(&(registry, asset_id));
    }

    /// Toggle the outage simulation.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// How many lookups have been made.
    #[must_use]
    pub fn queries(&self) -> usize {
        self.queries.load(Ordering::SeqCst)
    }
}

impl OwnershipRegistry for InMemoryRegistry {
    fn owner_of(&self, registry: Address, asset_id: U256) -> Result<Address, RegistryError> {
        self.queries.fetch_add(1, Ordering::SeqCst);
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(RegistryError::Unavailable);
        }
        self.owners
            .read()
            .get(&(registry, asset_id))
            .copied()
            .ok_or(RegistryError::UnknownAsset { registry, asset_id })
    }
}
