//! # Verifier Adapter
//!
//! Contract owners that approve specific `(hash, signature)` pairs.

use crate::domain::value_objects::{Address, Bytes, Hash};
use crate::ports::outbound::DelegatedVerifier;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};

/// In-memory set of delegated verifiers.
#[derive(Debug, Default)]
pub struct InMemoryVerifiers {
    approvals: RwLock<HashMap<Address, HashSet<(Hash, Bytes)>>>,
}

impl InMemoryVerifiers {
    /// No verifiers registered.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `verifier` as a contract owner with no approvals yet.
    pub fn register(&self, verifier: Address) {
        self.approvals.write().entry(verifier).or_default();
    }

    /// Have `verifier` accept `signature` for `hash`. Registers it if needed.
    pub fn approve(&self, verifier: Address, hash: Hash, signature: Bytes) {
        self.approvals
            .write()
            .entry(verifier)
            .or_default()
            .insert((hash, signature));
    }
}

impl DelegatedVerifier for InMemoryVerifiers {
    fn is_verifier(&self, address: Address) -> bool {
        self.approvals.read().contains_key(&address)
    }

    fn is_valid_signature(&self, verifier: Address, hash: &Hash, signature: &[u8]) -> bool {
        self.approvals
            .read()
            .get(&verifier)
            .is_some_and(|approved| approved.contains(&(*hash, Bytes::from_slice(signature))))
    }
}
