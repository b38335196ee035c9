//! # Coordinator Adapter
//!
//! In-memory deposit ledger and nonce sequence. Deposits are backed by the
//! coordinator's own balance in the shared relay.

use crate::domain::value_objects::{Address, U256};
use crate::errors::CoordinatorError;
use crate::ports::outbound::{Coordinator, ExecutionRelay};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// In-memory coordinator.
pub struct InMemoryCoordinator {
    address: Address,
    relay: Arc<dyn ExecutionRelay>,
    deposits: RwLock<HashMap<Address, U256>>,
    nonces: RwLock<HashMap<Address, u64>>,
}

impl fmt::Debug for InMemoryCoordinator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InMemoryCoordinator")
            .field("address", &self.address)
            .field("deposits", &*self.deposits.read())
            .field("nonces", &*self.nonces.read())
            .finish_non_exhaustive()
    }
}

impl InMemoryCoordinator {
    /// Coordinator at `address`, paying out through `relay`.
    #[must_use]
    pub fn new(address: Address, relay: Arc<dyn ExecutionRelay>) -> Self {
        Self {
            address,
            relay,
            deposits: RwLock::new(HashMap::new()),
            nonces: RwLock::new(HashMap::new()),
        }
    }
}

impl Coordinator for InMemoryCoordinator {
    fn address(&self) -> Address {
        self.address
    }

    fn deposit_of(&self, account: Address) -> U256 {
        self.deposits
            .read()
            .get(&account)
            .copied()
            .unwrap_or_default()
    }

    fn deposit_to(&self, account: Address, amount: U256) {
        let mut deposits = self.deposits.write();
        let deposit = deposits.entry(account).or_default();
        *deposit = deposit.saturating_add(amount);
    }

    fn withdraw_to(
        &self,
        account: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), CoordinatorError> {
        let mut deposits = self.deposits.write();
        let available = deposits.get(&account).copied().unwrap_or_default();
        let Some(remaining) = available.checked_sub(amount) else {
            return Err(CoordinatorError::InsufficientDeposit {
                requested: amount,
                available,
            });
        };
        self.relay
            .transfer(self.address, to, amount)
            .map_err(|_| CoordinatorError::TransferFailed(to))?;
        deposits.insert(account, remaining);
        Ok(())
    }

    fn nonce_of(&self, account: Address) -> u64 {
        self.nonces.read().get(&account).copied().unwrap_or(0)
    }

    fn increment_nonce(&self, account: Address) {
        let mut nonces = self.nonces.write();
        let nonce = nonces.entry(account).or_insert(0);
        *nonce = nonce.saturating_add(1);
    }
}
