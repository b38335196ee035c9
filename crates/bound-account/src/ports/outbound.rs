//! # Driven Ports (SPI - Outbound)
//!
//! Interfaces the bound account depends on:
//! - Ownership registry (source of truth for the owner)
//! - Execution relay (value transfers and forwarded calls)
//! - Coordinator (deposit ledger and nonce sequence)
//! - Delegated verifiers (contract owners that check their own signatures)
//!
//! All ports are synchronous: validation and synchronization never suspend.

use crate::domain::value_objects::{Address, Bytes, Hash, U256};
use crate::errors::{CoordinatorError, RegistryError};

// =============================================================================
// OWNERSHIP REGISTRY
// =============================================================================

/// Authoritative asset -> owner mapping.
///
/// Only synchronization and the live `owner()` accessor query it; validation
/// never does.
pub trait OwnershipRegistry: Send + Sync {
    /// Current owner of `asset_id` in `registry`.
    ///
    /// # Errors
    ///
    /// Returns `RegistryError` for unknown assets or an unreachable registry.
    fn owner_of(&self, registry: Address, asset_id: U256) -> Result<Address, RegistryError>;
}

// =============================================================================
// EXECUTION RELAY
// =============================================================================

/// Position in the relay's change journal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Checkpoint(pub usize);

/// Why a value transfer did not happen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransferFailure {
    /// Sender balance too low.
    InsufficientBalance,
    /// Recipient refused the funds.
    Rejected,
}

/// Forwards calls and value on behalf of the account.
pub trait ExecutionRelay: Send + Sync {
    /// Native balance of `address`.
    fn balance_of(&self, address: Address) -> U256;

    /// Move `value` from `from` to `to`.
    ///
    /// # Errors
    ///
    /// Returns why the transfer failed; nothing moves on failure.
    fn transfer(&self, from: Address, to: Address, value: U256) -> Result<(), TransferFailure>;

    /// Call `target` with `value` and `data`.
    ///
    /// # Errors
    ///
    /// Returns the callee's failure payload; the call's own effects are undone.
    fn call(&self, from: Address, target: Address, value: U256, data: &[u8])
        -> Result<Bytes, Bytes>;

    /// Mark the current journal position.
    fn checkpoint(&self) -> Checkpoint;

    /// Undo every change made after `checkpoint` and close it.
    fn revert_to(&self, checkpoint: Checkpoint);

    /// Keep every change made after `checkpoint` and close it.
    fn commit(&self, checkpoint: Checkpoint);
}

// =============================================================================
// COORDINATOR
// =============================================================================

/// The coordinator's per-account ledger and sequencing.
pub trait Coordinator: Send + Sync {
    /// Coordinator address; calls from it resolve to `Caller::Coordinator`.
    fn address(&self) -> Address;

    /// Deposit held for `account`.
    fn deposit_of(&self, account: Address) -> U256;

    /// Credit `amount` (already transferred to the coordinator) to `account`.
    fn deposit_to(&self, account: Address, amount: U256);

    /// Pay `amount` out of `account`'s deposit to `to`.
    ///
    /// # Errors
    ///
    /// Returns `CoordinatorError` if the deposit is short or the payout fails.
    fn withdraw_to(&self, account: Address, to: Address, amount: U256)
        -> Result<(), CoordinatorError>;

    /// Next nonce the coordinator will accept for `account`.
    fn nonce_of(&self, account: Address) -> u64;

    /// Consume the current nonce for `account`.
    fn increment_nonce(&self, account: Address);
}

// =============================================================================
// DELEGATED VERIFIERS
// =============================================================================

/// Contract-like owners that validate signatures themselves.
pub trait DelegatedVerifier: Send + Sync {
    /// True if `address` validates its own signatures.
    fn is_verifier(&self, address: Address) -> bool;

    /// Ask `verifier` whether `signature` is valid for `hash`.
    fn is_valid_signature(&self, verifier: Address, hash: &Hash, signature: &[u8]) -> bool;
}

/// Verifier set with no contract owners; every owner is a plain key.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelegatedVerifiers;

impl DelegatedVerifier for NoDelegatedVerifiers {
    fn is_verifier(&self, _address: Address) -> bool {
        false
    }

    fn is_valid_signature(&self, _verifier: Address, _hash: &Hash, _signature: &[u8]) -> bool {
        false
    }
}

// =============================================================================
// TESTS
// =============================================================================
