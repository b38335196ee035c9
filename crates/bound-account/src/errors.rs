//! # Error Types
//!
//! All error types for the bound account.

use crate::domain::entities::ValidationFailure;
use crate::domain::value_objects::{Address, Bytes, U256};
use thiserror::Error;

// =============================================================================
// ACCOUNT ERRORS
// =============================================================================

/// Errors surfaced by account entry points.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AccountError {
    /// Caller lacks the capability the entry point requires.
    #[error("unauthorized caller: {caller:?}")]
    Unauthorized {
        /// Calling address.
        caller: Address,
    },

    /// The cache is stale; only synchronization may run.
    #[error("synchronization required")]
    SyncRequired,

    /// Validation rejected the request.
    #[error("validation failed: {0}")]
    Validation(ValidationFailure),

    /// The account cannot cover what the coordinator is owed.
    #[error("insufficient funds: required {required}, available {available}")]
    InsufficientFunds {
        /// Amount owed.
        required: U256,
        /// Account balance.
        available: U256,
    },

    /// A forwarded call failed; `data` is the callee's failure payload verbatim.
    #[error("call to {target:?} reverted: {data:?}")]
    CallReverted {
        /// Call target.
        target: Address,
        /// Position in the batch, if the call was part of one.
        index: Option<usize>,
        /// Callee failure payload.
        data: Bytes,
    },

    /// The bounty does not cover the caller's gas cost.
    #[error("unprofitable sync: refund {refund} < cost {cost}")]
    UnprofitableSync {
        /// Fixed bounty.
        refund: U256,
        /// Gas cost at the effective gas price.
        cost: U256,
    },

    /// The cache was already up to date; no bounty is owed.
    #[error("owner cache already up to date")]
    SyncNotNeeded,

    /// The request nonce is not the coordinator's next nonce.
    #[error("nonce mismatch: expected {expected}, got {got}")]
    NonceMismatch {
        /// Next nonce per the coordinator.
        expected: u64,
        /// Nonce the request carried.
        got: u64,
    },

    /// Registry query failed.
    #[error("registry error: {0}")]
    Registry(#[from] RegistryError),

    /// Coordinator ledger operation failed.
    #[error("coordinator error: {0}")]
    Coordinator(#[from] CoordinatorError),
}

impl From<ValidationFailure> for AccountError {
    fn from(failure: ValidationFailure) -> Self {
        Self::Validation(failure)
    }
}

impl AccountError {
    /// Returns true if this error aborts the request rather than rejecting it.
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        matches!(self, Self::InsufficientFunds { .. })
    }
}

// =============================================================================
// REGISTRY ERRORS
// =============================================================================

/// Errors from the ownership registry.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// No such asset in the registry.
    #[error("asset {asset_id} not found in registry {registry:?}")]
    UnknownAsset {
        /// Registry contract.
        registry: Address,
        /// Asset identifier.
        asset_id: U256,
    },

    /// The registry could not be reached.
    #[error("registry unavailable")]
    Unavailable,
}

// =============================================================================
// COORDINATOR ERRORS
// =============================================================================

/// Errors from the coordinator's deposit ledger.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CoordinatorError {
    /// Withdrawal exceeds the recorded deposit.
    #[error("withdrawal {requested} exceeds deposit {available}")]
    InsufficientDeposit {
        /// Amount requested.
        requested: U256,
        /// Deposit on record.
        available: U256,
    },

    /// The payout transfer failed.
    #[error("withdrawal transfer to {0:?} failed")]
    TransferFailed(Address),
}

// =============================================================================
// TESTS
// =============================================================================
