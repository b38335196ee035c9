//! # Driving Ports (API - Inbound)
//!
//! The interface the bound account exposes to its coordinator, its owner
//! and anonymous synchronizers.

use crate::domain::entities::{ActionOutput, Call, RefundOutcome, Request, SyncOutcome};
use crate::domain::value_objects::{Address, Bytes, Hash, U256};
use crate::errors::AccountError;
use async_trait::async_trait;

// =============================================================================
// REQUEST RECEIPT
// =============================================================================

/// Outcome of a request that passed validation.
///
/// The nonce is consumed and the prefund settled even when `execution`
/// failed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestReceipt {
    /// Digest the owner signed.
    pub request_hash: Hash,
    /// Nonce consumed by the request.
    pub nonce: u64,
    /// What the action produced, or why it failed.
    pub execution: Result<ActionOutput, AccountError>,
}

impl RequestReceipt {
    /// Returns true if the action completed.
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.execution.is_ok()
    }
}

// =============================================================================
// BOUND ACCOUNT API (Primary Driving Port)
// =============================================================================

/// Entry points of a bound account.
///
/// ## Usage
///
/// ```ignore
/// let receipt = api.handle_request(request, gas_price).await?;
/// ```
#[async_trait]
pub trait BoundAccountApi: Send + Sync {
    /// Run the coordinator flow for one request: nonce check, validation,
    /// nonce consumption, then the action.
    ///
    /// # Errors
    ///
    /// `NonceMismatch`, `Validation` for rejected requests, or the fatal
    /// `InsufficientFunds`. Failures of the action itself land in the receipt.
    async fn handle_request(
        &self,
        request: Request,
        gas_price: U256,
    ) -> Result<RequestReceipt, AccountError>;

    /// Refresh the owner cache. Open to anyone.
    async fn synchronize(&self, caller: Address) -> Result<SyncOutcome, AccountError>;

    /// Refresh the owner cache for a bounty.
    async fn synchronize_and_refund(
        &self,
        caller: Address,
        recipient: Option<Address>,
        gas_price: U256,
    ) -> Result<RefundOutcome, AccountError>;

    /// Raise the pause signal.
    async fn pause(&self, caller: Address) -> Result<(), AccountError>;

    /// Forward a call as the owner.
    async fn execute(&self, caller: Address, call: Call) -> Result<Bytes, AccountError>;

    /// Forward a batch of calls as the owner.
    async fn execute_batch(
        &self,
        caller: Address,
        calls: Vec<Call>,
    ) -> Result<Vec<Bytes>, AccountError>;

    /// ERC-1271 style signature check against the trusted owner.
    async fn is_valid_signature(&self, hash: Hash, signature: Bytes) -> [u8; 4];

    /// Live owner from the registry.
    async fn owner(&self) -> Result<Address, AccountError>;

    /// Last synchronized owner.
    async fn cached_owner(&self) -> Address;

    /// True while the cached owner is not trusted.
    async fn is_stale(&self) -> bool;
}
