//! # Core Domain Entities
//!
//! Requests, execution context and validation outcomes for the bound account.

use crate::domain::value_objects::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// SYNC ECONOMICS
// =============================================================================

/// Economic parameters of the synchronization bounty.
///
/// Fixed at account creation; the account exposes no way to change them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncEconomics {
    /// Estimated gas of the sync operation itself.
    pub sync_gas_cost: u64,
    /// Estimated gas of paying the refund.
    pub refund_gas_cost: u64,
    /// Flat bounty paid to the synchronizer.
    pub sync_refund: U256,
    /// Maximum fee budget a forced sync request may consume.
    pub sync_prefund: U256,
}

impl SyncEconomics {
    /// Creates a new set of sync economics.
    #[must_use]
    pub const fn new(
        sync_gas_cost: u64,
        refund_gas_cost: u64,
        sync_refund: U256,
        sync_prefund: U256,
    ) -> Self {
        Self {
            sync_gas_cost,
            refund_gas_cost,
            sync_refund,
            sync_prefund,
        }
    }
}

// =============================================================================
// CALLS AND ACTIONS
// =============================================================================

/// A single forwarded call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Call {
    /// Call target.
    pub target: Address,
    /// Value sent with the call.
    pub value: U256,
    /// Call payload.
    pub data: Bytes,
}

impl Call {
    /// Creates a new call.
    #[must_use]
    pub fn new(target: Address, value: U256, data: Bytes) -> Self {
        Self {
            target,
            value,
            data,
        }
    }
}

/// The action a request asks the account to perform once validated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    /// Refresh the owner cache.
    Synchronize,
    /// Refresh the owner cache and pay the bounty to `recipient`.
    SynchronizeAndRefund {
        /// Bounty recipient. Defaults to the caller.
        recipient: Option<Address>,
    },
    /// Forward one call.
    Execute(Call),
    /// Forward calls in order, all-or-nothing.
    ExecuteBatch(Vec<Call>),
}

impl Action {
    /// Returns true if this action is one of the synchronization actions.
    #[must_use]
    pub fn is_synchronization(&self) -> bool {
        matches!(self, Self::Synchronize | Self::SynchronizeAndRefund { .. })
    }
}

// =============================================================================
// REQUEST
// =============================================================================

/// Fee sponsorship extension attached to a request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sponsorship {
    /// Sponsor contract.
    pub paymaster: Address,
    /// Sponsor-specific payload.
    pub data: Bytes,
}

/// One authorization request as submitted by the coordinator.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// Account the request targets.
    pub sender: Address,
    /// Sequence number. Zero marks the bootstrap sync request.
    pub nonce: u64,
    /// Action to run after validation.
    pub action: Action,
    /// Gas for the execution phase.
    pub call_gas_limit: u64,
    /// Gas for the validation phase.
    pub verification_gas_limit: u64,
    /// Gas charged up front for request overhead.
    pub pre_verification_gas: u64,
    /// Maximum fee per gas.
    pub max_fee_per_gas: U256,
    /// Maximum priority fee per gas.
    pub max_priority_fee_per_gas: U256,
    /// Optional fee sponsorship.
    pub sponsorship: Option<Sponsorship>,
    /// Owner signature over the request digest.
    pub signature: Bytes,
}

impl Request {
    /// Creates an unsigned request with zeroed fee fields.
    #[must_use]
    pub fn new(sender: Address, nonce: u64, action: Action) -> Self {
        Self {
            sender,
            nonce,
            action,
            call_gas_limit: 0,
            verification_gas_limit: 0,
            pre_verification_gas: 0,
            max_fee_per_gas: U256::zero(),
            max_priority_fee_per_gas: U256::zero(),
            sponsorship: None,
            signature: Bytes::new(),
        }
    }

    /// Sets the three gas limits.
    #[must_use]
    pub fn with_gas(mut self, pre_verification: u64, verification: u64, call: u64) -> Self {
        self.pre_verification_gas = pre_verification;
        self.verification_gas_limit = verification;
        self.call_gas_limit = call;
        self
    }

    /// Sets the fee rates.
    #[must_use]
    pub fn with_fees(mut self, max_fee_per_gas: U256, max_priority_fee_per_gas: U256) -> Self {
        self.max_fee_per_gas = max_fee_per_gas;
        self.max_priority_fee_per_gas = max_priority_fee_per_gas;
        self
    }

    /// Attaches a fee sponsorship extension.
    #[must_use]
    pub fn with_sponsorship(mut self, paymaster: Address, data: Bytes) -> Self {
        self.sponsorship = Some(Sponsorship { paymaster, data });
        self
    }

    /// Sets the signature.
    #[must_use]
    pub fn with_signature(mut self, signature: Bytes) -> Self {
        self.signature = signature;
        self
    }

    /// True for the nonce-0 bootstrap request.
    #[must_use]
    pub fn is_bootstrap(&self) -> bool {
        self.nonce == 0
    }

    /// True when a fee sponsorship extension is attached.
    #[must_use]
    pub fn is_sponsored(&self) -> bool {
        self.sponsorship.is_some()
    }
}

// =============================================================================
// CALLER AND CONTEXT
// =============================================================================

/// Capability of whoever invoked an entry point, resolved once per call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Caller {
    /// The coordinator sequencing requests for this account.
    Coordinator,
    /// The cached owner, while the cache is fresh.
    DirectOwner,
    /// Anyone else.
    Anonymous,
}

impl Caller {
    /// Returns true for the coordinator.
    #[must_use]
    pub fn is_coordinator(self) -> bool {
        self == Self::Coordinator
    }

    /// Returns true for callers allowed to drive execution.
    #[must_use]
    pub fn is_privileged(self) -> bool {
        matches!(self, Self::Coordinator | Self::DirectOwner)
    }
}

/// Per-invocation context: who is calling and at what gas price.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CallContext {
    /// Calling address.
    pub caller: Address,
    /// Effective gas price of the enclosing transaction.
    pub gas_price: U256,
}

impl CallContext {
    /// Creates a new call context.
    #[must_use]
    pub fn new(caller: Address, gas_price: U256) -> Self {
        Self { caller, gas_price }
    }
}

/// Whether the cached owner may be trusted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountStatus {
    /// Cache trusted for authorization.
    Active,
    /// Cache not trusted; only synchronization is allowed.
    Stale,
}

// =============================================================================
// VALIDATION OUTCOME
// =============================================================================

/// Which fee bound a request broke.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeeBoundViolation {
    /// `max_fee_per_gas` above ceiling.
    MaxFeePerGas,
    /// `max_priority_fee_per_gas` above ceiling.
    MaxPriorityFeePerGas,
    /// `pre_verification_gas` above ceiling.
    PreVerificationGas,
    /// `verification_gas_limit` outside floor..=ceiling.
    VerificationGasLimit,
    /// `call_gas_limit` outside floor..=ceiling.
    CallGasLimit,
}

impl fmt::Display for FeeBoundViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::MaxFeePerGas => "max_fee_per_gas",
            Self::MaxPriorityFeePerGas => "max_priority_fee_per_gas",
            Self::PreVerificationGas => "pre_verification_gas",
            Self::VerificationGasLimit => "verification_gas_limit",
            Self::CallGasLimit => "call_gas_limit",
        };
        f.write_str(name)
    }
}

/// Why validation rejected a request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum ValidationFailure {
    /// Signature does not match the cached owner.
    #[error("bad signature")]
    BadSignature,
    /// Account must synchronize before anything else.
    #[error("synchronization required")]
    SyncRequired,
    /// Forced sync request could consume more than `sync_prefund`.
    #[error("required prefund {required} exceeds sync prefund {ceiling}")]
    PrefundExceeded {
        /// Worst-case fee of the request.
        required: U256,
        /// Configured ceiling.
        ceiling: U256,
    },
    /// A fee field is out of its configured bounds.
    #[error("fee bound exceeded: {0}")]
    FeeBoundsExceeded(FeeBoundViolation),
    /// Validation was not invoked by the coordinator.
    #[error("unauthorized validation caller")]
    Unauthorized,
}

impl ValidationFailure {
    /// Stable numeric code for the failure marker. Zero is reserved for success.
    #[must_use]
    pub fn code(&self) -> u8 {
        match self {
            Self::BadSignature => 1,
            Self::SyncRequired => 2,
            Self::PrefundExceeded { .. } => 3,
            Self::FeeBoundsExceeded(_) => 4,
            Self::Unauthorized => 5,
        }
    }
}

/// Result of `validate`: success marker or a failure marker.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValidationData {
    /// The coordinator may execute the request.
    Valid,
    /// The request must not be executed.
    Invalid(ValidationFailure),
}

impl ValidationData {
    /// Returns true on success.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        matches!(self, Self::Valid)
    }

    /// Numeric code: 0 for success, the failure code otherwise.
    #[must_use]
    pub fn code(&self) -> u8 {
        match self {
            Self::Valid => 0,
            Self::Invalid(failure) => failure.code(),
        }
    }

    /// Returns the failure, if any.
    #[must_use]
    pub fn failure(&self) -> Option<ValidationFailure> {
        match self {
            Self::Valid => None,
            Self::Invalid(failure) => Some(*failure),
        }
    }
}

// =============================================================================
// SYNC OUTCOMES
// =============================================================================

/// Result of `synchronize`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncOutcome {
    /// The cached owner changed.
    pub updated: bool,
    /// Owner after synchronization.
    pub current_owner: Address,
}

/// Result of `synchronize_and_refund`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefundOutcome {
    /// Owner after synchronization.
    pub current_owner: Address,
    /// Bounty minus the caller's gas cost.
    pub profit: U256,
    /// Amount actually transferred (zero if the transfer failed).
    pub refunded: U256,
}

/// What running a validated action produced.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum ActionOutput {
    /// Result of `synchronize`.
    Synced(SyncOutcome),
    /// Result of `synchronize_and_refund`.
    Refunded(RefundOutcome),
    /// Return data of a single call.
    Executed(Bytes),
    /// Return data of each batched call.
    Batch(Vec<Bytes>),
}
