//! # Bound Account - Asset-Controlled Smart Account
//!
//! An account whose authority is "whoever currently owns a given asset" in an
//! external ownership registry. The owner is cached locally so request
//! validation never has to read the registry; anyone can refresh the cache,
//! and a flat bounty makes refreshing worth someone's gas.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement Location |
//! |-----------|---------------------|
//! | Validation never queries the registry | `account.rs` - `BoundAccount::validate()` |
//! | Stale cache authorizes only synchronization | `account.rs` - `validate()`, `ensure_can_execute()` |
//! | Zero owner is never trusted | `domain/cache.rs` - `trusted_owner()` |
//! | Refunds only for syncs that changed the owner | `account.rs` - `synchronize_and_refund()` |
//! | Failed refund never undoes an owner update | `account.rs` - `synchronize_and_refund()` |
//! | Forced-sync fees bounded by `sync_prefund` | `account.rs` - `validate()` |
//! | Batch failure rolls back earlier calls | `account.rs` - `execute_batch()` |
//!
//! ## Caller Capabilities
//!
//! | Caller | Resolved When | May |
//! |--------|---------------|-----|
//! | `Coordinator` | address equals the coordinator | validate, execute, pause, manage deposit |
//! | `DirectOwner` | address equals the fresh, non-zero cached owner | execute, pause, manage deposit |
//! | `Anonymous` | anything else | synchronize, synchronize for a bounty |
//!
//! ## Outbound Dependencies
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | `OwnershipRegistry` | Source of truth for the owner |
//! | `ExecutionRelay` | Value transfers, forwarded calls, rollback |
//! | `Coordinator` | Deposit ledger, nonce sequence |
//! | `DelegatedVerifier` | Contract owners that check their own signatures |
//!
//! ## Usage Example
//!
//! ```ignore
//! use bound_account::prelude::*;
//!
//! let service = AccountService::new(account);
//! let receipt = service.handle_request(request, gas_price).await?;
//! assert!(receipt.is_success());
//! ```

// Crate-level lints
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::similar_names)]

// =============================================================================
// MODULES
// =============================================================================

pub mod account;
pub mod adapters;
pub mod config;
pub mod domain;
pub mod errors;
pub mod events;
pub mod ports;
pub mod service;

// =============================================================================
// PRELUDE
// =============================================================================

/// Convenient re-exports for common usage.
pub mod prelude {
    // Account
    pub use crate::account::{
        AccountPorts, BoundAccount, SIGNATURE_INVALID_VALUE, SIGNATURE_MAGIC_VALUE,
    };

    // Domain entities
    pub use crate::domain::entities::{
        AccountStatus, Action, ActionOutput, Call, CallContext, Caller, FeeBoundViolation,
        RefundOutcome, Request, Sponsorship, SyncEconomics, SyncOutcome, ValidationData,
        ValidationFailure,
    };

    // Value objects
    pub use crate::domain::value_objects::{Address, AssetRef, Bytes, EcdsaSignature, Hash, U256};

    // Domain services
    pub use crate::domain::cache::OwnershipCache;
    pub use crate::domain::economics::{check_fee_bounds, refund_profit, required_prefund, sync_cost};
    pub use crate::domain::services::request_hash;
    pub use crate::domain::signature::{eth_signed_message_hash, keccak256, recover_address};

    // Config
    pub use crate::config::{AccountConfig, ConfigError, FeeBounds, SyncPolicy};

    // Ports
    pub use crate::ports::inbound::{BoundAccountApi, RequestReceipt};
    pub use crate::ports::outbound::{
        Checkpoint, Coordinator, DelegatedVerifier, ExecutionRelay, NoDelegatedVerifiers,
        OwnershipRegistry, TransferFailure,
    };

    // Events
    pub use crate::events::{AccountEvent, EventLog};

    // Errors
    pub use crate::errors::{AccountError, CoordinatorError, RegistryError};

    // Adapters
    pub use crate::adapters::{
        InMemoryCoordinator, InMemoryRegistry, InMemoryVerifiers, InMemoryWorld, RecordedCall,
        TargetBehavior,
    };

    // Service
    pub use crate::service::{AccountService, ServiceStats};
}

// =============================================================================
// CRATE INFO
// =============================================================================

/// Crate version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// =============================================================================
// TESTS
// =============================================================================
