//! # Bound Account
//!
//! The ownership-synchronization and validation state machine.
//!
//! ## State
//!
//! | Field | Mutability |
//! |-------|------------|
//! | `chain_id`, `asset`, `economics`, `config` | fixed at construction |
//! | `cache` (owner + staleness) | synchronization and the pause signal only |
//!
//! ## Invariants
//!
//! - The cached owner authorizes nothing but a synchronization while stale.
//! - Validation reads the cache, never the registry.
//! - A failed `synchronize_and_refund` leaves no trace: cache, events and
//!   balances are as before.
//! - A failed refund transfer never undoes a legitimate owner update.

use crate::config::{AccountConfig, ConfigError};
use crate::domain::cache::OwnershipCache;
use crate::domain::economics::{check_fee_bounds, refund_profit, required_prefund, sync_cost};
use crate::domain::entities::{
    AccountStatus, Action, ActionOutput, Call, CallContext, Caller, RefundOutcome, Request,
    SyncEconomics, SyncOutcome, ValidationData, ValidationFailure,
};
use crate::domain::signature::{eth_signed_message_hash, is_signed_by};
use crate::domain::value_objects::{Address, AssetRef, Bytes, Hash, U256};
use crate::errors::{AccountError, RegistryError};
use crate::events::{AccountEvent, EventLog};
use crate::ports::outbound::{Coordinator, DelegatedVerifier, ExecutionRelay, OwnershipRegistry};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Returned by `is_valid_signature` for a valid signature.
pub const SIGNATURE_MAGIC_VALUE: [u8; 4] = [0x16, 0x26, 0xba, 0x7e];

/// Returned by `is_valid_signature` otherwise.
pub const SIGNATURE_INVALID_VALUE: [u8; 4] = [0xff, 0xff, 0xff, 0xff];

/// Collaborators the account talks to.
#[derive(Clone)]
pub struct AccountPorts {
    /// Source of truth for the owner.
    pub registry: Arc<dyn OwnershipRegistry>,
    /// Value transfers and forwarded calls.
    pub relay: Arc<dyn ExecutionRelay>,
    /// Deposit ledger and sequencing.
    pub coordinator: Arc<dyn Coordinator>,
    /// Contract owners that check their own signatures.
    pub verifiers: Arc<dyn DelegatedVerifier>,
}

/// An account controlled by whoever owns `asset`.
pub struct BoundAccount {
    address: Address,
    chain_id: u64,
    asset: AssetRef,
    economics: SyncEconomics,
    config: AccountConfig,
    cache: OwnershipCache,
    events: EventLog,
    ports: AccountPorts,
}

impl BoundAccount {
    /// Creates a stale account with no cached owner, deployed on `chain_id`.
    ///
    /// # Errors
    ///
    /// Rejects a config that `AccountConfig::validate` refuses.
    pub fn new(
        address: Address,
        chain_id: u64,
        asset: AssetRef,
        economics: SyncEconomics,
        config: AccountConfig,
        ports: AccountPorts,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        info!(
            account = %address,
            chain_id,
            registry = %asset.registry,
            asset_id = %asset.asset_id,
            asset_chain_id = asset.chain_id,
            "Bound account created"
        );
        Ok(Self {
            address,
            chain_id,
            asset,
            economics,
            config,
            cache: OwnershipCache::new(),
            events: EventLog::new(),
            ports,
        })
    }

    // -------------------------------------------------------------------------
    // Accessors
    // -------------------------------------------------------------------------

    /// Account address.
    #[must_use]
    pub fn address(&self) -> Address {
        self.address
    }

    /// Chain the account is deployed on.
    #[must_use]
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    /// The asset whose owner controls this account.
    #[must_use]
    pub fn token(&self) -> AssetRef {
        self.asset
    }

    /// Sync bounty parameters.
    #[must_use]
    pub fn economics(&self) -> &SyncEconomics {
        &self.economics
    }

    /// Account configuration.
    #[must_use]
    pub fn config(&self) -> &AccountConfig {
        &self.config
    }

    /// Owner cache snapshot.
    #[must_use]
    pub fn cache(&self) -> &OwnershipCache {
        &self.cache
    }

    /// Last synchronized owner.
    #[must_use]
    pub fn cached_owner(&self) -> Address {
        self.cache.current_cached_owner()
    }

    /// True while the cached owner is not trusted.
    #[must_use]
    pub fn is_stale(&self) -> bool {
        self.cache.is_stale()
    }

    /// `Active` or `Stale`.
    #[must_use]
    pub fn status(&self) -> AccountStatus {
        self.cache.status()
    }

    /// Collaborators the account was built with.
    #[must_use]
    pub fn ports(&self) -> &AccountPorts {
        &self.ports
    }

    /// Events emitted so far.
    #[must_use]
    pub fn events(&self) -> &[AccountEvent] {
        self.events.events()
    }

    /// Hand all emitted events to the caller.
    pub fn drain_events(&mut self) -> Vec<AccountEvent> {
        self.events.drain()
    }

    /// Live owner from the registry; zero if the asset lives on another chain.
    ///
    /// # Errors
    ///
    /// Propagates registry failures.
    pub fn owner(&self) -> Result<Address, RegistryError> {
        if !self.asset.is_local_to(self.chain_id) {
            return Ok(Address::ZERO);
        }
        self.ports
            .registry
            .owner_of(self.asset.registry, self.asset.asset_id)
    }

    /// Deposit the coordinator holds for this account.
    #[must_use]
    pub fn deposit(&self) -> U256 {
        self.ports.coordinator.deposit_of(self.address)
    }

    /// Next nonce the coordinator expects.
    #[must_use]
    pub fn nonce(&self) -> u64 {
        self.ports.coordinator.nonce_of(self.address)
    }

    /// Resolve the calling address to a capability.
    #[must_use]
    pub fn resolve_caller(&self, caller: Address) -> Caller {
        if caller == self.ports.coordinator.address() {
            Caller::Coordinator
        } else if self.cache.trusted_owner() == Some(caller) {
            Caller::DirectOwner
        } else {
            Caller::Anonymous
        }
    }

    // -------------------------------------------------------------------------
    // Synchronization
    // -------------------------------------------------------------------------

    /// Refresh the cache from the registry. Open to anyone.
    ///
    /// # Errors
    ///
    /// Propagates registry failures; the cache is untouched in that case.
    pub fn synchronize(&mut self, ctx: &CallContext) -> Result<SyncOutcome, AccountError> {
        let live = self.owner()?;
        let previous = self.cache.current_cached_owner();

        let updated = live != previous;
        if updated {
            self.cache.set_owner(live);
            self.events.emit(AccountEvent::OwnerUpdated {
                previous,
                current: live,
            });
            info!(account = %self.address, %previous, current = %live, "Owner cache updated");
        }

        // A zero owner is "no owner": the cache stays or becomes stale.
        if live.is_zero() {
            self.cache.mark_stale();
        } else {
            self.cache.mark_fresh();
        }

        debug!(
            account = %self.address,
            updated,
            stale = self.cache.is_stale(),
            "Synchronization complete"
        );
        Ok(SyncOutcome {
            updated,
            current_owner: live,
        })
    }

    /// Synchronize and pay the flat bounty to `recipient` (default: caller).
    ///
    /// # Errors
    ///
    /// - `UnprofitableSync` if the bounty does not cover the caller's gas
    /// - `SyncNotNeeded` if the cache was already current
    /// - registry failures
    ///
    /// No state changes on any error.
    pub fn synchronize_and_refund(
        &mut self,
        ctx: &CallContext,
        recipient: Option<Address>,
    ) -> Result<RefundOutcome, AccountError> {
        let exempt = self.config.policy.coordinator_gas_exempt
            && self.resolve_caller(ctx.caller).is_coordinator();
        let Some(profit) = refund_profit(&self.economics, ctx.gas_price, exempt) else {
            let cost = sync_cost(&self.economics, ctx.gas_price, exempt);
            warn!(
                account = %self.address,
                caller = %ctx.caller,
                refund = %self.economics.sync_refund,
                %cost,
                "Rejected unprofitable sync"
            );
            return Err(AccountError::UnprofitableSync {
                refund: self.economics.sync_refund,
                cost,
            });
        };

        let snapshot = self.cache;
        let mark = self.events.len();
        let outcome = self.synchronize(ctx)?;
        if !outcome.updated {
            self.cache = snapshot;
            self.events.truncate(mark);
            debug!(account = %self.address, caller = %ctx.caller, "Refund refused: cache current");
            return Err(AccountError::SyncNotNeeded);
        }

        let recipient = recipient.unwrap_or(ctx.caller);
        let amount = self.economics.sync_refund;
        let (refunded, success) = match self.ports.relay.transfer(self.address, recipient, amount) {
            Ok(()) => (amount, true),
            Err(failure) => {
                warn!(account = %self.address, %recipient, ?failure, "Sync refund transfer failed");
                (U256::zero(), false)
            }
        };
        self.events.emit(AccountEvent::SyncRefunded {
            recipient,
            amount: refunded,
            success,
        });
        info!(account = %self.address, %recipient, %refunded, %profit, "Sync refund settled");

        Ok(RefundOutcome {
            current_owner: outcome.current_owner,
            profit,
            refunded,
        })
    }

    /// Suspend authorization until the next synchronization.
    ///
    /// # Errors
    ///
    /// `Unauthorized` unless called by the owner or the coordinator.
    pub fn pause(&mut self, ctx: &CallContext) -> Result<(), AccountError> {
        if !self.resolve_caller(ctx.caller).is_privileged() {
            return Err(AccountError::Unauthorized { caller: ctx.caller });
        }
        if !self.cache.is_stale() {
            self.cache.mark_stale();
            self.events.emit(AccountEvent::Paused { by: ctx.caller });
            info!(account = %self.address, by = %ctx.caller, "Account paused");
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Validation
    // -------------------------------------------------------------------------

    /// Decide whether the coordinator may execute `request`.
    ///
    /// On success the account also forwards `missing_funds` to the coordinator.
    ///
    /// # Errors
    ///
    /// `InsufficientFunds` if the account cannot cover `missing_funds`. Every
    /// other rejection is reported through `ValidationData::Invalid`.
    pub fn validate(
        &self,
        ctx: &CallContext,
        request: &Request,
        request_hash: &Hash,
        missing_funds: U256,
    ) -> Result<ValidationData, AccountError> {
        if !self.resolve_caller(ctx.caller).is_coordinator() {
            warn!(account = %self.address, caller = %ctx.caller, "Validation from non-coordinator");
            return Ok(ValidationData::Invalid(ValidationFailure::Unauthorized));
        }

        if let Err(violation) = check_fee_bounds(request, &self.config.fee_bounds) {
            debug!(account = %self.address, %violation, "Fee bounds exceeded");
            return Ok(ValidationData::Invalid(ValidationFailure::FeeBoundsExceeded(violation)));
        }

        if self.cache.is_stale() || request.is_bootstrap() {
            if !request.action.is_synchronization() {
                debug!(account = %self.address, nonce = request.nonce, "Sync required first");
                return Ok(ValidationData::Invalid(ValidationFailure::SyncRequired));
            }
            let required = required_prefund(
                request,
                self.config.policy.sponsored_verification_multiplier,
            );
            if required > self.economics.sync_prefund {
                debug!(account = %self.address, %required, "Sync prefund exceeded");
                return Ok(ValidationData::Invalid(ValidationFailure::PrefundExceeded {
                    required,
                    ceiling: self.economics.sync_prefund,
                }));
            }
        }

        let digest = eth_signed_message_hash(request_hash);
        let signature = request.signature.as_slice();
        if !request.is_bootstrap() && !self.is_owner_signature(&digest, signature) {
            debug!(account = %self.address, nonce = request.nonce, "Bad signature");
            return Ok(ValidationData::Invalid(ValidationFailure::BadSignature));
        }

        self.pay_prefund(missing_funds)?;
        debug!(account = %self.address, nonce = request.nonce, "Request validated");
        Ok(ValidationData::Valid)
    }

    /// ERC-1271 style check against the trusted cached owner.
    #[must_use]
    pub fn is_valid_signature(&self, hash: &Hash, signature: &[u8]) -> [u8; 4] {
        match self.cache.trusted_owner() {
            Some(owner) if self.verify_for(owner, hash, signature) => SIGNATURE_MAGIC_VALUE,
            _ => SIGNATURE_INVALID_VALUE,
        }
    }

    fn is_owner_signature(&self, digest: &Hash, signature: &[u8]) -> bool {
        let owner = self.cache.current_cached_owner();
        !owner.is_zero() && self.verify_for(owner, digest, signature)
    }

    fn verify_for(&self, signer: Address, hash: &Hash, signature: &[u8]) -> bool {
        if is_signed_by(hash, signature, signer) {
            return true;
        }
        self.ports.verifiers.is_verifier(signer)
            && self
                .ports
                .verifiers
                .is_valid_signature(signer, hash, signature)
    }

    fn pay_prefund(&self, missing_funds: U256) -> Result<(), AccountError> {
        if missing_funds.is_zero() {
            return Ok(());
        }
        let available = self.ports.relay.balance_of(self.address);
        let insufficient = AccountError::InsufficientFunds {
            required: missing_funds,
            available,
        };
        if available < missing_funds {
            warn!(account = %self.address, %missing_funds, %available, "Cannot cover prefund");
            return Err(insufficient);
        }
        let coordinator = self.ports.coordinator.address();
        self.ports
            .relay
            .transfer(self.address, coordinator, missing_funds)
            .map_err(|_| insufficient)?;
        self.ports
            .coordinator
            .deposit_to(self.address, missing_funds);
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Execution
    // -------------------------------------------------------------------------

    /// Run a validated request's action on behalf of the coordinator.
    ///
    /// # Errors
    ///
    /// Whatever the underlying entry point returns.
    pub fn run_action(
        &mut self,
        ctx: &CallContext,
        action: &Action,
    ) -> Result<ActionOutput, AccountError> {
        match action {
            Action::Synchronize => self.synchronize(ctx).map(ActionOutput::Synced),
            Action::SynchronizeAndRefund { recipient } => self
                .synchronize_and_refund(ctx, *recipient)
                .map(ActionOutput::Refunded),
            Action::Execute(call) => self.execute(ctx, call).map(ActionOutput::Executed),
            Action::ExecuteBatch(calls) => {
                self.execute_batch(ctx, calls).map(ActionOutput::Batch)
            }
        }
    }

    /// Forward one call.
    ///
    /// # Errors
    ///
    /// `Unauthorized`, `SyncRequired`, or `CallReverted` with the callee payload.
    pub fn execute(&mut self, ctx: &CallContext, call: &Call) -> Result<Bytes, AccountError> {
        self.ensure_can_execute(ctx)?;
        self.ports
            .relay
            .call(self.address, call.target, call.value, call.data.as_slice())
            .map_err(|data| {
                debug!(account = %self.address, target = %call.target, "Forwarded call reverted");
                AccountError::CallReverted {
                    target: call.target,
                    index: None,
                    data,
                }
            })
    }

    /// Forward calls in order; the first failure undoes the whole batch.
    ///
    /// # Errors
    ///
    /// `Unauthorized`, `SyncRequired`, or `CallReverted` for the failing call.
    pub fn execute_batch(
        &mut self,
        ctx: &CallContext,
        calls: &[Call],
    ) -> Result<Vec<Bytes>, AccountError> {
        self.ensure_can_execute(ctx)?;
        let checkpoint = self.ports.relay.checkpoint();
        let mut outputs = Vec::with_capacity(calls.len());
        for (index, call) in calls.iter().enumerate() {
            match self.ports.relay.call(
                self.address,
                call.target,
                call.value,
                call.data.as_slice(),
            ) {
                Ok(output) => outputs.push(output),
                Err(data) => {
                    self.ports.relay.revert_to(checkpoint);
                    warn!(
                        account = %self.address,
                        index,
                        target = %call.target,
                        "Batch aborted, earlier calls rolled back"
                    );
                    return Err(AccountError::CallReverted {
                        target: call.target,
                        index: Some(index),
                        data,
                    });
                }
            }
        }
        self.ports.relay.commit(checkpoint);
        Ok(outputs)
    }

    fn ensure_can_execute(&self, ctx: &CallContext) -> Result<(), AccountError> {
        if !self.resolve_caller(ctx.caller).is_privileged() {
            return Err(AccountError::Unauthorized { caller: ctx.caller });
        }
        if self.cache.is_stale() {
            return Err(AccountError::SyncRequired);
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Deposit
    // -------------------------------------------------------------------------

    /// Move `amount` of the account's balance into its coordinator deposit.
    ///
    /// # Errors
    ///
    /// `Unauthorized` for anonymous callers, `InsufficientFunds` if the
    /// balance is short.
    pub fn add_deposit(&mut self, ctx: &CallContext, amount: U256) -> Result<(), AccountError> {
        if !self.resolve_caller(ctx.caller).is_privileged() {
            return Err(AccountError::Unauthorized { caller: ctx.caller });
        }
        let coordinator = self.ports.coordinator.address();
        self.ports
            .relay
            .transfer(self.address, coordinator, amount)
            .map_err(|_| AccountError::InsufficientFunds {
                required: amount,
                available: self.ports.relay.balance_of(self.address),
            })?;
        self.ports.coordinator.deposit_to(self.address, amount);
        debug!(account = %self.address, %amount, "Deposit added");
        Ok(())
    }

    /// Withdraw `amount` of the coordinator deposit to `to`.
    ///
    /// # Errors
    ///
    /// `Unauthorized` for anonymous callers, coordinator ledger errors.
    pub fn withdraw_deposit_to(
        &mut self,
        ctx: &CallContext,
        to: Address,
        amount: U256,
    ) -> Result<(), AccountError> {
        if !self.resolve_caller(ctx.caller).is_privileged() {
            return Err(AccountError::Unauthorized { caller: ctx.caller });
        }
        self.ports.coordinator.withdraw_to(self.address, to, amount)?;
        debug!(account = %self.address, %to, %amount, "Deposit withdrawn");
        Ok(())
    }
}

// =============================================================================
// TESTS
// =============================================================================
