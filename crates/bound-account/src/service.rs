//! # Account Service
//!
//! Async front end for a single bound account. Every entry point takes the
//! account lock for its whole duration, so a forwarded call can never
//! observe or re-enter a half-finished validation or synchronization.
//!
//! `handle_request` plays the coordinator's part of the protocol:
//!
//! 1. Check the request nonce against the coordinator's sequence
//! 2. Compute the request digest and the missing prefund
//! 3. Validate; rejected requests stop here
//! 4. Consume the nonce
//! 5. Run the action; its failure is recorded in the receipt

use crate::account::BoundAccount;
use crate::domain::economics::required_prefund;
use crate::domain::entities::{
    ActionOutput, Call, CallContext, RefundOutcome, Request, SyncOutcome, ValidationData,
};
use crate::domain::services::request_hash;
use crate::domain::value_objects::{Address, Bytes, Hash, U256};
use crate::errors::AccountError;
use crate::ports::inbound::{BoundAccountApi, RequestReceipt};
use crate::ports::outbound::Coordinator;

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, instrument, warn};

/// Statistics for the account service.
#[derive(Debug, Default, Clone)]
pub struct ServiceStats {
    /// Requests that passed validation.
    pub requests_validated: u64,
    /// Requests rejected by validation or the nonce check.
    pub requests_rejected: u64,
    /// Actions that completed.
    pub actions_executed: u64,
    /// Actions that failed after validation.
    pub failed_executions: u64,
    /// Synchronizations that changed the cached owner.
    pub owner_updates: u64,
    /// Total sync bounty paid out.
    pub refunds_paid: U256,
}

impl ServiceStats {
    fn record_output(&mut self, output: &ActionOutput) {
        match output {
            ActionOutput::Synced(outcome) if outcome.updated => self.owner_updates += 1,
            ActionOutput::Refunded(outcome) => {
                self.owner_updates += 1;
                self.refunds_paid = self.refunds_paid.saturating_add(outcome.refunded);
            }
            _ => {}
        }
    }
}

/// Serialized access to one bound account.
#[derive(Clone)]
pub struct AccountService {
    /// Account address, fixed at construction.
    address: Address,
    /// Chain the service runs on.
    chain_id: u64,
    /// The account itself.
    account: Arc<Mutex<BoundAccount>>,
    /// Coordinator the account was built with.
    coordinator: Arc<dyn Coordinator>,
    /// Service statistics.
    stats: Arc<RwLock<ServiceStats>>,
}

impl AccountService {
    /// Wrap `account`. Requests are bound to the account's deployment chain.
    #[must_use]
    pub fn new(account: BoundAccount) -> Self {
        Self {
            address: account.address(),
            chain_id: account.chain_id(),
            coordinator: account.ports().coordinator.clone(),
            account: Arc::new(Mutex::new(account)),
            stats: Arc::new(RwLock::new(ServiceStats::default())),
        }
    }

    /// Account address.
    #[must_use]
    pub fn address(&self) -> Address {
        self.address
    }

    /// Get current service statistics.
    pub async fn stats(&self) -> ServiceStats {
        self.stats.read().await.clone()
    }

    /// Run `f` with exclusive access to the account.
    pub async fn with_account<R>(&self, f: impl FnOnce(&mut BoundAccount) -> R) -> R {
        let mut account = self.account.lock().await;
        f(&mut account)
    }

    fn context(&self, caller: Address, gas_price: U256) -> CallContext {
        CallContext::new(caller, gas_price)
    }

    async fn reject(&self, error: AccountError) -> Result<RequestReceipt, AccountError> {
        self.stats.write().await.requests_rejected += 1;
        Err(error)
    }
}

#[async_trait]
impl BoundAccountApi for AccountService {
    #[instrument(skip(self, request), fields(account = %self.address, nonce = request.nonce))]
    async fn handle_request(
        &self,
        request: Request,
        gas_price: U256,
    ) -> Result<RequestReceipt, AccountError> {
        let mut account = self.account.lock().await;

        if request.sender != self.address {
            warn!(sender = %request.sender, "Request addressed to another account");
            return self
                .reject(AccountError::Unauthorized {
                    caller: request.sender,
                })
                .await;
        }

        let expected = self.coordinator.nonce_of(self.address);
        if request.nonce != expected {
            debug!(expected, got = request.nonce, "Nonce mismatch");
            return self
                .reject(AccountError::NonceMismatch {
                    expected,
                    got: request.nonce,
                })
                .await;
        }

        let coordinator = self.coordinator.address();
        let digest = request_hash(&request, coordinator, self.chain_id);
        let required = required_prefund(
            &request,
            account.config().policy.sponsored_verification_multiplier,
        );
        let missing_funds = required.saturating_sub(self.coordinator.deposit_of(self.address));
        let ctx = self.context(coordinator, gas_price);

        match account.validate(&ctx, &request, &digest, missing_funds)? {
            ValidationData::Valid => {}
            ValidationData::Invalid(failure) => {
                info!(%failure, code = failure.code(), "Request rejected");
                return self.reject(failure.into()).await;
            }
        }
        self.coordinator.increment_nonce(self.address);

        let execution = account.run_action(&ctx, &request.action);
        drop(account);

        let mut stats = self.stats.write().await;
        stats.requests_validated += 1;
        match &execution {
            Ok(output) => {
                stats.actions_executed += 1;
                stats.record_output(output);
            }
            Err(error) => {
                stats.failed_executions += 1;
                warn!(%error, "Validated request failed during execution");
            }
        }

        Ok(RequestReceipt {
            request_hash: digest,
            nonce: request.nonce,
            execution,
        })
    }

    #[instrument(skip(self), fields(account = %self.address))]
    async fn synchronize(&self, caller: Address) -> Result<SyncOutcome, AccountError> {
        let outcome = self
            .account
            .lock()
            .await
            .synchronize(&self.context(caller, U256::zero()))?;
        self.stats
            .write()
            .await
            .record_output(&ActionOutput::Synced(outcome));
        Ok(outcome)
    }

    #[instrument(skip(self), fields(account = %self.address))]
    async fn synchronize_and_refund(
        &self,
        caller: Address,
        recipient: Option<Address>,
        gas_price: U256,
    ) -> Result<RefundOutcome, AccountError> {
        let outcome = self
            .account
            .lock()
            .await
            .synchronize_and_refund(&self.context(caller, gas_price), recipient)?;
        self.stats
            .write()
            .await
            .record_output(&ActionOutput::Refunded(outcome));
        Ok(outcome)
    }

    async fn pause(&self, caller: Address) -> Result<(), AccountError> {
        self.account
            .lock()
            .await
            .pause(&self.context(caller, U256::zero()))
    }

    async fn execute(&self, caller: Address, call: Call) -> Result<Bytes, AccountError> {
        self.account
            .lock()
            .await
            .execute(&self.context(caller, U256::zero()), &call)
    }

    async fn execute_batch(
        &self,
        caller: Address,
        calls: Vec<Call>,
    ) -> Result<Vec<Bytes>, AccountError> {
        self.account
            .lock()
            .await
            .execute_batch(&self.context(caller, U256::zero()), &calls)
    }

    async fn is_valid_signature(&self, hash: Hash, signature: Bytes) -> [u8; 4] {
        self.account
            .lock()
            .await
            .is_valid_signature(&hash, signature.as_slice())
    }

    async fn owner(&self) -> Result<Address, AccountError> {
        Ok(self.account.lock().await.owner()?)
    }

    async fn cached_owner(&self) -> Address {
        self.account.lock().await.cached_owner()
    }

    async fn is_stale(&self) -> bool {
        self.account.lock().await.is_stale()
    }
}

// =============================================================================
// TESTS
// =============================================================================
