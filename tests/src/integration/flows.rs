//! # Integration Test Flows
//!
//! Request lifecycles driven through `AccountService` the way a coordinator
//! would, with the asset changing hands in the registry between steps.
//!
//! ## Flows Tested:
//!
//! 1. **Bootstrap**: first request (nonce 0) must be an unsigned sync
//! 2. **Ownership transfer**: old owner keeps control until someone syncs
//! 3. **Pause and recovery**: only a sync can lift the pause
//! 4. **Batches**: a failing call aborts and rolls back the whole batch

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use bound_account::prelude::*;

    // =============================================================================
    // BOOTSTRAP
    // =============================================================================

    #[tokio::test]
    async fn test_bootstrap_sync_then_owner_execution() {
        let env = TestWorld::new();
        let (key, owner) = keypair();
        env.bootstrap(owner).await;

        assert_eq!(env.service.cached_owner().await, owner);
        assert_eq!(env.next_nonce(), 1);

        let target = Address::repeat_byte(0x10);
        env.world
            .set_target(target, TargetBehavior::Accept(Bytes::from_slice(b"done")));
        let call = Call::new(target, gwei(3), Bytes::from_slice(b"\x01\x02"));
        let receipt = env
            .submit(env.sign(env.request(1, Action::Execute(call)), &key))
            .await
            .unwrap();

        assert_eq!(
            receipt.execution,
            Ok(ActionOutput::Executed(Bytes::from_slice(b"done")))
        );
        assert_eq!(env.world.balance_of(target), gwei(3));
        assert_eq!(env.world.calls()[0].data, Bytes::from_slice(b"\x01\x02"));
    }

    #[tokio::test]
    async fn test_bootstrap_prefund_charged_once() {
        let env = TestWorld::new();
        let (key, owner) = keypair();
        let before = env.world.balance_of(ACCOUNT);
        env.bootstrap(owner).await;

        let request = env.request(1, Action::Synchronize);
        let prefund = required_prefund(&request, 3);
        assert_eq!(env.world.balance_of(ACCOUNT), before - prefund);

        // Deposit already covers the next request: nothing more is pulled.
        env.submit(env.sign(request, &key)).await.unwrap();
        assert_eq!(env.world.balance_of(ACCOUNT), before - prefund);
        assert_eq!(env.coordinator.deposit_of(ACCOUNT), prefund);
    }

    // =============================================================================
    // OWNERSHIP TRANSFER
    // =============================================================================

    #[tokio::test]
    async fn test_transfer_takes_effect_on_sync() {
        let env = TestWorld::new();
        let (alice_key, alice) = keypair();
        let (bob_key, bob) = keypair();
        env.bootstrap(alice).await;

        env.transfer_asset(bob);

        // The cache still says Alice and is fresh: her requests still pass.
        let receipt = env
            .submit(env.sign(env.request(1, Action::Synchronize), &alice_key))
            .await
            .unwrap();
        assert_eq!(
            receipt.execution,
            Ok(ActionOutput::Synced(SyncOutcome {
                updated: true,
                current_owner: bob
            }))
        );

        // Alice is now locked out, Bob is in.
        let call = Call::new(Address::repeat_byte(0x20), U256::zero(), Bytes::new());
        let err = env
            .submit(env.sign(env.request(2, Action::Execute(call.clone())), &alice_key))
            .await
            .unwrap_err();
        assert_eq!(err, AccountError::Validation(ValidationFailure::BadSignature));

        let receipt = env
            .submit(env.sign(env.request(2, Action::Execute(call)), &bob_key))
            .await
            .unwrap();
        assert!(receipt.is_success());
    }

    #[tokio::test]
    async fn test_third_party_sync_earns_bounty() {
        let env = TestWorld::new();
        let (_, alice) = keypair();
        let bob = Address::repeat_byte(0xb0);
        let keeper = Address::repeat_byte(0x4b);
        env.bootstrap(alice).await;
        env.transfer_asset(bob);

        let outcome = env
            .service
            .synchronize_and_refund(keeper, None, gwei(1))
            .await
            .unwrap();

        // 1_000_000 gwei bounty - 70_000 gas * 1 gwei
        assert_eq!(outcome.profit, gwei(930_000));
        assert_eq!(env.world.balance_of(keeper), gwei(1_000_000));
        assert_eq!(env.service.cached_owner().await, bob);
        assert_eq!(env.service.stats().await.refunds_paid, gwei(1_000_000));
    }

    #[tokio::test]
    async fn test_coordinator_refund_action_pays_recipient() {
        let env = TestWorld::new();
        let (key, alice) = keypair();
        let bob = Address::repeat_byte(0xb0);
        let bundler = Address::repeat_byte(0xbd);
        env.bootstrap(alice).await;
        env.transfer_asset(bob);

        let action = Action::SynchronizeAndRefund {
            recipient: Some(bundler),
        };
        let receipt = env
            .submit(env.sign(env.request(1, action), &key))
            .await
            .unwrap();

        // Coordinator is exempt from refund gas: 1_000_000 - 50_000 gwei
        assert!(matches!(
            receipt.execution,
            Ok(ActionOutput::Refunded(RefundOutcome { profit, .. })) if profit == gwei(950_000)
        ));
        assert_eq!(env.world.balance_of(bundler), gwei(1_000_000));
    }

    #[tokio::test]
    async fn test_live_owner_versus_cached_owner() {
        let env = TestWorld::new();
        let (_, alice) = keypair();
        let bob = Address::repeat_byte(0xb0);
        env.bootstrap(alice).await;
        env.transfer_asset(bob);

        assert_eq!(env.service.owner().await, Ok(bob));
        assert_eq!(env.service.cached_owner().await, alice);
    }

    // =============================================================================
    // PAUSE AND RECOVERY
    // =============================================================================

    #[tokio::test]
    async fn test_pause_blocks_until_sync() {
        let env = TestWorld::new();
        let (key, owner) = keypair();
        env.bootstrap(owner).await;

        env.service.pause(owner).await.unwrap();
        assert!(env.service.is_stale().await);

        let call = Call::new(Address::repeat_byte(0x30), U256::zero(), Bytes::new());
        let err = env
            .submit(env.sign(env.request(1, Action::Execute(call.clone())), &key))
            .await
            .unwrap_err();
        assert_eq!(err, AccountError::Validation(ValidationFailure::SyncRequired));
        assert_eq!(
            env.service.execute(owner, call.clone()).await,
            Err(AccountError::Unauthorized { caller: owner })
        );

        // A signed sync lifts the pause; the nonce was not consumed above.
        let receipt = env
            .submit(env.sign(env.request(1, Action::Synchronize), &key))
            .await
            .unwrap();
        assert!(receipt.is_success());
        assert!(!env.service.is_stale().await);

        assert!(env.service.execute(owner, call).await.is_ok());
    }

    #[tokio::test]
    async fn test_pause_event_recorded() {
        let env = TestWorld::new();
        let (_, owner) = keypair();
        env.bootstrap(owner).await;
        env.service.pause(COORDINATOR).await.unwrap();

        let events = env.service.with_account(BoundAccount::drain_events).await;
        assert_eq!(
            events.last(),
            Some(&AccountEvent::Paused { by: COORDINATOR })
        );
    }

    // =============================================================================
    // BATCHES
    // =============================================================================

    #[tokio::test]
    async fn test_failing_batch_rolls_back_and_consumes_nonce() {
        let env = TestWorld::new();
        let (key, owner) = keypair();
        env.bootstrap(owner).await;
        let balance = env.world.balance_of(ACCOUNT);

        let ok = Address::repeat_byte(0x41);
        let bad = Address::repeat_byte(0x42);
        env.world
            .set_target(bad, TargetBehavior::Revert(Bytes::from_slice(b"denied")));
        let calls = vec![
            Call::new(ok, gwei(1), Bytes::new()),
            Call::new(bad, gwei(1), Bytes::new()),
        ];

        let receipt = env
            .submit(env.sign(env.request(1, Action::ExecuteBatch(calls)), &key))
            .await
            .unwrap();

        assert_eq!(
            receipt.execution,
            Err(AccountError::CallReverted {
                target: bad,
                index: Some(1),
                data: Bytes::from_slice(b"denied"),
            })
        );
        assert_eq!(env.world.balance_of(ok), U256::zero());
        assert_eq!(env.world.balance_of(ACCOUNT), balance);
        assert_eq!(env.next_nonce(), 2);
        assert_eq!(env.service.stats().await.failed_executions, 1);
    }

    // =============================================================================
    // CONFIGURATION
    // =============================================================================

    #[tokio::test]
    async fn test_config_file_bounds_apply() {
        let config = AccountConfig::parse(
            r#"
            [fee_bounds]
            max_fee_per_gas = "0x77359400"   # 2 gwei
            "#,
        )
        .unwrap();
        let env = TestWorld::with(default_economics(), config);

        let request = env
            .request(0, Action::Synchronize)
            .with_fees(gwei(3), U256::zero());
        let err = env.submit(request).await.unwrap_err();

        assert_eq!(
            err,
            AccountError::Validation(ValidationFailure::FeeBoundsExceeded(
                FeeBoundViolation::MaxFeePerGas
            ))
        );
    }

    #[tokio::test]
    async fn test_contract_owner_signs_through_verifier() {
        let env = TestWorld::new();
        let multisig = Address::repeat_byte(0x5a);
        env.bootstrap(multisig).await;

        let request = env
            .request(1, Action::Synchronize)
            .with_signature(Bytes::from_slice(b"2-of-3"));
        let digest = eth_signed_message_hash(&request_hash(&request, COORDINATOR, CHAIN_ID));
        env.verifiers
            .approve(multisig, digest, Bytes::from_slice(b"2-of-3"));

        assert!(env.submit(request).await.unwrap().is_success());
    }
}
