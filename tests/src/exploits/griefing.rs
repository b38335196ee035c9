//! # Griefing Attacks on the Sync Incentive
//!
//! ## Attacks Simulated:
//!
//! 1. **Bounty farming**: repeated `synchronize_and_refund` on a current cache
//! 2. **Pause farming**: owner pauses, attacker claims a bounty for the "fix"
//! 3. **Gas price inflation**: claiming at a price where the bounty is a loss
//! 4. **Prefund drain**: forced sync requests with oversized gas limits
//! 5. **Refund blocking**: a recipient that refuses the bounty

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use bound_account::prelude::*;

    const ATTACKER: Address = Address::repeat_byte(0x66);

    #[tokio::test]
    async fn test_bounty_paid_once_per_owner_change() {
        let env = TestWorld::new();
        let (_, alice) = keypair();
        env.bootstrap(alice).await;
        env.transfer_asset(Address::repeat_byte(0xb0));

        env.service
            .synchronize_and_refund(ATTACKER, None, gwei(1))
            .await
            .unwrap();
        for _ in 0..5 {
            assert_eq!(
                env.service
                    .synchronize_and_refund(ATTACKER, None, gwei(1))
                    .await,
                Err(AccountError::SyncNotNeeded)
            );
        }

        assert_eq!(env.world.balance_of(ATTACKER), gwei(1_000_000));
    }

    #[tokio::test]
    async fn test_pause_cannot_be_farmed() {
        let env = TestWorld::new();
        let (_, owner) = keypair();
        env.bootstrap(owner).await;
        env.service.pause(owner).await.unwrap();

        assert_eq!(
            env.service
                .synchronize_and_refund(ATTACKER, None, gwei(1))
                .await,
            Err(AccountError::SyncNotNeeded)
        );
        assert_eq!(env.world.balance_of(ATTACKER), U256::zero());
        // The failed claim left the pause in place.
        assert!(env.service.is_stale().await);

        // A bounty-free sync still lifts it.
        let outcome = env.service.synchronize(ATTACKER).await.unwrap();
        assert!(!outcome.updated);
        assert!(!env.service.is_stale().await);
    }

    #[tokio::test]
    async fn test_unprofitable_claim_changes_nothing() {
        let env = TestWorld::new();
        let (_, alice) = keypair();
        let bob = Address::repeat_byte(0xb0);
        env.bootstrap(alice).await;
        env.transfer_asset(bob);
        let events_before = env.service.with_account(|a| a.events().len()).await;

        // 70_000 gas * 20 gwei = 1_400_000 gwei > 1_000_000 gwei bounty
        let err = env
            .service
            .synchronize_and_refund(ATTACKER, None, gwei(20))
            .await
            .unwrap_err();

        assert!(matches!(err, AccountError::UnprofitableSync { .. }));
        assert_eq!(env.service.cached_owner().await, alice);
        assert_eq!(
            env.service.with_account(|a| a.events().len()).await,
            events_before
        );
        assert_eq!(env.world.balance_of(ATTACKER), U256::zero());
    }

    #[tokio::test]
    async fn test_forced_sync_cannot_drain_account() {
        let env = TestWorld::new();
        let balance = env.world.balance_of(ACCOUNT);

        // Gas limits at the ceilings: far beyond the forced-sync budget.
        let request = env
            .request(0, Action::Synchronize)
            .with_gas(1_000_000, 3_000_000, 10_000_000)
            .with_fees(gwei(500), U256::zero());
        let err = env.submit(request).await.unwrap_err();

        assert!(matches!(
            err,
            AccountError::Validation(ValidationFailure::PrefundExceeded { .. })
        ));
        assert_eq!(env.world.balance_of(ACCOUNT), balance);
        assert_eq!(env.coordinator.deposit_of(ACCOUNT), U256::zero());
        assert_eq!(env.next_nonce(), 0);
    }

    #[tokio::test]
    async fn test_sponsor_cannot_inflate_forced_sync() {
        // 250_000 gas fits the budget at 1 gwei; x3 verification gas does not
        let economics = SyncEconomics::new(50_000, 20_000, gwei(1_000_000), gwei(300_000));
        let env = TestWorld::with(economics, AccountConfig::default());
        env.transfer_asset(Address::repeat_byte(0xa1));

        let plain = env.request(0, Action::Synchronize);
        let sponsored = plain
            .clone()
            .with_sponsorship(Address::repeat_byte(0x99), Bytes::from_slice(b"sponsor"));

        assert!(matches!(
            env.submit(sponsored).await,
            Err(AccountError::Validation(ValidationFailure::PrefundExceeded { .. }))
        ));
        assert!(env.submit(plain).await.unwrap().is_success());
    }

    #[tokio::test]
    async fn test_reject_refund_cannot_block_owner_update() {
        let env = TestWorld::new();
        let (_, alice) = keypair();
        let bob = Address::repeat_byte(0xb0);
        env.bootstrap(alice).await;
        env.transfer_asset(bob);
        env.world.reject_transfers(ATTACKER);

        let outcome = env
            .service
            .synchronize_and_refund(ATTACKER, None, gwei(1))
            .await
            .unwrap();

        assert_eq!(outcome.refunded, U256::zero());
        assert_eq!(env.service.cached_owner().await, bob);
        let events = env.service.with_account(BoundAccount::drain_events).await;
        assert_eq!(
            events.last(),
            Some(&AccountEvent::SyncRefunded {
                recipient: ATTACKER,
                amount: U256::zero(),
                success: false
            })
        );
    }

    #[tokio::test]
    async fn test_registry_outage_pays_nothing() {
        let env = TestWorld::new();
        let (_, alice) = keypair();
        env.bootstrap(alice).await;
        env.registry.set_unavailable(true);

        assert_eq!(
            env.service
                .synchronize_and_refund(ATTACKER, None, gwei(1))
                .await,
            Err(AccountError::Registry(RegistryError::Unavailable))
        );
        assert_eq!(env.world.balance_of(ATTACKER), U256::zero());
        assert_eq!(env.service.cached_owner().await, alice);
    }
}
