//! # Account Takeover Attempts
//!
//! ## Attacks Simulated:
//!
//! 1. **Former owner**: keeps signing after the asset moved and was synced
//! 2. **Unowned account**: claims an account whose asset has no owner
//! 3. **Replay**: reuses a signed request on another chain or nonce
//! 4. **Malleability**: submits the high-S twin of a valid signature
//! 5. **Direct access**: an outsider calls owner-only entry points

#[cfg(test)]
mod tests {
    use crate::fixtures::*;
    use bound_account::domain::signature::test_helpers;
    use bound_account::prelude::*;

    const ATTACKER: Address = Address::repeat_byte(0x66);

    /// secp256k1 group order.
    const ORDER: [u8; 32] = [
        0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
        0xFE, 0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B, 0xBF, 0xD2, 0x5E, 0x8C, 0xD0, 0x36,
        0x41, 0x41,
    ];

    fn call() -> Call {
        Call::new(ATTACKER, gwei(1_000), Bytes::new())
    }

    #[tokio::test]
    async fn test_former_owner_locked_out_after_sync() {
        let env = TestWorld::new();
        let (alice_key, alice) = keypair();
        env.bootstrap(alice).await;
        env.transfer_asset(Address::repeat_byte(0xb0));
        env.service.synchronize(ATTACKER).await.unwrap();

        let err = env
            .submit(env.sign(env.request(1, Action::Execute(call())), &alice_key))
            .await
            .unwrap_err();

        assert_eq!(err, AccountError::Validation(ValidationFailure::BadSignature));
        assert_eq!(
            env.service.execute(alice, call()).await,
            Err(AccountError::Unauthorized { caller: alice })
        );
        assert_eq!(env.world.balance_of(ATTACKER), U256::zero());
    }

    #[tokio::test]
    async fn test_unowned_account_cannot_be_claimed() {
        let env = TestWorld::new();
        let (attacker_key, attacker) = keypair();

        // Bootstrap against an unregistered asset: the sync fails, the nonce is spent.
        let receipt = env
            .submit(env.request(0, Action::Synchronize))
            .await
            .unwrap();
        assert!(!receipt.is_success());
        assert!(env.service.is_stale().await);

        let err = env
            .submit(env.sign(env.request(1, Action::Synchronize), &attacker_key))
            .await
            .unwrap_err();
        assert_eq!(err, AccountError::Validation(ValidationFailure::BadSignature));

        let hash = keccak256(b"permit");
        let signature = test_helpers::sign(&hash, &attacker_key).to_bytes();
        assert_eq!(
            env.service.is_valid_signature(hash, signature).await,
            SIGNATURE_INVALID_VALUE
        );
        assert_eq!(
            env.service.execute(attacker, call()).await,
            Err(AccountError::Unauthorized { caller: attacker })
        );
    }

    #[tokio::test]
    async fn test_zero_owner_never_trusted() {
        let env = TestWorld::new();
        let (_, alice) = keypair();
        env.bootstrap(alice).await;

        env.transfer_asset(Address::ZERO);
        let outcome = env.service.synchronize(ATTACKER).await.unwrap();

        assert!(outcome.updated);
        assert!(env.service.is_stale().await);
        assert_eq!(
            env.service.execute(COORDINATOR, call()).await,
            Err(AccountError::SyncRequired)
        );
    }

    #[tokio::test]
    async fn test_cross_chain_replay_rejected() {
        let env = TestWorld::new();
        let (key, owner) = keypair();
        env.bootstrap(owner).await;

        let request = env.request(1, Action::Execute(call()));
        let foreign = request_hash(&request, COORDINATOR, CHAIN_ID + 1);
        let signature = test_helpers::sign(&eth_signed_message_hash(&foreign), &key);
        let err = env
            .submit(request.with_signature(signature.to_bytes()))
            .await
            .unwrap_err();

        assert_eq!(err, AccountError::Validation(ValidationFailure::BadSignature));
    }

    #[tokio::test]
    async fn test_nonce_replay_rejected() {
        let env = TestWorld::new();
        let (key, owner) = keypair();
        env.bootstrap(owner).await;

        let signed = env.sign(env.request(1, Action::Execute(call())), &key);
        assert!(env.submit(signed.clone()).await.unwrap().is_success());

        assert_eq!(
            env.submit(signed).await,
            Err(AccountError::NonceMismatch {
                expected: 2,
                got: 1
            })
        );
        assert_eq!(env.world.balance_of(ATTACKER), gwei(1_000));
    }

    #[tokio::test]
    async fn test_high_s_twin_rejected() {
        let env = TestWorld::new();
        let (key, owner) = keypair();
        env.bootstrap(owner).await;

        let request = env.sign(env.request(1, Action::Execute(call())), &key);
        let mut sig = EcdsaSignature::from_slice(request.signature.as_slice()).unwrap();
        let high_s = U256::from_big_endian(&ORDER) - U256::from_big_endian(&sig.s);
        high_s.to_big_endian(&mut sig.s);
        sig.v = if sig.v == 27 { 28 } else { 27 };
        let twin = request.with_signature(sig.to_bytes());

        assert_eq!(
            env.submit(twin).await.unwrap_err(),
            AccountError::Validation(ValidationFailure::BadSignature)
        );
    }

    #[tokio::test]
    async fn test_outsider_entry_points() {
        let env = TestWorld::new();
        let (_, owner) = keypair();
        env.bootstrap(owner).await;

        assert_eq!(
            env.service.pause(ATTACKER).await,
            Err(AccountError::Unauthorized { caller: ATTACKER })
        );
        assert_eq!(
            env.service.execute_batch(ATTACKER, vec![call()]).await,
            Err(AccountError::Unauthorized { caller: ATTACKER })
        );
        let stolen = env
            .service
            .with_account(|a| {
                a.withdraw_deposit_to(
                    &CallContext::new(ATTACKER, U256::zero()),
                    ATTACKER,
                    U256::one(),
                )
            })
            .await;
        assert_eq!(stolen, Err(AccountError::Unauthorized { caller: ATTACKER }));
        assert!(!env.service.is_stale().await);
    }

    #[tokio::test]
    async fn test_request_for_other_account_rejected() {
        let env = TestWorld::new();
        let (key, owner) = keypair();
        env.bootstrap(owner).await;

        let mut request = env.request(1, Action::Execute(call()));
        request.sender = Address::repeat_byte(0xee);
        let err = env.submit(env.sign(request, &key)).await.unwrap_err();

        assert!(matches!(err, AccountError::Unauthorized { .. }));
        assert_eq!(env.next_nonce(), 1);
    }
}
