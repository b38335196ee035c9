//! # ECDSA Recovery (secp256k1)
//!
//! Pure signature logic used to check requests against the cached owner.
//!
//! ## Security Notes
//!
//! - **Malleability Prevention (EIP-2)**: S must not exceed half the curve order
//! - **Scalar Range Validation**: R and S must be in [1, n-1]
//! - Uses the k256 crate for the curve operations

use crate::domain::value_objects::{Address, EcdsaSignature, Hash, U256};
use k256::ecdsa::{RecoveryId, Signature, VerifyingKey};
use sha3::{Digest, Keccak256};

/// secp256k1 curve order n.
const SECP256K1_ORDER: [u8; 32] = [
    0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFE,
    0xBA, 0xAE, 0xDC, 0xE6, 0xAF, 0x48, 0xA0, 0x3B, 0xBF, 0xD2, 0x5E, 0x8C, 0xD0, 0x36, 0x41, 0x41,
];

/// Half of the secp256k1 curve order, rounded down.
const SECP256K1_HALF_ORDER: [u8; 32] = [
    0x7F, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF,
    0x5D, 0x57, 0x6E, 0x73, 0x57, 0xA4, 0x50, 0x1D, 0xDF, 0xE9, 0x2F, 0x46, 0x68, 0x1B, 0x20, 0xA0,
];

/// Prefix of an eth-signed 32-byte message.
const ETH_MESSAGE_PREFIX: &[u8] = b"\x19Ethereum Signed Message:\n32";

/// Keccak256 hash function.
#[must_use]
pub fn keccak256(data: &[u8]) -> Hash {
    let mut hash = [0u8; 32];
    hash.copy_from_slice(&Keccak256::digest(data));
    Hash(hash)
}

/// Digest an owner actually signs for a request hash.
#[must_use]
pub fn eth_signed_message_hash(hash: &Hash) -> Hash {
    let mut buf = Vec::with_capacity(ETH_MESSAGE_PREFIX.len() + 32);
    buf.extend_from_slice(ETH_MESSAGE_PREFIX);
    buf.extend_from_slice(hash.as_bytes());
    keccak256(&buf)
}

/// Derive an address from a public key: last 20 bytes of keccak256(pubkey).
#[must_use]
pub fn address_from_pubkey(public_key: &VerifyingKey) -> Address {
    let encoded = public_key.to_encoded_point(false);
    // Skip the 0x04 uncompressed-point prefix
    let hash = keccak256(&encoded.as_bytes()[1..]);
    let mut address = [0u8; 20];
    address.copy_from_slice(&hash.0[12..]);
    Address(address)
}

/// Recover the signer of `hash`, or `None` when the signature is malformed,
/// malleable, or does not recover to a key.
#[must_use]
pub fn recover_address(hash: &Hash, signature: &EcdsaSignature) -> Option<Address> {
    if !is_valid_scalar(&signature.r) || !is_valid_scalar(&signature.s) {
        return None;
    }
    if !is_low_s(&signature.s) {
        return None;
    }
    let recovery_id = parse_recovery_id(signature.v)?;

    let mut sig_bytes = [0u8; 64];
    sig_bytes[..32].copy_from_slice(&signature.r);
    sig_bytes[32..].copy_from_slice(&signature.s);
    let sig = Signature::from_slice(&sig_bytes).ok()?;

    let key = VerifyingKey::recover_from_prehash(hash.as_bytes(), &sig, recovery_id).ok()?;
    Some(address_from_pubkey(&key))
}

/// True if `signature` is a well-formed `r || s || v` signature by `signer`.
#[must_use]
pub fn is_signed_by(hash: &Hash, signature: &[u8], signer: Address) -> bool {
    if signer.is_zero() {
        return false;
    }
    EcdsaSignature::from_slice(signature)
        .and_then(|sig| recover_address(hash, &sig))
        .is_some_and(|recovered| recovered == signer)
}

fn parse_recovery_id(v: u8) -> Option<RecoveryId> {
    match v {
        0 | 27 => RecoveryId::from_byte(0),
        1 | 28 => RecoveryId::from_byte(1),
        _ => None,
    }
}

/// Per EIP-2: S must not exceed half the order.
fn is_low_s(s: &[u8; 32]) -> bool {
    U256::from_big_endian(s) <= U256::from_big_endian(&SECP256K1_HALF_ORDER)
}

fn is_valid_scalar(scalar: &[u8; 32]) -> bool {
    let value = U256::from_big_endian(scalar);
    !value.is_zero() && value < U256::from_big_endian(&SECP256K1_ORDER)
}

/// Key generation and signing for tests.
#[cfg(any(test, feature = "test-utils"))]
pub mod test_helpers {
    use super::*;
    use k256::ecdsa::SigningKey;

    /// Generate a new signing key and its address.
    pub fn generate_signer() -> (SigningKey, Address) {
        let signing_key = SigningKey::random(&mut rand::thread_rng());
        let address = address_from_pubkey(signing_key.verifying_key());
        (signing_key, address)
    }

    /// Sign a prehashed message, normalized to low S.
    pub fn sign(hash: &Hash, key: &SigningKey) -> EcdsaSignature {
        let (sig, recid) = key
            .sign_prehash_recoverable(hash.as_bytes())
            .expect("signing failed");

        let sig_bytes = sig.to_bytes();
        let mut r = [0u8; 32];
        let mut s = [0u8; 32];
        r.copy_from_slice(&sig_bytes[..32]);
        s.copy_from_slice(&sig_bytes[32..]);

        if is_low_s(&s) {
            return EcdsaSignature::new(r, s, recid.to_byte() + 27);
        }
        let order = U256::from_big_endian(&SECP256K1_ORDER);
        let mut flipped = [0u8; 32];
        (order - U256::from_big_endian(&s)).to_big_endian(&mut flipped);
        let v = if recid.to_byte() == 0 { 28 } else { 27 };
        EcdsaSignature::new(r, flipped, v)
    }
}
