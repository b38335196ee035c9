//! # Domain Services
//!
//! Deterministic request digests. Pure functions only.

use crate::domain::entities::{Action, Call, Request};
use crate::domain::signature::keccak256;
use crate::domain::value_objects::{Address, Hash, U256};

const TAG_SYNCHRONIZE: u8 = 0x01;
const TAG_SYNCHRONIZE_AND_REFUND: u8 = 0x02;
const TAG_EXECUTE: u8 = 0x03;
const TAG_EXECUTE_BATCH: u8 = 0x04;

/// Digest of a request, signature excluded, bound to a coordinator and chain.
///
/// `keccak256(keccak256(packed request) || coordinator || chain_id)`
#[must_use]
pub fn request_hash(request: &Request, coordinator: Address, chain_id: u64) -> Hash {
    let mut packed = Vec::with_capacity(256);
    packed.extend_from_slice(request.sender.as_bytes());
    packed.extend_from_slice(&request.nonce.to_be_bytes());
    packed.extend_from_slice(action_digest(&request.action).as_bytes());
    packed.extend_from_slice(&request.call_gas_limit.to_be_bytes());
    packed.extend_from_slice(&request.verification_gas_limit.to_be_bytes());
    packed.extend_from_slice(&request.pre_verification_gas.to_be_bytes());
    push_u256(&mut packed, request.max_fee_per_gas);
    push_u256(&mut packed, request.max_priority_fee_per_gas);
    match &request.sponsorship {
        Some(sponsorship) => {
            packed.extend_from_slice(sponsorship.paymaster.as_bytes());
            packed.extend_from_slice(keccak256(sponsorship.data.as_slice()).as_bytes());
        }
        None => packed.extend_from_slice(Address::ZERO.as_bytes()),
    }

    let inner = keccak256(&packed);
    let mut outer = Vec::with_capacity(32 + 20 + 8);
    outer.extend_from_slice(inner.as_bytes());
    outer.extend_from_slice(coordinator.as_bytes());
    outer.extend_from_slice(&chain_id.to_be_bytes());
    keccak256(&outer)
}

/// Digest of an action: tag byte followed by its fields.
#[must_use]
pub fn action_digest(action: &Action) -> Hash {
    let mut buf = Vec::new();
    match action {
        Action::Synchronize => buf.push(TAG_SYNCHRONIZE),
        Action::SynchronizeAndRefund { recipient } => {
            buf.push(TAG_SYNCHRONIZE_AND_REFUND);
            buf.extend_from_slice(recipient.unwrap_or(Address::ZERO).as_bytes());
        }
        Action::Execute(call) => {
            buf.push(TAG_EXECUTE);
            push_call(&mut buf, call);
        }
        Action::ExecuteBatch(calls) => {
            buf.push(TAG_EXECUTE_BATCH);
            buf.extend_from_slice(&(calls.len() as u64).to_be_bytes());
            for call in calls {
                push_call(&mut buf, call);
            }
        }
    }
    keccak256(&buf)
}

fn push_call(buf: &mut Vec<u8>, call: &Call) {
    buf.extend_from_slice(call.target.as_bytes());
    push_u256(buf, call.value);
    buf.extend_from_slice(keccak256(call.data.as_slice()).as_bytes());
}

fn push_u256(buf: &mut Vec<u8>, value: U256) {
    let mut word = [0u8; 32];
    value.to_big_endian(&mut word);
    buf.extend_from_slice(&word);
}
