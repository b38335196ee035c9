//! # Domain Layer (Inner Hexagon)
//!
//! Pure logic for the bound account: the owner cache, sync economics,
//! request digests and signature recovery.
//! NO I/O, NO async.
//!
//! - This is the **inner layer** of the hexagonal architecture.
//! - Dependencies point INWARD only (adapters depend on this, not vice versa).

pub mod cache;
pub mod economics;
pub mod entities;
pub mod services;
pub mod signature;
pub mod value_objects;

pub use cache::*;
pub use economics::*;
pub use entities::*;
pub use services::*;
pub use signature::{
    address_from_pubkey, eth_signed_message_hash, is_signed_by, keccak256, recover_address,
};
pub use value_objects::*;
