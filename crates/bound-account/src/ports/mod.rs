//! # Ports Layer (Middle Hexagon)
//!
//! Trait definitions for the bound account.
//!
//! - **Driving Ports (Inbound)**: `BoundAccountApi`
//! - **Driven Ports (Outbound)**: `OwnershipRegistry`, `ExecutionRelay`,
//!   `Coordinator`, `DelegatedVerifier`
//! - No concrete implementations in this module

pub mod inbound;
pub mod outbound;

pub use inbound::*;
pub use outbound::*;
