//! # Adapters Layer (Outer Hexagon)
//!
//! In-memory implementations of the driven ports. They back the unit and
//! integration tests and are enough to run a single account end to end.

pub mod coordinator;
pub mod registry;
pub mod verifier;
pub mod world;

pub use coordinator::*;
pub use registry::*;
pub use verifier::*;
pub use world::*;
