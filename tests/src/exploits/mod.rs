//! # Exploit Simulations
//!
//! Each test plays an adversary against a live account and asserts the
//! attack gains nothing.

pub mod griefing;
pub mod takeover;
