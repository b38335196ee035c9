//! # Integration Tests
//!
//! Full request lifecycles through `AccountService`: bootstrap, ownership
//! transfer, pause and recovery.

pub mod flows;
