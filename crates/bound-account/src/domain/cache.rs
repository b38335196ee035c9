//! # Ownership Cache
//!
//! Locally readable copy of the registry's owner plus the staleness flag.
//!
//! The cached owner is only ever trusted for authorization while
//! `is_stale()` is false. A new cache is stale with a zero owner, so the
//! first authorized action on an account is always a synchronization.

use crate::domain::entities::AccountStatus;
use crate::domain::value_objects::Address;
use serde::{Deserialize, Serialize};

/// Cached owner and staleness flag, revisioned on every change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnershipCache {
    owner: Address,
    stale: bool,
    revision: u64,
}

impl OwnershipCache {
    /// A fresh account: zero owner, stale.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            owner: Address::ZERO,
            stale: true,
            revision: 0,
        }
    }

    /// Last synchronized owner.
    #[must_use]
    pub const fn current_cached_owner(&self) -> Address {
        self.owner
    }

    /// True while the owner must not be trusted.
    #[must_use]
    pub const fn is_stale(&self) -> bool {
        self.stale
    }

    /// Number of changes applied since creation.
    #[must_use]
    pub const fn revision(&self) -> u64 {
        self.revision
    }

    /// State machine view of the staleness flag.
    #[must_use]
    pub const fn status(&self) -> AccountStatus {
        if self.stale {
            AccountStatus::Stale
        } else {
            AccountStatus::Active
        }
    }

    /// The owner if it may be trusted right now.
    #[must_use]
    pub fn trusted_owner(&self) -> Option<Address> {
        (!self.stale && !self.owner.is_zero()).then_some(self.owner)
    }

    pub(crate) fn set_owner(&mut self, owner: Address) {
        if self.owner != owner {
            self.owner = owner;
            self.revision += 1;
        }
    }

    pub(crate) fn mark_fresh(&mut self) {
        if self.stale {
            self.stale = false;
            self.revision += 1;
        }
    }

    pub(crate) fn mark_stale(&mut self) {
        if !self.stale {
            self.stale = true;
            self.revision += 1;
        }
    }
}

impl Default for OwnershipCache {
    fn default() -> Self {
        Self::new()
    }
}
