//! # Account Events
//!
//! Notifications emitted by the account. They are appended to the account's
//! own log in emission order and can be drained by an exporter.

use crate::domain::value_objects::{Address, U256};
use serde::{Deserialize, Serialize};

/// Something observable happened to the account.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum AccountEvent {
    /// Synchronization replaced the cached owner.
    OwnerUpdated {
        /// Owner before the sync.
        previous: Address,
        /// Owner after the sync.
        current: Address,
    },
    /// A sync bounty payment was attempted.
    SyncRefunded {
        /// Bounty recipient.
        recipient: Address,
        /// Amount paid (zero if the transfer failed).
        amount: U256,
        /// Whether the transfer went through.
        success: bool,
    },
    /// Authorization suspended until the next synchronization.
    Paused {
        /// Who raised the signal.
        by: Address,
    },
}

/// Ordered, truncatable record of emitted events.
#[derive(Clone, Debug, Default)]
pub struct EventLog {
    events: Vec<AccountEvent>,
}

impl EventLog {
    /// Empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an event.
    pub fn emit(&mut self, event: AccountEvent) {
        self.events.push(event);
    }

    /// Events emitted so far.
    #[must_use]
    pub fn events(&self) -> &[AccountEvent] {
        &self.events
    }

    /// Number of events; doubles as a mark for `truncate`.
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// True if nothing was emitted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Drop every event emitted after `mark`.
    pub fn truncate(&mut self, mark: usize) {
        self.events.truncate(mark);
    }

    /// Take all events, leaving the log empty.
    pub fn drain(&mut self) -> Vec<AccountEvent> {
        std::mem::take(&mut self.events)
    }
}
