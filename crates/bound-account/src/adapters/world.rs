//! # World Adapter
//!
//! In-memory execution relay: native balances, scripted call targets and a
//! change journal for checkpoint/rollback.
//!
//! Changes are journaled only while a checkpoint is open, and the journal is
//! cleared once the outermost checkpoint closes. The call log is kept for
//! inspection and grows with every call that is not rolled back.

use crate::domain::value_objects::{Address, Bytes, U256};
use crate::ports::outbound::{Checkpoint, ExecutionRelay, TransferFailure};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};

/// How a call target responds.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TargetBehavior {
    /// Accept the call and return the given data.
    Accept(Bytes),
    /// Fail with the given payload.
    Revert(Bytes),
}

impl Default for TargetBehavior {
    fn default() -> Self {
        Self::Accept(Bytes::new())
    }
}

/// A call that went through.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordedCall {
    /// Calling account.
    pub from: Address,
    /// Call target.
    pub target: Address,
    /// Value sent.
    pub value: U256,
    /// Calldata.
    pub data: Bytes,
}

#[derive(Debug)]
enum JournalEntry {
    Balance { address: Address, previous: U256 },
    Call,
}

#[derive(Debug, Default)]
struct WorldState {
    balances: HashMap<Address, U256>,
    targets: HashMap<Address, TargetBehavior>,
    rejecting: HashSet<Address>,
    calls: Vec<RecordedCall>,
    journal: Vec<JournalEntry>,
    open: Vec<usize>,
}

impl WorldState {
    fn balance(&self, address: Address) -> U256 {
        self.balances.get(&address).copied().unwrap_or_default()
    }

    fn record(&mut self, entry: JournalEntry) {
        if !self.open.is_empty() {
            self.journal.push(entry);
        }
    }

    fn set_balance_journaled(&mut self, address: Address, balance: U256) {
        let previous = self.balance(address);
        self.record(JournalEntry::Balance { address, previous });
        self.balances.insert(address, balance);
    }

    /// Close `checkpoint` and every checkpoint opened after it.
    fn close(&mut self, checkpoint: Checkpoint) {
        while self.open.last().is_some_and(|&position| position > checkpoint.0) {
            self.open.pop();
        }
        if self.open.last() == Some(&checkpoint.0) {
            self.open.pop();
        }
        if self.open.is_empty() {
            self.journal.clear();
        }
    }

    fn move_value(&mut self, from: Address, to: Address, value: U256) -> Result<(), TransferFailure> {
        let from_balance = self.balance(from);
        let Some(remaining) = from_balance.checked_sub(value) else {
            return Err(TransferFailure::InsufficientBalance);
        };
        if self.rejecting.contains(&to) {
            return Err(TransferFailure::Rejected);
        }
        if value.is_zero() || from == to {
            return Ok(());
        }
        self.set_balance_journaled(from, remaining);
        let credited = self.balance(to).saturating_add(value);
        self.set_balance_journaled(to, credited);
        Ok(())
    }
}

/// In-memory world shared by the account, the coordinator and the tests.
#[derive(Debug, Default)]
pub struct InMemoryWorld {
    state: Mutex<WorldState>,
}

impl InMemoryWorld {
    /// Empty world.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a balance outside the journal.
    pub fn set_balance(&self, address: Address, balance: U256) {
        self.state.lock().balances.insert(address, balance);
    }

    /// Script how `target` responds to calls. Unscripted targets accept.
    pub fn set_target(&self, target: Address, behavior: TargetBehavior) {
        self.state.lock().targets.insert(target, behavior);
    }

    /// Make `address` refuse incoming value.
    pub fn reject_transfers(&self, address: Address) {
        self.state.lock().rejecting.insert(address);
    }

    /// Number of journal entries currently held for open checkpoints.
    #[must_use]
    pub fn journal_len(&self) -> usize {
        self.state.lock().journal.len()
    }

    /// Calls that went through and were not rolled back.
    #[must_use]
    pub fn calls(&self) -> Vec<RecordedCall> {
        self.state.lock().calls.clone()
    }
}

impl ExecutionRelay for InMemoryWorld {
    fn balance_of(&self, address: Address) -> U256 {
        self.state.lock().balance(address)
    }

    fn transfer(&self, from: Address, to: Address, value: U256) -> Result<(), TransferFailure> {
        self.state.lock().move_value(from, to, value)
    }

    fn call(
        &self,
        from: Address,
        target: Address,
        value: U256,
        data: &[u8],
    ) -> Result<Bytes, Bytes> {
        let mut state = self.state.lock();
        let output = match state.targets.get(&target).cloned().unwrap_or_default() {
            TargetBehavior::Revert(payload) => return Err(payload),
            TargetBehavior::Accept(output) => output,
        };
        state
            .move_value(from, target, value)
            .map_err(|failure| Bytes::from_slice(format!("{failure:?}").as_bytes()))?;
        state.calls.push(RecordedCall {
            from,
            target,
            value,
            data: Bytes::from_slice(data),
        });
        state.record(JournalEntry::Call);
        Ok(output)
    }

    fn checkpoint(&self) -> Checkpoint {
        let mut state = self.state.lock();
        let position = state.journal.len();
        state.open.push(position);
        Checkpoint(position)
    }

    fn revert_to(&self, checkpoint: Checkpoint) {
        let mut state = self.state.lock();
        while state.journal.len() > checkpoint.0 {
            match state.journal.pop() {
                Some(JournalEntry::Balance { address, previous }) => {
                    state.balances.insert(address, previous);
                }
                Some(JournalEntry::Call) => {
                    state.calls.pop();
                }
                None => break,
            }
        }
        state.close(checkpoint);
    }

    fn commit(&self, checkpoint: Checkpoint) {
        self.state.lock().close(checkpoint);
    }
}

// =============================================================================
// TESTS
// =============================================================================
