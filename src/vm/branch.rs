//! Indent-keyed branch outcomes
//!
//! There is no parse tree. A conditional, choice or battle command records its
//! outcome under its own indent, and the matching Else / When / If Win command
//! at the same indent reads it back.

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// Memoized outcome of a block-opening command
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BranchOutcome {
    /// Conditional Branch result
    Bool(bool),
    /// Choice index or battle result
    Int(i64),
}

/// Branch store, one slot per indent level
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BranchState {
    slots: SmallVec<[Option<BranchOutcome>; 8]>,
}

impl BranchState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(
        &self,
        indent: usize,
    ) -> Option<BranchOutcome> {
        self.slots.get(indent).copied().flatten()
    }

    pub fn set(
        &mut self,
        indent: usize,
        outcome: BranchOutcome,
    ) {
        if indent >= self.slots.len() {
            self.slots.resize(indent + 1, None);
        }
        self.slots[indent] = Some(outcome);
    }

    /// Invalidate the outcome stored at `indent`
    pub fn clear(
        &mut self,
        indent: usize,
    ) {
        if let Some(slot) = self.slots.get_mut(indent) {
            *slot = None;
        }
    }

    /// Whether the slot holds exactly `false`. Else runs only in that case.
    pub fn is_false(
        &self,
        indent: usize,
    ) -> bool {
        self.get(indent) == Some(BranchOutcome::Bool(false))
    }

    /// Integer outcome at `indent`, if one is recorded
    pub fn int(
        &self,
        indent: usize,
    ) -> Option<i64> {
        match self.get(indent) {
            Some(BranchOutcome::Int(n)) => Some(n),
            _ => None,
        }
    }
}
