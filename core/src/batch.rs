// Copyright (c) 2022-2023 The MobileCoin Foundation

//! Batch signing progress
//!
//! Wallet sequence numbers must be claimed contiguously and in order, so a
//! batch never skips or reorders items: a failed item is retried in place
//! until a shared attempt budget runs out, and a user rejection aborts the
//! whole batch.
//!
//! ```text
//!   Pending(i) --ok--> Pending(i+1) --...--> Done
//!       |  ^
//!  fail |  | ok
//!       v  |
//!   Retrying(i, n) --budget spent--> Exhausted
//!
//!   any --rejected--> Aborted
//! ```

use strum::Display;

/// Batch signing state
#[derive(Copy, Clone, PartialEq, Eq, Debug, Display)]
pub enum BatchState {
    /// Awaiting the first attempt at `index`
    Pending { index: usize },

    /// Item at `index` failed and will be attempted again
    Retrying { index: usize, attempts_left: usize },

    /// All items signed
    Done,

    /// User rejected a request, no further items are attempted
    Aborted,

    /// Attempt budget spent before all items were signed
    Exhausted,
}

/// Classified signing failure
#[derive(Copy, Clone, PartialEq, Eq, Debug, Display)]
pub enum Failure {
    /// User declined on the device
    Rejected,

    /// Any other device or transport failure
    Transient,
}

/// Tracks progress through a batch with a shared attempt budget
#[derive(Clone, PartialEq, Debug)]
pub struct BatchProgress {
    len: usize,
    index: usize,
    attempts_left: usize,
    state: BatchState,
}

impl BatchProgress {
    /// Create progress for a batch of `len` items
    ///
    /// The budget is `base_attempts + len` so every item gets at least one
    /// attempt even after earlier items consume retries.
    pub fn new(len: usize, base_attempts: usize) -> Self {
        let state = match len {
            0 => BatchState::Done,
            _ => BatchState::Pending { index: 0 },
        };

        Self {
            len,
            index: 0,
            attempts_left: base_attempts + len,
            state,
        }
    }

    pub fn state(&self) -> BatchState {
        self.state
    }

    /// Index of the item to attempt next, if the batch is still running
    pub fn current(&self) -> Option<usize> {
        match self.state {
            BatchState::Pending { index } | BatchState::Retrying { index, .. } => Some(index),
            _ => None,
        }
    }

    /// Number of items signed so far
    pub fn completed(&self) -> usize {
        self.index
    }

    pub fn attempts_left(&self) -> usize {
        self.attempts_left
    }

    pub fn is_finished(&self) -> bool {
        self.current().is_none()
    }

    /// Record a successful attempt on the current item
    pub fn record_success(&mut self) -> BatchState {
        if self.is_finished() {
            return self.state;
        }

        self.attempts_left = self.attempts_left.saturating_sub(1);
        self.index += 1;

        self.state = if self.index >= self.len {
            BatchState::Done
        } else if self.attempts_left == 0 {
            BatchState::Exhausted
        } else {
            BatchState::Pending { index: self.index }
        };

        self.state
    }

    /// Record a failed attempt on the current item
    pub fn record_failure(&mut self, failure: Failure) -> BatchState {
        if self.is_finished() {
            return self.state;
        }

        self.attempts_left = self.attempts_left.saturating_sub(1);

        self.state = match failure {
            Failure::Rejected => BatchState::Aborted,
            Failure::Transient if self.attempts_left == 0 => BatchState::Exhausted,
            Failure::Transient => BatchState::Retrying {
                index: self.index,
                attempts_left: self.attempts_left,
            },
        };

        self.state
    }
}
