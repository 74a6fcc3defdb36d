//! In-flight guard for the upload form.
//!
//! A form may be submitted again while the previous POST is still
//! outstanding. [`SubmitGuard`] tracks the request state so that only
//! one submission is in flight at a time:
//!
//! ```text
//! Idle --begin--> InFlight --finish--> Done --begin--> InFlight ...
//! ```
//!
//! The guard is a `Cell`: the browser event loop is single-threaded and
//! the guard is only touched from event handlers and the futures they
//! spawn.

use std::cell::Cell;

/// Request state of the form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmitState {
    /// No submission has been made yet.
    #[default]
    Idle,
    /// A POST is outstanding; further submissions are rejected.
    InFlight,
    /// The last submission has resolved (successfully or not).
    Done,
}

impl SubmitState {
    /// Whether a new submission may start from this state.
    #[must_use]
    pub const fn accepts_submit(self) -> bool {
        !matches!(self, Self::InFlight)
    }
}

/// Shared request-state cell for one form.
#[derive(Debug, Default)]
pub struct SubmitGuard {
    state: Cell<SubmitState>,
}

impl SubmitGuard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current state.
    #[must_use]
    pub fn state(&self) -> SubmitState {
        self.state.get()
    }

    /// Whether a POST is outstanding.
    #[must_use]
    pub fn is_in_flight(&self) -> bool {
        self.state() == SubmitState::InFlight
    }

    /// Move to [`SubmitState::InFlight`].
    ///
    /// Returns `false` (and leaves the state unchanged) when a
    /// submission is already in flight.
    pub fn try_begin(&self) -> bool {
        if !self.state().accepts_submit() {
            return false;
        }
        self.state.set(SubmitState::InFlight);
        true
    }

    /// Move to [`SubmitState::Done`].
    pub fn finish(&self) {
        self.state.set(SubmitState::Done);
    }
}
