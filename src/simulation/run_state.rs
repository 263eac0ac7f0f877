//! Run state tracking for the Model 2 runner
//!
//! A run moves through warm-up, arrival accumulation and departure location
//! before its result is recorded. Each run starts again from `Idle`.

use super::error::SimError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RunState {
    /// No run in progress
    #[default]
    Idle,
    /// Throwaway cycle seeding the opposing green duration
    WarmingUp,
    /// Simulating cycles until the tracked vehicle has arrived
    Accumulating,
    /// Simulating cycles until the tracked vehicle can depart
    LocatingDeparture,
    /// Result recorded
    Done,
}

impl RunState {
    /// Whether a run may move from `self` to `next`
    ///
    /// Any state may fall back to `Idle` so an aborted run leaves the
    /// runner usable.
    pub fn can_transition_to(self, next: RunState) -> bool {
        use RunState::*;
        matches!(
            (self, next),
            (_, Idle)
                | (Idle, WarmingUp)
                | (Done, WarmingUp)
                | (WarmingUp, Accumulating)
                | (Accumulating, LocatingDeparture)
                | (LocatingDeparture, Done)
        )
    }

    /// Move to `next`, rejecting transitions the runner never makes
    pub fn transition(&mut self, next: RunState) -> Result<(), SimError> {
        if !self.can_transition_to(next) {
            return Err(SimError::IllegalTransition {
                from: *self,
                to: next,
            });
        }
        *self = next;
        Ok(())
    }

    /// True while a run is between warm-up and its result
    pub fn is_running(self) -> bool {
        matches!(
            self,
            RunState::WarmingUp | RunState::Accumulating | RunState::LocatingDeparture
        )
    }
}
