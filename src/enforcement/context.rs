//! Context provided to enforcement checks.

use crate::core::State;
use chrono::{DateTime, Utc};
use std::time::Duration;

/// Snapshot of a transition about to be committed.
///
/// `now` is read from the machine's clock by the caller, so checks stay
/// pure and tests can pin time.
#[derive(Clone, Debug)]
pub struct TransitionContext<S: State> {
    pub from: S,
    pub to: S,
    /// When the guarded phase began (for a booking request: when it was sent)
    pub started_at: DateTime<Utc>,
    pub now: DateTime<Utc>,
}

impl<S: State> TransitionContext<S> {
    /// Time spent since `started_at`, zero if the clock went backwards.
    pub fn elapsed(&self) -> Duration {
        self.now
            .signed_duration_since(self.started_at)
            .to_std()
            .unwrap_or(Duration::ZERO)
    }
}
