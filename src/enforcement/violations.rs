//! Why a guarded transition was refused, and what to do about it.

use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ViolationError {
    #[error("deadline of {}s passed {}s ago", window.as_secs(), late_by.as_secs())]
    DeadlinePassed { window: Duration, late_by: Duration },

    #[error("rule broken: {rule}")]
    RuleBroken { rule: String },
}

impl ViolationError {
    pub fn rule(rule: impl Into<String>) -> Self {
        Self::RuleBroken { rule: rule.into() }
    }

    pub fn is_deadline(&self) -> bool {
        matches!(self, Self::DeadlinePassed { .. })
    }
}

/// What the owning machine does when a rule is broken.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViolationStrategy {
    /// Abandon the session (the machine moves to its cancelled stage)
    Abort,

    /// Refuse the action and keep the current stage
    #[default]
    Reject,

    /// Proceed anyway and log a warning
    IgnoreAndLog,
}
