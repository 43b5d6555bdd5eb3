//! Rules checked before a guarded transition commits.

use crate::core::State;
use crate::enforcement::context::TransitionContext;
use crate::enforcement::violations::{ViolationError, ViolationStrategy};
use std::time::Duration;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Outcome of one rule, or of a whole rule set.
pub type Verdict = Validation<(), NonEmptyVec<ViolationError>>;

type Rule<S> = Box<dyn Fn(&TransitionContext<S>) -> Verdict + Send + Sync>;

/// A deadline plus any number of custom rules. Every broken rule is
/// reported, not only the first.
pub struct EnforcementRules<S: State> {
    pub(crate) deadline: Option<Duration>,
    pub(crate) rules: Vec<Rule<S>>,
    pub(crate) on_violation: ViolationStrategy,
}

impl<S: State> EnforcementRules<S> {
    pub fn enforce(&self, context: &TransitionContext<S>) -> Verdict {
        let mut verdicts: Vec<Verdict> = Vec::with_capacity(self.rules.len() + 1);

        if let Some(window) = self.deadline {
            let elapsed = context.elapsed();
            verdicts.push(match elapsed.checked_sub(window) {
                Some(late_by) if !late_by.is_zero() => {
                    Validation::fail(ViolationError::DeadlinePassed { window, late_by })
                }
                _ => Validation::success(()),
            });
        }
        verdicts.extend(self.rules.iter().map(|rule| rule(context)));

        Validation::all_vec(verdicts).map(|_| ())
    }

    /// Broken rules as messages; empty when the transition may proceed.
    pub fn violations(&self, context: &TransitionContext<S>) -> Vec<String> {
        match self.enforce(context) {
            Validation::Success(_) => Vec::new(),
            Validation::Failure(errors) => errors.iter().map(ToString::to_string).collect(),
        }
    }

    pub fn violation_strategy(&self) -> ViolationStrategy {
        self.on_violation
    }

    pub fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    /// Number of custom rules, not counting the deadline.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty() && self.deadline.is_none()
    }
}
