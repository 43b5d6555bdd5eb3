//! Fluent construction of [`EnforcementRules`].

use crate::core::{Guard, State};
use crate::enforcement::context::TransitionContext;
use crate::enforcement::rules::{EnforcementRules, Verdict};
use crate::enforcement::violations::{ViolationError, ViolationStrategy};
use std::time::Duration;
use stillwater::validation::Validation;

pub struct EnforcementBuilder<S: State> {
    deadline: Option<Duration>,
    rules: Vec<Box<dyn Fn(&TransitionContext<S>) -> Verdict + Send + Sync>>,
    on_violation: ViolationStrategy,
}

impl<S: State + 'static> EnforcementBuilder<S> {
    pub fn new() -> Self {
        Self {
            deadline: None,
            rules: Vec::new(),
            on_violation: ViolationStrategy::default(),
        }
    }

    /// Refuse the transition once more than `window` has passed since the
    /// guarded phase began. Arriving exactly at the deadline is allowed.
    pub fn deadline(mut self, window: Duration) -> Self {
        self.deadline = Some(window);
        self
    }

    /// Add a rule that reports its own violations.
    pub fn check<F>(mut self, rule: F) -> Self
    where
        F: Fn(&TransitionContext<S>) -> Verdict + Send + Sync + 'static,
    {
        self.rules.push(Box::new(rule));
        self
    }

    /// Add a named guard; a failing guard is reported by its description.
    pub fn guard(self, guard: Guard<TransitionContext<S>>) -> Self {
        self.check(move |ctx| {
            if guard.check(ctx) {
                Validation::success(())
            } else {
                Validation::fail(ViolationError::rule(guard.describe()))
            }
        })
    }

    /// Shorthand for `guard(Guard::new(rule, predicate))`.
    pub fn must<F>(self, rule: &str, predicate: F) -> Self
    where
        F: Fn(&TransitionContext<S>) -> bool + Send + Sync + 'static,
    {
        self.guard(Guard::new(rule, predicate))
    }

    pub fn on_violation(mut self, strategy: ViolationStrategy) -> Self {
        self.on_violation = strategy;
        self
    }

    pub fn build(self) -> EnforcementRules<S> {
        EnforcementRules {
            deadline: self.deadline,
            rules: self.rules,
            on_violation: self.on_violation,
        }
    }
}

impl<S: State + 'static> Default for EnforcementBuilder<S> {
    fn default() -> Self {
        Self::new()
    }
}
