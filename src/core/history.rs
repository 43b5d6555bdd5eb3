//! Transition history.
//!
//! Every committed transition of a machine is recorded here together with
//! the operation that caused it. Recording returns a new history and leaves
//! the old one untouched.

use super::state::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Record of a single committed transition.
///
/// # Example
///
/// ```rust
/// use patternworks::core::{State, StateTransition};
/// use serde::{Deserialize, Serialize};
/// use chrono::Utc;
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// enum Door {
///     Closed,
///     Open,
/// }
///
/// impl State for Door {
///     fn name(&self) -> &str {
///         match self {
///             Self::Closed => "Closed",
///             Self::Open => "Open",
///         }
///     }
/// }
///
/// let transition = StateTransition {
///     from: Door::Closed,
///     to: Door::Open,
///     action: "open".to_string(),
///     timestamp: Utc::now(),
/// };
/// assert_eq!(transition.action, "open");
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateTransition<S: State> {
    /// Stage the machine left
    pub from: S,
    /// Stage the machine entered
    pub to: S,
    /// Operation that caused the move (`select`, `cancel`, ...)
    pub action: String,
    /// When the transition was committed
    pub timestamp: DateTime<Utc>,
}

/// Ordered history of committed transitions.
///
/// # Example
///
/// ```rust
/// use patternworks::core::{State, StateHistory, StateTransition};
/// use serde::{Deserialize, Serialize};
/// use chrono::Utc;
///
/// #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
/// enum Kettle {
///     Cold,
///     Heating,
///     Boiled,
/// }
///
/// impl State for Kettle {
///     fn name(&self) -> &str {
///         match self {
///             Self::Cold => "Cold",
///             Self::Heating => "Heating",
///             Self::Boiled => "Boiled",
///         }
///     }
/// }
///
/// let history = StateHistory::new()
///     .record(StateTransition {
///         from: Kettle::Cold,
///         to: Kettle::Heating,
///         action: "switch_on".into(),
///         timestamp: Utc::now(),
///     })
///     .record(StateTransition {
///         from: Kettle::Heating,
///         to: Kettle::Boiled,
///         action: "tick".into(),
///         timestamp: Utc::now(),
///     });
///
/// assert_eq!(history.get_path().len(), 3);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateHistory<S: State> {
    transitions: Vec<StateTransition<S>>,
}

impl<S: State> Default for StateHistory<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: State> StateHistory<S> {
    /// Create an empty history.
    pub fn new() -> Self {
        Self {
            transitions: Vec::new(),
        }
    }

    /// Record a transition, returning a new history.
    pub fn record(&self, transition: StateTransition<S>) -> Self {
        let mut transitions = self.transitions.clone();
        transitions.push(transition);
        Self { transitions }
    }

    /// Stages traversed: the first `from`, then every `to` in order.
    pub fn get_path(&self) -> Vec<&S> {
        let mut path = Vec::new();
        if let Some(first) = self.transitions.first() {
            path.push(&first.from);
        }
        for transition in &self.transitions {
            path.push(&transition.to);
        }
        path
    }

    /// Time between the first and the last recorded transition.
    ///
    /// `None` when nothing has been recorded.
    pub fn duration(&self) -> Option<Duration> {
        if let (Some(first), Some(last)) = (self.transitions.first(), self.transitions.last()) {
            last.timestamp
                .signed_duration_since(first.timestamp)
                .to_std()
                .ok()
        } else {
            None
        }
    }

    /// All transitions in order.
    pub fn transitions(&self) -> &[StateTransition<S>] {
        &self.transitions
    }

    /// The most recent transition.
    pub fn last(&self) -> Option<&StateTransition<S>> {
        self.transitions.last()
    }

    /// Number of recorded transitions.
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, PartialEq, Debug, Serialize, Deserialize)]
    enum Order {
        Draft,
        Placed,
        Shipped,
        Returned,
    }

    impl State for Order {
        fn name(&self) -> &str {
            match self {
                Self::Draft => "Draft",
                Self::Placed => "Placed",
                Self::Shipped => "Shipped",
                Self::Returned => "Returned",
            }
        }

        fn is_final(&self) -> bool {
            matches!(self, Self::Shipped | Self::Returned)
        }
    }

    fn step(from: Order, to: Order, action: &str) -> StateTransition<Order> {
        StateTransition {
            from,
            to,
            action: action.to_string(),
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn new_history_is_empty() {
        let history: StateHistory<Order> = StateHistory::new();
        assert!(history.is_empty());
        assert!(history.get_path().is_empty());
        assert!(history.duration().is_none());
        assert!(history.last().is_none());
    }

    #[test]
    fn record_leaves_original_untouched() {
        let history = StateHistory::new();
        let next = history.record(step(Order::Draft, Order::Placed, "place"));

        assert_eq!(history.len(), 0);
        assert_eq!(next.len(), 1);
    }

    #[test]
    fn path_follows_recorded_order() {
        let history = StateHistory::new()
            .record(step(Order::Draft, Order::Placed, "place"))
            .record(step(Order::Placed, Order::Shipped, "ship"));

        let path = history.get_path();
        assert_eq!(path, vec![&Order::Draft, &Order::Placed, &Order::Shipped]);
        assert_eq!(history.last().map(|t| t.action.as_str()), Some("ship"));
    }

    #[test]
    fn duration_spans_first_to_last() {
        let start = Utc::now();
        let history = StateHistory::new()
            .record(StateTransition {
                from: Order::Draft,
                to: Order::Placed,
                action: "place".into(),
                timestamp: start,
            })
            .record(StateTransition {
                from: Order::Placed,
                to: Order::Returned,
                action: "return".into(),
                timestamp: start + chrono::Duration::seconds(90),
            });

        assert_eq!(history.duration(), Some(Duration::from_secs(90)));
    }

    #[test]
    fn single_transition_has_zero_duration() {
        let history = StateHistory::new().record(step(Order::Draft, Order::Placed, "place"));
        assert_eq!(history.duration(), Some(Duration::ZERO));
    }

    #[test]
    fn history_serializes_with_actions() {
        let history = StateHistory::new().record(step(Order::Draft, Order::Placed, "place"));

        let json = serde_json::to_string(&history).unwrap();
        assert!(json.contains("\"action\":\"place\""));

        let back: StateHistory<Order> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.len(), 1);
        assert_eq!(back.transitions()[0].to, Order::Placed);
    }
}
