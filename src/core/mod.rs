//! Core state machine types.
//!
//! This module contains the pieces every machine in the crate shares:
//! - Stage identity via the `State` trait
//! - Guard predicates naming preconditions
//! - Immutable transition history and a free-text journal
//! - `Step`, the outcome a stage handler hands back to its machine
//!
//! Nothing in here performs I/O. Output goes through the ports in
//! [`crate::feedback`].

mod guard;
mod history;
mod journal;
mod state;
mod step;

pub use guard::Guard;
pub use history::{StateHistory, StateTransition};
pub use journal::{Journal, JournalEntry};
pub use state::State;
pub use step::Step;
