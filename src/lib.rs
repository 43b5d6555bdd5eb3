//! Patternworks: design-pattern simulations built around small, explicit
//! state machines.
//!
//! The crate keeps the teaching exercises' behavior but none of their
//! console coupling. Machines are pure state plus a journal; every
//! user-visible line goes through a [`feedback::Feedback`] port and every
//! question through [`feedback::Prompt`].
//!
//! # Core Concepts
//!
//! - **State**: stage identity via the [`State`] trait (usually generated
//!   with [`state_enum!`])
//! - **Step**: what a stage handler returns to its machine
//! - **History**: immutable record of committed transitions
//! - **Enforcement**: deadline and custom rules checked before a
//!   transition commits
//!
//! # Example
//!
//! ```rust
//! use patternworks::feedback::Transcript;
//! use patternworks::money::Amount;
//! use patternworks::ticket::{TicketMachineBuilder, TicketStage};
//!
//! let mut machine = TicketMachineBuilder::new()
//!     .ticket("Standard", "Standard", Amount::from_units(100))
//!     .stock("Standard", 2)
//!     .build(Transcript::new())
//!     .unwrap();
//!
//! machine.select("standard").unwrap();
//! machine.insert_funds(Amount::from_units(150)).unwrap();
//! machine.confirm().unwrap();
//!
//! assert_eq!(machine.stage(), TicketStage::Dispensed);
//! assert_eq!(machine.remaining("Standard"), 1);
//! ```

#[macro_use]
mod macros;

pub mod clock;
pub mod config;
pub mod core;
pub mod enforcement;
pub mod feedback;
pub mod hotel;
pub mod money;
pub mod patterns;
pub mod request;
pub mod roles;
pub mod ticket;

// Re-export commonly used types
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, PatternworksConfig};
pub use core::{Guard, Journal, State, StateHistory, StateTransition, Step};
pub use feedback::{Console, Feedback, Prompt, Transcript};
pub use money::Amount;
