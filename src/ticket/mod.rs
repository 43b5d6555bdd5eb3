//! Ticket vending machine.
//!
//! A purchase moves through `Idle -> WaitingForPayment -> PaymentReceived
//! -> Dispensed`, with `Cancelled` reachable while money is held. Finished
//! and cancelled sessions hand the next action back through `Idle`.

mod builder;
mod catalog;
mod context;
mod error;
mod inventory;
mod machine;
mod payment;
mod script;
mod states;

pub use builder::TicketMachineBuilder;
pub use catalog::{TicketCatalog, TicketType};
pub use context::{Sale, TicketContext};
pub use error::{BuildError, TicketError};
pub use inventory::Inventory;
pub use machine::TicketMachine;
pub use payment::PaymentTracker;
pub use script::{demo_script, parse_script, run_script, ScriptError, TicketCommand};
pub use states::{handler_for, TicketMachineState, TicketStage, TicketStep};
