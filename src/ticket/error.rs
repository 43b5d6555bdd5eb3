//! Ticket machine errors.

use crate::money::Amount;
use thiserror::Error;

/// Reasons a ticket machine action was refused.
///
/// A refused action leaves balance, selection and stock as they were.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TicketError {
    #[error("no ticket with code '{0}'")]
    UnknownTicket(String),

    #[error("'{0}' tickets are sold out")]
    OutOfStock(String),

    #[error("amount must be positive, got {0}")]
    InvalidAmount(Amount),

    #[error("balance {balance} cannot take another {amount}")]
    BalanceOverflow { balance: Amount, amount: Amount },

    #[error("no ticket selected")]
    NoTicketSelected,

    #[error("nothing to dispense: select a ticket first")]
    NothingToDispense,

    #[error("no transaction in progress to cancel")]
    NothingToCancel,

    #[error("insufficient funds: price {price}, balance {balance}")]
    InsufficientFunds { price: Amount, balance: Amount },

    #[error("ticket already paid; cancel to choose a different one")]
    AlreadyPaid,
}

/// Errors raised while assembling a ticket machine.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("no ticket types defined. Add at least one with .ticket(..)")]
    NoTickets,

    #[error("ticket code '{0}' is defined twice")]
    DuplicateTicket(String),

    #[error("ticket code must not be blank")]
    BlankCode,

    #[error("ticket '{0}' must have a positive price")]
    NonPositivePrice(String),

    #[error("stock given for unknown ticket '{0}'")]
    UnknownStockCode(String),
}
