//! Builder for ticket machines.

use super::catalog::{TicketCatalog, TicketType};
use super::context::TicketContext;
use super::error::BuildError;
use super::inventory::Inventory;
use super::machine::TicketMachine;
use crate::clock::{Clock, SystemClock};
use crate::config::TicketConfig;
use crate::feedback::Feedback;
use crate::money::Amount;
use std::collections::BTreeSet;
use std::sync::Arc;

/// Builder for [`TicketMachine`].
///
/// # Example
///
/// ```rust
/// use patternworks::feedback::Silent;
/// use patternworks::money::Amount;
/// use patternworks::ticket::TicketMachineBuilder;
///
/// let machine = TicketMachineBuilder::new()
///     .ticket("Child", "Child", Amount::from_units(50))
///     .stock("Child", 3)
///     .build(Silent)
///     .unwrap();
///
/// assert_eq!(machine.remaining("child"), 3);
/// ```
pub struct TicketMachineBuilder {
    tickets: Vec<TicketType>,
    stock: Vec<(String, u32)>,
    clock: Option<Arc<dyn Clock>>,
}

impl TicketMachineBuilder {
    pub fn new() -> Self {
        Self {
            tickets: Vec::new(),
            stock: Vec::new(),
            clock: None,
        }
    }

    /// Seed catalog and stock from configuration.
    pub fn from_config(config: &TicketConfig) -> Self {
        let mut builder = Self::new();
        for spec in &config.tickets {
            builder = builder.ticket(spec.code.clone(), spec.name.clone(), spec.price);
        }
        for (code, quantity) in &config.stock {
            builder = builder.stock(code.clone(), *quantity);
        }
        builder
    }

    /// Offer a ticket type
    pub fn ticket(mut self, code: impl Into<String>, name: impl Into<String>, price: Amount) -> Self {
        self.tickets.push(TicketType::new(code, name, price));
        self
    }

    /// Set the initial stock of a ticket code
    pub fn stock(mut self, code: impl Into<String>, quantity: u32) -> Self {
        self.stock.push((code.into(), quantity));
        self
    }

    /// Use `clock` for history and journal timestamps
    pub fn clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = Some(clock);
        self
    }

    /// Validate and build the machine
    pub fn build<F: Feedback>(self, out: F) -> Result<TicketMachine<F>, BuildError> {
        if self.tickets.is_empty() {
            return Err(BuildError::NoTickets);
        }

        let mut seen = BTreeSet::new();
        let mut catalog = TicketCatalog::new();
        for ticket in self.tickets {
            if ticket.code.trim().is_empty() {
                return Err(BuildError::BlankCode);
            }
            if !seen.insert(ticket.code.to_lowercase()) {
                return Err(BuildError::DuplicateTicket(ticket.code));
            }
            if !ticket.price.is_positive() {
                return Err(BuildError::NonPositivePrice(ticket.code));
            }
            catalog.insert(ticket);
        }

        let mut inventory = Inventory::new();
        for (code, quantity) in self.stock {
            let known = catalog
                .find(&code)
                .ok_or_else(|| BuildError::UnknownStockCode(code.clone()))?;
            inventory.seed(&known.code, quantity);
        }

        let clock = self.clock.unwrap_or_else(|| Arc::new(SystemClock));
        tracing::debug!(
            machine = "ticket",
            tickets = catalog.len(),
            stock = inventory.total(),
            "ticket machine built"
        );
        Ok(TicketMachine::new(
            TicketContext::new(catalog, inventory, clock),
            out,
        ))
    }
}

impl Default for TicketMachineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
