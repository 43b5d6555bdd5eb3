//! Ticket types on offer.

use crate::money::Amount;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A ticket type: stable code, display name and price.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketType {
    pub code: String,
    pub name: String,
    pub price: Amount,
}

impl TicketType {
    pub fn new(code: impl Into<String>, name: impl Into<String>, price: Amount) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            price,
        }
    }
}

/// Ticket types keyed by code, looked up case-insensitively.
#[derive(Clone, Debug, Default)]
pub struct TicketCatalog {
    tickets: BTreeMap<String, TicketType>,
}

impl TicketCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a ticket type.
    pub fn insert(&mut self, ticket: TicketType) {
        self.tickets.insert(ticket.code.to_lowercase(), ticket);
    }

    pub fn seed(&mut self, tickets: impl IntoIterator<Item = TicketType>) {
        for ticket in tickets {
            self.insert(ticket);
        }
    }

    pub fn find(&self, code: &str) -> Option<&TicketType> {
        self.tickets.get(&code.trim().to_lowercase())
    }

    pub fn contains(&self, code: &str) -> bool {
        self.find(code).is_some()
    }

    /// All ticket types ordered by code.
    pub fn all(&self) -> impl Iterator<Item = &TicketType> {
        self.tickets.values()
    }

    pub fn len(&self) -> usize {
        self.tickets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tickets.is_empty()
    }
}
