//! Shared data of a ticket machine session.

use super::catalog::{TicketCatalog, TicketType};
use super::inventory::Inventory;
use super::payment::PaymentTracker;
use crate::clock::Clock;
use crate::core::Journal;
use crate::money::Amount;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// A completed sale.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sale {
    pub code: String,
    pub price: Amount,
    pub change: Amount,
    pub at: DateTime<Utc>,
}

/// Data the stage handlers read and mutate.
///
/// Only the active stage's handlers touch these fields; the machine owns
/// the context and lends it to one handler at a time.
pub struct TicketContext {
    pub(crate) catalog: TicketCatalog,
    pub(crate) inventory: Inventory,
    pub(crate) payments: PaymentTracker,
    pub(crate) selection: Option<TicketType>,
    pub(crate) sales: Vec<Sale>,
    pub(crate) journal: Journal,
    pub(crate) clock: Arc<dyn Clock>,
}

impl TicketContext {
    pub(crate) fn new(catalog: TicketCatalog, inventory: Inventory, clock: Arc<dyn Clock>) -> Self {
        Self {
            catalog,
            inventory,
            payments: PaymentTracker::new(),
            selection: None,
            sales: Vec::new(),
            journal: Journal::new(),
            clock,
        }
    }

    pub fn catalog(&self) -> &TicketCatalog {
        &self.catalog
    }

    pub fn inventory(&self) -> &Inventory {
        &self.inventory
    }

    pub fn balance(&self) -> Amount {
        self.payments.balance()
    }

    pub fn selection(&self) -> Option<&TicketType> {
        self.selection.as_ref()
    }

    pub fn sales(&self) -> &[Sale] {
        &self.sales
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub(crate) fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub(crate) fn note(&mut self, message: impl Into<String>) {
        let at = self.clock.now();
        self.journal.note(at, message);
    }
}
