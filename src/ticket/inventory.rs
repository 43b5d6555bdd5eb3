//! Stock tracking.

use super::error::TicketError;
use std::collections::BTreeMap;

/// Remaining tickets per code (case-insensitive).
#[derive(Clone, Debug, Default)]
pub struct Inventory {
    stock: BTreeMap<String, u32>,
}

impl Inventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the stock for `code`, replacing any previous count.
    pub fn seed(&mut self, code: &str, quantity: u32) {
        self.stock.insert(code.to_lowercase(), quantity);
    }

    pub fn remaining(&self, code: &str) -> u32 {
        self.stock.get(&code.to_lowercase()).copied().unwrap_or(0)
    }

    pub fn has_stock(&self, code: &str) -> bool {
        self.remaining(code) > 0
    }

    /// Take one ticket out of stock.
    pub fn reserve(&mut self, code: &str) -> Result<(), TicketError> {
        match self.stock.get_mut(&code.to_lowercase()) {
            Some(count) if *count > 0 => {
                *count -= 1;
                Ok(())
            }
            _ => Err(TicketError::OutOfStock(code.to_string())),
        }
    }

    /// Add `quantity` tickets, returning the new count.
    pub fn restock(&mut self, code: &str, quantity: u32) -> u32 {
        let count = self.stock.entry(code.to_lowercase()).or_insert(0);
        *count = count.saturating_add(quantity);
        *count
    }

    /// Total tickets left across all codes.
    pub fn total(&self) -> u64 {
        self.stock.values().map(|&c| u64::from(c)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reserve_decrements_until_empty() {
        let mut inventory = Inventory::new();
        inventory.seed("Child", 2);

        assert!(inventory.reserve("child").is_ok());
        assert!(inventory.reserve("CHILD").is_ok());
        assert_eq!(inventory.remaining("Child"), 0);
        assert!(!inventory.has_stock("Child"));
        assert_eq!(
            inventory.reserve("Child"),
            Err(TicketError::OutOfStock("Child".to_string()))
        );
    }

    #[test]
    fn unknown_code_has_no_stock() {
        let mut inventory = Inventory::new();
        assert!(!inventory.has_stock("Ghost"));
        assert!(inventory.reserve("Ghost").is_err());
    }

    #[test]
    fn restock_adds() {
        let mut inventory = Inventory::new();
        inventory.seed("Standard", 1);
        assert_eq!(inventory.restock("standard", 4), 5);
        assert_eq!(inventory.restock("Student", 2), 2);
        assert_eq!(inventory.total(), 7);
    }
}
