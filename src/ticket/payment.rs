//! Balance tracking for the current transaction.

use super::error::TicketError;
use crate::money::Amount;

/// Money inserted so far.
#[derive(Clone, Debug, Default)]
pub struct PaymentTracker {
    balance: Amount,
}

impl PaymentTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn balance(&self) -> Amount {
        self.balance
    }

    /// Add `amount` to the balance and return the new balance.
    pub fn insert(&mut self, amount: Amount) -> Result<Amount, TicketError> {
        if !amount.is_positive() {
            return Err(TicketError::InvalidAmount(amount));
        }
        let balance = self
            .balance
            .checked_add(amount)
            .ok_or(TicketError::BalanceOverflow {
                balance: self.balance,
                amount,
            })?;
        self.balance = balance;
        Ok(balance)
    }

    pub fn is_enough(&self, price: Amount) -> bool {
        self.balance >= price
    }

    /// Take `price` out of the balance.
    pub fn deduct(&mut self, price: Amount) -> Result<Amount, TicketError> {
        if !self.is_enough(price) {
            return Err(TicketError::InsufficientFunds {
                price,
                balance: self.balance,
            });
        }
        self.balance -= price;
        Ok(price)
    }

    /// Hand back whatever is left and zero the balance.
    pub fn return_change(&mut self) -> Amount {
        std::mem::take(&mut self.balance)
    }

    pub fn reset(&mut self) {
        self.balance = Amount::ZERO;
    }
}
