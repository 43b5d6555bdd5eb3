//! Stage handlers of the ticket machine.
//!
//! Each stage is a zero-sized handler implementing the full
//! [`TicketMachineState`] interface. Handlers return a [`Step`] and never
//! install their successor themselves.

use super::context::{Sale, TicketContext};
use super::error::TicketError;
use crate::core::Step;
use crate::feedback::Feedback;
use crate::money::Amount;

state_enum! {
    /// Where the ticket machine is in a purchase.
    pub enum TicketStage {
        Idle,
        WaitingForPayment,
        PaymentReceived,
        Dispensed,
        Cancelled,
    }
    error: [Cancelled]
}

/// Outcome of a ticket stage handler.
pub type TicketStep = Step<dyn TicketMachineState>;

/// Behavior of one ticket machine stage.
///
/// Every stage answers every action: either by mutating the context and
/// returning a step, or by returning an error with the context untouched.
pub trait TicketMachineState: Send + Sync {
    fn stage(&self) -> TicketStage;

    /// Runs once each time the stage is installed.
    fn on_enter(&self, _ctx: &mut TicketContext, _out: &mut dyn Feedback) {}

    fn select(
        &self,
        ctx: &mut TicketContext,
        out: &mut dyn Feedback,
        code: &str,
    ) -> Result<TicketStep, TicketError>;

    fn insert_funds(
        &self,
        ctx: &mut TicketContext,
        out: &mut dyn Feedback,
        amount: Amount,
    ) -> Result<TicketStep, TicketError>;

    fn confirm(&self, ctx: &mut TicketContext, out: &mut dyn Feedback)
        -> Result<TicketStep, TicketError>;

    fn cancel(&self, ctx: &mut TicketContext, out: &mut dyn Feedback)
        -> Result<TicketStep, TicketError>;
}

/// Build the handler for `stage`.
pub fn handler_for(stage: TicketStage) -> Box<dyn TicketMachineState> {
    match stage {
        TicketStage::Idle => Box::new(Idle),
        TicketStage::WaitingForPayment => Box::new(WaitingForPayment),
        TicketStage::PaymentReceived => Box::new(PaymentReceived),
        TicketStage::Dispensed => Box::new(Dispensed),
        TicketStage::Cancelled => Box::new(Cancelled),
    }
}

fn enter(stage: TicketStage) -> Result<TicketStep, TicketError> {
    Ok(Step::Enter(handler_for(stage)))
}

fn reroute(stage: TicketStage) -> Result<TicketStep, TicketError> {
    Ok(Step::Reroute(handler_for(stage)))
}

fn refund(ctx: &mut TicketContext, out: &mut dyn Feedback) {
    let returned = ctx.payments.return_change();
    out.say(&format!("Transaction cancelled. Returned {returned}"));
    ctx.note(format!("cancelled, refunded {returned}"));
}

/// No purchase in progress.
#[derive(Debug, Clone, Copy)]
pub struct Idle;

impl TicketMachineState for Idle {
    fn stage(&self) -> TicketStage {
        TicketStage::Idle
    }

    fn on_enter(&self, ctx: &mut TicketContext, _out: &mut dyn Feedback) {
        ctx.payments.reset();
        ctx.selection = None;
    }

    fn select(
        &self,
        ctx: &mut TicketContext,
        out: &mut dyn Feedback,
        code: &str,
    ) -> Result<TicketStep, TicketError> {
        let ticket = ctx
            .catalog
            .find(code)
            .cloned()
            .ok_or_else(|| TicketError::UnknownTicket(code.to_string()))?;
        if !ctx.inventory.has_stock(&ticket.code) {
            return Err(TicketError::OutOfStock(ticket.code));
        }

        out.say(&format!("Selected {}. Price {}", ticket.name, ticket.price));
        ctx.note(format!("selected {}", ticket.code));
        ctx.selection = Some(ticket);
        enter(TicketStage::WaitingForPayment)
    }

    fn insert_funds(
        &self,
        _ctx: &mut TicketContext,
        _out: &mut dyn Feedback,
        _amount: Amount,
    ) -> Result<TicketStep, TicketError> {
        Err(TicketError::NoTicketSelected)
    }

    fn confirm(
        &self,
        _ctx: &mut TicketContext,
        _out: &mut dyn Feedback,
    ) -> Result<TicketStep, TicketError> {
        Err(TicketError::NothingToDispense)
    }

    fn cancel(
        &self,
        _ctx: &mut TicketContext,
        _out: &mut dyn Feedback,
    ) -> Result<TicketStep, TicketError> {
        Err(TicketError::NothingToCancel)
    }
}

/// A ticket is selected and the balance does not cover it yet.
#[derive(Debug, Clone, Copy)]
pub struct WaitingForPayment;

impl TicketMachineState for WaitingForPayment {
    fn stage(&self) -> TicketStage {
        TicketStage::WaitingForPayment
    }

    fn select(
        &self,
        ctx: &mut TicketContext,
        out: &mut dyn Feedback,
        code: &str,
    ) -> Result<TicketStep, TicketError> {
        let ticket = ctx
            .catalog
            .find(code)
            .cloned()
            .ok_or_else(|| TicketError::UnknownTicket(code.to_string()))?;
        if !ctx.inventory.has_stock(&ticket.code) {
            return Err(TicketError::OutOfStock(ticket.code));
        }

        out.say(&format!("Switched to {}. Price {}", ticket.name, ticket.price));
        ctx.note(format!("reselected {}", ticket.code));
        let covered = ctx.payments.is_enough(ticket.price);
        ctx.selection = Some(ticket);

        if covered {
            out.say("Balance covers the ticket. Confirm to dispense.");
            enter(TicketStage::PaymentReceived)
        } else {
            Ok(Step::Stay)
        }
    }

    fn insert_funds(
        &self,
        ctx: &mut TicketContext,
        out: &mut dyn Feedback,
        amount: Amount,
    ) -> Result<TicketStep, TicketError> {
        let price = ctx
            .selection
            .as_ref()
            .map(|t| t.price)
            .ok_or(TicketError::NoTicketSelected)?;
        let balance = ctx.payments.insert(amount)?;
        out.say(&format!("Added {amount}. Balance {balance}"));
        ctx.note(format!("inserted {amount}"));

        if ctx.payments.is_enough(price) {
            out.say("Payment received. Confirm to dispense.");
            enter(TicketStage::PaymentReceived)
        } else {
            out.say(&format!("{} still due", price - balance));
            Ok(Step::Stay)
        }
    }

    fn confirm(
        &self,
        ctx: &mut TicketContext,
        _out: &mut dyn Feedback,
    ) -> Result<TicketStep, TicketError> {
        match &ctx.selection {
            Some(ticket) => Err(TicketError::InsufficientFunds {
                price: ticket.price,
                balance: ctx.payments.balance(),
            }),
            None => Err(TicketError::NoTicketSelected),
        }
    }

    fn cancel(
        &self,
        ctx: &mut TicketContext,
        out: &mut dyn Feedback,
    ) -> Result<TicketStep, TicketError> {
        refund(ctx, out);
        enter(TicketStage::Cancelled)
    }
}

/// The balance covers the selected ticket.
#[derive(Debug, Clone, Copy)]
pub struct PaymentReceived;

impl TicketMachineState for PaymentReceived {
    fn stage(&self) -> TicketStage {
        TicketStage::PaymentReceived
    }

    fn select(
        &self,
        _ctx: &mut TicketContext,
        _out: &mut dyn Feedback,
        _code: &str,
    ) -> Result<TicketStep, TicketError> {
        Err(TicketError::AlreadyPaid)
    }

    fn insert_funds(
        &self,
        _ctx: &mut TicketContext,
        out: &mut dyn Feedback,
        amount: Amount,
    ) -> Result<TicketStep, TicketError> {
        out.say(&format!(
            "Balance already covers the ticket. {amount} returned."
        ));
        Ok(Step::Stay)
    }

    fn confirm(
        &self,
        ctx: &mut TicketContext,
        out: &mut dyn Feedback,
    ) -> Result<TicketStep, TicketError> {
        let ticket = ctx.selection.clone().ok_or(TicketError::NoTicketSelected)?;
        if !ctx.payments.is_enough(ticket.price) {
            return Err(TicketError::InsufficientFunds {
                price: ticket.price,
                balance: ctx.payments.balance(),
            });
        }

        ctx.inventory.reserve(&ticket.code)?;
        ctx.payments.deduct(ticket.price)?;
        let change = ctx.payments.return_change();

        if change.is_positive() {
            out.say(&format!("Ticket dispensed, change: {change}"));
        } else {
            out.say("Ticket dispensed.");
        }

        let at = ctx.now();
        ctx.note(format!("dispensed {} for {}", ticket.code, ticket.price));
        ctx.sales.push(Sale {
            code: ticket.code,
            price: ticket.price,
            change,
            at,
        });
        enter(TicketStage::Dispensed)
    }

    fn cancel(
        &self,
        ctx: &mut TicketContext,
        out: &mut dyn Feedback,
    ) -> Result<TicketStep, TicketError> {
        refund(ctx, out);
        enter(TicketStage::Cancelled)
    }
}

/// A ticket was just handed out.
#[derive(Debug, Clone, Copy)]
pub struct Dispensed;

impl TicketMachineState for Dispensed {
    fn stage(&self) -> TicketStage {
        TicketStage::Dispensed
    }

    fn on_enter(&self, _ctx: &mut TicketContext, out: &mut dyn Feedback) {
        out.say("Please take your ticket.");
    }

    fn select(
        &self,
        _ctx: &mut TicketContext,
        out: &mut dyn Feedback,
        _code: &str,
    ) -> Result<TicketStep, TicketError> {
        out.say("Ready for a new purchase.");
        reroute(TicketStage::Idle)
    }

    fn insert_funds(
        &self,
        _ctx: &mut TicketContext,
        out: &mut dyn Feedback,
        _amount: Amount,
    ) -> Result<TicketStep, TicketError> {
        out.say("Ready for a new purchase.");
        reroute(TicketStage::Idle)
    }

    fn confirm(
        &self,
        _ctx: &mut TicketContext,
        out: &mut dyn Feedback,
    ) -> Result<TicketStep, TicketError> {
        out.say("Ticket already dispensed.");
        Ok(Step::Stay)
    }

    fn cancel(
        &self,
        _ctx: &mut TicketContext,
        out: &mut dyn Feedback,
    ) -> Result<TicketStep, TicketError> {
        out.say("Nothing to cancel.");
        enter(TicketStage::Idle)
    }
}

/// The last transaction was cancelled and refunded.
#[derive(Debug, Clone, Copy)]
pub struct Cancelled;

impl TicketMachineState for Cancelled {
    fn stage(&self) -> TicketStage {
        TicketStage::Cancelled
    }

    fn on_enter(&self, _ctx: &mut TicketContext, out: &mut dyn Feedback) {
        out.say("Operation cancelled. Back to the start.");
    }

    fn select(
        &self,
        _ctx: &mut TicketContext,
        out: &mut dyn Feedback,
        _code: &str,
    ) -> Result<TicketStep, TicketError> {
        out.say("Ready for a new purchase.");
        reroute(TicketStage::Idle)
    }

    fn insert_funds(
        &self,
        _ctx: &mut TicketContext,
        out: &mut dyn Feedback,
        _amount: Amount,
    ) -> Result<TicketStep, TicketError> {
        out.say("Ready for a new purchase.");
        reroute(TicketStage::Idle)
    }

    fn confirm(
        &self,
        _ctx: &mut TicketContext,
        out: &mut dyn Feedback,
    ) -> Result<TicketStep, TicketError> {
        out.say("Transaction cancelled. No ticket selected.");
        Ok(Step::Stay)
    }

    fn cancel(
        &self,
        _ctx: &mut TicketContext,
        out: &mut dyn Feedback,
    ) -> Result<TicketStep, TicketError> {
        out.say("Ready for a new purchase.");
        enter(TicketStage::Idle)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::State;

    #[test]
    fn handlers_report_their_stage() {
        for stage in [
            TicketStage::Idle,
            TicketStage::WaitingForPayment,
            TicketStage::PaymentReceived,
            TicketStage::Dispensed,
            TicketStage::Cancelled,
        ] {
            assert_eq!(handler_for(stage).stage(), stage);
        }
    }

    #[test]
    fn no_stage_is_final() {
        assert!(!TicketStage::Dispensed.is_final());
        assert!(!TicketStage::Cancelled.is_final());
        assert!(TicketStage::Cancelled.is_error());
        assert_eq!(TicketStage::WaitingForPayment.name(), "WaitingForPayment");
    }
}
