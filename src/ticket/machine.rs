//! The ticket vending machine.

use super::catalog::TicketType;
use super::context::{Sale, TicketContext};
use super::error::TicketError;
use super::states::{Idle, TicketMachineState, TicketStage};
use crate::core::{Journal, State, StateHistory, StateTransition, Step};
use crate::feedback::Feedback;
use crate::money::Amount;

/// An action forwarded to the active stage.
#[derive(Debug, Clone, Copy)]
enum Action<'a> {
    Select(&'a str),
    InsertFunds(Amount),
    Confirm,
    Cancel,
}

impl Action<'_> {
    fn name(&self) -> &'static str {
        match self {
            Action::Select(_) => "select",
            Action::InsertFunds(_) => "insert_funds",
            Action::Confirm => "confirm",
            Action::Cancel => "cancel",
        }
    }
}

/// Ticket vending machine.
///
/// Holds exactly one active stage and forwards every action to it. A
/// refused action returns the handler's error and leaves the stage and the
/// context as they were. Build one with
/// [`TicketMachineBuilder`](super::TicketMachineBuilder).
///
/// # Example
///
/// ```rust
/// use patternworks::feedback::Transcript;
/// use patternworks::money::Amount;
/// use patternworks::ticket::{TicketMachineBuilder, TicketStage};
///
/// let mut machine = TicketMachineBuilder::new()
///     .ticket("Standard", "Standard", Amount::from_units(100))
///     .stock("Standard", 1)
///     .build(Transcript::new())
///     .unwrap();
///
/// machine.select("standard").unwrap();
/// machine.insert_funds(Amount::from_units(120)).unwrap();
/// assert_eq!(machine.stage(), TicketStage::PaymentReceived);
///
/// machine.confirm().unwrap();
/// assert_eq!(machine.stage(), TicketStage::Dispensed);
/// assert_eq!(machine.remaining("Standard"), 0);
/// assert!(machine.feedback().contains("change: 20.00"));
/// ```
pub struct TicketMachine<F: Feedback> {
    state: Box<dyn TicketMachineState>,
    ctx: TicketContext,
    history: StateHistory<TicketStage>,
    out: F,
}

impl<F: Feedback> TicketMachine<F> {
    pub(crate) fn new(mut ctx: TicketContext, mut out: F) -> Self {
        let state: Box<dyn TicketMachineState> = Box::new(Idle);
        state.on_enter(&mut ctx, &mut out);
        ctx.note("ticket machine started");
        Self {
            state,
            ctx,
            history: StateHistory::new(),
            out,
        }
    }

    /// Choose a ticket by code (case-insensitive).
    pub fn select(&mut self, code: &str) -> Result<(), TicketError> {
        self.dispatch(Action::Select(code))
    }

    /// Insert money towards the selected ticket.
    pub fn insert_funds(&mut self, amount: Amount) -> Result<(), TicketError> {
        self.dispatch(Action::InsertFunds(amount))
    }

    /// Dispense the paid ticket.
    pub fn confirm(&mut self) -> Result<(), TicketError> {
        self.dispatch(Action::Confirm)
    }

    /// Abort the current purchase and refund the balance.
    pub fn cancel(&mut self) -> Result<(), TicketError> {
        self.dispatch(Action::Cancel)
    }

    /// Add tickets to the stock of a known code.
    pub fn restock(&mut self, code: &str, quantity: u32) -> Result<u32, TicketError> {
        let ticket = self
            .ctx
            .catalog
            .find(code)
            .ok_or_else(|| TicketError::UnknownTicket(code.to_string()))?;
        let code = ticket.code.clone();
        let count = self.ctx.inventory.restock(&code, quantity);
        self.ctx.note(format!("restocked {code} (+{quantity})"));
        tracing::info!(machine = "ticket", code = %code, count, "restocked");
        Ok(count)
    }

    pub fn stage(&self) -> TicketStage {
        self.state.stage()
    }

    pub fn balance(&self) -> Amount {
        self.ctx.balance()
    }

    pub fn selection(&self) -> Option<&TicketType> {
        self.ctx.selection()
    }

    pub fn remaining(&self, code: &str) -> u32 {
        self.ctx.inventory.remaining(code)
    }

    pub fn catalog(&self) -> impl Iterator<Item = &TicketType> {
        self.ctx.catalog.all()
    }

    pub fn sales(&self) -> &[Sale] {
        self.ctx.sales()
    }

    pub fn history(&self) -> &StateHistory<TicketStage> {
        &self.history
    }

    pub fn journal(&self) -> &Journal {
        self.ctx.journal()
    }

    pub fn context(&self) -> &TicketContext {
        &self.ctx
    }

    pub fn feedback(&self) -> &F {
        &self.out
    }

    pub fn feedback_mut(&mut self) -> &mut F {
        &mut self.out
    }

    fn dispatch(&mut self, action: Action<'_>) -> Result<(), TicketError> {
        loop {
            let result = match action {
                Action::Select(code) => self.state.select(&mut self.ctx, &mut self.out, code),
                Action::InsertFunds(amount) => {
                    self.state.insert_funds(&mut self.ctx, &mut self.out, amount)
                }
                Action::Confirm => self.state.confirm(&mut self.ctx, &mut self.out),
                Action::Cancel => self.state.cancel(&mut self.ctx, &mut self.out),
            };

            match result {
                Ok(Step::Stay) => return Ok(()),
                Ok(Step::Enter(next)) => {
                    self.install(next, action.name());
                    return Ok(());
                }
                Ok(Step::Reroute(next)) => {
                    self.install(next, action.name());
                }
                Err(error) => {
                    tracing::warn!(
                        machine = "ticket",
                        stage = %self.state.stage(),
                        action = action.name(),
                        %error,
                        "action refused"
                    );
                    return Err(error);
                }
            }
        }
    }

    fn install(&mut self, next: Box<dyn TicketMachineState>, action: &str) {
        let from = self.state.stage();
        let to = next.stage();
        self.history = self.history.record(StateTransition {
            from,
            to,
            action: action.to_string(),
            timestamp: self.ctx.now(),
        });
        tracing::debug!(machine = "ticket", from = from.name(), to = to.name(), action, "transition");

        self.state = next;
        self.state.on_enter(&mut self.ctx, &mut self.out);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::Transcript;
    use crate::ticket::TicketMachineBuilder;

    fn machine() -> TicketMachine<Transcript> {
        TicketMachineBuilder::new()
            .ticket("Child", "Child", Amount::from_units(50))
            .ticket("Standard", "Standard", Amount::from_units(100))
            .ticket("Student", "Student", Amount::from_units(90))
            .stock("Standard", 10)
            .stock("Student", 5)
            .stock("Child", 3)
            .build(Transcript::new())
            .unwrap()
    }

    fn units(n: i64) -> Amount {
        Amount::from_units(n)
    }

    #[test]
    fn starts_idle_with_empty_balance() {
        let machine = machine();
        assert_eq!(machine.stage(), TicketStage::Idle);
        assert_eq!(machine.balance(), Amount::ZERO);
        assert!(machine.selection().is_none());
        assert!(machine.history().is_empty());
    }

    #[test]
    fn full_purchase_with_exact_money() {
        let mut machine = machine();
        machine.select("Standard").unwrap();
        assert_eq!(machine.stage(), TicketStage::WaitingForPayment);

        machine.insert_funds(units(100)).unwrap();
        assert_eq!(machine.stage(), TicketStage::PaymentReceived);

        machine.confirm().unwrap();
        assert_eq!(machine.stage(), TicketStage::Dispensed);
        assert_eq!(machine.balance(), Amount::ZERO);
        assert_eq!(machine.remaining("Standard"), 9);
        assert_eq!(machine.sales().len(), 1);
        assert_eq!(machine.sales()[0].change, Amount::ZERO);
        assert!(machine.feedback().contains("Ticket dispensed."));
    }

    #[test]
    fn partial_payments_accumulate() {
        let mut machine = machine();
        machine.select("child").unwrap();
        machine.insert_funds(units(20)).unwrap();
        assert_eq!(machine.stage(), TicketStage::WaitingForPayment);
        assert_eq!(machine.balance(), units(20));

        machine.insert_funds(units(30)).unwrap();
        assert_eq!(machine.stage(), TicketStage::PaymentReceived);

        machine.confirm().unwrap();
        assert_eq!(machine.remaining("Child"), 2);
    }

    #[test]
    fn oversized_deposit_is_refused_without_capping_the_balance() {
        let mut machine = TicketMachineBuilder::new()
            .ticket("Gold", "Gold", Amount::from_micros(i64::MAX))
            .stock("Gold", 1)
            .build(Transcript::new())
            .unwrap();
        machine.select("Gold").unwrap();

        let deposit = units(9_223_372_036_854);
        machine.insert_funds(deposit).unwrap();
        let err = machine.insert_funds(deposit).unwrap_err();

        assert!(matches!(err, TicketError::BalanceOverflow { .. }));
        assert_eq!(machine.balance(), deposit);
        assert_eq!(machine.stage(), TicketStage::WaitingForPayment);
        assert_eq!(machine.remaining("Gold"), 1);
    }

    #[test]
    fn cancel_while_waiting_refunds() {
        let mut machine = machine();
        machine.select("Student").unwrap();
        machine.insert_funds(units(50)).unwrap();
        machine.cancel().unwrap();

        assert_eq!(machine.stage(), TicketStage::Cancelled);
        assert_eq!(machine.balance(), Amount::ZERO);
        assert_eq!(machine.remaining("Student"), 5);
        assert!(machine.feedback().contains("Returned 50.00"));
    }

    #[test]
    fn idle_rejects_everything_but_select() {
        let mut machine = machine();
        assert_eq!(machine.insert_funds(units(10)), Err(TicketError::NoTicketSelected));
        assert_eq!(machine.confirm(), Err(TicketError::NothingToDispense));
        assert_eq!(machine.cancel(), Err(TicketError::NothingToCancel));
        assert_eq!(machine.stage(), TicketStage::Idle);
        assert_eq!(machine.balance(), Amount::ZERO);
    }

    #[test]
    fn unknown_and_sold_out_codes_are_rejected() {
        let mut machine = machine();
        assert_eq!(
            machine.select("Senior"),
            Err(TicketError::UnknownTicket("Senior".into()))
        );

        for _ in 0..3 {
            machine.select("Child").unwrap();
            machine.insert_funds(units(50)).unwrap();
            machine.confirm().unwrap();
        }
        assert_eq!(machine.remaining("Child"), 0);
        assert_eq!(
            machine.select("Child"),
            Err(TicketError::OutOfStock("Child".into()))
        );
        // the failed select still rerouted through Idle
        assert_eq!(machine.stage(), TicketStage::Idle);
    }

    #[test]
    fn invalid_amount_keeps_balance() {
        let mut machine = machine();
        machine.select("Standard").unwrap();
        machine.insert_funds(units(40)).unwrap();

        assert_eq!(
            machine.insert_funds(Amount::ZERO),
            Err(TicketError::InvalidAmount(Amount::ZERO))
        );
        assert_eq!(machine.balance(), units(40));
        assert_eq!(machine.stage(), TicketStage::WaitingForPayment);
    }

    #[test]
    fn confirm_while_waiting_reports_shortfall() {
        let mut machine = machine();
        machine.select("Standard").unwrap();
        machine.insert_funds(units(30)).unwrap();

        assert_eq!(
            machine.confirm(),
            Err(TicketError::InsufficientFunds {
                price: units(100),
                balance: units(30)
            })
        );
    }

    #[test]
    fn reselect_to_cheaper_ticket_can_complete_payment() {
        let mut machine = machine();
        machine.select("Standard").unwrap();
        machine.insert_funds(units(60)).unwrap();

        machine.select("Child").unwrap();
        assert_eq!(machine.stage(), TicketStage::PaymentReceived);
        assert_eq!(machine.selection().map(|t| t.code.as_str()), Some("Child"));

        machine.confirm().unwrap();
        assert_eq!(machine.sales()[0].change, units(10));
    }

    #[test]
    fn paid_machine_refuses_coins_and_reselection() {
        let mut machine = machine();
        machine.select("Child").unwrap();
        machine.insert_funds(units(50)).unwrap();

        machine.insert_funds(units(10)).unwrap();
        assert_eq!(machine.balance(), units(50));
        assert_eq!(machine.select("Standard"), Err(TicketError::AlreadyPaid));
        assert_eq!(machine.stage(), TicketStage::PaymentReceived);
    }

    #[test]
    fn dispensed_reroutes_new_selection_through_idle() {
        let mut machine = machine();
        machine.select("Child").unwrap();
        machine.insert_funds(units(50)).unwrap();
        machine.confirm().unwrap();

        machine.select("Student").unwrap();
        assert_eq!(machine.stage(), TicketStage::WaitingForPayment);

        let actions: Vec<_> = machine
            .history()
            .transitions()
            .iter()
            .map(|t| (t.from, t.to, t.action.as_str()))
            .collect();
        assert_eq!(
            &actions[3..],
            &[
                (TicketStage::Dispensed, TicketStage::Idle, "select"),
                (TicketStage::Idle, TicketStage::WaitingForPayment, "select"),
            ]
        );
    }

    #[test]
    fn insert_after_cancel_is_rerouted_and_refused() {
        let mut machine = machine();
        machine.select("Child").unwrap();
        machine.cancel().unwrap();

        assert_eq!(machine.insert_funds(units(5)), Err(TicketError::NoTicketSelected));
        assert_eq!(machine.stage(), TicketStage::Idle);
        assert_eq!(machine.balance(), Amount::ZERO);
    }

    #[test]
    fn terminal_stages_answer_with_messages() {
        let mut machine = machine();
        machine.select("Child").unwrap();
        machine.insert_funds(units(50)).unwrap();
        machine.confirm().unwrap();

        machine.confirm().unwrap();
        assert_eq!(machine.feedback().last(), Some("Ticket already dispensed."));
        assert_eq!(machine.stage(), TicketStage::Dispensed);

        machine.cancel().unwrap();
        assert_eq!(machine.stage(), TicketStage::Idle);

        machine.select("Child").unwrap();
        machine.cancel().unwrap();
        machine.confirm().unwrap();
        assert_eq!(machine.stage(), TicketStage::Cancelled);
        machine.cancel().unwrap();
        assert_eq!(machine.stage(), TicketStage::Idle);
    }

    #[test]
    fn restock_known_codes_only() {
        let mut machine = machine();
        assert_eq!(machine.restock("child", 2), Ok(5));
        assert!(machine.restock("Ghost", 1).is_err());
        assert!(machine.journal().mentions("restocked Child"));
    }
}
