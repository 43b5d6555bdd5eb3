//! The hotel booking context.

use super::discount::DiscountTier;
use super::error::BookingError;
use super::rates::RoomRates;
use super::states::{HotelBookingState, HotelStage, HotelStep, Idle};
use crate::clock::{Clock, SystemClock};
use crate::core::{Journal, State, StateHistory, StateTransition, Step};
use crate::feedback::Feedback;
use crate::money::Amount;
use std::sync::Arc;

/// Data shared by the booking stages.
pub struct BookingDetails {
    pub(crate) room: Option<String>,
    pub(crate) total: Amount,
    pub(crate) discount: Option<DiscountTier>,
    pub(crate) paid: Amount,
    pub(crate) journal: Journal,
    pub(crate) rates: Arc<dyn RoomRates>,
    clock: Arc<dyn Clock>,
}

impl BookingDetails {
    pub fn room(&self) -> Option<&str> {
        self.room.as_deref()
    }

    /// Quoted total before discount; zero until confirmed.
    pub fn total(&self) -> Amount {
        self.total
    }

    pub fn discount(&self) -> Option<DiscountTier> {
        self.discount
    }

    /// Total after the discount.
    pub fn amount_due(&self) -> Amount {
        match self.discount {
            Some(tier) => self.total.percent_off(tier.percent()),
            None => self.total,
        }
    }

    pub fn paid(&self) -> Amount {
        self.paid
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    pub(crate) fn note(&mut self, message: impl Into<String>) {
        let at = self.clock.now();
        self.journal.note(at, message);
    }
}

/// A single hotel booking session.
///
/// # Example
///
/// ```rust
/// use patternworks::feedback::Transcript;
/// use patternworks::hotel::{DiscountTier, FlatRate, HotelBooking, HotelStage};
/// use patternworks::money::Amount;
/// use std::sync::Arc;
///
/// let mut booking = HotelBooking::new(Arc::new(FlatRate(Amount::from_units(4000))), Transcript::new());
/// booking.select_room("205").unwrap();
/// booking.confirm().unwrap();
/// booking.apply_discount(DiscountTier::Regular).unwrap();
/// booking.pay(Amount::from_units(3600)).unwrap();
///
/// assert_eq!(booking.stage(), HotelStage::Paid);
/// ```
pub struct HotelBooking<F: Feedback> {
    state: Box<dyn HotelBookingState>,
    details: BookingDetails,
    history: StateHistory<HotelStage>,
    out: F,
}

impl<F: Feedback> HotelBooking<F> {
    pub fn new(rates: Arc<dyn RoomRates>, out: F) -> Self {
        Self::with_clock(rates, Arc::new(SystemClock), out)
    }

    pub fn with_clock(rates: Arc<dyn RoomRates>, clock: Arc<dyn Clock>, out: F) -> Self {
        let mut details = BookingDetails {
            room: None,
            total: Amount::ZERO,
            discount: None,
            paid: Amount::ZERO,
            journal: Journal::new(),
            rates,
            clock,
        };
        details.note("booking opened");
        Self {
            state: Box::new(Idle),
            details,
            history: StateHistory::new(),
            out,
        }
    }

    pub fn select_room(&mut self, room: &str) -> Result<(), BookingError> {
        let step = self.state.select_room(&mut self.details, &mut self.out, room);
        self.commit("select_room", step)
    }

    pub fn change_room(&mut self, room: &str) -> Result<(), BookingError> {
        let step = self.state.change_room(&mut self.details, &mut self.out, room);
        self.commit("change_room", step)
    }

    pub fn confirm(&mut self) -> Result<(), BookingError> {
        let step = self.state.confirm(&mut self.details, &mut self.out);
        self.commit("confirm", step)
    }

    pub fn pay(&mut self, amount: Amount) -> Result<(), BookingError> {
        let step = self.state.pay(&mut self.details, &mut self.out, amount);
        self.commit("pay", step)
    }

    pub fn cancel(&mut self) -> Result<(), BookingError> {
        let step = self.state.cancel(&mut self.details, &mut self.out);
        self.commit("cancel", step)
    }

    pub fn apply_discount(&mut self, tier: DiscountTier) -> Result<(), BookingError> {
        let step = self.state.apply_discount(&mut self.details, &mut self.out, tier);
        self.commit("apply_discount", step)
    }

    pub fn stage(&self) -> HotelStage {
        self.state.stage()
    }

    pub fn details(&self) -> &BookingDetails {
        &self.details
    }

    pub fn history(&self) -> &StateHistory<HotelStage> {
        &self.history
    }

    pub fn journal(&self) -> &Journal {
        &self.details.journal
    }

    pub fn feedback(&self) -> &F {
        &self.out
    }

    /// One-paragraph status summary.
    pub fn summary(&self) -> Vec<String> {
        let mut lines = vec![format!("Stage: {}", self.stage())];
        if let Some(room) = self.details.room() {
            lines.push(format!("Room: {room}"));
        }
        if self.details.total.is_positive() {
            lines.push(format!("Total: {}", self.details.total));
            if let Some(tier) = self.details.discount {
                lines.push(format!("Discount: {}%", tier.percent()));
                lines.push(format!("Due: {}", self.details.amount_due()));
            }
        }
        lines
    }

    fn commit(
        &mut self,
        action: &'static str,
        step: Result<HotelStep, BookingError>,
    ) -> Result<(), BookingError> {
        match step {
            Ok(Step::Stay) => Ok(()),
            Ok(Step::Enter(next)) | Ok(Step::Reroute(next)) => {
                let from = self.state.stage();
                let to = next.stage();
                let timestamp = self.details.clock.now();
                self.history = self.history.record(StateTransition {
                    from,
                    to,
                    action: action.to_string(),
                    timestamp,
                });
                self.details.note(format!("entered {to}"));
                tracing::debug!(machine = "hotel", from = from.name(), to = to.name(), action, "transition");
                self.state = next;
                Ok(())
            }
            Err(error) => {
                tracing::warn!(machine = "hotel", stage = %self.state.stage(), action, %error, "action refused");
                Err(error)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::Transcript;
    use crate::hotel::{FlatRate, RateTable};

    fn booking() -> HotelBooking<Transcript> {
        let rates = RateTable::new(Amount::from_units(5000)).with_rate("101", Amount::from_units(3000));
        HotelBooking::new(Arc::new(rates), Transcript::new())
    }

    fn units(n: i64) -> Amount {
        Amount::from_units(n)
    }

    #[test]
    fn happy_path_with_discount_and_change() {
        let mut booking = booking();
        booking.select_room("101").unwrap();
        booking.confirm().unwrap();
        assert_eq!(booking.details().total(), units(3000));

        booking.apply_discount(DiscountTier::Seasonal).unwrap();
        assert_eq!(booking.details().amount_due(), units(2400));

        booking.pay(units(2500)).unwrap();
        assert_eq!(booking.stage(), HotelStage::Paid);
        assert!(booking.stage().is_final());
        assert_eq!(booking.details().paid(), units(2400));
        assert!(booking.feedback().contains("Change: 100.00"));
        assert!(booking.feedback().contains("Discount applied: 20%"));
    }

    #[test]
    fn underpayment_is_refused_and_keeps_stage() {
        let mut booking = booking();
        booking.select_room("404").unwrap();
        booking.confirm().unwrap();

        assert_eq!(
            booking.pay(units(4999)),
            Err(BookingError::InsufficientPayment {
                required: units(5000),
                offered: units(4999)
            })
        );
        assert_eq!(booking.stage(), HotelStage::Confirmed);
    }

    #[test]
    fn discount_only_after_confirmation() {
        let mut booking = booking();
        assert!(matches!(
            booking.apply_discount(DiscountTier::Vip),
            Err(BookingError::NotAllowed { stage: HotelStage::Idle, .. })
        ));

        booking.select_room("101").unwrap();
        assert!(booking.apply_discount(DiscountTier::Vip).is_err());
        assert_eq!(booking.details().discount(), None);
    }

    #[test]
    fn later_discount_replaces_earlier() {
        let mut booking = booking();
        booking.select_room("101").unwrap();
        booking.confirm().unwrap();
        booking.apply_discount(DiscountTier::FirstVisit).unwrap();
        booking.apply_discount(DiscountTier::Regular).unwrap();

        assert_eq!(booking.details().amount_due(), units(2700));
    }

    #[test]
    fn change_room_only_before_confirmation() {
        let mut booking = booking();
        booking.select_room("101").unwrap();
        booking.select_room("102").unwrap();
        assert_eq!(booking.details().room(), Some("101"));

        booking.change_room("205").unwrap();
        assert_eq!(booking.details().room(), Some("205"));
        assert!(booking.journal().mentions("101 -> 205"));

        booking.confirm().unwrap();
        assert!(booking.change_room("301").is_err());
        assert_eq!(booking.details().room(), Some("205"));
    }

    #[test]
    fn blank_room_is_rejected() {
        let mut booking = booking();
        assert_eq!(booking.select_room("  "), Err(BookingError::BlankRoom));
        assert_eq!(booking.stage(), HotelStage::Idle);
    }

    #[test]
    fn cancel_after_confirmation_clears_details() {
        let mut booking = booking();
        booking.select_room("101").unwrap();
        booking.confirm().unwrap();
        booking.apply_discount(DiscountTier::Vip).unwrap();
        booking.cancel().unwrap();

        assert_eq!(booking.stage(), HotelStage::Cancelled);
        assert_eq!(booking.details().room(), None);
        assert_eq!(booking.details().total(), Amount::ZERO);
        assert_eq!(booking.details().discount(), None);

        booking.cancel().unwrap();
        assert_eq!(booking.feedback().last(), Some("Booking is already cancelled."));
        assert!(booking.pay(units(1)).is_err());
    }

    #[test]
    fn paid_booking_cannot_be_cancelled() {
        let mut booking = HotelBooking::new(Arc::new(FlatRate(units(100))), Transcript::new());
        booking.select_room("7").unwrap();
        booking.confirm().unwrap();
        booking.pay(units(100)).unwrap();

        assert!(matches!(
            booking.cancel(),
            Err(BookingError::NotAllowed { action: "cancel", .. })
        ));
        booking.pay(units(100)).unwrap();
        assert_eq!(booking.feedback().last(), Some("Booking is already paid."));
        assert_eq!(booking.details().paid(), units(100));
    }

    #[test]
    fn idle_cancel_is_informational() {
        let mut booking = booking();
        booking.cancel().unwrap();
        assert_eq!(booking.stage(), HotelStage::Idle);
        assert!(booking.history().is_empty());
    }

    #[test]
    fn history_records_each_stage() {
        let mut booking = booking();
        booking.select_room("101").unwrap();
        booking.confirm().unwrap();
        booking.pay(units(3000)).unwrap();

        let path: Vec<_> = booking.history().get_path().into_iter().copied().collect();
        assert_eq!(
            path,
            vec![
                HotelStage::Idle,
                HotelStage::RoomSelected,
                HotelStage::Confirmed,
                HotelStage::Paid
            ]
        );
        assert!(booking.summary().iter().any(|l| l == "Stage: Paid"));
    }
}
