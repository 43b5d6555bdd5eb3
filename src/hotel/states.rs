//! Stage handlers of the hotel booking.

use super::booking::BookingDetails;
use super::discount::DiscountTier;
use super::error::BookingError;
use crate::core::Step;
use crate::feedback::Feedback;
use crate::money::Amount;

state_enum! {
    pub enum HotelStage {
        Idle,
        RoomSelected,
        Confirmed,
        Paid,
        Cancelled,
    }
    final: [Paid, Cancelled]
    error: [Cancelled]
}

pub type HotelStep = Step<dyn HotelBookingState>;

/// Behavior of one booking stage.
pub trait HotelBookingState: Send + Sync {
    fn stage(&self) -> HotelStage;

    fn select_room(
        &self,
        ctx: &mut BookingDetails,
        out: &mut dyn Feedback,
        room: &str,
    ) -> Result<HotelStep, BookingError>;

    fn change_room(
        &self,
        ctx: &mut BookingDetails,
        out: &mut dyn Feedback,
        room: &str,
    ) -> Result<HotelStep, BookingError>;

    fn confirm(&self, ctx: &mut BookingDetails, out: &mut dyn Feedback)
        -> Result<HotelStep, BookingError>;

    fn pay(
        &self,
        ctx: &mut BookingDetails,
        out: &mut dyn Feedback,
        amount: Amount,
    ) -> Result<HotelStep, BookingError>;

    fn cancel(&self, ctx: &mut BookingDetails, out: &mut dyn Feedback)
        -> Result<HotelStep, BookingError>;

    fn apply_discount(
        &self,
        ctx: &mut BookingDetails,
        out: &mut dyn Feedback,
        tier: DiscountTier,
    ) -> Result<HotelStep, BookingError>;
}

fn refuse(
    stage: HotelStage,
    action: &'static str,
    hint: &'static str,
) -> Result<HotelStep, BookingError> {
    Err(BookingError::NotAllowed {
        action,
        stage,
        hint,
    })
}

fn stay_with(out: &mut dyn Feedback, line: &str) -> Result<HotelStep, BookingError> {
    out.say(line);
    Ok(Step::Stay)
}

/// No room chosen yet.
#[derive(Debug, Clone, Copy)]
pub struct Idle;

impl HotelBookingState for Idle {
    fn stage(&self) -> HotelStage {
        HotelStage::Idle
    }

    fn select_room(
        &self,
        ctx: &mut BookingDetails,
        out: &mut dyn Feedback,
        room: &str,
    ) -> Result<HotelStep, BookingError> {
        let room = room.trim();
        if room.is_empty() {
            return Err(BookingError::BlankRoom);
        }
        out.say(&format!("Room {room} selected."));
        ctx.note(format!("room {room} selected"));
        ctx.room = Some(room.to_string());
        Ok(Step::Enter(Box::new(RoomSelected)))
    }

    fn change_room(
        &self,
        _ctx: &mut BookingDetails,
        _out: &mut dyn Feedback,
        _room: &str,
    ) -> Result<HotelStep, BookingError> {
        refuse(self.stage(), "change room", "select a room first")
    }

    fn confirm(
        &self,
        _ctx: &mut BookingDetails,
        _out: &mut dyn Feedback,
    ) -> Result<HotelStep, BookingError> {
        refuse(self.stage(), "confirm", "select a room first")
    }

    fn pay(
        &self,
        _ctx: &mut BookingDetails,
        _out: &mut dyn Feedback,
        _amount: Amount,
    ) -> Result<HotelStep, BookingError> {
        refuse(self.stage(), "pay", "select a room first")
    }

    fn cancel(
        &self,
        _ctx: &mut BookingDetails,
        out: &mut dyn Feedback,
    ) -> Result<HotelStep, BookingError> {
        stay_with(out, "No active booking to cancel.")
    }

    fn apply_discount(
        &self,
        _ctx: &mut BookingDetails,
        _out: &mut dyn Feedback,
        _tier: DiscountTier,
    ) -> Result<HotelStep, BookingError> {
        refuse(self.stage(), "apply a discount", "discounts apply after confirmation")
    }
}

/// A room is chosen but not confirmed.
#[derive(Debug, Clone, Copy)]
pub struct RoomSelected;

impl HotelBookingState for RoomSelected {
    fn stage(&self) -> HotelStage {
        HotelStage::RoomSelected
    }

    fn select_room(
        &self,
        _ctx: &mut BookingDetails,
        out: &mut dyn Feedback,
        _room: &str,
    ) -> Result<HotelStep, BookingError> {
        stay_with(out, "A room is already selected. Use change room instead.")
    }

    fn change_room(
        &self,
        ctx: &mut BookingDetails,
        out: &mut dyn Feedback,
        room: &str,
    ) -> Result<HotelStep, BookingError> {
        let room = room.trim();
        if room.is_empty() {
            return Err(BookingError::BlankRoom);
        }
        let previous = ctx.room.replace(room.to_string()).unwrap_or_default();
        out.say(&format!("Room changed from {previous} to {room}."));
        ctx.note(format!("room changed: {previous} -> {room}"));
        Ok(Step::Stay)
    }

    fn confirm(
        &self,
        ctx: &mut BookingDetails,
        out: &mut dyn Feedback,
    ) -> Result<HotelStep, BookingError> {
        let room = ctx.room.clone().unwrap_or_default();
        ctx.total = ctx.rates.quote(&room);
        out.say(&format!("Booking for room {room} confirmed. Total {}", ctx.total));
        ctx.note(format!("confirmed, total {}", ctx.total));
        Ok(Step::Enter(Box::new(Confirmed)))
    }

    fn pay(
        &self,
        _ctx: &mut BookingDetails,
        _out: &mut dyn Feedback,
        _amount: Amount,
    ) -> Result<HotelStep, BookingError> {
        refuse(self.stage(), "pay", "confirm the booking first")
    }

    fn cancel(
        &self,
        ctx: &mut BookingDetails,
        out: &mut dyn Feedback,
    ) -> Result<HotelStep, BookingError> {
        let room = ctx.room.take().unwrap_or_default();
        out.say(&format!("Booking for room {room} cancelled."));
        ctx.note("cancelled while selecting a room");
        Ok(Step::Enter(Box::new(Cancelled)))
    }

    fn apply_discount(
        &self,
        _ctx: &mut BookingDetails,
        _out: &mut dyn Feedback,
        _tier: DiscountTier,
    ) -> Result<HotelStep, BookingError> {
        refuse(self.stage(), "apply a discount", "discounts apply after confirmation")
    }
}

/// Confirmed and priced, awaiting payment.
#[derive(Debug, Clone, Copy)]
pub struct Confirmed;

impl HotelBookingState for Confirmed {
    fn stage(&self) -> HotelStage {
        HotelStage::Confirmed
    }

    fn select_room(
        &self,
        _ctx: &mut BookingDetails,
        _out: &mut dyn Feedback,
        _room: &str,
    ) -> Result<HotelStep, BookingError> {
        refuse(self.stage(), "select a room", "cancel this booking to choose another room")
    }

    fn change_room(
        &self,
        _ctx: &mut BookingDetails,
        _out: &mut dyn Feedback,
        _room: &str,
    ) -> Result<HotelStep, BookingError> {
        refuse(self.stage(), "change room", "cancel and start again")
    }

    fn confirm(
        &self,
        _ctx: &mut BookingDetails,
        out: &mut dyn Feedback,
    ) -> Result<HotelStep, BookingError> {
        stay_with(out, "Booking is already confirmed.")
    }

    fn pay(
        &self,
        ctx: &mut BookingDetails,
        out: &mut dyn Feedback,
        amount: Amount,
    ) -> Result<HotelStep, BookingError> {
        let due = ctx.amount_due();
        if amount < due {
            return Err(BookingError::InsufficientPayment {
                required: due,
                offered: amount,
            });
        }

        out.say(&format!("Payment accepted: {due}"));
        if let Some(tier) = ctx.discount {
            out.say(&format!("Discount applied: {}%", tier.percent()));
        }
        if amount > due {
            out.say(&format!("Change: {}", amount - due));
        }
        ctx.paid = due;
        ctx.note(format!("paid {due}"));
        Ok(Step::Enter(Box::new(Paid)))
    }

    fn cancel(
        &self,
        ctx: &mut BookingDetails,
        out: &mut dyn Feedback,
    ) -> Result<HotelStep, BookingError> {
        let room = ctx.room.take().unwrap_or_default();
        out.say(&format!("Booking for room {room} cancelled."));
        ctx.total = Amount::ZERO;
        ctx.discount = None;
        ctx.note("cancelled after confirmation, before payment");
        Ok(Step::Enter(Box::new(Cancelled)))
    }

    fn apply_discount(
        &self,
        ctx: &mut BookingDetails,
        out: &mut dyn Feedback,
        tier: DiscountTier,
    ) -> Result<HotelStep, BookingError> {
        ctx.discount = Some(tier);
        let due = ctx.amount_due();
        out.say(&format!("Discount {tier} applied."));
        out.say(&format!(
            "Original {}, now {}, saved {}",
            ctx.total,
            due,
            ctx.total - due
        ));
        ctx.note(format!("discount {}% applied", tier.percent()));
        Ok(Step::Stay)
    }
}

/// Paid in full. Final.
#[derive(Debug, Clone, Copy)]
pub struct Paid;

impl HotelBookingState for Paid {
    fn stage(&self) -> HotelStage {
        HotelStage::Paid
    }

    fn select_room(
        &self,
        _ctx: &mut BookingDetails,
        _out: &mut dyn Feedback,
        _room: &str,
    ) -> Result<HotelStep, BookingError> {
        refuse(self.stage(), "select a room", "the booking is already paid")
    }

    fn change_room(
        &self,
        _ctx: &mut BookingDetails,
        _out: &mut dyn Feedback,
        _room: &str,
    ) -> Result<HotelStep, BookingError> {
        refuse(self.stage(), "change room", "the booking is already paid")
    }

    fn confirm(
        &self,
        _ctx: &mut BookingDetails,
        out: &mut dyn Feedback,
    ) -> Result<HotelStep, BookingError> {
        stay_with(out, "Booking is already confirmed and paid.")
    }

    fn pay(
        &self,
        _ctx: &mut BookingDetails,
        out: &mut dyn Feedback,
        _amount: Amount,
    ) -> Result<HotelStep, BookingError> {
        stay_with(out, "Booking is already paid.")
    }

    fn cancel(
        &self,
        _ctx: &mut BookingDetails,
        _out: &mut dyn Feedback,
    ) -> Result<HotelStep, BookingError> {
        refuse(self.stage(), "cancel", "contact the front desk for a refund")
    }

    fn apply_discount(
        &self,
        _ctx: &mut BookingDetails,
        _out: &mut dyn Feedback,
        _tier: DiscountTier,
    ) -> Result<HotelStep, BookingError> {
        refuse(self.stage(), "apply a discount", "the booking is already paid")
    }
}

/// Cancelled. Final.
#[derive(Debug, Clone, Copy)]
pub struct Cancelled;

impl HotelBookingState for Cancelled {
    fn stage(&self) -> HotelStage {
        HotelStage::Cancelled
    }

    fn select_room(
        &self,
        _ctx: &mut BookingDetails,
        out: &mut dyn Feedback,
        _room: &str,
    ) -> Result<HotelStep, BookingError> {
        stay_with(out, "This booking was cancelled. Start a new booking.")
    }

    fn change_room(
        &self,
        _ctx: &mut BookingDetails,
        _out: &mut dyn Feedback,
        _room: &str,
    ) -> Result<HotelStep, BookingError> {
        refuse(self.stage(), "change room", "the booking was cancelled")
    }

    fn confirm(
        &self,
        _ctx: &mut BookingDetails,
        _out: &mut dyn Feedback,
    ) -> Result<HotelStep, BookingError> {
        refuse(self.stage(), "confirm", "the booking was cancelled")
    }

    fn pay(
        &self,
        _ctx: &mut BookingDetails,
        _out: &mut dyn Feedback,
        _amount: Amount,
    ) -> Result<HotelStep, BookingError> {
        refuse(self.stage(), "pay", "the booking was cancelled")
    }

    fn cancel(
        &self,
        _ctx: &mut BookingDetails,
        out: &mut dyn Feedback,
    ) -> Result<HotelStep, BookingError> {
        stay_with(out, "Booking is already cancelled.")
    }

    fn apply_discount(
        &self,
        _ctx: &mut BookingDetails,
        _out: &mut dyn Feedback,
        _tier: DiscountTier,
    ) -> Result<HotelStep, BookingError> {
        refuse(self.stage(), "apply a discount", "the booking was cancelled")
    }
}
