//! Hotel room booking.
//!
//! `Idle -> RoomSelected -> Confirmed -> Paid`, with `Cancelled` reachable
//! until payment. Prices come from an injected [`RoomRates`] strategy and
//! discounts can be applied between confirmation and payment.

mod booking;
mod discount;
mod error;
mod rates;
mod states;

pub use booking::{BookingDetails, HotelBooking};
pub use discount::DiscountTier;
pub use error::BookingError;
pub use rates::{FlatRate, RateTable, RoomRates};
pub use states::{HotelBookingState, HotelStage, HotelStep};
