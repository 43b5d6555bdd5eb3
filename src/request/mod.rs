//! Ticket booking requests with a payment deadline.
//!
//! `Created -> WaitingForPayment -> Paid -> Confirmed`. Sending a request
//! starts a payment window (five minutes by default); the deadline is only
//! checked when someone tries to pay.

mod error;
mod request;
mod states;

pub use error::RequestError;
pub use request::{BookingRequest, RequestDetails, RequestOptions, DEFAULT_PAYMENT_WINDOW_SECS};
pub use states::{BookingRequestState, RequestStage, RequestStep};
