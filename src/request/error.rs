//! Booking request errors.

use super::states::RequestStage;
use crate::money::Amount;
use chrono::{DateTime, Duration, Utc};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("cannot {action} while {stage}: {hint}")]
    NotAllowed {
        action: &'static str,
        stage: RequestStage,
        hint: &'static str,
    },

    #[error("payment window closed at {}", deadline.format("%H:%M:%S"))]
    PaymentExpired { deadline: DateTime<Utc> },

    #[error("client name must not be blank")]
    BlankClient,

    #[error("ticket price must be positive, got {0}")]
    InvalidPrice(Amount),

    #[error("payment window of {window} cannot produce a deadline")]
    InvalidWindow { window: Duration },
}
