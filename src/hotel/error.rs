//! Hotel booking errors.

use super::states::HotelStage;
use crate::money::Amount;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BookingError {
    #[error("cannot {action} while {stage}: {hint}")]
    NotAllowed {
        action: &'static str,
        stage: HotelStage,
        hint: &'static str,
    },

    #[error("insufficient payment: {required} required, {offered} offered")]
    InsufficientPayment { required: Amount, offered: Amount },

    #[error("room number must not be blank")]
    BlankRoom,
}
