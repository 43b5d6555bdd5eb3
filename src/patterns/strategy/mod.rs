//! Strategy pattern: interchangeable shipping tariffs and payment methods.

pub mod payment;
pub mod shipping;

pub use payment::{
    BankTransfer, CreditCard, Crypto, PayPal, PaymentContext, PaymentError, PaymentStrategy,
    SetupError,
};
pub use shipping::{
    DeliveryContext, ExpressShipping, InternationalShipping, OvernightShipping, Parcel,
    ParcelProblem, ShippingError, ShippingMethod, ShippingStrategy, StandardShipping, Tariff,
};
