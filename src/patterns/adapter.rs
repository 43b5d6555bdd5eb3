//! Adapter pattern: third-party payment services behind one interface.
//!
//! Each vendor SDK below has its own call shape and result type. The
//! adapters translate them to [`PaymentProcessor`], so the store never
//! sees vendor types.

use crate::feedback::Feedback;
use crate::money::Amount;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProcessorError {
    #[error("amount must be positive, got {0}")]
    NonPositive(Amount),

    #[error("{processor} declined the payment: {reason}")]
    Declined { processor: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    #[error("no payment processor at index {0}")]
    UnknownProcessor(usize),

    #[error(transparent)]
    Payment(#[from] ProcessorError),
}

/// Proof of a successful charge.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Receipt {
    pub processor: String,
    pub amount: Amount,
    pub reference: String,
}

/// The interface the store is written against.
pub trait PaymentProcessor: Send + Sync {
    fn name(&self) -> String;

    fn process(&self, amount: Amount, out: &mut dyn Feedback) -> Result<Receipt, ProcessorError>;
}

fn ensure_positive(amount: Amount) -> Result<(), ProcessorError> {
    if amount.is_positive() {
        Ok(())
    } else {
        Err(ProcessorError::NonPositive(amount))
    }
}

fn declined(processor: String, reason: impl Into<String>) -> ProcessorError {
    ProcessorError::Declined {
        processor,
        reason: reason.into(),
    }
}

/// Native processor; implements the interface directly.
pub struct PayPalProcessor {
    account: String,
}

impl PayPalProcessor {
    pub const LIMIT: Amount = Amount::from_units(10_000);

    pub fn new(account: impl Into<String>) -> Self {
        Self {
            account: account.into(),
        }
    }
}

impl PaymentProcessor for PayPalProcessor {
    fn name(&self) -> String {
        "PayPal".to_string()
    }

    fn process(&self, amount: Amount, out: &mut dyn Feedback) -> Result<Receipt, ProcessorError> {
        ensure_positive(amount)?;
        out.say(&format!("PayPal: charging {amount} to {}", self.account));
        if amount > Self::LIMIT {
            return Err(declined(self.name(), format!("over the {} limit", Self::LIMIT)));
        }
        Ok(Receipt {
            processor: self.name(),
            amount,
            reference: format!("PP-{}", self.account),
        })
    }
}

// ---- vendor SDKs --------------------------------------------------------

/// Stripe works in integer cents and returns a charge id.
pub struct StripeService {
    #[allow(dead_code)]
    api_key: String,
    merchant_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StripeDecline {
    pub code: &'static str,
}

impl StripeService {
    pub const LIMIT_CENTS: i64 = 500_000;

    pub fn new(api_key: impl Into<String>, merchant_id: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            merchant_id: merchant_id.into(),
        }
    }

    pub fn make_transaction(&self, total_cents: i64) -> Result<String, StripeDecline> {
        if total_cents <= 0 {
            return Err(StripeDecline { code: "invalid_amount" });
        }
        if total_cents > Self::LIMIT_CENTS {
            return Err(StripeDecline { code: "amount_too_large" });
        }
        Ok(format!("ch_{}_{total_cents}", self.merchant_id))
    }

    pub fn service_info(&self) -> &'static str {
        "Stripe Payment Service"
    }
}

/// Square takes a currency and reports a status object.
pub struct SquareService {
    location_id: String,
    #[allow(dead_code)]
    access_token: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SquareStatus {
    Completed,
    Failed,
}

impl SquareService {
    pub const LIMIT: Amount = Amount::from_units(3_000);

    pub fn new(location_id: impl Into<String>, access_token: impl Into<String>) -> Self {
        Self {
            location_id: location_id.into(),
            access_token: access_token.into(),
        }
    }

    pub fn create_payment(&self, amount: Amount, currency: &str) -> (SquareStatus, String) {
        let status = if amount.is_positive() && amount <= Self::LIMIT {
            SquareStatus::Completed
        } else {
            SquareStatus::Failed
        };
        (status, format!("sq-{}-{currency}", self.location_id))
    }

    pub fn service_details(&self) -> &'static str {
        "Square Payment Platform"
    }
}

/// CryptoPay converts fiat at a fixed rate and returns the coins sent.
pub struct CryptoPayService {
    wallet: String,
    coin: String,
}

impl CryptoPayService {
    pub const LIMIT: f64 = 1_000.0;
    /// Fiat units per coin.
    pub const RATE: f64 = 50_000.0;

    pub fn new(wallet: impl Into<String>, coin: impl Into<String>) -> Self {
        Self {
            wallet: wallet.into(),
            coin: coin.into().to_uppercase(),
        }
    }

    pub fn execute_transfer(&self, fiat: f64, _currency: &str) -> Option<f64> {
        (fiat > 0.0 && fiat <= Self::LIMIT).then(|| fiat / Self::RATE)
    }

    pub fn service_name(&self) -> String {
        format!("CryptoPay ({})", self.coin)
    }
}

// ---- adapters -----------------------------------------------------------

pub struct StripeAdapter(pub StripeService);

impl PaymentProcessor for StripeAdapter {
    fn name(&self) -> String {
        self.0.service_info().to_string()
    }

    fn process(&self, amount: Amount, out: &mut dyn Feedback) -> Result<Receipt, ProcessorError> {
        ensure_positive(amount)?;
        // Sub-cent fractions are rounded away by the conversion.
        let cents = (amount.micros() + 5_000) / 10_000;
        out.say(&format!("Stripe: transaction of {amount} for {}", self.0.merchant_id));
        let charge = self
            .0
            .make_transaction(cents)
            .map_err(|decline| declined(self.name(), decline.code))?;
        Ok(Receipt {
            processor: self.name(),
            amount,
            reference: charge,
        })
    }
}

pub struct SquareAdapter(pub SquareService);

impl PaymentProcessor for SquareAdapter {
    fn name(&self) -> String {
        self.0.service_details().to_string()
    }

    fn process(&self, amount: Amount, out: &mut dyn Feedback) -> Result<Receipt, ProcessorError> {
        ensure_positive(amount)?;
        out.say(&format!("Square: payment of {amount} USD at {}", self.0.location_id));
        match self.0.create_payment(amount, "USD") {
            (SquareStatus::Completed, reference) => Ok(Receipt {
                processor: self.name(),
                amount,
                reference,
            }),
            (SquareStatus::Failed, _) => Err(declined(self.name(), "payment could not be created")),
        }
    }
}

pub struct CryptoPayAdapter(pub CryptoPayService);

impl PaymentProcessor for CryptoPayAdapter {
    fn name(&self) -> String {
        self.0.service_name()
    }

    fn process(&self, amount: Amount, out: &mut dyn Feedback) -> Result<Receipt, ProcessorError> {
        ensure_positive(amount)?;
        let coins = self
            .0
            .execute_transfer(amount.to_f64(), "USD")
            .ok_or_else(|| declined(self.name(), "transfer rejected"))?;
        out.say(&format!("CryptoPay: sent {coins:.6} {} to {}", self.0.coin, self.0.wallet));
        Ok(Receipt {
            processor: self.name(),
            amount,
            reference: format!("{coins:.6} {}", self.0.coin),
        })
    }
}

/// Builds processors without exposing which ones are adapters.
pub struct ProcessorFactory;

impl ProcessorFactory {
    pub fn paypal(account: &str) -> Box<dyn PaymentProcessor> {
        Box::new(PayPalProcessor::new(account))
    }

    pub fn stripe(api_key: &str, merchant_id: &str) -> Box<dyn PaymentProcessor> {
        Box::new(StripeAdapter(StripeService::new(api_key, merchant_id)))
    }

    pub fn square(location_id: &str, access_token: &str) -> Box<dyn PaymentProcessor> {
        Box::new(SquareAdapter(SquareService::new(location_id, access_token)))
    }

    pub fn crypto(wallet: &str, coin: &str) -> Box<dyn PaymentProcessor> {
        Box::new(CryptoPayAdapter(CryptoPayService::new(wallet, coin)))
    }
}

/// Checkout that picks a processor by position.
#[derive(Default)]
pub struct OnlineStore {
    processors: Vec<Box<dyn PaymentProcessor>>,
}

impl OnlineStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// One processor of each kind: PayPal, Stripe, Square, CryptoPay.
    pub fn demo() -> Self {
        Self::new()
            .with(ProcessorFactory::paypal("shop@example.com"))
            .with(ProcessorFactory::stripe("sk_test_123456", "merchant_demo"))
            .with(ProcessorFactory::square("loc_demo", "sq0atp-demo"))
            .with(ProcessorFactory::crypto("1A1zP1eP5QGefi2DMPTfTL5SLmv7DivfNa", "btc"))
    }

    pub fn with(mut self, processor: Box<dyn PaymentProcessor>) -> Self {
        self.processors.push(processor);
        self
    }

    pub fn processors(&self) -> Vec<String> {
        self.processors.iter().map(|p| p.name()).collect()
    }

    pub fn process_order(
        &self,
        customer: &str,
        amount: Amount,
        processor: usize,
        out: &mut dyn Feedback,
    ) -> Result<Receipt, StoreError> {
        let chosen = self
            .processors
            .get(processor)
            .ok_or(StoreError::UnknownProcessor(processor))?;
        out.say(&format!("Order for {customer}: {amount} via {}", chosen.name()));
        match chosen.process(amount, out) {
            Ok(receipt) => {
                tracing::info!(%customer, %amount, processor = %receipt.processor, "order paid");
                Ok(receipt)
            }
            Err(error) => {
                tracing::warn!(%customer, %amount, %error, "order payment failed");
                Err(error.into())
            }
        }
    }
}
