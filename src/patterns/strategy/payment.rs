//! Payment method strategies.
//!
//! Credentials are validated when a strategy is built, so a constructed
//! strategy is always usable; `process` only judges the amount.

use crate::feedback::Feedback;
use crate::money::Amount;
use thiserror::Error;

pub const CARD_LIMIT: Amount = Amount::from_units(10_000);
pub const CRYPTO_MINIMUM: Amount = Amount::from_cents(1);
pub const TRANSFER_REVIEW_THRESHOLD: Amount = Amount::from_units(50_000);

/// Rejected credentials.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SetupError {
    #[error("card number must have 16 digits")]
    CardNumber,
    #[error("card holder is required")]
    CardHolder,
    #[error("CVV must have 3 digits")]
    Cvv,
    #[error("card expiry date is required")]
    Expiry,
    #[error("'{0}' is not an email address")]
    Email(String),
    #[error("password must be at least 6 characters")]
    Password,
    #[error("wallet address must be at least 26 characters")]
    Wallet,
    #[error("crypto currency is required")]
    Currency,
    #[error("account number must be at least 5 characters")]
    Account,
    #[error("bank name is required")]
    Bank,
    #[error("recipient name is required")]
    Recipient,
}

/// Rejected payments.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaymentError {
    #[error("no payment method selected")]
    NoStrategy,
    #[error("payment amount must be positive, got {0}")]
    NonPositive(Amount),
    #[error("card payments are limited to {}", CARD_LIMIT)]
    OverCardLimit,
    #[error("PayPal authentication failed for {0}")]
    AuthenticationFailed(String),
    #[error("crypto payments must be at least {}", CRYPTO_MINIMUM)]
    BelowCryptoMinimum,
}

pub trait PaymentStrategy: Send + Sync {
    /// Masked description safe to show the user.
    fn details(&self) -> String;

    fn process(&self, amount: Amount, out: &mut dyn Feedback) -> Result<(), PaymentError>;
}

fn required(value: &str, error: SetupError) -> Result<String, SetupError> {
    let value = value.trim();
    if value.is_empty() {
        Err(error)
    } else {
        Ok(value.to_string())
    }
}

fn digits(value: &str, count: usize) -> bool {
    value.len() == count && value.chars().all(|c| c.is_ascii_digit())
}

/// Last `n` characters, or the whole string when it is short.
fn tail(value: &str, n: usize) -> &str {
    let start = value.char_indices().rev().nth(n.saturating_sub(1)).map_or(0, |(i, _)| i);
    &value[start..]
}

fn ensure_positive(amount: Amount) -> Result<(), PaymentError> {
    if amount.is_positive() {
        Ok(())
    } else {
        Err(PaymentError::NonPositive(amount))
    }
}

pub struct CreditCard {
    number: String,
    holder: String,
    // Held for the card network; never displayed.
    #[allow(dead_code)]
    cvv: String,
    expiry: String,
}

impl CreditCard {
    pub fn new(number: &str, holder: &str, cvv: &str, expiry: &str) -> Result<Self, SetupError> {
        let number: String = number.chars().filter(|c| !c.is_whitespace() && *c != '-').collect();
        if !digits(&number, 16) {
            return Err(SetupError::CardNumber);
        }
        let holder = required(holder, SetupError::CardHolder)?;
        if !digits(cvv.trim(), 3) {
            return Err(SetupError::Cvv);
        }
        let expiry = required(expiry, SetupError::Expiry)?;
        Ok(Self {
            number,
            holder,
            cvv: cvv.trim().to_string(),
            expiry,
        })
    }

    pub fn masked_number(&self) -> String {
        format!("****-****-****-{}", tail(&self.number, 4))
    }
}

impl PaymentStrategy for CreditCard {
    fn details(&self) -> String {
        format!("card {} ({}, expires {})", self.masked_number(), self.holder, self.expiry)
    }

    fn process(&self, amount: Amount, out: &mut dyn Feedback) -> Result<(), PaymentError> {
        ensure_positive(amount)?;
        if amount > CARD_LIMIT {
            return Err(PaymentError::OverCardLimit);
        }
        out.say(&format!("Charged {amount} to card {}", self.masked_number()));
        Ok(())
    }
}

pub struct PayPal {
    email: String,
    // Sent to the provider on login; never displayed.
    #[allow(dead_code)]
    password: String,
}

impl PayPal {
    pub fn new(email: &str, password: &str) -> Result<Self, SetupError> {
        let email = email.trim();
        if !email.contains('@') {
            return Err(SetupError::Email(email.to_string()));
        }
        if password.chars().count() < 6 {
            return Err(SetupError::Password);
        }
        Ok(Self {
            email: email.to_string(),
            password: password.to_string(),
        })
    }
}

impl PaymentStrategy for PayPal {
    fn details(&self) -> String {
        format!("PayPal account {}", self.email)
    }

    fn process(&self, amount: Amount, out: &mut dyn Feedback) -> Result<(), PaymentError> {
        ensure_positive(amount)?;
        out.say(&format!("Authenticating {}...", self.email));
        // Sandbox accounts are refused by the provider.
        if self.email.contains("test") {
            return Err(PaymentError::AuthenticationFailed(self.email.clone()));
        }
        out.say(&format!("Paid {amount} from PayPal account {}", self.email));
        Ok(())
    }
}

pub struct Crypto {
    wallet: String,
    currency: String,
}

impl Crypto {
    pub fn new(wallet: &str, currency: &str) -> Result<Self, SetupError> {
        let wallet = wallet.trim();
        if wallet.chars().count() < 26 {
            return Err(SetupError::Wallet);
        }
        let currency = required(currency, SetupError::Currency)?.to_uppercase();
        Ok(Self {
            wallet: wallet.to_string(),
            currency,
        })
    }

    /// Bitcoin wallet.
    pub fn btc(wallet: &str) -> Result<Self, SetupError> {
        Self::new(wallet, "BTC")
    }

    pub fn masked_wallet(&self) -> String {
        let head: String = self.wallet.chars().take(4).collect();
        format!("{head}...{}", tail(&self.wallet, 4))
    }
}

impl PaymentStrategy for Crypto {
    fn details(&self) -> String {
        format!("{} wallet {}", self.currency, self.masked_wallet())
    }

    fn process(&self, amount: Amount, out: &mut dyn Feedback) -> Result<(), PaymentError> {
        ensure_positive(amount)?;
        if amount < CRYPTO_MINIMUM {
            return Err(PaymentError::BelowCryptoMinimum);
        }
        out.say("Waiting for block confirmation...");
        out.say(&format!("Sent {amount} in {} to {}", self.currency, self.masked_wallet()));
        Ok(())
    }
}

pub struct BankTransfer {
    account: String,
    bank: String,
    recipient: String,
}

impl BankTransfer {
    pub fn new(account: &str, bank: &str, recipient: &str) -> Result<Self, SetupError> {
        let account = account.trim();
        if account.chars().count() < 5 {
            return Err(SetupError::Account);
        }
        Ok(Self {
            account: account.to_string(),
            bank: required(bank, SetupError::Bank)?,
            recipient: required(recipient, SetupError::Recipient)?,
        })
    }

    pub fn masked_account(&self) -> String {
        format!("**{}", tail(&self.account, 4))
    }
}

impl PaymentStrategy for BankTransfer {
    fn details(&self) -> String {
        format!(
            "bank transfer via {} to {} ({})",
            self.bank,
            self.masked_account(),
            self.recipient
        )
    }

    fn process(&self, amount: Amount, out: &mut dyn Feedback) -> Result<(), PaymentError> {
        ensure_positive(amount)?;
        if amount > TRANSFER_REVIEW_THRESHOLD {
            out.say("Large transfer: additional verification required");
            tracing::warn!(%amount, bank = %self.bank, "large transfer");
        }
        out.say(&format!("Transferred {amount} to {} at {}", self.masked_account(), self.bank));
        Ok(())
    }
}

/// Runs payments through the selected strategy.
#[derive(Default)]
pub struct PaymentContext {
    strategy: Option<Box<dyn PaymentStrategy>>,
}

impl PaymentContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_strategy(&mut self, strategy: Box<dyn PaymentStrategy>) {
        self.strategy = Some(strategy);
    }

    pub fn current_method(&self) -> String {
        self.strategy
            .as_ref()
            .map_or_else(|| "no payment method selected".to_string(), |s| s.details())
    }

    pub fn execute(&self, amount: Amount, out: &mut dyn Feedback) -> Result<(), PaymentError> {
        let strategy = self.strategy.as_ref().ok_or(PaymentError::NoStrategy)?;
        ensure_positive(amount)?;

        out.say(&format!("Paying {amount} with {}", strategy.details()));
        match strategy.process(amount, out) {
            Ok(()) => {
                tracing::info!(%amount, method = %strategy.details(), "payment completed");
                out.say("Payment completed.");
                Ok(())
            }
            Err(error) => {
                tracing::warn!(%amount, %error, "payment failed");
                out.say(&format!("Payment failed: {error}"));
                Err(error)
            }
        }
    }
}
