//! Currency exchange with asynchronous subscribers.
//!
//! A rate change is fanned out to every subscriber at once with
//! [`join_all`]; notifications come back in registration order no matter
//! which observer finishes first.

use crate::clock::{Clock, SystemClock};
use crate::money::Amount;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, Mutex, PoisonError};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ExchangeError {
    #[error("currency pair must not be blank")]
    BlankPair,

    #[error("'{0}' is not a BASE/QUOTE currency pair")]
    MalformedPair(String),

    #[error("exchange rate must be positive, got {0}")]
    NonPositiveRate(Amount),
}

/// `BASE/QUOTE`, stored uppercase.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CurrencyPair {
    pub base: String,
    pub quote: String,
}

impl CurrencyPair {
    pub fn new(base: &str, quote: &str) -> Self {
        Self {
            base: base.trim().to_uppercase(),
            quote: quote.trim().to_uppercase(),
        }
    }
}

impl FromStr for CurrencyPair {
    type Err = ExchangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(ExchangeError::BlankPair);
        }
        match s.split_once('/') {
            Some((base, quote))
                if !base.trim().is_empty() && !quote.trim().is_empty() && !quote.contains('/') =>
            {
                Ok(Self::new(base, quote))
            }
            _ => Err(ExchangeError::MalformedPair(s.to_string())),
        }
    }
}

impl fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

/// One published rate move.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RateChange {
    pub pair: CurrencyPair,
    pub rate: Amount,
    pub previous: Amount,
    pub change_percent: f64,
    pub at: DateTime<Utc>,
}

impl RateChange {
    pub fn is_rise(&self) -> bool {
        self.change_percent >= 0.0
    }
}

impl fmt::Display for RateChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let trend = if self.is_rise() { "up" } else { "down" };
        write!(
            f,
            "{} {:.4} ({trend} {:.2}%)",
            self.pair,
            self.rate,
            self.change_percent.abs()
        )
    }
}

/// Subscriber to rate changes.
#[async_trait]
pub trait RateObserver: Send + Sync {
    fn name(&self) -> String;

    /// React to a change; returns the lines to show the user.
    async fn on_rate_change(&self, change: &RateChange) -> Vec<String>;
}

/// What `update_rate` did.
#[derive(Debug, Clone, PartialEq)]
pub enum RateUpdate {
    /// First quote for the pair; nobody is notified.
    Added,
    /// Same rate as before; nobody is notified.
    Unchanged,
    Changed {
        change: RateChange,
        /// Observer lines, in registration order.
        notifications: Vec<String>,
    },
}

pub struct CurrencyExchange {
    name: String,
    rates: BTreeMap<CurrencyPair, Amount>,
    previous: BTreeMap<CurrencyPair, Amount>,
    observers: Vec<Arc<dyn RateObserver>>,
    clock: Arc<dyn Clock>,
}

impl CurrencyExchange {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_clock(name, Arc::new(SystemClock))
    }

    /// Exchange whose rate changes are stamped by `clock`.
    pub fn with_clock(name: impl Into<String>, clock: Arc<dyn Clock>) -> Self {
        Self {
            name: name.into(),
            rates: BTreeMap::new(),
            previous: BTreeMap::new(),
            observers: Vec::new(),
            clock,
        }
    }

    /// Exchange seeded with USD/RUB, EUR/RUB, USD/EUR, GBP/RUB and CNY/RUB.
    pub fn with_default_rates(name: impl Into<String>) -> Self {
        Self::new(name).seeded()
    }

    /// Load the stock USD/RUB, EUR/RUB, USD/EUR, GBP/RUB and CNY/RUB quotes.
    pub fn seeded(mut self) -> Self {
        for (base, quote, micros) in [
            ("USD", "RUB", 92_500_000),
            ("EUR", "RUB", 99_800_000),
            ("USD", "EUR", 930_000),
            ("GBP", "RUB", 115_200_000),
            ("CNY", "RUB", 12_800_000),
        ] {
            let pair = CurrencyPair::new(base, quote);
            let rate = Amount::from_micros(micros);
            self.rates.insert(pair.clone(), rate);
            self.previous.insert(pair, rate);
        }
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Subscribe; `false` when an observer with the same name is present.
    pub fn register(&mut self, observer: Arc<dyn RateObserver>) -> bool {
        let name = observer.name();
        if self.observers.iter().any(|o| o.name() == name) {
            return false;
        }
        tracing::info!(exchange = %self.name, observer = %name, "observer subscribed");
        self.observers.push(observer);
        true
    }

    /// Unsubscribe by name.
    pub fn remove(&mut self, name: &str) -> bool {
        let before = self.observers.len();
        self.observers.retain(|o| o.name() != name);
        let removed = self.observers.len() != before;
        if removed {
            tracing::info!(exchange = %self.name, observer = %name, "observer unsubscribed");
        }
        removed
    }

    pub fn subscribers(&self) -> Vec<String> {
        self.observers.iter().map(|o| o.name()).collect()
    }

    pub fn rate(&self, pair: &str) -> Option<Amount> {
        let pair = pair.parse::<CurrencyPair>().ok()?;
        self.rates.get(&pair).copied()
    }

    /// Current rates with their change from the previous quote.
    pub fn rates(&self) -> Vec<(CurrencyPair, Amount, f64)> {
        self.rates
            .iter()
            .map(|(pair, rate)| {
                let previous = self.previous.get(pair).copied().unwrap_or(*rate);
                let change = Amount::change_percent(previous, *rate).unwrap_or(0.0);
                (pair.clone(), *rate, change)
            })
            .collect()
    }

    /// Publish a new rate and wait for every subscriber.
    pub async fn update_rate(&mut self, pair: &str, rate: Amount) -> Result<RateUpdate, ExchangeError> {
        let pair: CurrencyPair = pair.parse()?;
        if !rate.is_positive() {
            return Err(ExchangeError::NonPositiveRate(rate));
        }

        let Some(old) = self.rates.get(&pair).copied() else {
            tracing::info!(exchange = %self.name, %pair, %rate, "pair added");
            self.rates.insert(pair.clone(), rate);
            self.previous.insert(pair, rate);
            return Ok(RateUpdate::Added);
        };
        if old == rate {
            return Ok(RateUpdate::Unchanged);
        }

        self.previous.insert(pair.clone(), old);
        self.rates.insert(pair.clone(), rate);
        let change = RateChange {
            change_percent: Amount::change_percent(old, rate).unwrap_or(0.0),
            pair,
            rate,
            previous: old,
            at: self.clock.now(),
        };
        tracing::info!(
            exchange = %self.name,
            pair = %change.pair,
            from = %old,
            to = %rate,
            observers = self.observers.len(),
            "rate changed"
        );

        let notifications = join_all(self.observers.iter().map(|o| o.on_rate_change(&change)))
            .await
            .into_iter()
            .flatten()
            .collect();

        Ok(RateUpdate::Changed {
            change,
            notifications,
        })
    }
}

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Push notifications for a trading app.
pub struct MobileApp {
    app: String,
    received: Mutex<Vec<String>>,
}

impl MobileApp {
    pub fn new(app: impl Into<String>) -> Self {
        Self {
            app: app.into(),
            received: Mutex::new(Vec::new()),
        }
    }

    pub fn received(&self) -> Vec<String> {
        lock(&self.received).clone()
    }
}

#[async_trait]
impl RateObserver for MobileApp {
    fn name(&self) -> String {
        format!("mobile:{}", self.app)
    }

    async fn on_rate_change(&self, change: &RateChange) -> Vec<String> {
        lock(&self.received).push(format!("{} - {change}", change.at.format("%H:%M:%S")));

        let marker = if change.change_percent >= 1.0 {
            "surge"
        } else if change.change_percent <= -1.0 {
            "slide"
        } else {
            "tick"
        };
        let mut lines = vec![format!("[{}] {marker}: {change}", self.app)];
        if change.change_percent.abs() > 2.0 {
            lines.push(format!("[{}] significant move", self.app));
        }
        lines
    }
}

/// Mails a short report for every change.
pub struct EmailAlerts {
    address: String,
    sent: Mutex<Vec<String>>,
}

impl EmailAlerts {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            sent: Mutex::new(Vec::new()),
        }
    }

    /// Subjects of mails sent so far.
    pub fn sent(&self) -> Vec<String> {
        lock(&self.sent).clone()
    }
}

#[async_trait]
impl RateObserver for EmailAlerts {
    fn name(&self) -> String {
        format!("email:{}", self.address)
    }

    async fn on_rate_change(&self, change: &RateChange) -> Vec<String> {
        let subject = if change.change_percent.abs() > 1.0 {
            "IMPORTANT: significant rate change"
        } else {
            "Exchange rate update"
        };
        lock(&self.sent).push(format!("{} {}: {subject}", change.at.format("%Y-%m-%d"), change.pair));
        vec![
            format!("mail to {}: {subject}", self.address),
            format!(
                "  {} {:.4} -> {:.4} ({:+.2}%)",
                change.pair, change.previous, change.rate, change.change_percent
            ),
        ]
    }
}

/// Decision taken by the trading bot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum TradeSignal {
    Buy,
    Sell,
    Hold,
}

/// Buys at or below a floor and sells at or above a ceiling.
pub struct TradingBot {
    bot: String,
    rules: Mutex<BTreeMap<CurrencyPair, (Amount, Amount)>>,
    actions: Mutex<Vec<(CurrencyPair, TradeSignal, Amount)>>,
}

impl TradingBot {
    /// Bot with thresholds for USD/RUB, EUR/RUB and USD/EUR.
    pub fn new(bot: impl Into<String>) -> Self {
        let rules = [
            ("USD", "RUB", 90_000_000, 95_000_000),
            ("EUR", "RUB", 98_000_000, 102_000_000),
            ("USD", "EUR", 900_000, 960_000),
        ]
        .into_iter()
        .map(|(base, quote, buy, sell)| {
            (
                CurrencyPair::new(base, quote),
                (Amount::from_micros(buy), Amount::from_micros(sell)),
            )
        })
        .collect();
        Self {
            bot: bot.into(),
            rules: Mutex::new(rules),
            actions: Mutex::new(Vec::new()),
        }
    }

    pub fn set_rule(&self, pair: &str, buy_at: Amount, sell_at: Amount) -> Result<(), ExchangeError> {
        let pair = pair.parse()?;
        lock(&self.rules).insert(pair, (buy_at, sell_at));
        Ok(())
    }

    pub fn signal(&self, pair: &CurrencyPair, rate: Amount) -> Option<TradeSignal> {
        let (buy_at, sell_at) = *lock(&self.rules).get(pair)?;
        Some(if rate <= buy_at {
            TradeSignal::Buy
        } else if rate >= sell_at {
            TradeSignal::Sell
        } else {
            TradeSignal::Hold
        })
    }

    pub fn actions(&self) -> Vec<(CurrencyPair, TradeSignal, Amount)> {
        lock(&self.actions).clone()
    }
}

#[async_trait]
impl RateObserver for TradingBot {
    fn name(&self) -> String {
        format!("bot:{}", self.bot)
    }

    async fn on_rate_change(&self, change: &RateChange) -> Vec<String> {
        let Some(signal) = self.signal(&change.pair, change.rate) else {
            return Vec::new();
        };
        lock(&self.actions).push((change.pair.clone(), signal, change.rate));
        let verb = match signal {
            TradeSignal::Buy => "BUY",
            TradeSignal::Sell => "SELL",
            TradeSignal::Hold => "HOLD",
        };
        vec![format!("[{}] {verb} {} at {:.4}", self.bot, change.pair, change.rate)]
    }
}

/// Keeps every change and flags accelerating trends.
pub struct AnalyticsBoard {
    board: String,
    history: Mutex<Vec<RateChange>>,
}

impl AnalyticsBoard {
    pub fn new(board: impl Into<String>) -> Self {
        Self {
            board: board.into(),
            history: Mutex::new(Vec::new()),
        }
    }

    pub fn history(&self) -> Vec<RateChange> {
        lock(&self.history).clone()
    }
}

#[async_trait]
impl RateObserver for AnalyticsBoard {
    fn name(&self) -> String {
        format!("analytics:{}", self.board)
    }

    async fn on_rate_change(&self, change: &RateChange) -> Vec<String> {
        let mut history = lock(&self.history);
        history.push(change.clone());

        let magnitude = change.change_percent.abs();
        let level = if magnitude > 2.0 {
            "critical"
        } else if magnitude > 1.0 {
            "high"
        } else {
            "normal"
        };
        let trend = if change.is_rise() { "rise" } else { "fall" };
        let mut lines = vec![format!(
            "[{}] {level}: {} {trend} of {magnitude:.2}%",
            self.board, change.pair
        )];

        if let [.., before, last] = history.as_slice() {
            let acceleration = last.change_percent - before.change_percent;
            if acceleration.abs() > 0.5 {
                lines.push(format!("[{}] trend acceleration {acceleration:+.2}%", self.board));
            }
        }
        lines
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use chrono::TimeZone;

    fn amt(s: &str) -> Amount {
        s.parse().unwrap()
    }

    #[test]
    fn pairs_parse_case_insensitively() {
        let pair: CurrencyPair = " usd/rub ".parse().unwrap();
        assert_eq!(pair.to_string(), "USD/RUB");
        assert_eq!("".parse::<CurrencyPair>(), Err(ExchangeError::BlankPair));
        assert!(matches!("USDRUB".parse::<CurrencyPair>(), Err(ExchangeError::MalformedPair(_))));
        assert!(matches!("A/B/C".parse::<CurrencyPair>(), Err(ExchangeError::MalformedPair(_))));
    }

    #[test]
    fn trading_bot_signals() {
        let bot = TradingBot::new("alpha");
        let usd: CurrencyPair = "USD/RUB".parse().unwrap();
        assert_eq!(bot.signal(&usd, amt("89.5")), Some(TradeSignal::Buy));
        assert_eq!(bot.signal(&usd, amt("95")), Some(TradeSignal::Sell));
        assert_eq!(bot.signal(&usd, amt("93")), Some(TradeSignal::Hold));
        assert_eq!(bot.signal(&"GBP/RUB".parse().unwrap(), amt("100")), None);

        let eur = CurrencyPair::new("usd", "eur");
        assert_eq!(bot.signal(&eur, amt("0.9")), Some(TradeSignal::Buy));
        assert_eq!(bot.signal(&"EUR/RUB".parse().unwrap(), amt("102")), Some(TradeSignal::Sell));
    }

    #[tokio::test]
    async fn changes_are_stamped_by_the_exchange_clock() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        let clock = Arc::new(ManualClock::new(start));
        let mut exchange = CurrencyExchange::with_clock("MOEX", clock.clone()).seeded();
        let app = Arc::new(MobileApp::new("Pocket"));
        exchange.register(app.clone());

        clock.advance(chrono::Duration::minutes(15));
        let update = exchange.update_rate("USD/RUB", amt("94.8")).await.unwrap();

        match update {
            RateUpdate::Changed { change, .. } => {
                assert_eq!(change.at, start + chrono::Duration::minutes(15));
            }
            other => panic!("expected a change, got {other:?}"),
        }
        assert!(app.received()[0].starts_with("09:45:00 - USD/RUB"));
    }

    #[test]
    fn change_renders_with_trend() {
        let change = RateChange {
            pair: "USD/RUB".parse().unwrap(),
            rate: amt("94.8"),
            previous: amt("92.5"),
            change_percent: Amount::change_percent(amt("92.5"), amt("94.8")).unwrap(),
            at: Utc::now(),
        };
        assert_eq!(change.to_string(), "USD/RUB 94.8000 (up 2.49%)");
    }
}
