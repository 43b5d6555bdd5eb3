//! Currency exchange fan-out under a real tokio runtime.

use patternworks::money::Amount;
use patternworks::patterns::observer::{
    AnalyticsBoard, CurrencyExchange, EmailAlerts, MobileApp, RateObserver, RateUpdate,
    TradeSignal, TradingBot,
};
use std::sync::Arc;

fn rate(text: &str) -> Amount {
    text.parse().unwrap()
}

#[tokio::test]
async fn every_observer_hears_a_change_in_registration_order() {
    let mut exchange = CurrencyExchange::with_default_rates("central");
    let app = Arc::new(MobileApp::new("pocket"));
    let mail = Arc::new(EmailAlerts::new("desk@example.com"));
    let bot = Arc::new(TradingBot::new("alpha"));
    let board = Arc::new(AnalyticsBoard::new("wall"));
    assert!(exchange.register(app.clone()));
    assert!(exchange.register(mail.clone()));
    assert!(exchange.register(bot.clone()));
    assert!(exchange.register(board.clone()));

    let update = exchange.update_rate("usd/rub", rate("96")).await.unwrap();
    let RateUpdate::Changed { change, notifications } = update else {
        panic!("expected a change, got {update:?}");
    };

    assert!(change.is_rise());
    assert!(notifications[0].starts_with("[pocket]"));
    assert!(notifications.iter().any(|l| l.starts_with("mail to desk@example.com")));
    assert!(notifications.iter().any(|l| l == "[alpha] SELL USD/RUB at 96.0000"));
    assert!(notifications.last().unwrap().starts_with("[wall]"));

    assert_eq!(app.received().len(), 1);
    assert_eq!(mail.sent().len(), 1);
    assert_eq!(bot.actions()[0].1, TradeSignal::Sell);
    assert_eq!(board.history().len(), 1);
}

#[tokio::test]
async fn new_pairs_and_repeated_rates_stay_quiet() {
    let mut exchange = CurrencyExchange::with_default_rates("central");
    let app = Arc::new(MobileApp::new("pocket"));
    exchange.register(app.clone());

    assert!(matches!(
        exchange.update_rate("JPY/RUB", rate("0.62")).await,
        Ok(RateUpdate::Added)
    ));
    assert!(matches!(
        exchange.update_rate("USD/RUB", rate("92.5")).await,
        Ok(RateUpdate::Unchanged)
    ));
    assert!(exchange.update_rate("USD/RUB", Amount::ZERO).await.is_err());
    assert!(exchange.update_rate("USDRUB", rate("93")).await.is_err());

    assert!(app.received().is_empty());
    assert_eq!(exchange.rate("JPY/RUB"), Some(rate("0.62")));
}

#[tokio::test]
async fn removed_observers_are_not_notified() {
    let mut exchange = CurrencyExchange::with_default_rates("central");
    let app = Arc::new(MobileApp::new("pocket"));
    exchange.register(app.clone());
    assert!(!exchange.register(app.clone()));

    assert!(exchange.remove(&app.name()));
    exchange.update_rate("EUR/RUB", rate("97")).await.unwrap();

    assert!(app.received().is_empty());
    assert!(exchange.subscribers().is_empty());
}
