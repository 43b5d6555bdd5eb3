//! Observer pattern: a synchronous weather station and an async currency
//! exchange.

pub mod exchange;
pub mod weather;

pub use exchange::{
    AnalyticsBoard, CurrencyExchange, CurrencyPair, EmailAlerts, ExchangeError, MobileApp,
    RateChange, RateObserver, RateUpdate, TradeSignal, TradingBot,
};
pub use weather::{
    EmailNotifier, SoundAlarm, TemperatureObserver, WeatherDisplay, WeatherError, WeatherStation,
};
