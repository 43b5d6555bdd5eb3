//! Synchronous weather station.

use crate::feedback::Feedback;
use thiserror::Error;

pub const MIN_CELSIUS: f64 = -100.0;
pub const MAX_CELSIUS: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum WeatherError {
    #[error("temperature {0}°C is outside -100..=100")]
    OutOfRange(f64),

    #[error("no observer named '{0}' is subscribed")]
    NotSubscribed(String),
}

/// Receives every accepted temperature reading.
pub trait TemperatureObserver {
    /// Unique name used for subscription bookkeeping.
    fn name(&self) -> &str;

    fn update(&mut self, celsius: f64, out: &mut dyn Feedback);
}

/// Subject holding the latest reading and its subscribers.
#[derive(Default)]
pub struct WeatherStation {
    temperature: f64,
    observers: Vec<Box<dyn TemperatureObserver>>,
}

impl WeatherStation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribe an observer. Returns `false` if the name is already taken.
    pub fn register(&mut self, observer: Box<dyn TemperatureObserver>, out: &mut dyn Feedback) -> bool {
        if self.observers.iter().any(|o| o.name() == observer.name()) {
            return false;
        }
        out.say(&format!("Observer '{}' registered.", observer.name()));
        self.observers.push(observer);
        true
    }

    /// Unsubscribe by name, handing the observer back.
    pub fn remove(
        &mut self,
        name: &str,
        out: &mut dyn Feedback,
    ) -> Result<Box<dyn TemperatureObserver>, WeatherError> {
        let index = self
            .observers
            .iter()
            .position(|o| o.name() == name)
            .ok_or_else(|| WeatherError::NotSubscribed(name.to_string()))?;
        out.say(&format!("Observer '{name}' removed."));
        Ok(self.observers.remove(index))
    }

    /// Store a new reading and notify every subscriber in registration order.
    pub fn set_temperature(&mut self, celsius: f64, out: &mut dyn Feedback) -> Result<(), WeatherError> {
        if !(MIN_CELSIUS..=MAX_CELSIUS).contains(&celsius) {
            return Err(WeatherError::OutOfRange(celsius));
        }
        out.say(&format!(
            "Station: temperature {}°C -> {}°C",
            self.temperature, celsius
        ));
        tracing::info!(from = self.temperature, to = celsius, observers = self.observers.len(), "temperature changed");
        self.temperature = celsius;
        self.notify(out);
        Ok(())
    }

    pub fn notify(&mut self, out: &mut dyn Feedback) {
        let celsius = self.temperature;
        for observer in &mut self.observers {
            observer.update(celsius, out);
        }
    }

    pub fn temperature(&self) -> f64 {
        self.temperature
    }

    pub fn subscribers(&self) -> Vec<&str> {
        self.observers.iter().map(|o| o.name()).collect()
    }
}

/// Screen that shows every reading, with heat and frost warnings.
#[derive(Debug, Clone)]
pub struct WeatherDisplay {
    name: String,
    shown: usize,
}

impl WeatherDisplay {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            shown: 0,
        }
    }

    pub fn shown(&self) -> usize {
        self.shown
    }
}

impl TemperatureObserver for WeatherDisplay {
    fn name(&self) -> &str {
        &self.name
    }

    fn update(&mut self, celsius: f64, out: &mut dyn Feedback) {
        self.shown += 1;
        out.say(&format!("{}: temperature update {celsius}°C", self.name));
        if celsius > 30.0 {
            out.say(&format!("  {}: warning, high temperature", self.name));
        } else if celsius < 0.0 {
            out.say(&format!("  {}: frost warning", self.name));
        }
    }
}

/// Mails every reading to one address.
#[derive(Debug, Clone)]
pub struct EmailNotifier {
    address: String,
}

impl EmailNotifier {
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            address: address.into(),
        }
    }
}

impl TemperatureObserver for EmailNotifier {
    fn name(&self) -> &str {
        &self.address
    }

    fn update(&mut self, celsius: f64, out: &mut dyn Feedback) {
        out.say(&format!(
            "Email sent to {}: temperature is now {celsius}°C",
            self.address
        ));
    }
}

/// Sounds only for critical readings: above 35°C or below -20°C.
#[derive(Debug, Clone, Default)]
pub struct SoundAlarm {
    triggered: usize,
}

impl SoundAlarm {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn triggered(&self) -> usize {
        self.triggered
    }

    pub fn is_critical(celsius: f64) -> bool {
        !(-20.0..=35.0).contains(&celsius)
    }
}

impl TemperatureObserver for SoundAlarm {
    fn name(&self) -> &str {
        "sound-alarm"
    }

    fn update(&mut self, celsius: f64, out: &mut dyn Feedback) {
        if Self::is_critical(celsius) {
            self.triggered += 1;
            out.say(&format!("ALARM: critical temperature {celsius}°C"));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::Transcript;

    fn station(out: &mut Transcript) -> WeatherStation {
        let mut station = WeatherStation::new();
        station.register(Box::new(WeatherDisplay::new("billboard")), out);
        station.register(Box::new(EmailNotifier::new("admin@weather.io")), out);
        station.register(Box::new(SoundAlarm::new()), out);
        out.clear();
        station
    }

    #[test]
    fn rejects_readings_outside_range() {
        let mut out = Transcript::new();
        let mut station = station(&mut out);

        assert_eq!(
            station.set_temperature(101.0, &mut out),
            Err(WeatherError::OutOfRange(101.0))
        );
        assert!(station.set_temperature(-100.0, &mut out).is_ok());
        assert_eq!(station.temperature(), -100.0);
    }

    #[test]
    fn observers_are_notified_in_order() {
        let mut out = Transcript::new();
        let mut station = station(&mut out);
        station.set_temperature(36.0, &mut out).unwrap();

        let lines = out.lines();
        assert!(lines[0].starts_with("Station"));
        assert!(lines[1].starts_with("billboard"));
        assert!(lines[2].contains("high temperature"));
        assert!(lines[3].starts_with("Email sent to admin@weather.io"));
        assert!(lines[4].starts_with("ALARM"));
    }

    #[test]
    fn alarm_stays_quiet_for_normal_readings() {
        let mut out = Transcript::new();
        let mut station = station(&mut out);
        station.set_temperature(20.0, &mut out).unwrap();
        assert!(!out.contains("ALARM"));
        assert!(SoundAlarm::is_critical(-25.0));
    }

    #[test]
    fn duplicate_names_are_ignored() {
        let mut out = Transcript::new();
        let mut station = station(&mut out);
        assert!(!station.register(Box::new(WeatherDisplay::new("billboard")), &mut out));
        assert_eq!(station.subscribers().len(), 3);
    }

    #[test]
    fn removed_observers_stop_receiving() {
        let mut out = Transcript::new();
        let mut station = station(&mut out);
        station.remove("billboard", &mut out).unwrap();
        out.clear();

        station.set_temperature(-5.0, &mut out).unwrap();
        assert!(!out.contains("billboard"));
        assert!(matches!(
            station.remove("ghost", &mut out),
            Err(WeatherError::NotSubscribed(_))
        ));
    }
}
