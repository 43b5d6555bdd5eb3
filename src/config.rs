//! TOML configuration for the machines.
//!
//! Every section is optional; missing sections fall back to the stock
//! demo data.
//!
//! ```toml
//! [[ticket.tickets]]
//! code = "Standard"
//! name = "Standard"
//! price = "100"
//!
//! [ticket.stock]
//! Standard = 10
//!
//! [hotel]
//! default_rate = "4500"
//!
//! [hotel.rates]
//! "101" = "3000"
//!
//! [booking]
//! payment_window_secs = 300
//! ```

use crate::money::Amount;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use thiserror::Error;

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// One ticket type offered by the vending machine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketSpec {
    pub code: String,
    pub name: String,
    pub price: Amount,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TicketConfig {
    pub tickets: Vec<TicketSpec>,
    /// Initial stock per ticket code
    pub stock: BTreeMap<String, u32>,
}

impl Default for TicketConfig {
    fn default() -> Self {
        Self {
            tickets: vec![
                TicketSpec {
                    code: "Child".into(),
                    name: "Child".into(),
                    price: Amount::from_units(50),
                },
                TicketSpec {
                    code: "Standard".into(),
                    name: "Standard".into(),
                    price: Amount::from_units(100),
                },
                TicketSpec {
                    code: "Student".into(),
                    name: "Student".into(),
                    price: Amount::from_units(90),
                },
            ],
            stock: BTreeMap::from([
                ("Standard".to_string(), 10),
                ("Student".to_string(), 5),
                ("Child".to_string(), 3),
            ]),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HotelConfig {
    /// Booking total for rooms without an explicit rate
    pub default_rate: Amount,
    pub rates: BTreeMap<String, Amount>,
}

impl Default for HotelConfig {
    fn default() -> Self {
        Self {
            default_rate: Amount::from_units(4500),
            rates: BTreeMap::from([
                ("101".to_string(), Amount::from_units(3000)),
                ("205".to_string(), Amount::from_units(6500)),
                ("301".to_string(), Amount::from_units(9500)),
            ]),
        }
    }
}

/// Longest payment window a configuration may ask for (30 days).
pub const MAX_PAYMENT_WINDOW_SECS: u64 = 30 * 24 * 60 * 60;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BookingConfig {
    /// Seconds a client has to pay once a request is sent
    pub payment_window_secs: u64,
}

impl Default for BookingConfig {
    fn default() -> Self {
        Self {
            payment_window_secs: 300,
        }
    }
}

impl BookingConfig {
    /// The window as a duration. Values past [`MAX_PAYMENT_WINDOW_SECS`]
    /// never pass [`PatternworksConfig::validate`] and are clamped here.
    pub fn payment_window(&self) -> chrono::Duration {
        let secs = self.payment_window_secs.min(MAX_PAYMENT_WINDOW_SECS);
        i64::try_from(secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .unwrap_or_else(chrono::Duration::zero)
    }
}

/// Top-level configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternworksConfig {
    pub ticket: TicketConfig,
    pub hotel: HotelConfig,
    pub booking: BookingConfig,
}

impl PatternworksConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: PatternworksConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::info!(path = %path.display(), tickets = config.ticket.tickets.len(), "configuration loaded");
        Ok(config)
    }

    /// Check every section, reporting all problems at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut checks: Vec<Validation<(), NonEmptyVec<String>>> = Vec::new();

        if self.ticket.tickets.is_empty() {
            checks.push(Validation::fail("ticket catalog is empty".to_string()));
        }

        let mut seen = BTreeSet::new();
        for spec in &self.ticket.tickets {
            let code = spec.code.trim();
            if code.is_empty() {
                checks.push(Validation::fail("ticket code must not be blank".to_string()));
            } else if !seen.insert(code.to_lowercase()) {
                checks.push(Validation::fail(format!("duplicate ticket code '{code}'")));
            }
            if !spec.price.is_positive() {
                checks.push(Validation::fail(format!(
                    "ticket '{}' must have a positive price",
                    spec.code
                )));
            }
        }

        for code in self.ticket.stock.keys() {
            if !seen.contains(&code.to_lowercase()) {
                checks.push(Validation::fail(format!(
                    "stock listed for unknown ticket '{code}'"
                )));
            }
        }

        if !self.hotel.default_rate.is_positive() {
            checks.push(Validation::fail("hotel default rate must be positive".to_string()));
        }
        for (room, rate) in &self.hotel.rates {
            if !rate.is_positive() {
                checks.push(Validation::fail(format!(
                    "rate for room '{room}' must be positive"
                )));
            }
        }

        if self.booking.payment_window_secs == 0 {
            checks.push(Validation::fail(
                "booking payment window must be at least one second".to_string(),
            ));
        } else if self.booking.payment_window_secs > MAX_PAYMENT_WINDOW_SECS {
            checks.push(Validation::fail(format!(
                "booking payment window must be at most {MAX_PAYMENT_WINDOW_SECS} seconds"
            )));
        }

        match Validation::all_vec(checks) {
            Validation::Success(_) => Ok(()),
            Validation::Failure(errors) => {
                Err(ConfigError::Invalid(errors.iter().cloned().collect()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_demo_seed() {
        let config = PatternworksConfig::default();
        assert!(config.validate().is_ok());

        let codes: Vec<_> = config.ticket.tickets.iter().map(|t| t.code.as_str()).collect();
        assert_eq!(codes, vec!["Child", "Standard", "Student"]);
        assert_eq!(config.ticket.stock["Standard"], 10);
        assert_eq!(config.ticket.stock["Student"], 5);
        assert_eq!(config.ticket.stock["Child"], 3);
        assert_eq!(config.booking.payment_window(), chrono::Duration::minutes(5));
    }

    #[test]
    fn empty_document_uses_defaults() {
        let config = PatternworksConfig::from_toml_str("").unwrap();
        assert_eq!(config, PatternworksConfig::default());
    }

    #[test]
    fn parses_sections() {
        let text = r#"
            [[ticket.tickets]]
            code = "Adult"
            name = "Adult"
            price = "12.50"

            [[ticket.tickets]]
            code = "Senior"
            name = "Senior"
            price = 8

            [ticket.stock]
            Adult = 4
            senior = 2

            [hotel]
            default_rate = 1000

            [booking]
            payment_window_secs = 60
        "#;

        let config = PatternworksConfig::from_toml_str(text).unwrap();
        assert_eq!(config.ticket.tickets.len(), 2);
        assert_eq!(config.ticket.tickets[0].price, "12.5".parse::<Amount>().unwrap());
        assert_eq!(config.ticket.tickets[1].price, Amount::from_units(8));
        assert_eq!(config.hotel.default_rate, Amount::from_units(1000));
        assert_eq!(config.booking.payment_window_secs, 60);
    }

    #[test]
    fn validation_reports_every_problem() {
        let text = r#"
            [[ticket.tickets]]
            code = "A"
            name = "A"
            price = 0

            [[ticket.tickets]]
            code = "a"
            name = "Again"
            price = 5

            [ticket.stock]
            Ghost = 1

            [booking]
            payment_window_secs = 9300000000000000
        "#;

        match PatternworksConfig::from_toml_str(text) {
            Err(ConfigError::Invalid(problems)) => {
                assert_eq!(problems.len(), 4, "{problems:?}");
                assert!(problems.iter().any(|p| p.contains("positive price")));
                assert!(problems.iter().any(|p| p.contains("duplicate")));
                assert!(problems.iter().any(|p| p.contains("Ghost")));
                assert!(problems.iter().any(|p| p.contains("payment window must be at most")));
            }
            other => panic!("expected invalid config, got {other:?}"),
        }
    }

    #[test]
    fn payment_window_must_be_within_bounds() {
        for secs in [MAX_PAYMENT_WINDOW_SECS + 1, 10_000_000_000_000, 9_300_000_000_000_000] {
            let text = format!("[booking]\npayment_window_secs = {secs}\n");
            match PatternworksConfig::from_toml_str(&text) {
                Err(ConfigError::Invalid(problems)) => {
                    assert_eq!(problems.len(), 1, "{problems:?}");
                    assert!(problems[0].contains("at most"), "{problems:?}");
                }
                other => panic!("expected invalid config for {secs}, got {other:?}"),
            }
        }

        let zero = PatternworksConfig::from_toml_str("[booking]\npayment_window_secs = 0\n");
        assert!(
            matches!(&zero, Err(ConfigError::Invalid(p)) if p[0].contains("at least one second")),
            "{zero:?}"
        );

        let edge = format!("[booking]\npayment_window_secs = {MAX_PAYMENT_WINDOW_SECS}\n");
        let config = PatternworksConfig::from_toml_str(&edge).unwrap();
        assert_eq!(config.booking.payment_window(), chrono::Duration::days(30));
    }

    #[test]
    fn payment_window_never_panics_on_unvalidated_values() {
        for secs in [0, 10_000_000_000_000, 9_300_000_000_000_000, u64::MAX] {
            let booking = BookingConfig {
                payment_window_secs: secs,
            };
            let window = booking.payment_window();
            assert!(window <= chrono::Duration::days(30));
        }
        assert_eq!(
            BookingConfig { payment_window_secs: u64::MAX }.payment_window(),
            chrono::Duration::days(30)
        );
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let result = PatternworksConfig::from_toml_str("[ticket\nbroken");
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let result = PatternworksConfig::load("/definitely/not/here.toml");
        assert!(matches!(result, Err(ConfigError::Io { .. })));
    }
}
