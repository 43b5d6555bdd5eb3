//! Room pricing strategies.

use crate::config::HotelConfig;
use crate::money::Amount;
use std::collections::BTreeMap;

/// Prices a booking for a room.
pub trait RoomRates: Send + Sync {
    fn quote(&self, room: &str) -> Amount;
}

/// Same total for every room.
#[derive(Debug, Clone, Copy)]
pub struct FlatRate(pub Amount);

impl RoomRates for FlatRate {
    fn quote(&self, _room: &str) -> Amount {
        self.0
    }
}

/// Per-room totals with a fallback.
#[derive(Debug, Clone)]
pub struct RateTable {
    default_rate: Amount,
    rates: BTreeMap<String, Amount>,
}

impl RateTable {
    pub fn new(default_rate: Amount) -> Self {
        Self {
            default_rate,
            rates: BTreeMap::new(),
        }
    }

    pub fn with_rate(mut self, room: impl Into<String>, rate: Amount) -> Self {
        self.rates.insert(room.into(), rate);
        self
    }

    pub fn from_config(config: &HotelConfig) -> Self {
        Self {
            default_rate: config.default_rate,
            rates: config.rates.clone(),
        }
    }
}

impl RoomRates for RateTable {
    fn quote(&self, room: &str) -> Amount {
        self.rates.get(room).copied().unwrap_or(self.default_rate)
    }
}
