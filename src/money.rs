//! Fixed-point decimal amounts.
//!
//! Every price, balance, rate and measured quantity in the crate is an
//! [`Amount`]: a signed integer count of micros (1 unit = 1_000_000 micros).
//! Arithmetic never goes through `f64`. Floats are only accepted at the
//! edges (`from_f64`) and produced for ratios (`change_percent`).
//!
//! Text parsing is exact: `"12.345"` becomes 12_345_000 micros, and input
//! with more than six decimal places is rejected rather than rounded.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};
use std::str::FromStr;
use thiserror::Error;

/// Scale factor: 1 unit = 1_000_000 micros (6 decimal places).
pub const MICROS_PER_UNIT: i64 = 1_000_000;

const DECIMALS: usize = 6;

/// Errors produced when building an [`Amount`] from outside input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("'{0}' is not a decimal number")]
    Malformed(String),

    #[error("'{0}' has more than six decimal places")]
    TooPrecise(String),

    #[error("value is not finite")]
    NotFinite,

    #[error("value is out of range")]
    OutOfRange,
}

/// Signed fixed-point decimal with six fractional digits.
///
/// # Example
///
/// ```rust
/// use patternworks::money::Amount;
///
/// let price: Amount = "49.99".parse().unwrap();
/// let paid = Amount::from_units(50);
///
/// assert_eq!((paid - price).to_string(), "0.01");
/// assert_eq!(format!("{:.4}", price), "49.9900");
/// ```
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "AmountRepr", into = "String")]
pub struct Amount(i64);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    /// Whole units (`from_units(5)` is 5.000000).
    pub const fn from_units(units: i64) -> Self {
        Amount(units * MICROS_PER_UNIT)
    }

    pub const fn from_micros(micros: i64) -> Self {
        Amount(micros)
    }

    /// Build from a whole/hundredths pair, e.g. `from_cents(1999)` is 19.99.
    pub const fn from_cents(cents: i64) -> Self {
        Amount(cents * (MICROS_PER_UNIT / 100))
    }

    pub const fn micros(self) -> i64 {
        self.0
    }

    /// Convert a float, rounding to the nearest micro.
    pub fn from_f64(value: f64) -> Result<Self, AmountError> {
        if !value.is_finite() {
            return Err(AmountError::NotFinite);
        }
        let scaled = (value * MICROS_PER_UNIT as f64).round();
        if scaled > i64::MAX as f64 || scaled < i64::MIN as f64 {
            return Err(AmountError::OutOfRange);
        }
        Ok(Amount(scaled as i64))
    }

    /// Lossy conversion for ratios and display only.
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / MICROS_PER_UNIT as f64
    }

    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub const fn is_positive(self) -> bool {
        self.0 > 0
    }

    pub const fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn abs(self) -> Self {
        Amount(self.0.saturating_abs())
    }

    pub fn checked_add(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_add(rhs.0).map(Amount)
    }

    pub fn checked_sub(self, rhs: Amount) -> Option<Amount> {
        self.0.checked_sub(rhs.0).map(Amount)
    }

    /// Fixed-point product, rounded half away from zero.
    ///
    /// `None` on overflow.
    pub fn checked_mul(self, rhs: Amount) -> Option<Amount> {
        let wide = i128::from(self.0) * i128::from(rhs.0);
        let scale = i128::from(MICROS_PER_UNIT);
        let half = scale / 2;
        let rounded = if wide >= 0 {
            (wide + half) / scale
        } else {
            (wide - half) / scale
        };
        i64::try_from(rounded).ok().map(Amount)
    }

    /// Multiply by an integer count.
    pub fn times(self, count: i64) -> Option<Amount> {
        self.0.checked_mul(count).map(Amount)
    }

    /// `percent` of this amount, rounded half away from zero.
    pub fn percent(self, percent: u32) -> Amount {
        let wide = i128::from(self.0) * i128::from(percent);
        let rounded = if wide >= 0 { (wide + 50) / 100 } else { (wide - 50) / 100 };
        // saturates above i64 range
        Amount(i64::try_from(rounded).unwrap_or(if wide >= 0 { i64::MAX } else { i64::MIN }))
    }

    /// This amount reduced by `percent` (clamped to 100).
    pub fn percent_off(self, percent: u32) -> Amount {
        self - self.percent(percent.min(100))
    }

    /// Relative change from `previous` to `current`, in percent.
    ///
    /// `None` when `previous` is zero.
    pub fn change_percent(previous: Amount, current: Amount) -> Option<f64> {
        if previous.is_zero() {
            return None;
        }
        let delta = (current.0 - previous.0) as f64;
        Some(delta / previous.0 as f64 * 100.0)
    }

    /// Full-precision text with trailing zeros trimmed (`"12.5"`, `"3"`).
    pub fn to_plain_string(self) -> String {
        let negative = self.0 < 0;
        let abs = self.0.unsigned_abs();
        let unit = MICROS_PER_UNIT as u64;
        let whole = abs / unit;
        let frac = abs % unit;
        let sign = if negative { "-" } else { "" };
        if frac == 0 {
            format!("{sign}{whole}")
        } else {
            let digits = format!("{frac:0width$}", width = DECIMALS);
            format!("{sign}{whole}.{}", digits.trim_end_matches('0'))
        }
    }
}

impl fmt::Display for Amount {
    /// Two decimals by default; `{:.N}` selects up to six.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let places = f.precision().unwrap_or(2).min(DECIMALS);
        let divisor = 10_i128.pow((DECIMALS - places) as u32);
        let value = i128::from(self.0);
        let half = divisor / 2;
        let rounded = if divisor == 1 {
            value
        } else if value >= 0 {
            (value + half) / divisor
        } else {
            (value - half) / divisor
        };

        let abs = rounded.unsigned_abs();
        let unit = 10_u128.pow(places as u32);
        let digits = if places == 0 {
            abs.to_string()
        } else {
            format!("{}.{:0width$}", abs / unit, abs % unit, width = places)
        };
        f.pad_integral(rounded >= 0, "", &digits)
    }
}

impl fmt::Debug for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Amount({})", self.to_plain_string())
    }
}

impl FromStr for Amount {
    type Err = AmountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let malformed = || AmountError::Malformed(s.to_string());

        let (negative, body) = match text.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, text.strip_prefix('+').unwrap_or(text)),
        };

        let (whole, frac) = match body.split_once('.') {
            Some((w, f)) => (w, f),
            None => (body, ""),
        };

        if whole.is_empty() && frac.is_empty() {
            return Err(malformed());
        }
        if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit())
        {
            return Err(malformed());
        }
        if frac.len() > DECIMALS {
            return Err(AmountError::TooPrecise(s.to_string()));
        }

        let whole_value: i64 = if whole.is_empty() {
            0
        } else {
            whole.parse().map_err(|_| AmountError::OutOfRange)?
        };
        let frac_value: i64 = if frac.is_empty() {
            0
        } else {
            let padded = format!("{frac:0<width$}", width = DECIMALS);
            padded.parse().map_err(|_| malformed())?
        };

        let micros = whole_value
            .checked_mul(MICROS_PER_UNIT)
            .and_then(|m| m.checked_add(frac_value))
            .ok_or(AmountError::OutOfRange)?;

        Ok(Amount(if negative { -micros } else { micros }))
    }
}

/// Accepted serialized forms: integers, floats and decimal strings.
#[derive(Deserialize)]
#[serde(untagged)]
enum AmountRepr {
    Int(i64),
    Float(f64),
    Text(String),
}

impl TryFrom<AmountRepr> for Amount {
    type Error = AmountError;

    fn try_from(repr: AmountRepr) -> Result<Self, Self::Error> {
        match repr {
            AmountRepr::Int(units) => units
                .checked_mul(MICROS_PER_UNIT)
                .map(Amount)
                .ok_or(AmountError::OutOfRange),
            AmountRepr::Float(value) => Amount::from_f64(value),
            AmountRepr::Text(text) => text.parse(),
        }
    }
}

impl From<Amount> for String {
    fn from(amount: Amount) -> Self {
        amount.to_plain_string()
    }
}

impl Add for Amount {
    type Output = Amount;

    fn add(self, rhs: Amount) -> Amount {
        Amount(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Amount {
    fn add_assign(&mut self, rhs: Amount) {
        *self = *self + rhs;
    }
}

impl Sub for Amount {
    type Output = Amount;

    fn sub(self, rhs: Amount) -> Amount {
        Amount(self.0.saturating_sub(rhs.0))
    }
}

impl SubAssign for Amount {
    fn sub_assign(&mut self, rhs: Amount) {
        *self = *self - rhs;
    }
}

impl Neg for Amount {
    type Output = Amount;

    fn neg(self) -> Amount {
        Amount(self.0.saturating_neg())
    }
}

impl Sum for Amount {
    fn sum<I: Iterator<Item = Amount>>(iter: I) -> Amount {
        iter.fold(Amount::ZERO, Add::add)
    }
}

impl<'a> Sum<&'a Amount> for Amount {
    fn sum<I: Iterator<Item = &'a Amount>>(iter: I) -> Amount {
        iter.copied().sum()
    }
}

impl PartialEq<i64> for Amount {
    fn eq(&self, other: &i64) -> bool {
        other
            .checked_mul(MICROS_PER_UNIT)
            .map(|m| m == self.0)
            .unwrap_or(false)
    }
}

impl PartialOrd<i64> for Amount {
    fn partial_cmp(&self, other: &i64) -> Option<Ordering> {
        Some(i128::from(self.0).cmp(&(i128::from(*other) * i128::from(MICROS_PER_UNIT))))
    }
}
