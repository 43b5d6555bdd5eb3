//! Shipping cost strategies.
//!
//! Every method prices a parcel as `weight * per_kg + distance * per_km +
//! surcharge`; only the tariff differs.

use crate::money::Amount;
use std::fmt;
use std::str::FromStr;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;
use thiserror::Error;

pub const MAX_WEIGHT_KG: Amount = Amount::from_units(1000);
pub const MAX_DISTANCE_KM: Amount = Amount::from_units(50_000);

/// What is wrong with a parcel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParcelProblem {
    NonPositiveWeight,
    NonPositiveDistance,
    TooHeavy(Amount),
    TooFar(Amount),
}

impl fmt::Display for ParcelProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NonPositiveWeight => write!(f, "weight must be positive"),
            Self::NonPositiveDistance => write!(f, "distance must be positive"),
            Self::TooHeavy(w) => write!(f, "weight {} kg exceeds {} kg", w.to_plain_string(), MAX_WEIGHT_KG.to_plain_string()),
            Self::TooFar(d) => write!(f, "distance {} km exceeds {} km", d.to_plain_string(), MAX_DISTANCE_KM.to_plain_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShippingError {
    #[error("no shipping method selected")]
    NoStrategy,

    #[error("invalid parcel: {}", .0.iter().map(ToString::to_string).collect::<Vec<_>>().join("; "))]
    InvalidParcel(Vec<ParcelProblem>),

    #[error("shipping cost overflowed")]
    Overflow,

    #[error("unknown shipping method '{0}'")]
    UnknownMethod(String),
}

/// Weight in kilograms and distance in kilometres.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parcel {
    pub weight: Amount,
    pub distance: Amount,
}

impl Parcel {
    pub fn new(weight: Amount, distance: Amount) -> Self {
        Self { weight, distance }
    }

    /// Report every problem with the parcel at once.
    pub fn validate(&self) -> Result<(), ShippingError> {
        let weight = if !self.weight.is_positive() {
            Validation::fail(ParcelProblem::NonPositiveWeight)
        } else if self.weight > MAX_WEIGHT_KG {
            Validation::fail(ParcelProblem::TooHeavy(self.weight))
        } else {
            Validation::success(())
        };
        let distance = if !self.distance.is_positive() {
            Validation::fail(ParcelProblem::NonPositiveDistance)
        } else if self.distance > MAX_DISTANCE_KM {
            Validation::fail(ParcelProblem::TooFar(self.distance))
        } else {
            Validation::success(())
        };

        let checks: Vec<Validation<(), NonEmptyVec<ParcelProblem>>> = vec![weight, distance];
        match Validation::all_vec(checks) {
            Validation::Success(_) => Ok(()),
            Validation::Failure(problems) => {
                Err(ShippingError::InvalidParcel(problems.iter().cloned().collect()))
            }
        }
    }
}

/// Coefficients of the linear price formula.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tariff {
    pub per_kg: Amount,
    pub per_km: Amount,
    pub surcharge: Amount,
}

impl Tariff {
    pub fn price(&self, parcel: &Parcel) -> Option<Amount> {
        parcel
            .weight
            .checked_mul(self.per_kg)?
            .checked_add(parcel.distance.checked_mul(self.per_km)?)?
            .checked_add(self.surcharge)
    }
}

pub trait ShippingStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn tariff(&self) -> Tariff;

    fn cost(&self, parcel: &Parcel) -> Option<Amount> {
        self.tariff().price(parcel)
    }
}

macro_rules! tariff {
    ($ty:ident, $name:literal, $kg:expr, $km:expr, $extra:expr) => {
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $ty;

        impl ShippingStrategy for $ty {
            fn name(&self) -> &'static str {
                $name
            }

            fn tariff(&self) -> Tariff {
                Tariff {
                    per_kg: Amount::from_micros($kg),
                    per_km: Amount::from_micros($km),
                    surcharge: Amount::from_units($extra),
                }
            }
        }
    };
}

tariff!(StandardShipping, "standard", 500_000, 100_000, 0);
tariff!(ExpressShipping, "express", 750_000, 200_000, 10);
tariff!(InternationalShipping, "international", 1_000_000, 500_000, 15);
tariff!(OvernightShipping, "overnight", 900_000, 300_000, 25);

/// Strategy selector for menus and the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShippingMethod {
    Standard,
    Express,
    International,
    Overnight,
}

impl ShippingMethod {
    pub const ALL: [ShippingMethod; 4] = [
        ShippingMethod::Standard,
        ShippingMethod::Express,
        ShippingMethod::International,
        ShippingMethod::Overnight,
    ];

    pub fn strategy(self) -> Box<dyn ShippingStrategy> {
        match self {
            Self::Standard => Box::new(StandardShipping),
            Self::Express => Box::new(ExpressShipping),
            Self::International => Box::new(InternationalShipping),
            Self::Overnight => Box::new(OvernightShipping),
        }
    }
}

impl FromStr for ShippingMethod {
    type Err = ShippingError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "standard" | "1" => Ok(Self::Standard),
            "express" | "2" => Ok(Self::Express),
            "international" | "3" => Ok(Self::International),
            "overnight" | "4" => Ok(Self::Overnight),
            other => Err(ShippingError::UnknownMethod(other.to_string())),
        }
    }
}

/// Holds the selected strategy and validates parcels before pricing.
#[derive(Default)]
pub struct DeliveryContext {
    strategy: Option<Box<dyn ShippingStrategy>>,
}

impl DeliveryContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_strategy(strategy: Box<dyn ShippingStrategy>) -> Self {
        Self {
            strategy: Some(strategy),
        }
    }

    pub fn set_strategy(&mut self, strategy: Box<dyn ShippingStrategy>) {
        tracing::debug!(method = strategy.name(), "shipping method selected");
        self.strategy = Some(strategy);
    }

    pub fn method(&self) -> Option<&'static str> {
        self.strategy.as_ref().map(|s| s.name())
    }

    pub fn cost(&self, parcel: &Parcel) -> Result<Amount, ShippingError> {
        let strategy = self.strategy.as_ref().ok_or(ShippingError::NoStrategy)?;
        parcel.validate()?;
        strategy.cost(parcel).ok_or(ShippingError::Overflow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parcel(weight: i64, distance: i64) -> Parcel {
        Parcel::new(Amount::from_units(weight), Amount::from_units(distance))
    }

    #[test]
    fn each_method_applies_its_tariff() {
        let p = parcel(10, 100);
        let costs: Vec<Amount> = ShippingMethod::ALL
            .iter()
            .map(|m| DeliveryContext::with_strategy(m.strategy()).cost(&p).unwrap())
            .collect();

        assert_eq!(costs[0], Amount::from_units(15));
        assert_eq!(costs[1], "37.5".parse::<Amount>().unwrap());
        assert_eq!(costs[2], Amount::from_units(75));
        assert_eq!(costs[3], Amount::from_units(64));
    }

    #[test]
    fn fractional_inputs_stay_exact() {
        let p = Parcel::new("2.5".parse().unwrap(), "12.3".parse().unwrap());
        let cost = DeliveryContext::with_strategy(Box::new(StandardShipping)).cost(&p).unwrap();
        assert_eq!(cost, "2.48".parse::<Amount>().unwrap());
    }

    #[test]
    fn missing_strategy_is_an_error() {
        assert_eq!(DeliveryContext::new().cost(&parcel(1, 1)), Err(ShippingError::NoStrategy));
    }

    #[test]
    fn every_parcel_problem_is_reported() {
        let ctx = DeliveryContext::with_strategy(Box::new(ExpressShipping));
        assert_eq!(
            ctx.cost(&parcel(0, 60_000)),
            Err(ShippingError::InvalidParcel(vec![
                ParcelProblem::NonPositiveWeight,
                ParcelProblem::TooFar(Amount::from_units(60_000)),
            ]))
        );
        assert!(ctx.cost(&parcel(1000, 50_000)).is_ok());
        assert!(matches!(
            ctx.cost(&parcel(1001, 5)),
            Err(ShippingError::InvalidParcel(p)) if p == vec![ParcelProblem::TooHeavy(Amount::from_units(1001))]
        ));
    }

    #[test]
    fn methods_parse_by_name_or_menu_number() {
        assert_eq!("Express".parse::<ShippingMethod>(), Ok(ShippingMethod::Express));
        assert_eq!("4".parse::<ShippingMethod>(), Ok(ShippingMethod::Overnight));
        assert!("drone".parse::<ShippingMethod>().is_err());
    }
}
