//! Discount coupons.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coupon tiers offered after a booking is confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscountTier {
    FirstVisit,
    Regular,
    Vip,
    Seasonal,
}

impl DiscountTier {
    pub const ALL: [DiscountTier; 4] = [
        DiscountTier::FirstVisit,
        DiscountTier::Regular,
        DiscountTier::Vip,
        DiscountTier::Seasonal,
    ];

    pub fn percent(self) -> u32 {
        match self {
            DiscountTier::FirstVisit => 5,
            DiscountTier::Regular => 10,
            DiscountTier::Vip => 15,
            DiscountTier::Seasonal => 20,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            DiscountTier::FirstVisit => "first visit",
            DiscountTier::Regular => "regular guest",
            DiscountTier::Vip => "VIP guest",
            DiscountTier::Seasonal => "holiday offer",
        }
    }

    pub fn from_percent(percent: u32) -> Option<Self> {
        Self::ALL.into_iter().find(|tier| tier.percent() == percent)
    }
}

impl fmt::Display for DiscountTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}% ({})", self.percent(), self.label())
    }
}
