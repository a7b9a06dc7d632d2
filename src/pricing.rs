use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Hint level 0-5. The discount scale is fixed: the last two levels step by
/// 5% instead of 10%.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Default)]
#[serde(try_from = "u8", into = "u8")]
pub enum HintLevel {
    #[default]
    Lv0,
    Lv1,
    Lv2,
    Lv3,
    Lv4,
    Lv5,
}

/// Flat extra discount granted by the fast-learner trait, stacked on top of
/// the hint discount.
pub const FAST_LEARNER_DISCOUNT_PCT: u32 = 10;

/// Guards the floor against float error pushing an exact boundary value
/// down one point (e.g. 170 * 0.9 landing at 152.99999...).
const COST_EPSILON: f64 = 1e-9;

impl HintLevel {
    pub const ALL: [HintLevel; 6] = [
        HintLevel::Lv0,
        HintLevel::Lv1,
        HintLevel::Lv2,
        HintLevel::Lv3,
        HintLevel::Lv4,
        HintLevel::Lv5,
    ];

    pub fn discount_pct(&self) -> u32 {
        match self {
            Self::Lv0 => 0,
            Self::Lv1 => 10,
            Self::Lv2 => 20,
            Self::Lv3 => 30,
            Self::Lv4 => 35,
            Self::Lv5 => 40,
        }
    }

    /// Combined discount shown in row listings, e.g. "Lv3 (40% off)" with
    /// fast learner active.
    pub fn total_discount_pct(&self, fast_learner: bool) -> u32 {
        let extra = if fast_learner {
            FAST_LEARNER_DISCOUNT_PCT
        } else {
            0
        };
        (self.discount_pct() + extra).min(100)
    }

    pub fn as_u8(&self) -> u8 {
        *self as u8
    }
}

impl Display for HintLevel {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "Lv{}", self.as_u8())
    }
}

#[derive(Debug, Error)]
#[error("hint level out of range (expected 0-5): {0}")]
pub struct HintLevelError(pub u8);

impl TryFrom<u8> for HintLevel {
    type Error = HintLevelError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Lv0),
            1 => Ok(Self::Lv1),
            2 => Ok(Self::Lv2),
            3 => Ok(Self::Lv3),
            4 => Ok(Self::Lv4),
            5 => Ok(Self::Lv5),
            other => Err(HintLevelError(other)),
        }
    }
}

impl From<HintLevel> for u8 {
    fn from(value: HintLevel) -> Self {
        value.as_u8()
    }
}

/// Discount-adjusted purchase cost: `floor(base * (1 - discount) + eps)`,
/// never negative. Total discount is clamped at 100%.
pub fn effective_cost(base_cost: u32, hint: HintLevel, fast_learner: bool) -> u32 {
    let discount_pct = hint.total_discount_pct(fast_learner);
    let multiplier = f64::from(100u32.saturating_sub(discount_pct)) / 100.0;
    let raw = f64::from(base_cost) * multiplier;
    let floored = (raw + COST_EPSILON).floor();
    if floored <= 0.0 {
        0
    } else {
        floored as u32
    }
}
