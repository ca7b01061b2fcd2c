//! Price tiers.
//!
//! Prices are blended USD per million tokens. The blend itself is the
//! caller's concern; `PriceBlend` is provided for building attribute tables.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// =============================================================================
// TIER BOUNDS
// =============================================================================

// Half-open, ascending: [0, 0.20) [0.20, 1) [1, 10) [10, inf)
const T1_UPPER: f64 = 0.20;
const T2_UPPER: f64 = 1.00;
const T3_UPPER: f64 = 10.00;

/// Ordinal price band. `T1` is the cheapest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceTier {
    T1,
    T2,
    T3,
    T4,
}

impl PriceTier {
    pub const ALL: [PriceTier; 4] = [PriceTier::T1, PriceTier::T2, PriceTier::T3, PriceTier::T4];

    /// Dollar-sign shorthand shown in tier pickers.
    pub fn symbol(self) -> &'static str {
        match self {
            Self::T1 => "$",
            Self::T2 => "$$",
            Self::T3 => "$$$",
            Self::T4 => "$$$$",
        }
    }

    /// Human-readable price range.
    pub fn label(self) -> &'static str {
        match self {
            Self::T1 => "<$0.20",
            Self::T2 => "$0.20-$1",
            Self::T3 => "$1-$10",
            Self::T4 => "$10+",
        }
    }
}

impl fmt::Display for PriceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for PriceTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "$" | "t1" => Ok(Self::T1),
            "$$" | "t2" => Ok(Self::T2),
            "$$$" | "t3" => Ok(Self::T3),
            "$$$$" | "t4" => Ok(Self::T4),
            other => Err(format!(
                "unknown price tier {other:?} (expected one of $, $$, $$$, $$$$ or t1..t4)"
            )),
        }
    }
}

/// Classify a blended price. Unknown stays unknown.
pub fn price_tier(price: Option<f64>) -> Option<PriceTier> {
    let price = price?;
    Some(if price < T1_UPPER {
        PriceTier::T1
    } else if price < T2_UPPER {
        PriceTier::T2
    } else if price < T3_UPPER {
        PriceTier::T3
    } else {
        PriceTier::T4
    })
}

/// Weighting used to collapse input/output token costs into one price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceBlend {
    pub input_weight: f64,
    pub output_weight: f64,
}

impl Default for PriceBlend {
    /// Two input tokens for every output token.
    fn default() -> Self {
        Self {
            input_weight: 2.0 / 3.0,
            output_weight: 1.0 / 3.0,
        }
    }
}

impl PriceBlend {
    pub fn blend(&self, input: f64, output: f64) -> f64 {
        self.input_weight * input + self.output_weight * output
    }
}
