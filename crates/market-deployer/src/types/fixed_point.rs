//! Exact conversions between display percentages and on-chain integers.
//!
//! The deployer contract stores fees and LTVs as 18-decimal fixed point where
//! `1e18` is 100%. Display values are percentages (`"92.5"` = 92.5%). Every
//! conversion here goes through `Decimal` mantissa/scale arithmetic and
//! `U256`, never through `f64`.

use alloy::primitives::U256;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::constants::PERCENT_WAD_SCALE;
use crate::errors::DeployerError;

/// Fractional digits carried by the basis-point encoding, in percent units.
const PERCENT_BPS_SCALE: u32 = 2;

// ---------------------------------------------------------------------------
// Percent: validated display percentage
// ---------------------------------------------------------------------------

/// Non-negative display percentage (`Percent::from_str("5")` is 5%).
///
/// Deserializes only from JSON strings so that no value ever passes through a
/// binary float on its way in.
#[derive(Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Percent(Decimal);

impl Percent {
    pub const ZERO: Percent = Percent(Decimal::ZERO);

    pub fn new(value: Decimal) -> Result<Self, DeployerError> {
        if value.is_sign_negative() && !value.is_zero() {
            return Err(DeployerError::OutOfRange {
                reason: format!("percentage {value} is negative"),
            });
        }
        Ok(Self(value.normalize()))
    }

    pub fn value(self) -> Decimal {
        self.0
    }

    pub fn is_zero(self) -> bool {
        self.0.is_zero()
    }

    /// 18-decimal fixed point: `trunc(percent × 10^16)`.
    pub fn to_wad(self) -> U256 {
        scale_truncated(self.0, PERCENT_WAD_SCALE)
    }

    /// Basis points: `trunc(percent × 100)`.
    pub fn to_bps(self) -> U256 {
        scale_truncated(self.0, PERCENT_BPS_SCALE)
    }
}

impl FromStr for Percent {
    type Err = DeployerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let value = Decimal::from_str(trimmed).map_err(|_| DeployerError::Parse {
            input: s.to_string(),
        })?;
        Self::new(value)
    }
}

impl TryFrom<String> for Percent {
    type Error = DeployerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Percent> for String {
    fn from(p: Percent) -> Self {
        p.0.to_string()
    }
}

impl fmt::Debug for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Percent({})", self.0)
    }
}

impl fmt::Display for Percent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.0)
    }
}

// ---------------------------------------------------------------------------
// Free-standing conversion helpers
// ---------------------------------------------------------------------------

/// Convert a display percentage string into the contract's 18-decimal fixed
/// point. `"5"` → `50_000_000_000_000_000`.
pub fn to_chain_fixed_point(percent: &str) -> Result<U256, DeployerError> {
    Ok(Percent::from_str(percent)?.to_wad())
}

/// Inverse of [`to_chain_fixed_point`]: `929876543219000000` → `92.9876543219`.
pub fn from_chain_fixed_point(raw: U256) -> Result<Decimal, DeployerError> {
    unscale(raw, PERCENT_WAD_SCALE)
}

/// Convert a display percentage string into basis points (`"12.5"` → 1250).
pub fn to_basis_points(percent: &str) -> Result<U256, DeployerError> {
    Ok(Percent::from_str(percent)?.to_bps())
}

/// Inverse of [`to_basis_points`]: 1250 → `12.5`.
pub fn from_basis_points(bps: U256) -> Result<Decimal, DeployerError> {
    unscale(bps, PERCENT_BPS_SCALE)
}

/// Human-readable percentage for a fixed-point value, for check messages.
/// Falls back to the raw integer when the value is not representable.
pub fn display_wad_percent(raw: U256) -> String {
    match from_chain_fixed_point(raw) {
        Ok(pct) => format!("{pct}%"),
        Err(_) => format!("{raw} (raw)"),
    }
}

/// `trunc(value × 10^scale)` as an integer, computed from the mantissa.
fn scale_truncated(value: Decimal, scale: u32) -> U256 {
    let truncated = value.trunc_with_scale(scale);
    let mantissa = U256::from(truncated.mantissa().unsigned_abs());
    let shift = scale - truncated.scale();
    mantissa * U256::from(10u64).pow(U256::from(shift))
}

/// `raw / 10^scale` as an exact, normalized `Decimal`.
fn unscale(raw: U256, scale: u32) -> Result<Decimal, DeployerError> {
    let out_of_range = || DeployerError::OutOfRange {
        reason: format!("{raw} exceeds the decimal display range"),
    };
    let as_u128: u128 = raw.try_into().map_err(|_| out_of_range())?;
    let as_i128 = i128::try_from(as_u128).map_err(|_| out_of_range())?;
    Decimal::try_from_i128_with_scale(as_i128, scale)
        .map(|d| d.normalize())
        .map_err(|_| out_of_range())
}
