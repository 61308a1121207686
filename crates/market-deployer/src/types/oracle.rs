use alloy::primitives::{Address, U256};
use serde::Deserialize;

use super::fixed_point::Percent;
use super::market::Side;
use super::serde_num;

// ---------------------------------------------------------------------------
// Wizard input for one oracle slot
// ---------------------------------------------------------------------------

/// Raw state of one oracle slot. Several candidates may be filled in at once;
/// the compiler resolves them into exactly one [`OracleSelection`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct OracleSlotInput {
    #[serde(default)]
    pub chainlink: Option<ChainlinkOracleConfig>,
    #[serde(default)]
    pub pt_linear: Option<PtLinearOracleConfig>,
    #[serde(default)]
    pub scaler: Option<ScalerChoice>,
}

impl OracleSlotInput {
    pub fn is_empty(&self) -> bool {
        self.chainlink.is_none() && self.pt_linear.is_none() && self.scaler.is_none()
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChainlinkOracleConfig {
    /// Side whose token is priced.
    pub base_side: Side,
    /// Defaults to the token of the opposite side.
    #[serde(default)]
    pub quote_token: Option<Address>,
    pub primary_aggregator: Address,
    #[serde(default)]
    pub secondary_aggregator: Option<Address>,
    #[serde(with = "serde_num::u256")]
    pub normalization_divider: U256,
    #[serde(with = "serde_num::u256")]
    pub normalization_multiplier: U256,
    #[serde(default)]
    pub invert_second_price: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PtLinearOracleConfig {
    /// Side whose token is the principal token.
    pub pt_side: Side,
    pub max_yield: Percent,
    pub hardcoded_quote_token: Address,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ScalerChoice {
    /// Already deployed scaler chosen by the operator.
    #[serde(default)]
    pub deployed: Option<Address>,
    /// Token the scaler normalizes; defaults to the slot's own token.
    #[serde(default)]
    pub quote_token: Option<Address>,
}

// ---------------------------------------------------------------------------
// Resolved selection
// ---------------------------------------------------------------------------

/// One resolved oracle slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OracleSelection {
    None,
    Scaler(ScalerOracle),
    Chainlink(ChainlinkDeployment),
    PtLinear(PtLinearDeployment),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScalerOracle {
    Deployed(Address),
    Create { factory: Address, quote_token: Address },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainlinkDeployment {
    pub factory: Address,
    pub base_token: Address,
    pub quote_token: Address,
    pub primary_aggregator: Address,
    /// Zero when absent.
    pub secondary_aggregator: Address,
    pub normalization_divider: U256,
    pub normalization_multiplier: U256,
    pub invert_second_price: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PtLinearDeployment {
    pub factory: Address,
    pub pt_token: Address,
    /// 18-decimal fixed point.
    pub max_yield: U256,
    pub hardcoded_quote_token: Address,
}

impl OracleSelection {
    pub fn is_none(&self) -> bool {
        matches!(self, OracleSelection::None)
    }

    pub fn kind_label(&self) -> &'static str {
        match self {
            OracleSelection::None => "none",
            OracleSelection::Scaler(ScalerOracle::Deployed(_)) => "scaler (deployed)",
            OracleSelection::Scaler(ScalerOracle::Create { .. }) => "scaler (create)",
            OracleSelection::Chainlink(_) => "chainlink",
            OracleSelection::PtLinear(_) => "pt-linear",
        }
    }
}

// ---------------------------------------------------------------------------
// Slot roles
// ---------------------------------------------------------------------------

/// Which of a side's two oracle slots is meant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum OracleRole {
    Solvency,
    MaxLtv,
}

impl OracleRole {
    pub const ALL: [OracleRole; 2] = [OracleRole::Solvency, OracleRole::MaxLtv];

    pub fn label(self) -> &'static str {
        match self {
            OracleRole::Solvency => "solvency oracle",
            OracleRole::MaxLtv => "maxLtv oracle",
        }
    }
}
