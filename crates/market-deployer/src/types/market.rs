use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::fixed_point::Percent;
use super::irm::IrmSelection;
use super::oracle::OracleSlotInput;
use crate::constants::SILO_HOOK_V1;

// ---------------------------------------------------------------------------
// Side
// ---------------------------------------------------------------------------

/// One of the two sub-markets of a silo pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Side {
    #[serde(rename = "0", alias = "silo0")]
    Zero,
    #[serde(rename = "1", alias = "silo1")]
    One,
}

impl Side {
    pub const ALL: [Side; 2] = [Side::Zero, Side::One];

    pub fn other(self) -> Side {
        match self {
            Side::Zero => Side::One,
            Side::One => Side::Zero,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Side::Zero => "silo0",
            Side::One => "silo1",
        }
    }
}

impl fmt::Display for Side {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

// ---------------------------------------------------------------------------
// Token
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Token {
    pub address: Address,
    pub decimals: u8,
    /// Display only.
    #[serde(default)]
    pub symbol: String,
}

// ---------------------------------------------------------------------------
// Market configuration (wizard state)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct MarketSide {
    pub token: Token,
    #[serde(default)]
    pub solvency_oracle: OracleSlotInput,
    #[serde(default)]
    pub max_ltv_oracle: OracleSlotInput,
    pub irm: IrmSelection,
    pub max_ltv: Percent,
    pub lt: Percent,
    pub liquidation_target_ltv: Percent,
    pub liquidation_fee: Percent,
    pub flashloan_fee: Percent,
    #[serde(default)]
    pub call_before_quote: bool,
}

/// Owner and timelock applied to every oracle slot through the manageable
/// oracle factory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct ManageableOracleSettings {
    pub owner: Address,
    pub timelock: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MarketConfiguration {
    pub silo0: MarketSide,
    pub silo1: MarketSide,
    pub dao_fee: Percent,
    pub deployer_fee: Percent,
    /// Fee receiver written into the init data; zero when no deployer fee.
    #[serde(default)]
    pub deployer: Address,
    /// Address-book name of the hook receiver implementation to clone.
    #[serde(default = "default_hook_implementation")]
    pub hook_implementation: String,
    #[serde(default)]
    pub hook_owner: Option<Address>,
    #[serde(default)]
    pub manageable_oracle: Option<ManageableOracleSettings>,
}

fn default_hook_implementation() -> String {
    SILO_HOOK_V1.to_string()
}

impl MarketConfiguration {
    pub fn side(&self, side: Side) -> &MarketSide {
        match side {
            Side::Zero => &self.silo0,
            Side::One => &self.silo1,
        }
    }

    /// Hook owner if one was entered and it is not the zero address.
    pub fn valid_hook_owner(&self) -> Option<Address> {
        self.hook_owner.filter(|owner| !owner.is_zero())
    }
}
