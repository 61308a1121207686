use alloy::primitives::{Address, U256};
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::market::{Side, Token};
use super::oracle::OracleRole;

/// What a deployed oracle answered to when probed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OracleKind {
    /// Zero address: slot unused.
    None,
    Manageable,
    Chainlink,
    PtLinear,
    Scaler,
    /// Answers `quoteToken()` but none of the variant probes.
    Generic,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IrmKind {
    Kink,
    Legacy,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OracleSnapshot {
    pub address: Address,
    pub kind: OracleKind,
    /// Oracle behind a manageable wrapper, when `kind` is `Manageable`.
    pub underlying: Option<Address>,
    pub quote_token: Option<Address>,
    /// Quote for one whole base token; `None` when the call reverted.
    pub unit_quote: Option<U256>,
}

impl OracleSnapshot {
    pub fn empty() -> Self {
        Self {
            address: Address::ZERO,
            kind: OracleKind::None,
            underlying: None,
            quote_token: None,
            unit_quote: None,
        }
    }

    pub fn is_set(&self) -> bool {
        !self.address.is_zero()
    }
}

/// One sub-market as read from chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SideSnapshot {
    pub silo: Address,
    pub token: Token,
    pub protected_share_token: Address,
    pub collateral_share_token: Address,
    pub debt_share_token: Address,
    pub dao_fee: U256,
    pub deployer_fee: U256,
    pub solvency_oracle: OracleSnapshot,
    pub max_ltv_oracle: OracleSnapshot,
    pub interest_rate_model: Address,
    pub irm_kind: IrmKind,
    pub max_ltv: U256,
    pub lt: U256,
    pub liquidation_target_ltv: U256,
    pub liquidation_fee: U256,
    pub flashloan_fee: U256,
    pub call_before_quote: bool,
    pub hook_receiver: Address,
    /// `None` when the hook does not answer `owner()`.
    pub hook_owner: Option<Address>,
}

impl SideSnapshot {
    pub fn oracle(&self, role: OracleRole) -> &OracleSnapshot {
        match role {
            OracleRole::Solvency => &self.solvency_oracle,
            OracleRole::MaxLtv => &self.max_ltv_oracle,
        }
    }
}

/// Immutable view of a deployed market, taken once per verification run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigSnapshot {
    pub silo_config: Address,
    pub chain_id: u64,
    pub silo0: SideSnapshot,
    pub silo1: SideSnapshot,
    pub read_at: DateTime<Utc>,
}

impl ConfigSnapshot {
    pub fn side(&self, side: Side) -> &SideSnapshot {
        match side {
            Side::Zero => &self.silo0,
            Side::One => &self.silo1,
        }
    }
}
