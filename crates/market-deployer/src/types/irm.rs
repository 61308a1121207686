use alloy::primitives::{Address, Signed, I256};
use serde::{Deserialize, Serialize};

use super::serde_num;
use crate::constants::{DYNAMIC_KINK_FACTORY, IRM_V2_FACTORY};

/// Solidity `int112`.
pub type I112 = Signed<112, 2>;
/// Solidity `int96`.
pub type I96 = Signed<96, 2>;

/// Interest rate model choice for one side. Both sides of a market must use
/// the same variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IrmSelection {
    Legacy(LegacyIrmConfig),
    Kink(KinkIrmConfig),
}

impl IrmSelection {
    /// Address-book name of the factory that deploys this model.
    pub fn factory_name(&self) -> &'static str {
        match self {
            IrmSelection::Legacy(_) => IRM_V2_FACTORY,
            IrmSelection::Kink(_) => DYNAMIC_KINK_FACTORY,
        }
    }

    pub fn kind_label(&self) -> &'static str {
        match self {
            IrmSelection::Legacy(_) => "legacy",
            IrmSelection::Kink(_) => "kink",
        }
    }

    pub fn same_kind(&self, other: &IrmSelection) -> bool {
        std::mem::discriminant(self) == std::mem::discriminant(other)
    }
}

/// `InterestRateModelV2` config, all values 18-decimal fixed point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyIrmConfig {
    #[serde(with = "serde_num::signed")]
    pub uopt: I256,
    #[serde(with = "serde_num::signed")]
    pub ucrit: I256,
    #[serde(with = "serde_num::signed")]
    pub ulow: I256,
    #[serde(with = "serde_num::signed")]
    pub ki: I256,
    #[serde(with = "serde_num::signed")]
    pub kcrit: I256,
    #[serde(with = "serde_num::signed")]
    pub klow: I256,
    #[serde(with = "serde_num::signed")]
    pub klin: I256,
    #[serde(with = "serde_num::signed")]
    pub beta: I256,
    #[serde(with = "serde_num::signed")]
    pub ri: I112,
    #[serde(with = "serde_num::signed", alias = "Tcrit")]
    pub tcrit: I112,
}

/// `DynamicKinkModel` config plus its immutable args and initial owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KinkIrmConfig {
    #[serde(with = "serde_num::signed")]
    pub ulow: I256,
    #[serde(with = "serde_num::signed")]
    pub u1: I256,
    #[serde(with = "serde_num::signed")]
    pub u2: I256,
    #[serde(with = "serde_num::signed")]
    pub ucrit: I256,
    #[serde(with = "serde_num::signed")]
    pub rmin: I256,
    #[serde(with = "serde_num::signed")]
    pub kmin: I96,
    #[serde(with = "serde_num::signed")]
    pub kmax: I96,
    #[serde(with = "serde_num::signed")]
    pub alpha: I256,
    #[serde(with = "serde_num::signed")]
    pub cminus: I256,
    #[serde(with = "serde_num::signed")]
    pub cplus: I256,
    #[serde(with = "serde_num::signed")]
    pub c1: I256,
    #[serde(with = "serde_num::signed")]
    pub c2: I256,
    #[serde(with = "serde_num::signed")]
    pub dmax: I256,
    pub timelock: u32,
    #[serde(with = "serde_num::signed", alias = "rcompCap")]
    pub rcomp_cap: I96,
    #[serde(alias = "initialOwner")]
    pub initial_owner: Address,
}
