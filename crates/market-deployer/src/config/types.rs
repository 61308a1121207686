use alloy::primitives::Address;
use rust_decimal::Decimal;
use serde::Deserialize;
use std::path::PathBuf;

use crate::catalog::{IrmPresets, KnownOracle};
use crate::constants::{
    DEFAULT_DAO_FEE_MAX_PCT, DEFAULT_DAO_FEE_MIN_PCT, DEFAULT_DEPLOYER_FEE_MAX_PCT,
    DEFAULT_FLASHLOAN_FEE_MAX_PCT, DEFAULT_LIQUIDATION_FEE_MAX_PCT, DEFAULT_PRICE_TOLERANCE_BPS,
};

// ---------------------------------------------------------------------------
// Top-level aggregate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct DeployerConfig {
    pub app: AppConfig,
    pub chain: ChainConfig,
    pub verification: VerificationConfig,
    pub irm_presets: IrmPresets,
}

// ---------------------------------------------------------------------------
// app.json
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Alias of the `chains/{alias}.json` file used when `DEPLOYER_CHAIN` is
    /// not set.
    pub default_chain: String,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Directory for the JSON log file; stderr only when absent.
    #[serde(default)]
    pub log_dir: Option<String>,
    #[serde(default = "default_log_file")]
    pub file_prefix: String,
    /// Used when `RUST_LOG` is not set.
    #[serde(default = "default_log_filter")]
    pub default_filter: String,
}

fn default_log_file() -> String {
    "market-deployer.log".to_string()
}

fn default_log_filter() -> String {
    "market_deployer=info,warn".to_string()
}

// ---------------------------------------------------------------------------
// chains/{alias}.json
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
    pub chain_id: u64,
    pub alias: String,
    pub rpc: RpcConfig,
    pub deployments: DeploymentsConfig,
    #[serde(default)]
    pub known_oracles: Vec<KnownOracle>,
    #[serde(default)]
    pub reference: ReferenceConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcConfig {
    pub http_url: String,
}

/// Local mirror of `{root}/{module}/deployments/{alias}/{Name}.json`.
#[derive(Debug, Clone, Deserialize)]
pub struct DeploymentsConfig {
    pub root: PathBuf,
    pub modules: Vec<String>,
}

/// Independent data the verifier compares on-chain state against. Every
/// field is optional; a missing value turns the matching check into a
/// warning.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReferenceConfig {
    #[serde(default)]
    pub hook_owner: Option<Address>,
    #[serde(default)]
    pub irm_owner: Option<Address>,
    #[serde(default)]
    pub prices: Vec<ReferencePrice>,
}

/// Price of one whole `base` token in whole `quote` tokens.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ReferencePrice {
    pub base: Address,
    pub quote: Address,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
}

impl ReferenceConfig {
    pub fn price(&self, base: Address, quote: Address) -> Option<Decimal> {
        self.prices
            .iter()
            .find(|p| p.base == base && p.quote == quote)
            .map(|p| p.price)
    }
}

// ---------------------------------------------------------------------------
// verification.json (optional)
// ---------------------------------------------------------------------------

/// Bounds used by the fee and price checks, in display percent.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct VerificationConfig {
    #[serde(with = "rust_decimal::serde::str")]
    pub dao_fee_min_pct: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub dao_fee_max_pct: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub deployer_fee_max_pct: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub liquidation_fee_max_pct: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub flashloan_fee_max_pct: Decimal,
    /// Allowed deviation of an oracle quote from its reference price.
    pub price_tolerance_bps: u32,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        Self {
            dao_fee_min_pct: DEFAULT_DAO_FEE_MIN_PCT,
            dao_fee_max_pct: DEFAULT_DAO_FEE_MAX_PCT,
            deployer_fee_max_pct: DEFAULT_DEPLOYER_FEE_MAX_PCT,
            liquidation_fee_max_pct: DEFAULT_LIQUIDATION_FEE_MAX_PCT,
            flashloan_fee_max_pct: DEFAULT_FLASHLOAN_FEE_MAX_PCT,
            price_tolerance_bps: DEFAULT_PRICE_TOLERANCE_BPS,
        }
    }
}
