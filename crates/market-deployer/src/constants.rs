use alloy::primitives::{uint, B256, U256};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ---------------------------------------------------------------------------
// Numeric Constants
// ---------------------------------------------------------------------------

/// 1e18: the contract's 18-decimal fixed point, where `WAD` means 100%.
pub const WAD: U256 = uint!(1_000_000_000_000_000_000_U256);

/// Fractional digits carried by the 18-decimal fixed point, in percent units.
pub const PERCENT_WAD_SCALE: u32 = 16;

/// Salt passed to every factory `create` call. Deterministic addresses are
/// not used, so it is always the zero hash.
pub const EXTERNAL_SALT: B256 = B256::ZERO;

// ---------------------------------------------------------------------------
// Canonical contract names (address book keys)
// ---------------------------------------------------------------------------

pub const SILO_DEPLOYER: &str = "SiloDeployer";
pub const SILO_FACTORY: &str = "SiloFactory";
pub const SILO_HOOK_V1: &str = "SiloHookV1";
pub const IRM_V2_FACTORY: &str = "InterestRateModelV2Factory";
pub const DYNAMIC_KINK_FACTORY: &str = "DynamicKinkModelFactory";

pub const CHAINLINK_V3_ORACLE_FACTORY: &str = "ChainlinkV3OracleFactory";
pub const PT_LINEAR_ORACLE_FACTORY: &str = "PTLinearOracleFactory";
pub const ORACLE_SCALER_FACTORY: &str = "OracleScalerFactory";
pub const MANAGEABLE_ORACLE_FACTORY: &str = "ManageableOracleFactory";

/// Every oracle factory name the verifier consults for provenance.
pub const ORACLE_FACTORY_NAMES: [&str; 4] = [
    CHAINLINK_V3_ORACLE_FACTORY,
    PT_LINEAR_ORACLE_FACTORY,
    ORACLE_SCALER_FACTORY,
    MANAGEABLE_ORACLE_FACTORY,
];

// ---------------------------------------------------------------------------
// Default verification bounds (percent)
// ---------------------------------------------------------------------------

pub const DEFAULT_DAO_FEE_MIN_PCT: Decimal = dec!(0.01);
pub const DEFAULT_DAO_FEE_MAX_PCT: Decimal = dec!(25);
pub const DEFAULT_DEPLOYER_FEE_MAX_PCT: Decimal = dec!(15);
pub const DEFAULT_LIQUIDATION_FEE_MAX_PCT: Decimal = dec!(15);
pub const DEFAULT_FLASHLOAN_FEE_MAX_PCT: Decimal = dec!(15);
pub const DEFAULT_PRICE_TOLERANCE_BPS: u32 = 100;

/// Extra decimals on top of the token's own used by the large-amount quote
/// probe: the oracle must still answer for 10^(decimals + 20) base units.
pub const LARGE_QUOTE_EXTRA_DECIMALS: u8 = 20;

// ---------------------------------------------------------------------------
// EIP-1167 minimal proxy
// ---------------------------------------------------------------------------

/// Runtime code prefix of an EIP-1167 clone, followed by the 20-byte
/// implementation address and [`EIP1167_SUFFIX`].
pub const EIP1167_PREFIX: [u8; 10] = [0x36, 0x3d, 0x3d, 0x37, 0x3d, 0x3d, 0x3d, 0x36, 0x3d, 0x73];

pub const EIP1167_SUFFIX: [u8; 15] = [
    0x5a, 0xf4, 0x3d, 0x82, 0x80, 0x3e, 0x90, 0x3d, 0x91, 0x60, 0x2b, 0x57, 0xfd, 0x5b, 0xf3,
];
