//! Argument compiler: turns a [`MarketConfiguration`] into the exact
//! arguments of `SiloDeployer.deploy`.
//!
//! Synchronous and deterministic: catalogs are passed in, nothing touches
//! the network. Validation failures abort before any bytes are produced;
//! resolution gaps become [`ResolutionWarning`]s.

pub mod irm;
pub mod oracle;

use alloy::primitives::{Address, Bytes};
use alloy::sol_types::SolValue;
use rust_decimal_macros::dec;
use tracing::{debug, info, warn};

use crate::catalog::{AddressBook, OracleCatalog};
use crate::chain::contracts::{ClonableHookReceiver, InitData, OracleCreationTxData, Oracles};
use crate::constants::{MANAGEABLE_ORACLE_FACTORY, SILO_DEPLOYER};
use crate::errors::DeployerError;
use crate::types::{
    CompiledDeployment, DeployArguments, MarketConfiguration, MarketSide, OracleRole, ResolutionWarning,
    Side,
};

pub use self::irm::encode_irm;
pub use self::oracle::{encode_selection, resolve_slot, wrap_manageable};

/// Compile a market configuration into deploy arguments.
pub fn compile(
    config: &MarketConfiguration,
    contracts: &AddressBook,
    oracles: &OracleCatalog,
) -> Result<CompiledDeployment, DeployerError> {
    // -- Validation (fatal) --------------------------------------------------
    validate_market(config)?;
    let irm_config_data0 = encode_irm(&config.silo0.irm, Side::Zero)?;
    let irm_config_data1 = encode_irm(&config.silo1.irm, Side::One)?;

    // -- Resolution (warnings) -----------------------------------------------
    let mut warnings = Vec::new();
    let deployer = resolve_contract(contracts, SILO_DEPLOYER, &mut warnings);
    let hook_implementation = resolve_contract(contracts, &config.hook_implementation, &mut warnings);
    let irm_factory = resolve_contract(contracts, config.silo0.irm.factory_name(), &mut warnings);

    let manageable = config.manageable_oracle.map(|settings| {
        let factory = oracles
            .factory(MANAGEABLE_ORACLE_FACTORY)
            .or_else(|| contracts.get(MANAGEABLE_ORACLE_FACTORY))
            .unwrap_or_else(|| {
                warnings.push(ResolutionWarning::MissingContract {
                    name: MANAGEABLE_ORACLE_FACTORY.to_string(),
                });
                Address::ZERO
            });
        (settings, factory)
    });

    let mut slot = |side: Side, role: OracleRole| -> OracleCreationTxData {
        let market_side = config.side(side);
        let input = match role {
            OracleRole::Solvency => &market_side.solvency_oracle,
            OracleRole::MaxLtv => &market_side.max_ltv_oracle,
        };
        let selection = resolve_slot(input, side, role, config, oracles, &mut warnings);
        debug!(side = %side, slot = role.label(), oracle = selection.kind_label(), "oracle slot resolved");
        let encoded = encode_selection(&selection);
        match &manageable {
            Some((settings, factory)) if !factory.is_zero() => {
                wrap_manageable(encoded, settings, *factory)
            }
            _ => encoded,
        }
    };

    let oracle_slots = Oracles {
        solvencyOracle0: slot(Side::Zero, OracleRole::Solvency),
        maxLtvOracle0: slot(Side::Zero, OracleRole::MaxLtv),
        solvencyOracle1: slot(Side::One, OracleRole::Solvency),
        maxLtvOracle1: slot(Side::One, OracleRole::MaxLtv),
    };

    let initialization_data = match config.valid_hook_owner() {
        Some(owner) => Bytes::from(owner.abi_encode()),
        None => {
            warnings.push(ResolutionWarning::MissingHookOwner);
            Bytes::new()
        }
    };

    let init_data = build_init_data(config, &oracle_slots);

    let compiled = CompiledDeployment {
        arguments: DeployArguments {
            oracles: oracle_slots,
            irm_config_data0,
            irm_config_data1,
            clonable_hook_receiver: ClonableHookReceiver {
                implementation: hook_implementation,
                initializationData: initialization_data,
            },
            init_data,
        },
        deployer,
        irm_factory,
        hook_implementation,
        warnings,
    };

    for warning in &compiled.warnings {
        warn!(%warning, "deploy argument resolution gap");
    }
    info!(
        deployer = %compiled.deployer,
        irm = config.silo0.irm.kind_label(),
        warnings = compiled.warnings.len(),
        ready = compiled.is_ready(),
        "market compiled"
    );

    Ok(compiled)
}

/// Address-book lookup; a missing name becomes the zero address plus a
/// warning.
fn resolve_contract(book: &AddressBook, name: &str, warnings: &mut Vec<ResolutionWarning>) -> Address {
    match book.get(name) {
        Some(address) => address,
        None => {
            warnings.push(ResolutionWarning::MissingContract {
                name: name.to_string(),
            });
            Address::ZERO
        }
    }
}

/// 24-field init record. The deployer overwrites the hook receiver, IRM and
/// factory-created oracle addresses with what it creates, so those stay zero
/// here; pre-deployed oracles are filled in.
fn build_init_data(config: &MarketConfiguration, oracles: &Oracles) -> InitData {
    let s0 = &config.silo0;
    let s1 = &config.silo1;
    InitData {
        deployer: config.deployer,
        hookReceiver: Address::ZERO,
        deployerFee: config.deployer_fee.to_wad(),
        daoFee: config.dao_fee.to_wad(),
        token0: s0.token.address,
        solvencyOracle0: oracles.slot(Side::Zero, OracleRole::Solvency).deployed,
        maxLtvOracle0: oracles.slot(Side::Zero, OracleRole::MaxLtv).deployed,
        interestRateModel0: Address::ZERO,
        maxLtv0: s0.max_ltv.to_wad(),
        lt0: s0.lt.to_wad(),
        liquidationTargetLtv0: s0.liquidation_target_ltv.to_wad(),
        liquidationFee0: s0.liquidation_fee.to_wad(),
        flashloanFee0: s0.flashloan_fee.to_wad(),
        callBeforeQuote0: s0.call_before_quote,
        token1: s1.token.address,
        solvencyOracle1: oracles.slot(Side::One, OracleRole::Solvency).deployed,
        maxLtvOracle1: oracles.slot(Side::One, OracleRole::MaxLtv).deployed,
        interestRateModel1: Address::ZERO,
        maxLtv1: s1.max_ltv.to_wad(),
        lt1: s1.lt.to_wad(),
        liquidationTargetLtv1: s1.liquidation_target_ltv.to_wad(),
        liquidationFee1: s1.liquidation_fee.to_wad(),
        flashloanFee1: s1.flashloan_fee.to_wad(),
        callBeforeQuote1: s1.call_before_quote,
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Market-wide checks, then per-side risk checks.
pub fn validate_market(config: &MarketConfiguration) -> Result<(), DeployerError> {
    if config.silo0.token.address.is_zero() || config.silo1.token.address.is_zero() {
        return Err(DeployerError::validation("token", "both tokens must be set"));
    }
    if config.silo0.token.address == config.silo1.token.address {
        return Err(DeployerError::validation("token", "both sides use the same token"));
    }
    if !config.silo0.irm.same_kind(&config.silo1.irm) {
        return Err(DeployerError::validation(
            "irm",
            format!(
                "silo0 uses the {} model but silo1 uses the {} model",
                config.silo0.irm.kind_label(),
                config.silo1.irm.kind_label()
            ),
        ));
    }
    if config.dao_fee.value() + config.deployer_fee.value() >= dec!(100) {
        return Err(DeployerError::validation(
            "dao_fee",
            format!(
                "daoFee {} + deployerFee {} must be below 100%",
                config.dao_fee, config.deployer_fee
            ),
        ));
    }
    if !config.deployer_fee.is_zero() && config.deployer.is_zero() {
        return Err(DeployerError::validation(
            "deployer",
            format!("deployerFee is {} but no deployer address is set", config.deployer_fee),
        ));
    }

    for side in Side::ALL {
        validate_risk(config.side(side), side)?;
    }
    Ok(())
}

/// `maxLtv ≤ lt`, `liquidationTargetLtv < lt` (all zero when `lt` is zero),
/// `maxLtv`, `lt` and `liquidationFee` all zero or all non-zero, and
/// `lt + liquidationFee ≤ 100%`.
pub fn validate_risk(s: &MarketSide, side: Side) -> Result<(), DeployerError> {
    let field = |name: &str| format!("{side}.{name}");
    let hundred = dec!(100);

    for (name, value) in [
        ("max_ltv", s.max_ltv),
        ("lt", s.lt),
        ("liquidation_target_ltv", s.liquidation_target_ltv),
        ("liquidation_fee", s.liquidation_fee),
        ("flashloan_fee", s.flashloan_fee),
    ] {
        if value.value() > hundred {
            return Err(DeployerError::validation(field(name), format!("{value} exceeds 100%")));
        }
    }

    if s.max_ltv > s.lt {
        return Err(DeployerError::validation(
            field("max_ltv"),
            format!("maxLtv {} exceeds lt {}", s.max_ltv, s.lt),
        ));
    }

    let zeros = [s.max_ltv.is_zero(), s.lt.is_zero(), s.liquidation_fee.is_zero()];
    if zeros.iter().any(|z| *z) && !zeros.iter().all(|z| *z) {
        return Err(DeployerError::validation(
            field("lt"),
            format!(
                "maxLtv ({}), lt ({}) and liquidationFee ({}) must be all zero or all non-zero",
                s.max_ltv, s.lt, s.liquidation_fee
            ),
        ));
    }

    if s.lt.is_zero() {
        if !s.liquidation_target_ltv.is_zero() {
            return Err(DeployerError::validation(
                field("liquidation_target_ltv"),
                format!("must be 0 when lt is 0, got {}", s.liquidation_target_ltv),
            ));
        }
    } else if s.liquidation_target_ltv >= s.lt {
        return Err(DeployerError::validation(
            field("liquidation_target_ltv"),
            format!(
                "liquidationTargetLtv {} must be below lt {}",
                s.liquidation_target_ltv, s.lt
            ),
        ));
    }

    if s.lt.value() + s.liquidation_fee.value() > hundred {
        return Err(DeployerError::validation(
            field("liquidation_fee"),
            format!(
                "lt {} + liquidationFee {} exceeds 100%",
                s.lt, s.liquidation_fee
            ),
        ));
    }
    Ok(())
}
