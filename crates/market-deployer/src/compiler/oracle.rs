//! Oracle slot resolution and per-variant encoders.

use alloy::primitives::{Address, Bytes};
use alloy::sol_types::SolCall;
use tracing::debug;

use crate::catalog::OracleCatalog;
use crate::chain::contracts::{
    ChainlinkV3DeploymentConfig, IChainlinkV3OracleFactory, IManageableOracleFactory,
    IOracleScalerFactory, IPTLinearOracleFactory, OracleCreationTxData, PTLinearDeploymentConfig,
};
use crate::constants::{
    CHAINLINK_V3_ORACLE_FACTORY, EXTERNAL_SALT, ORACLE_SCALER_FACTORY, PT_LINEAR_ORACLE_FACTORY,
};
use crate::types::oracle::{ChainlinkDeployment, PtLinearDeployment, ScalerOracle};
use crate::types::{
    ManageableOracleSettings, MarketConfiguration, OracleRole, OracleSelection, OracleSlotInput,
    ResolutionWarning, Side,
};

/// Resolve one slot. Precedence: Chainlink with a known factory, PT-linear
/// with a known factory, explicit deployed scaler, catalogued scaler, custom
/// scaler through the scaler factory, none.
pub fn resolve_slot(
    input: &OracleSlotInput,
    side: Side,
    role: OracleRole,
    market: &MarketConfiguration,
    catalog: &OracleCatalog,
    warnings: &mut Vec<ResolutionWarning>,
) -> OracleSelection {
    let mut skipped = |variant: &'static str| {
        warnings.push(ResolutionWarning::UnknownOracleFactory { side, role, variant });
    };

    if let Some(cfg) = &input.chainlink {
        match catalog.factory(CHAINLINK_V3_ORACLE_FACTORY) {
            Some(factory) => {
                return OracleSelection::Chainlink(ChainlinkDeployment {
                    factory,
                    base_token: market.side(cfg.base_side).token.address,
                    quote_token: cfg
                        .quote_token
                        .unwrap_or(market.side(cfg.base_side.other()).token.address),
                    primary_aggregator: cfg.primary_aggregator,
                    secondary_aggregator: cfg.secondary_aggregator.unwrap_or(Address::ZERO),
                    normalization_divider: cfg.normalization_divider,
                    normalization_multiplier: cfg.normalization_multiplier,
                    invert_second_price: cfg.invert_second_price,
                });
            }
            None => skipped("chainlink"),
        }
    }

    if let Some(cfg) = &input.pt_linear {
        match catalog.factory(PT_LINEAR_ORACLE_FACTORY) {
            Some(factory) => {
                return OracleSelection::PtLinear(PtLinearDeployment {
                    factory,
                    pt_token: market.side(cfg.pt_side).token.address,
                    max_yield: cfg.max_yield.to_wad(),
                    hardcoded_quote_token: cfg.hardcoded_quote_token,
                });
            }
            None => skipped("pt-linear"),
        }
    }

    if let Some(scaler) = &input.scaler {
        if let Some(deployed) = scaler.deployed.filter(|a| !a.is_zero()) {
            return OracleSelection::Scaler(ScalerOracle::Deployed(deployed));
        }

        let quote_token = scaler.quote_token.unwrap_or(market.side(side).token.address);
        if let Some(known) = catalog.find_scaler(quote_token) {
            debug!(side = %side, oracle = %known.name, "scaler matched in catalog");
            return OracleSelection::Scaler(ScalerOracle::Deployed(known.address));
        }

        match catalog.factory(ORACLE_SCALER_FACTORY) {
            Some(factory) => {
                return OracleSelection::Scaler(ScalerOracle::Create {
                    factory,
                    quote_token,
                });
            }
            None => skipped("scaler"),
        }
    }

    OracleSelection::None
}

/// Encode a resolved slot as `{deployed}` or `{factory, txInput}`.
pub fn encode_selection(selection: &OracleSelection) -> OracleCreationTxData {
    match selection {
        OracleSelection::None => OracleCreationTxData::unset(),
        OracleSelection::Scaler(ScalerOracle::Deployed(oracle)) => {
            OracleCreationTxData::deployed(*oracle)
        }
        OracleSelection::Scaler(ScalerOracle::Create {
            factory,
            quote_token,
        }) => {
            let call = IOracleScalerFactory::createOracleScalerCall {
                _quoteToken: *quote_token,
                _externalSalt: EXTERNAL_SALT,
            };
            OracleCreationTxData::create(*factory, Bytes::from(call.abi_encode()))
        }
        OracleSelection::Chainlink(cl) => {
            let call = IChainlinkV3OracleFactory::createCall {
                _config: ChainlinkV3DeploymentConfig {
                    baseToken: cl.base_token,
                    quoteToken: cl.quote_token,
                    primaryAggregator: cl.primary_aggregator,
                    primaryHeartbeat: 0,
                    secondaryAggregator: cl.secondary_aggregator,
                    secondaryHeartbeat: 0,
                    normalizationDivider: cl.normalization_divider,
                    normalizationMultiplier: cl.normalization_multiplier,
                    invertSecondPrice: cl.invert_second_price,
                },
                _externalSalt: EXTERNAL_SALT,
            };
            OracleCreationTxData::create(cl.factory, Bytes::from(call.abi_encode()))
        }
        OracleSelection::PtLinear(pt) => {
            let call = IPTLinearOracleFactory::createCall {
                _config: PTLinearDeploymentConfig {
                    ptToken: pt.pt_token,
                    maxYield: pt.max_yield,
                    hardcodedQuoteToken: pt.hardcoded_quote_token,
                },
                _externalSalt: EXTERNAL_SALT,
            };
            OracleCreationTxData::create(pt.factory, Bytes::from(call.abi_encode()))
        }
    }
}

/// Route a non-empty slot through the manageable oracle factory. A deployed
/// oracle is wrapped as is; a factory-created one is created by the wrapper
/// factory from the underlying factory and its init data.
pub fn wrap_manageable(
    slot: OracleCreationTxData,
    settings: &ManageableOracleSettings,
    manageable_factory: Address,
) -> OracleCreationTxData {
    if slot.is_unset() {
        return slot;
    }

    let input = if !slot.deployed.is_zero() {
        IManageableOracleFactory::create_0Call {
            _oracle: slot.deployed,
            _owner: settings.owner,
            _timelock: settings.timelock,
            _externalSalt: EXTERNAL_SALT,
        }
        .abi_encode()
    } else {
        IManageableOracleFactory::create_1Call {
            _underlyingOracleFactory: slot.factory,
            _underlyingOracleInitData: slot.txInput,
            _owner: settings.owner,
            _timelock: settings.timelock,
            _externalSalt: EXTERNAL_SALT,
        }
        .abi_encode()
    };
    OracleCreationTxData::create(manageable_factory, Bytes::from(input))
}
