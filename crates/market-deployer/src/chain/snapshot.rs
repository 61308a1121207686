//! Config snapshot reader: reads both sides of a deployed market into an
//! immutable [`ConfigSnapshot`].
//!
//! Classification probes treat a revert as "not this type". A transport
//! error anywhere aborts the whole read.

use alloy::primitives::{Address, U256};
use chrono::Utc;
use futures::future::try_join;
use tracing::{debug, info, warn};

use super::contracts::{
    IChainlinkV3Oracle, IDynamicKinkModel, IERC20Metadata, IInterestRateModelV2, IManageableOracle,
    IOracleScaler, IOwnable, IPTLinearOracle, ISiloConfig, ISiloOracle,
};
use super::reader::{call_required, try_call, ChainReader};
use crate::errors::DeployerError;
use crate::types::{ConfigSnapshot, IrmKind, OracleKind, OracleSnapshot, SideSnapshot, Token};

/// Read `getSilos()` and `getConfig(silo)` for both silos, then probe the
/// tokens, oracles, IRMs and hook receivers they point at.
pub async fn read_snapshot(
    reader: &dyn ChainReader,
    silo_config: Address,
) -> Result<ConfigSnapshot, DeployerError> {
    let chain_id = reader.chain_id().await?;
    let silos = call_required(reader, silo_config, &ISiloConfig::getSilosCall {}).await?;
    if silos.silo0.is_zero() || silos.silo1.is_zero() || silos.silo0 == silos.silo1 {
        return Err(DeployerError::Snapshot {
            reason: format!(
                "{silo_config} reports silos {} and {}",
                silos.silo0, silos.silo1
            ),
        });
    }

    let (silo0, silo1) = try_join(
        read_side(reader, silo_config, silos.silo0),
        read_side(reader, silo_config, silos.silo1),
    )
    .await?;

    info!(
        silo_config = %silo_config,
        chain_id,
        silo0 = %silo0.silo,
        silo1 = %silo1.silo,
        "config snapshot read"
    );

    Ok(ConfigSnapshot {
        silo_config,
        chain_id,
        silo0,
        silo1,
        read_at: Utc::now(),
    })
}

async fn read_side(
    reader: &dyn ChainReader,
    silo_config: Address,
    silo: Address,
) -> Result<SideSnapshot, DeployerError> {
    let config = call_required(reader, silo_config, &ISiloConfig::getConfigCall { _silo: silo }).await?;
    let token = read_token(reader, config.token).await?;

    let solvency_oracle = read_oracle(reader, config.solvencyOracle, &token).await?;
    let max_ltv_oracle = if config.maxLtvOracle == config.solvencyOracle {
        solvency_oracle.clone()
    } else {
        read_oracle(reader, config.maxLtvOracle, &token).await?
    };

    let irm_kind = classify_irm(reader, config.interestRateModel, silo).await?;

    let hook_owner = if config.hookReceiver.is_zero() {
        None
    } else {
        try_call(reader, config.hookReceiver, &IOwnable::ownerCall {})
            .await?
            .answered()
    };

    Ok(SideSnapshot {
        silo,
        token,
        protected_share_token: config.protectedShareToken,
        collateral_share_token: config.collateralShareToken,
        debt_share_token: config.debtShareToken,
        dao_fee: config.daoFee,
        deployer_fee: config.deployerFee,
        solvency_oracle,
        max_ltv_oracle,
        interest_rate_model: config.interestRateModel,
        irm_kind,
        max_ltv: config.maxLtv,
        lt: config.lt,
        liquidation_target_ltv: config.liquidationTargetLtv,
        liquidation_fee: config.liquidationFee,
        flashloan_fee: config.flashloanFee,
        call_before_quote: config.callBeforeQuote,
        hook_receiver: config.hookReceiver,
        hook_owner,
    })
}

async fn read_token(reader: &dyn ChainReader, address: Address) -> Result<Token, DeployerError> {
    let decimals = call_required(reader, address, &IERC20Metadata::decimalsCall {}).await?;
    // bytes32 symbols do not decode as string; display only, so leave empty.
    let symbol = try_call(reader, address, &IERC20Metadata::symbolCall {})
        .await?
        .answered()
        .unwrap_or_default();
    Ok(Token {
        address,
        decimals,
        symbol,
    })
}

/// `10^decimals`, i.e. one whole token in base units. `None` past `10^77`.
pub fn one_token(decimals: u8) -> Option<U256> {
    U256::from(10u64).checked_pow(U256::from(decimals))
}

async fn read_oracle(
    reader: &dyn ChainReader,
    oracle: Address,
    base: &Token,
) -> Result<OracleSnapshot, DeployerError> {
    if oracle.is_zero() {
        return Ok(OracleSnapshot::empty());
    }

    let (kind, underlying) = classify_oracle(reader, oracle).await?;

    let quote_token = try_call(reader, oracle, &ISiloOracle::quoteTokenCall {})
        .await?
        .answered();

    let unit_quote = match one_token(base.decimals) {
        Some(amount) => {
            let quote = ISiloOracle::quoteCall {
                _baseAmount: amount,
                _baseToken: base.address,
            };
            try_call(reader, oracle, &quote).await?.answered()
        }
        None => {
            warn!(
                oracle = %oracle,
                token = %base.address,
                decimals = base.decimals,
                "token decimals too large for a unit quote"
            );
            None
        }
    };

    debug!(
        oracle = %oracle,
        kind = ?kind,
        quote_token = ?quote_token,
        unit_quote = ?unit_quote,
        "oracle probed"
    );

    Ok(OracleSnapshot {
        address: oracle,
        kind,
        underlying,
        quote_token,
        unit_quote,
    })
}

/// Probe order: manageable → Chainlink → PT-linear → scaler → generic.
async fn classify_oracle(
    reader: &dyn ChainReader,
    oracle: Address,
) -> Result<(OracleKind, Option<Address>), DeployerError> {
    if let Some(inner) = try_call(reader, oracle, &IManageableOracle::oracleCall {})
        .await?
        .answered()
    {
        return Ok((OracleKind::Manageable, Some(inner)));
    }
    if try_call(reader, oracle, &IChainlinkV3Oracle::oracleConfigCall {})
        .await?
        .is_answered()
    {
        return Ok((OracleKind::Chainlink, None));
    }
    if try_call(reader, oracle, &IPTLinearOracle::baseDiscountPerYearCall {})
        .await?
        .is_answered()
    {
        return Ok((OracleKind::PtLinear, None));
    }
    if try_call(reader, oracle, &IOracleScaler::SCALE_FACTORCall {})
        .await?
        .is_answered()
    {
        return Ok((OracleKind::Scaler, None));
    }
    Ok((OracleKind::Generic, None))
}

/// Probe order: dynamic kink → legacy v2 → unknown.
async fn classify_irm(
    reader: &dyn ChainReader,
    irm: Address,
    silo: Address,
) -> Result<IrmKind, DeployerError> {
    let kink = IDynamicKinkModel::getModelStateAndConfigCall { _usePending: false };
    if try_call(reader, irm, &kink).await?.is_answered() {
        return Ok(IrmKind::Kink);
    }
    let legacy = IInterestRateModelV2::getConfigCall { _silo: silo };
    if try_call(reader, irm, &legacy).await?.is_answered() {
        return Ok(IrmKind::Legacy);
    }
    Ok(IrmKind::Unknown)
}
