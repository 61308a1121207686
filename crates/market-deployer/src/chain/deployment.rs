use alloy::primitives::{Address, Log, B256};
use alloy::sol_types::SolEvent;
use tracing::info;

use super::contracts::ISiloFactory::NewSilo;
use super::reader::ChainReader;
use crate::errors::DeployerError;

/// Addresses announced by the factory's `NewSilo` event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeployedMarket {
    pub factory: Address,
    pub implementation: Address,
    pub token0: Address,
    pub token1: Address,
    pub silo0: Address,
    pub silo1: Address,
    pub silo_config: Address,
}

/// First `NewSilo` event among `logs`, if any.
pub fn find_new_silo(logs: &[Log]) -> Option<DeployedMarket> {
    logs.iter()
        .filter(|log| log.topics().first() == Some(&NewSilo::SIGNATURE_HASH))
        .find_map(|log| {
            let decoded = NewSilo::decode_log(log).ok()?;
            Some(DeployedMarket {
                factory: decoded.address,
                implementation: decoded.data.implementation,
                token0: decoded.data.token0,
                token1: decoded.data.token1,
                silo0: decoded.data.silo0,
                silo1: decoded.data.silo1,
                silo_config: decoded.data.siloConfig,
            })
        })
}

/// Locate the market created by a deploy transaction.
pub async fn locate_deployment(
    reader: &dyn ChainReader,
    tx_hash: B256,
) -> Result<DeployedMarket, DeployerError> {
    let logs = reader
        .receipt_logs(tx_hash)
        .await?
        .ok_or_else(|| DeployerError::DeploymentNotFound {
            reason: format!("no receipt for transaction {tx_hash}"),
        })?;

    let market = find_new_silo(&logs).ok_or_else(|| DeployerError::DeploymentNotFound {
        reason: format!("transaction {tx_hash} emitted no NewSilo event"),
    })?;

    info!(
        tx_hash = %tx_hash,
        silo_config = %market.silo_config,
        silo0 = %market.silo0,
        silo1 = %market.silo1,
        "deployment located"
    );
    Ok(market)
}
