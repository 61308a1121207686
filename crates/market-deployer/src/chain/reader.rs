//! Narrow read-only chain capability.
//!
//! Everything above this module talks to [`ChainReader`]; only
//! [`RpcChainReader`] knows about an Alloy provider. A revert is data
//! ([`CallOutcome::Reverted`]), a transport failure is an error.

use alloy::network::TransactionBuilder;
use alloy::primitives::{Address, Bytes, Log, B256};
use alloy::providers::{Provider, RootProvider};
use alloy::rpc::types::TransactionRequest;
use alloy::sol_types::SolCall;
use alloy::transports::{RpcError, TransportError};
use futures::future::BoxFuture;
use tracing::debug;

use crate::errors::DeployerError;

/// Concrete provider type: Alloy HTTP provider over Ethereum network.
pub type HttpProvider = RootProvider;

/// Result of an `eth_call` that reached the node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome {
    Returned(Bytes),
    /// Revert payload, possibly empty.
    Reverted(Bytes),
}

pub trait ChainReader: Send + Sync {
    fn chain_id(&self) -> BoxFuture<'_, Result<u64, TransportError>>;

    fn call(&self, to: Address, input: Bytes) -> BoxFuture<'_, Result<CallOutcome, TransportError>>;

    fn get_code(&self, address: Address) -> BoxFuture<'_, Result<Bytes, TransportError>>;

    /// Logs of a mined transaction, `None` if the receipt is unknown.
    fn receipt_logs(&self, tx_hash: B256) -> BoxFuture<'_, Result<Option<Vec<Log>>, TransportError>>;
}

// ---------------------------------------------------------------------------
// Alloy provider implementation
// ---------------------------------------------------------------------------

pub struct RpcChainReader<P> {
    provider: P,
}

impl<P: Provider> RpcChainReader<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }
}

impl RpcChainReader<HttpProvider> {
    /// Connect over HTTP. No request is sent until the first read.
    pub fn connect_http(rpc_url: &str) -> Result<Self, DeployerError> {
        let url = rpc_url
            .parse()
            .map_err(|e| DeployerError::Config(format!("invalid RPC URL '{rpc_url}': {e}")))?;
        Ok(Self::new(RootProvider::new_http(url)))
    }
}

impl<P: Provider + Send + Sync> ChainReader for RpcChainReader<P> {
    fn chain_id(&self) -> BoxFuture<'_, Result<u64, TransportError>> {
        Box::pin(async move { self.provider.get_chain_id().await })
    }

    fn call(&self, to: Address, input: Bytes) -> BoxFuture<'_, Result<CallOutcome, TransportError>> {
        Box::pin(async move {
            let tx = TransactionRequest::default().with_to(to).with_input(input);
            match self.provider.call(tx).await {
                Ok(output) => Ok(CallOutcome::Returned(output)),
                Err(RpcError::ErrorResp(payload)) => {
                    if let Some(data) = payload.as_revert_data() {
                        debug!(to = %to, revert_len = data.len(), "eth_call reverted");
                        Ok(CallOutcome::Reverted(data))
                    } else if payload.message.to_lowercase().contains("revert") {
                        debug!(to = %to, message = %payload.message, "eth_call reverted without data");
                        Ok(CallOutcome::Reverted(Bytes::new()))
                    } else {
                        Err(RpcError::ErrorResp(payload))
                    }
                }
                Err(e) => Err(e),
            }
        })
    }

    fn get_code(&self, address: Address) -> BoxFuture<'_, Result<Bytes, TransportError>> {
        Box::pin(async move { self.provider.get_code_at(address).await })
    }

    fn receipt_logs(&self, tx_hash: B256) -> BoxFuture<'_, Result<Option<Vec<Log>>, TransportError>> {
        Box::pin(async move {
            let receipt = self.provider.get_transaction_receipt(tx_hash).await?;
            Ok(receipt.map(|r| r.inner.logs().iter().map(|log| log.inner.clone()).collect()))
        })
    }
}

// ---------------------------------------------------------------------------
// Probe-by-revert
// ---------------------------------------------------------------------------

/// Answer to a call whose revert is a meaningful signal ("not this type",
/// "not supported") rather than a failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Probe<T> {
    Answered(T),
    /// Reverted, or returned data that does not decode as the expected type.
    Rejected,
}

impl<T> Probe<T> {
    pub fn answered(self) -> Option<T> {
        match self {
            Probe::Answered(v) => Some(v),
            Probe::Rejected => None,
        }
    }

    pub fn is_answered(&self) -> bool {
        matches!(self, Probe::Answered(_))
    }
}

/// Call `to` with a typed call; reverts and undecodable output are
/// [`Probe::Rejected`], transport errors propagate.
pub async fn try_call<C: SolCall>(
    reader: &dyn ChainReader,
    to: Address,
    call: &C,
) -> Result<Probe<C::Return>, TransportError> {
    match reader.call(to, Bytes::from(call.abi_encode())).await? {
        CallOutcome::Returned(output) => match C::abi_decode_returns(&output) {
            Ok(value) => Ok(Probe::Answered(value)),
            Err(e) => {
                debug!(to = %to, method = C::SIGNATURE, error = %e, "probe output undecodable");
                Ok(Probe::Rejected)
            }
        },
        CallOutcome::Reverted(_) => {
            debug!(to = %to, method = C::SIGNATURE, "probe rejected");
            Ok(Probe::Rejected)
        }
    }
}

/// Call `to` where a revert is not acceptable.
pub async fn call_required<C: SolCall>(
    reader: &dyn ChainReader,
    to: Address,
    call: &C,
) -> Result<C::Return, DeployerError> {
    match reader.call(to, Bytes::from(call.abi_encode())).await? {
        CallOutcome::Returned(output) => {
            C::abi_decode_returns(&output).map_err(|_| DeployerError::Decode {
                to,
                method: C::SIGNATURE,
            })
        }
        CallOutcome::Reverted(_) => Err(DeployerError::UnexpectedRevert {
            to,
            method: C::SIGNATURE,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::contracts::{IERC20Metadata, ISiloOracle};
    use crate::chain::mock::MockChain;
    use alloy::primitives::{address, U256};

    const TOKEN: Address = address!("0x1111111111111111111111111111111111111111");

    #[tokio::test]
    async fn test_try_call_answered() {
        let mut chain = MockChain::new(1);
        chain.respond(TOKEN, IERC20Metadata::decimalsCall {}, 6u8);
        let probe = try_call(&chain, TOKEN, &IERC20Metadata::decimalsCall {}).await.unwrap();
        assert_eq!(probe, Probe::Answered(6u8));
    }

    #[tokio::test]
    async fn test_try_call_revert_is_rejected() {
        let mut chain = MockChain::new(1);
        chain.revert(TOKEN, IERC20Metadata::decimalsCall {});
        let probe = try_call(&chain, TOKEN, &IERC20Metadata::decimalsCall {}).await.unwrap();
        assert_eq!(probe, Probe::Rejected);
    }

    #[tokio::test]
    async fn test_try_call_undecodable_is_rejected() {
        let mut chain = MockChain::new(1);
        chain.respond_raw(TOKEN, IERC20Metadata::decimalsCall {}.abi_encode(), Bytes::new());
        let probe = try_call(&chain, TOKEN, &IERC20Metadata::decimalsCall {}).await.unwrap();
        assert!(!probe.is_answered());
    }

    #[tokio::test]
    async fn test_transport_error_propagates() {
        let mut chain = MockChain::new(1);
        chain.fail_address(TOKEN);
        let call = ISiloOracle::quoteCall {
            _baseAmount: U256::from(1u64),
            _baseToken: TOKEN,
        };
        assert!(try_call(&chain, TOKEN, &call).await.is_err());
    }

    #[tokio::test]
    async fn test_call_required_revert_is_error() {
        let chain = MockChain::new(1);
        let err = call_required(&chain, TOKEN, &IERC20Metadata::symbolCall {})
            .await
            .unwrap_err();
        assert!(matches!(err, DeployerError::UnexpectedRevert { .. }));
    }
}
