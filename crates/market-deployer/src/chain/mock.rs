//! In-memory [`ChainReader`] for tests. Calls are keyed by exact
//! `(address, calldata)`; anything not registered reverts with empty data,
//! which is what a contract without the selector does.

use alloy::primitives::{Address, Bytes, Log, B256};
use alloy::sol_types::SolCall;
use alloy::transports::{TransportError, TransportErrorKind};
use futures::future::BoxFuture;
use std::collections::{HashMap, HashSet};

use super::reader::{CallOutcome, ChainReader};

#[derive(Debug, Default, Clone)]
pub struct MockChain {
    chain_id: u64,
    calls: HashMap<(Address, Bytes), CallOutcome>,
    code: HashMap<Address, Bytes>,
    receipts: HashMap<B256, Vec<Log>>,
    failing: HashSet<Address>,
}

impl MockChain {
    pub fn new(chain_id: u64) -> Self {
        Self {
            chain_id,
            ..Default::default()
        }
    }

    /// Register a typed answer for `call` on `to`.
    pub fn respond<C: SolCall>(&mut self, to: Address, call: C, ret: C::Return) {
        let output = C::abi_encode_returns(&ret);
        self.respond_raw(to, call.abi_encode(), Bytes::from(output));
    }

    pub fn respond_raw(&mut self, to: Address, input: Vec<u8>, output: Bytes) {
        self.calls
            .insert((to, Bytes::from(input)), CallOutcome::Returned(output));
    }

    pub fn revert<C: SolCall>(&mut self, to: Address, call: C) {
        self.calls
            .insert((to, Bytes::from(call.abi_encode())), CallOutcome::Reverted(Bytes::new()));
    }

    pub fn set_code(&mut self, address: Address, code: Bytes) {
        self.code.insert(address, code);
    }

    pub fn set_receipt(&mut self, tx_hash: B256, logs: Vec<Log>) {
        self.receipts.insert(tx_hash, logs);
    }

    /// Every call to `address` fails at the transport level.
    pub fn fail_address(&mut self, address: Address) {
        self.failing.insert(address);
    }
}

impl ChainReader for MockChain {
    fn chain_id(&self) -> BoxFuture<'_, Result<u64, TransportError>> {
        let id = self.chain_id;
        Box::pin(async move { Ok(id) })
    }

    fn call(&self, to: Address, input: Bytes) -> BoxFuture<'_, Result<CallOutcome, TransportError>> {
        let outcome = if self.failing.contains(&to) {
            Err(TransportErrorKind::custom_str("connection refused"))
        } else {
            Ok(self
                .calls
                .get(&(to, input))
                .cloned()
                .unwrap_or(CallOutcome::Reverted(Bytes::new())))
        };
        Box::pin(async move { outcome })
    }

    fn get_code(&self, address: Address) -> BoxFuture<'_, Result<Bytes, TransportError>> {
        let code = if self.failing.contains(&address) {
            Err(TransportErrorKind::custom_str("connection refused"))
        } else {
            Ok(self.code.get(&address).cloned().unwrap_or_default())
        };
        Box::pin(async move { code })
    }

    fn receipt_logs(&self, tx_hash: B256) -> BoxFuture<'_, Result<Option<Vec<Log>>, TransportError>> {
        let logs = self.receipts.get(&tx_hash).cloned();
        Box::pin(async move { Ok(logs) })
    }
}
