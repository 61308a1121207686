use alloy::primitives::Address;
use std::sync::Arc;

use crate::catalog::{AddressBook, OracleCatalog};
use crate::chain::ChainReader;
use crate::config::{ReferenceConfig, VerificationConfig};
use crate::constants::SILO_HOOK_V1;
use crate::types::{ConfigSnapshot, IrmSelection, MarketConfiguration, Side};

/// Read-only inputs shared by every check of one run.
pub struct VerificationContext {
    pub snapshot: ConfigSnapshot,
    /// Wizard configuration the market was deployed from, when known.
    pub expected: Option<MarketConfiguration>,
    /// Chain id the operator expects to be talking to.
    pub expected_chain_id: Option<u64>,
    pub reference: ReferenceConfig,
    pub bounds: VerificationConfig,
    /// Canonical contracts on this chain (factories, hook implementations).
    pub contracts: AddressBook,
    /// Oracle factories and catalogued oracles, for resolving wizard slots.
    pub oracles: OracleCatalog,
    pub reader: Arc<dyn ChainReader>,
}

impl VerificationContext {
    pub fn new(snapshot: ConfigSnapshot, reader: Arc<dyn ChainReader>) -> Self {
        Self {
            snapshot,
            expected: None,
            expected_chain_id: None,
            reference: ReferenceConfig::default(),
            bounds: VerificationConfig::default(),
            contracts: AddressBook::default(),
            oracles: OracleCatalog::default(),
            reader,
        }
    }

    pub fn with_expected(mut self, expected: MarketConfiguration) -> Self {
        self.expected = Some(expected);
        self
    }

    pub fn with_chain_id(mut self, chain_id: u64) -> Self {
        self.expected_chain_id = Some(chain_id);
        self
    }

    pub fn with_reference(mut self, reference: ReferenceConfig) -> Self {
        self.reference = reference;
        self
    }

    pub fn with_bounds(mut self, bounds: VerificationConfig) -> Self {
        self.bounds = bounds;
        self
    }

    pub fn with_contracts(mut self, contracts: AddressBook) -> Self {
        self.contracts = contracts;
        self
    }

    pub fn with_oracles(mut self, oracles: OracleCatalog) -> Self {
        self.oracles = oracles;
        self
    }

    /// Configured hook owner, else the one entered in the wizard.
    pub fn reference_hook_owner(&self) -> Option<Address> {
        self.reference
            .hook_owner
            .or_else(|| self.expected.as_ref().and_then(|e| e.valid_hook_owner()))
    }

    /// Configured IRM owner, else the kink owner entered for `side`.
    pub fn reference_irm_owner(&self, side: Side) -> Option<Address> {
        self.reference.irm_owner.or_else(|| {
            self.expected.as_ref().and_then(|e| match &e.side(side).irm {
                IrmSelection::Kink(cfg) => Some(cfg.initial_owner),
                IrmSelection::Legacy(_) => None,
            })
        })
    }

    /// Address-book name of the hook implementation markets clone.
    pub fn hook_implementation_name(&self) -> &str {
        self.expected
            .as_ref()
            .map(|e| e.hook_implementation.as_str())
            .unwrap_or(SILO_HOOK_V1)
    }

    /// Decimals of one of the two market tokens.
    pub fn market_token_decimals(&self, token: Address) -> Option<u8> {
        Side::ALL
            .iter()
            .map(|side| &self.snapshot.side(*side).token)
            .find(|t| t.address == token)
            .map(|t| t.decimals)
    }
}
