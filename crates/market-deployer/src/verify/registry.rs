use std::sync::Arc;

use super::check::VerificationCheck;
use super::checks::{chain, fees, oracle, ownership, provenance, risk};
use super::VerificationContext;

/// Builds zero or more checks from the shared context.
pub type CheckFactory = fn(&Arc<VerificationContext>) -> Vec<VerificationCheck>;

/// Ordered list of check factories. Registration order only affects ties;
/// the engine sorts results by `(order, source, name)`.
#[derive(Default)]
pub struct CheckRegistry {
    factories: Vec<(&'static str, CheckFactory)>,
}

impl CheckRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, name: &'static str, factory: CheckFactory) -> &mut Self {
        self.factories.push((name, factory));
        self
    }

    /// Every check the verifier knows about.
    pub fn with_default_checks() -> Self {
        let mut registry = Self::new();
        registry
            .register("chain_identity", chain::chain_identity)
            .register("dao_fee", fees::dao_fee)
            .register("deployer_fee", fees::deployer_fee)
            .register("liquidation_fee", fees::liquidation_fee)
            .register("flashloan_fee", fees::flashloan_fee)
            .register("risk_parameters", risk::risk_parameters)
            .register("expected_config", risk::expected_config)
            .register("oracle_price", oracle::oracle_price)
            .register("oracle_quote_token", oracle::oracle_quote_token)
            .register("oracle_zero_amount", oracle::oracle_zero_amount)
            .register("oracle_large_amount", oracle::oracle_large_amount)
            .register("pt_linear", oracle::pt_linear)
            .register("hook_owner", ownership::hook_owner)
            .register("irm_owner", ownership::irm_owner)
            .register("factory_provenance", provenance::factory_provenance)
            .register("hook_implementation", provenance::hook_implementation);
        registry
    }

    pub fn names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.factories.iter().map(|(name, _)| *name)
    }

    /// Instantiate every registered factory against `ctx`.
    pub fn build(&self, ctx: &Arc<VerificationContext>) -> Vec<VerificationCheck> {
        self.factories
            .iter()
            .flat_map(|(_, factory)| factory(ctx))
            .collect()
    }
}
