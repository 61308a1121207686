//! Check factories. Each takes the shared context and returns zero or more
//! checks, usually one per side.

pub mod chain;
pub mod fees;
pub mod oracle;
pub mod ownership;
pub mod provenance;
pub mod risk;

use alloy::primitives::U256;
use rust_decimal::Decimal;

use crate::types::fixed_point::display_wad_percent;
use crate::types::Percent;

pub const MARKET_SOURCE: &str = "market";

/// Display-percent bound as 18-decimal fixed point.
pub(crate) fn wad_bound(pct: Decimal) -> anyhow::Result<U256> {
    Ok(Percent::new(pct)?.to_wad())
}

pub(crate) fn pct(raw: U256) -> String {
    display_wad_percent(raw)
}

#[cfg(test)]
pub(crate) mod testing {
    use std::sync::Arc;

    use crate::chain::mock::MockChain;
    use crate::chain::read_snapshot;
    use crate::chain::snapshot::fixtures::{market_chain, SILO_CONFIG};
    use crate::verify::check::{CheckOutcome, VerificationCheck};
    use crate::verify::VerificationContext;

    /// Snapshot of `chain` wrapped in a default context over the same chain.
    pub async fn context_for(chain: MockChain) -> VerificationContext {
        let snapshot = read_snapshot(&chain, SILO_CONFIG).await.unwrap();
        VerificationContext::new(snapshot, Arc::new(chain))
    }

    pub async fn fixture_context() -> VerificationContext {
        context_for(market_chain()).await
    }

    /// Run every check in `checks` and collect `(id, outcome)`.
    pub async fn run_all(checks: Vec<VerificationCheck>) -> Vec<(String, CheckOutcome)> {
        let mut out = Vec::new();
        for check in checks {
            let (info, probe) = check.into_parts();
            out.push((info.id, probe().await.unwrap()));
        }
        out
    }
}
