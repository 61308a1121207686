use std::sync::Arc;

use super::MARKET_SOURCE;
use crate::verify::check::{CheckOutcome, VerificationCheck};
use crate::verify::VerificationContext;

pub const CHAIN_IDENTITY_ORDER: u32 = 0;

/// The node still reports the chain the snapshot was read from, and that
/// chain is the configured one.
pub fn chain_identity(ctx: &Arc<VerificationContext>) -> Vec<VerificationCheck> {
    let ctx = Arc::clone(ctx);
    vec![VerificationCheck::new(
        "chain_identity",
        "chain identity",
        CHAIN_IDENTITY_ORDER,
        MARKET_SOURCE,
        move || check_chain_identity(ctx),
    )]
}

async fn check_chain_identity(ctx: Arc<VerificationContext>) -> anyhow::Result<CheckOutcome> {
    let live = ctx.reader.chain_id().await?;
    let read = ctx.snapshot.chain_id;
    if live != read {
        return Ok(CheckOutcome::failed(format!(
            "node reports chain {live} but the snapshot was read on chain {read}"
        )));
    }
    let outcome = match ctx.expected_chain_id {
        None => CheckOutcome::warning(format!("no configured chain id; node reports chain {live}")),
        Some(expected) if expected == live => CheckOutcome::success(format!("chain {live}")),
        Some(expected) => {
            CheckOutcome::failed(format!("node reports chain {live}, configured chain is {expected}"))
        }
    };
    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::verify::check::CheckStatus;
    use crate::verify::checks::testing::{fixture_context, run_all};

    #[tokio::test]
    async fn test_chain_identity() {
        let ctx = Arc::new(fixture_context().await.with_chain_id(1));
        assert_eq!(run_all(chain_identity(&ctx)).await[0].1.status, CheckStatus::Success);

        let ctx = Arc::new(fixture_context().await.with_chain_id(10));
        let (_, outcome) = &run_all(chain_identity(&ctx)).await[0];
        assert_eq!(outcome.status, CheckStatus::Failed);
        assert_eq!(outcome.message, "node reports chain 1, configured chain is 10");

        let ctx = Arc::new(fixture_context().await);
        assert_eq!(run_all(chain_identity(&ctx)).await[0].1.status, CheckStatus::Warning);
    }
}
