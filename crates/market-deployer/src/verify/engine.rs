//! Runs every check concurrently, isolates failures, and produces an
//! ordered report.

use alloy::primitives::Address;
use futures::FutureExt;
use serde::Serialize;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

use super::check::{CheckEvent, CheckOutcome, CheckResult, CheckStatus, VerificationCheck};
use super::registry::CheckRegistry;
use super::VerificationContext;

#[derive(Debug, Clone, Serialize)]
pub struct VerificationReport {
    pub silo_config: Address,
    pub chain_id: u64,
    /// Sorted by `(order, source, name)`.
    pub results: Vec<CheckResult>,
}

impl VerificationReport {
    pub fn count(&self, status: CheckStatus) -> usize {
        self.results.iter().filter(|r| r.status() == status).count()
    }

    /// No check failed. Warnings do not block.
    pub fn passed(&self) -> bool {
        self.count(CheckStatus::Failed) == 0
    }

    pub fn log_summary(&self) {
        info!("═══════════════════════════════════════════════════════════════");
        info!("          MARKET VERIFICATION - {}", self.silo_config);
        info!("═══════════════════════════════════════════════════════════════");

        for result in &self.results {
            let line = format!(
                "{} [{}] {} - {}",
                result.status().symbol(),
                result.info.source,
                result.info.name,
                result.outcome.message
            );
            match result.status() {
                CheckStatus::Success => info!("{line}"),
                CheckStatus::Warning => warn!("{line}"),
                CheckStatus::Failed => error!("{line}"),
            }
        }

        info!("───────────────────────────────────────────────────────────────");
        let (passed, warnings, failed) = (
            self.count(CheckStatus::Success),
            self.count(CheckStatus::Warning),
            self.count(CheckStatus::Failed),
        );
        if failed > 0 {
            error!(
                "RESULT: {}/{} checks passed, {} warnings - {} FAILED",
                passed,
                self.results.len(),
                warnings,
                failed
            );
        } else {
            info!(
                "RESULT: {}/{} checks passed, {} warnings - NO FAILURES",
                passed,
                self.results.len(),
                warnings
            );
        }
        info!("═══════════════════════════════════════════════════════════════");
    }
}

pub struct VerificationEngine {
    registry: CheckRegistry,
}

impl Default for VerificationEngine {
    fn default() -> Self {
        Self::new(CheckRegistry::with_default_checks())
    }
}

impl VerificationEngine {
    pub fn new(registry: CheckRegistry) -> Self {
        Self { registry }
    }

    /// Build the checks for `ctx` and run them all. Never fails: errors and
    /// panics inside a probe become a `failed` result for that check.
    pub async fn run(
        &self,
        ctx: Arc<VerificationContext>,
        progress: Option<mpsc::Sender<CheckEvent>>,
    ) -> VerificationReport {
        let checks = self.registry.build(&ctx);
        info!(
            silo_config = %ctx.snapshot.silo_config,
            checks = checks.len(),
            "running verification"
        );
        let results = run_checks(checks, progress).await;
        VerificationReport {
            silo_config: ctx.snapshot.silo_config,
            chain_id: ctx.snapshot.chain_id,
            results,
        }
    }
}

/// Run `checks` concurrently and return their results sorted by
/// `(order, source, name)`.
pub async fn run_checks(
    checks: Vec<VerificationCheck>,
    progress: Option<mpsc::Sender<CheckEvent>>,
) -> Vec<CheckResult> {
    if let Some(tx) = &progress {
        for check in &checks {
            let _ = tx
                .send(CheckEvent::Pending {
                    id: check.info.id.clone(),
                })
                .await;
        }
    }

    let futures = checks.into_iter().map(|check| run_check(check, progress.clone()));
    let mut results = futures::future::join_all(futures).await;

    results.sort_by(|a, b| {
        (a.info.order, &a.info.source, &a.info.name).cmp(&(b.info.order, &b.info.source, &b.info.name))
    });
    results
}

async fn run_check(check: VerificationCheck, progress: Option<mpsc::Sender<CheckEvent>>) -> CheckResult {
    let (info, probe) = check.into_parts();
    if let Some(tx) = &progress {
        let _ = tx.send(CheckEvent::Running { id: info.id.clone() }).await;
    }

    let outcome = match AssertUnwindSafe(async move { probe().await }).catch_unwind().await {
        Ok(Ok(outcome)) => outcome,
        Ok(Err(e)) => {
            warn!(check = %info.id, error = %e, "check errored");
            CheckOutcome::failed(format!("check errored: {e:#}"))
        }
        Err(panic) => {
            let reason = panic
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| panic.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "unknown panic".to_string());
            error!(check = %info.id, reason = %reason, "check panicked");
            CheckOutcome::failed(format!("check panicked: {reason}"))
        }
    };

    let result = CheckResult { info, outcome };
    if let Some(tx) = &progress {
        let _ = tx.send(CheckEvent::Finished(result.clone())).await;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::AddressBook;
    use crate::chain::contracts::{ICreatedInFactory, ISiloOracle};
    use crate::chain::snapshot::fixtures::*;
    use crate::chain::snapshot::one_token;
    use crate::config::{ReferenceConfig, ReferencePrice};
    use crate::constants::{DYNAMIC_KINK_FACTORY, ORACLE_SCALER_FACTORY, SILO_HOOK_V1};
    use crate::verify::checks::oracle::large_amount;
    use crate::verify::checks::provenance::clone_code;
    use crate::verify::checks::testing::{context_for, fixture_context};
    use alloy::primitives::{address, U256};
    use rust_decimal::Decimal;

    fn check(id: &str, order: u32, source: &str, outcome: CheckOutcome) -> VerificationCheck {
        VerificationCheck::new(id, id, order, source, move || async move {
            Ok::<_, anyhow::Error>(outcome)
        })
    }

    #[tokio::test]
    async fn test_error_and_panic_are_isolated() {
        let checks = vec![
            VerificationCheck::new("errors", "errors", 1, "market", || async {
                Err::<CheckOutcome, _>(anyhow::anyhow!("rpc went away"))
            }),
            VerificationCheck::new("panics", "panics", 2, "market", || async {
                if true {
                    panic!("boom");
                }
                Ok::<_, anyhow::Error>(CheckOutcome::success("unreachable"))
            }),
            check("fine", 3, "market", CheckOutcome::success("ok")),
        ];
        let results = run_checks(checks, None).await;

        assert_eq!(results.len(), 3);
        assert_eq!(results[0].status(), CheckStatus::Failed);
        assert_eq!(results[0].outcome.message, "check errored: rpc went away");
        assert_eq!(results[1].status(), CheckStatus::Failed);
        assert_eq!(results[1].outcome.message, "check panicked: boom");
        assert_eq!(results[2].status(), CheckStatus::Success);
    }

    #[tokio::test]
    async fn test_sorted_by_order_source_name() {
        let checks = vec![
            check("c", 20, "market", CheckOutcome::success("")),
            check("b", 10, "silo1", CheckOutcome::success("")),
            check("a", 10, "silo0", CheckOutcome::success("")),
            check("z", 10, "market", CheckOutcome::success("")),
        ];
        let ids: Vec<String> = run_checks(checks, None)
            .await
            .into_iter()
            .map(|r| r.info.id)
            .collect();
        assert_eq!(ids, ["z", "a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_repeated_runs_are_stable() {
        let engine = VerificationEngine::default();
        let ctx = Arc::new(fixture_context().await);
        let first = engine.run(Arc::clone(&ctx), None).await;
        let second = engine.run(ctx, None).await;
        assert_eq!(first.results, second.results);
    }

    #[tokio::test]
    async fn test_progress_events() {
        let (tx, mut rx) = mpsc::channel(16);
        let checks = vec![
            check("a", 1, "market", CheckOutcome::success("")),
            check("b", 2, "market", CheckOutcome::warning("")),
        ];
        run_checks(checks, Some(tx)).await;

        let mut events = Vec::new();
        while let Some(event) = rx.recv().await {
            events.push(event);
        }
        assert_eq!(events.len(), 6);
        assert_eq!(events[0], CheckEvent::Pending { id: "a".into() });
        assert_eq!(events[1], CheckEvent::Pending { id: "b".into() });
        let finished = events
            .iter()
            .filter(|e| matches!(e, CheckEvent::Finished(_)))
            .count();
        assert_eq!(finished, 2);
    }

    #[tokio::test]
    async fn test_closed_progress_channel_is_ignored() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let results = run_checks(vec![check("a", 1, "market", CheckOutcome::success(""))], Some(tx)).await;
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn test_dao_fee_through_engine() {
        let ctx = Arc::new(fixture_context().await);
        let report = VerificationEngine::default().run(ctx, None).await;
        let dao = report
            .results
            .iter()
            .find(|r| r.info.id == "dao_fee")
            .unwrap();
        assert_eq!(dao.status(), CheckStatus::Success);
        assert_eq!(dao.outcome.message, "daoFee 5% within 0.01%–25% range");
    }

    #[tokio::test]
    async fn test_fully_configured_market_passes() {
        const KINK_FACTORY: Address = address!("0x6161616161616161616161616161616161616161");
        const SCALER_FACTORY: Address = address!("0x6262626262626262626262626262626262626262");
        const HOOK_IMPL: Address = address!("0x6363636363636363636363636363636363636363");

        let mut chain = market_chain();
        chain.respond(
            ORACLE0,
            ISiloOracle::quoteCall {
                _baseAmount: large_amount(18).unwrap(),
                _baseToken: TOKEN0,
            },
            U256::from(3_000u64) * one_token(26).unwrap(),
        );
        for irm in [IRM0, IRM1] {
            chain.respond(KINK_FACTORY, ICreatedInFactory::createdInFactoryCall { _contract: irm }, true);
        }
        chain.respond(SCALER_FACTORY, ICreatedInFactory::createdInFactoryCall { _contract: ORACLE0 }, true);
        chain.set_code(HOOK, clone_code(HOOK_IMPL));

        let contracts = AddressBook::new("mainnet")
            .with(DYNAMIC_KINK_FACTORY, KINK_FACTORY)
            .with(ORACLE_SCALER_FACTORY, SCALER_FACTORY)
            .with(SILO_HOOK_V1, HOOK_IMPL);
        let reference = ReferenceConfig {
            hook_owner: Some(HOOK_OWNER),
            irm_owner: Some(HOOK_OWNER),
            prices: vec![ReferencePrice {
                base: TOKEN0,
                quote: TOKEN1,
                price: Decimal::from(3000),
            }],
        };
        let ctx = context_for(chain)
            .await
            .with_chain_id(CHAIN_ID)
            .with_contracts(contracts)
            .with_reference(reference);

        let report = VerificationEngine::default().run(Arc::new(ctx), None).await;
        for result in &report.results {
            assert_eq!(
                result.status(),
                CheckStatus::Success,
                "{}: {}",
                result.info.id,
                result.outcome.message
            );
        }
        assert!(report.passed());
        assert_eq!(report.results[0].info.id, "chain_identity");
        assert_eq!(report.results.last().unwrap().info.id, "hook_implementation");
    }
}
