//! Risk parameter invariants and comparison against the wizard input.

use alloy::primitives::{Address, U256};
use std::sync::Arc;

use super::pct;
use crate::catalog::OracleCatalog;
use crate::compiler::resolve_slot;
use crate::constants::WAD;
use crate::types::oracle::ScalerOracle;
use crate::types::{
    IrmKind, IrmSelection, MarketConfiguration, OracleKind, OracleRole, OracleSelection,
    OracleSnapshot, Side, SideSnapshot,
};
use crate::verify::check::{CheckOutcome, VerificationCheck};
use crate::verify::VerificationContext;

pub const RISK_PARAMETERS_ORDER: u32 = 50;
pub const EXPECTED_CONFIG_ORDER: u32 = 60;

pub fn risk_parameters(ctx: &Arc<VerificationContext>) -> Vec<VerificationCheck> {
    Side::ALL
        .into_iter()
        .map(|side| {
            let ctx = Arc::clone(ctx);
            VerificationCheck::new(
                format!("risk_parameters:{side}"),
                format!("{side} risk parameters"),
                RISK_PARAMETERS_ORDER,
                side.label(),
                move || check_risk_parameters(ctx, side),
            )
        })
        .collect()
}

async fn check_risk_parameters(ctx: Arc<VerificationContext>, side: Side) -> anyhow::Result<CheckOutcome> {
    let s = ctx.snapshot.side(side);
    let violations = risk_violations(s);
    if violations.is_empty() {
        Ok(CheckOutcome::success(format!(
            "maxLtv {}, lt {}, liquidationTargetLtv {}, liquidationFee {}",
            pct(s.max_ltv),
            pct(s.lt),
            pct(s.liquidation_target_ltv),
            pct(s.liquidation_fee)
        )))
    } else {
        Ok(CheckOutcome::failed(violations.join("; ")))
    }
}

/// Same invariants the compiler enforces, on the stored fixed-point values.
fn risk_violations(s: &SideSnapshot) -> Vec<String> {
    let mut out = Vec::new();

    if s.max_ltv > s.lt {
        out.push(format!("maxLtv {} exceeds lt {}", pct(s.max_ltv), pct(s.lt)));
    }

    let zeros = [s.max_ltv.is_zero(), s.lt.is_zero(), s.liquidation_fee.is_zero()];
    if zeros.iter().any(|z| *z) && !zeros.iter().all(|z| *z) {
        out.push("maxLtv, lt and liquidationFee must be all zero or all non-zero".to_string());
    }

    if s.lt.is_zero() {
        if !s.liquidation_target_ltv.is_zero() {
            out.push(format!(
                "liquidationTargetLtv {} set while lt is 0",
                pct(s.liquidation_target_ltv)
            ));
        }
    } else if s.liquidation_target_ltv >= s.lt {
        out.push(format!(
            "liquidationTargetLtv {} not below lt {}",
            pct(s.liquidation_target_ltv),
            pct(s.lt)
        ));
    }

    if s.lt.saturating_add(s.liquidation_fee) > WAD {
        out.push(format!(
            "lt {} + liquidationFee {} exceeds 100%",
            pct(s.lt),
            pct(s.liquidation_fee)
        ));
    }
    out
}

/// Only registered when the wizard configuration is supplied.
pub fn expected_config(ctx: &Arc<VerificationContext>) -> Vec<VerificationCheck> {
    if ctx.expected.is_none() {
        return Vec::new();
    }
    Side::ALL
        .into_iter()
        .map(|side| {
            let ctx = Arc::clone(ctx);
            VerificationCheck::new(
                format!("expected_config:{side}"),
                format!("{side} matches wizard configuration"),
                EXPECTED_CONFIG_ORDER,
                side.label(),
                move || check_expected_config(ctx, side),
            )
        })
        .collect()
}

async fn check_expected_config(ctx: Arc<VerificationContext>, side: Side) -> anyhow::Result<CheckOutcome> {
    let Some(expected) = &ctx.expected else {
        return Ok(CheckOutcome::warning("no wizard configuration supplied"));
    };
    let mismatches = config_mismatches(expected, &ctx.oracles, side, ctx.snapshot.side(side));
    if mismatches.is_empty() {
        Ok(CheckOutcome::success("on-chain values match the wizard configuration"))
    } else {
        Ok(CheckOutcome::failed(mismatches.join("; ")))
    }
}

fn config_mismatches(
    expected: &MarketConfiguration,
    catalog: &OracleCatalog,
    side: Side,
    actual: &SideSnapshot,
) -> Vec<String> {
    let want = expected.side(side);
    let mut out = Vec::new();

    if want.token.address != actual.token.address {
        out.push(format!("token {} expected {}", actual.token.address, want.token.address));
    }

    let values: [(&str, U256, U256); 7] = [
        ("daoFee", expected.dao_fee.to_wad(), actual.dao_fee),
        ("deployerFee", expected.deployer_fee.to_wad(), actual.deployer_fee),
        ("maxLtv", want.max_ltv.to_wad(), actual.max_ltv),
        ("lt", want.lt.to_wad(), actual.lt),
        ("liquidationTargetLtv", want.liquidation_target_ltv.to_wad(), actual.liquidation_target_ltv),
        ("liquidationFee", want.liquidation_fee.to_wad(), actual.liquidation_fee),
        ("flashloanFee", want.flashloan_fee.to_wad(), actual.flashloan_fee),
    ];
    for (label, want, got) in values {
        if want != got {
            out.push(format!("{label} {} expected {}", pct(got), pct(want)));
        }
    }

    if want.call_before_quote != actual.call_before_quote {
        out.push(format!(
            "callBeforeQuote {} expected {}",
            actual.call_before_quote, want.call_before_quote
        ));
    }

    let irm_matches = matches!(
        (&want.irm, actual.irm_kind),
        (IrmSelection::Legacy(_), IrmKind::Legacy) | (IrmSelection::Kink(_), IrmKind::Kink)
    );
    if !irm_matches {
        out.push(format!(
            "interest rate model is {:?}, expected {}",
            actual.irm_kind,
            want.irm.kind_label()
        ));
    }

    for role in OracleRole::ALL {
        let input = match role {
            OracleRole::Solvency => &want.solvency_oracle,
            OracleRole::MaxLtv => &want.max_ltv_oracle,
        };
        let oracle = actual.oracle(role);
        if input.is_empty() != !oracle.is_set() {
            out.push(format!(
                "{} is {}, expected {}",
                role.label(),
                if oracle.is_set() { "set" } else { "unset" },
                if input.is_empty() { "none" } else { "one" }
            ));
        } else if oracle.is_set()
            && expected.manageable_oracle.is_some()
            && oracle.kind != OracleKind::Manageable
        {
            out.push(format!("{} is not wrapped in a manageable oracle", role.label()));
        } else if let Some(want_oracle) = expected_deployed_oracle(expected, catalog, side, role) {
            let got = deployed_oracle(oracle);
            if got != want_oracle {
                out.push(format!("{} is {got}, expected {want_oracle}", role.label()));
            }
        }
    }
    out
}

/// Pre-deployed oracle the compiler would have placed in this slot.
fn expected_deployed_oracle(
    expected: &MarketConfiguration,
    catalog: &OracleCatalog,
    side: Side,
    role: OracleRole,
) -> Option<Address> {
    let input = match role {
        OracleRole::Solvency => &expected.side(side).solvency_oracle,
        OracleRole::MaxLtv => &expected.side(side).max_ltv_oracle,
    };
    // Resolution gaps were already reported when the market was compiled.
    let mut warnings = Vec::new();
    match resolve_slot(input, side, role, expected, catalog, &mut warnings) {
        OracleSelection::Scaler(ScalerOracle::Deployed(address)) => Some(address),
        _ => None,
    }
}

/// Oracle doing the pricing: the wrapped one behind a manageable oracle.
fn deployed_oracle(oracle: &OracleSnapshot) -> Address {
    match (oracle.kind, oracle.underlying) {
        (OracleKind::Manageable, Some(inner)) => inner,
        _ => oracle.address,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::contracts::ISiloConfig;
    use crate::chain::snapshot::fixtures::*;
    use crate::verify::check::CheckStatus;
    use crate::catalog::{KnownOracle, KnownOracleKind};
    use crate::verify::checks::testing::{context_for, fixture_context, run_all};
    use alloy::primitives::address;

    fn expected_market() -> MarketConfiguration {
        let irm = serde_json::json!({
            "kind": "kink",
            "ulow": "0", "u1": "0", "u2": "0", "ucrit": "0", "rmin": "0",
            "kmin": "0", "kmax": "0", "alpha": "0", "cminus": "0", "cplus": "0",
            "c1": "0", "c2": "0", "dmax": "0",
            "timelock": 0, "rcompCap": "0",
            "initialOwner": HOOK_OWNER
        });
        let side = |token: Address, decimals: u8, oracle: serde_json::Value| {
            serde_json::json!({
                "token": { "address": token, "decimals": decimals },
                "solvency_oracle": oracle.clone(),
                "max_ltv_oracle": oracle,
                "irm": irm.clone(),
                "max_ltv": "75", "lt": "85", "liquidation_target_ltv": "80",
                "liquidation_fee": "5", "flashloan_fee": "0"
            })
        };
        serde_json::from_value(serde_json::json!({
            "silo0": side(TOKEN0, 18, serde_json::json!({ "scaler": { "deployed": ORACLE0 } })),
            "silo1": side(TOKEN1, 6, serde_json::json!({})),
            "dao_fee": "5",
            "deployer_fee": "0",
            "hook_owner": HOOK_OWNER
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_fixture_risk_parameters_pass() {
        let ctx = Arc::new(fixture_context().await);
        let results = run_all(risk_parameters(&ctx)).await;
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|(_, o)| o.status == CheckStatus::Success));
        assert_eq!(
            results[0].1.message,
            "maxLtv 75%, lt 85%, liquidationTargetLtv 80%, liquidationFee 5%"
        );
    }

    #[tokio::test]
    async fn test_risk_violations_reported_together() {
        let mut chain = market_chain();
        let mut data = config_data(SILO1, TOKEN1, Address::ZERO, IRM1);
        data.maxLtv = wad_pct(90);
        data.liquidationFee = U256::ZERO;
        chain.respond(SILO_CONFIG, ISiloConfig::getConfigCall { _silo: SILO1 }, data);
        let ctx = Arc::new(context_for(chain).await);

        let results = run_all(risk_parameters(&ctx)).await;
        let (id, outcome) = &results[1];
        assert_eq!(id, "risk_parameters:silo1");
        assert_eq!(outcome.status, CheckStatus::Failed);
        assert!(outcome.message.contains("maxLtv 90% exceeds lt 85%"));
        assert!(outcome.message.contains("all zero or all non-zero"));
    }

    #[tokio::test]
    async fn test_expected_config_skipped_without_wizard_input() {
        let ctx = Arc::new(fixture_context().await);
        assert!(expected_config(&ctx).is_empty());
    }

    #[tokio::test]
    async fn test_expected_config_matches_fixture() {
        let ctx = Arc::new(fixture_context().await.with_expected(expected_market()));
        let results = run_all(expected_config(&ctx)).await;
        assert_eq!(results.len(), 2);
        for (id, outcome) in &results {
            assert_eq!(outcome.status, CheckStatus::Success, "{id}: {}", outcome.message);
        }
    }

    #[tokio::test]
    async fn test_expected_config_lists_mismatches() {
        let mut expected = expected_market();
        expected.silo0.lt = "86".parse().unwrap();
        expected.silo0.call_before_quote = true;
        let ctx = Arc::new(fixture_context().await.with_expected(expected));
        let results = run_all(expected_config(&ctx)).await;
        let (_, outcome) = &results[0];
        assert_eq!(outcome.status, CheckStatus::Failed);
        assert!(outcome.message.contains("lt 85% expected 86%"), "got: {}", outcome.message);
        assert!(outcome.message.contains("callBeforeQuote false expected true"));
        assert_eq!(results[1].1.status, CheckStatus::Success);
    }

    #[tokio::test]
    async fn test_expected_config_flags_other_deployed_oracle() {
        const OTHER_ORACLE: Address = address!("0xdeaddeaddeaddeaddeaddeaddeaddeaddeaddead");
        let mut expected = expected_market();
        let wrong = serde_json::json!({ "scaler": { "deployed": OTHER_ORACLE } });
        expected.silo0.solvency_oracle = serde_json::from_value(wrong.clone()).unwrap();
        expected.silo0.max_ltv_oracle = serde_json::from_value(wrong).unwrap();
        let ctx = Arc::new(fixture_context().await.with_expected(expected));

        let results = run_all(expected_config(&ctx)).await;
        let (_, outcome) = &results[0];
        assert_eq!(outcome.status, CheckStatus::Failed);
        assert!(
            outcome
                .message
                .contains(&format!("solvency oracle is {ORACLE0}, expected {OTHER_ORACLE}")),
            "got: {}",
            outcome.message
        );
        assert!(outcome.message.contains("maxLtv oracle is"));
    }

    #[tokio::test]
    async fn test_expected_config_resolves_catalogued_scaler() {
        let mut expected = expected_market();
        let catalogued = serde_json::json!({ "scaler": {} });
        expected.silo0.solvency_oracle = serde_json::from_value(catalogued.clone()).unwrap();
        expected.silo0.max_ltv_oracle = serde_json::from_value(catalogued).unwrap();
        let known = |address: Address| {
            OracleCatalog::new(vec![KnownOracle {
                name: "WETH scaler".into(),
                address,
                kind: KnownOracleKind::Scaler,
                quote_token: TOKEN0,
            }])
        };

        let ctx = Arc::new(
            fixture_context()
                .await
                .with_expected(expected.clone())
                .with_oracles(known(ORACLE0)),
        );
        let results = run_all(expected_config(&ctx)).await;
        assert_eq!(results[0].1.status, CheckStatus::Success, "{}", results[0].1.message);

        let ctx = Arc::new(
            fixture_context()
                .await
                .with_expected(expected)
                .with_oracles(known(Address::repeat_byte(0x0b))),
        );
        let results = run_all(expected_config(&ctx)).await;
        assert_eq!(results[0].1.status, CheckStatus::Failed);
    }
}
