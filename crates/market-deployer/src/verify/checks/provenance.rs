//! Every component of the market must come from a canonical factory, and the
//! hook receiver must be a minimal-proxy clone of the canonical hook.

use alloy::primitives::Address;
use std::sync::Arc;

use super::oracle::oracle_targets;
use super::MARKET_SOURCE;
use crate::chain::contracts::ICreatedInFactory;
use crate::chain::{try_call, Probe};
use crate::constants::{
    CHAINLINK_V3_ORACLE_FACTORY, DYNAMIC_KINK_FACTORY, EIP1167_PREFIX, EIP1167_SUFFIX, IRM_V2_FACTORY,
    MANAGEABLE_ORACLE_FACTORY, ORACLE_SCALER_FACTORY, PT_LINEAR_ORACLE_FACTORY,
};
use crate::types::{IrmKind, OracleKind, Side};
use crate::verify::check::{CheckOutcome, VerificationCheck};
use crate::verify::VerificationContext;

pub const FACTORY_PROVENANCE_ORDER: u32 = 120;
pub const HOOK_IMPLEMENTATION_ORDER: u32 = 130;

/// What the deployed component claims to be, and so which factory must
/// have created it.
#[derive(Debug, Clone)]
enum Expectation {
    Factory(&'static str),
    /// Kind could not be determined; the outcome is fixed.
    Unclassified(CheckOutcome),
}

fn irm_expectation(kind: IrmKind) -> Expectation {
    match kind {
        IrmKind::Kink => Expectation::Factory(DYNAMIC_KINK_FACTORY),
        IrmKind::Legacy => Expectation::Factory(IRM_V2_FACTORY),
        IrmKind::Unknown => Expectation::Unclassified(CheckOutcome::failed(
            "interest rate model answers neither the kink nor the v2 interface",
        )),
    }
}

fn oracle_expectation(kind: OracleKind) -> Option<Expectation> {
    let name = match kind {
        OracleKind::None => return None,
        OracleKind::Manageable => MANAGEABLE_ORACLE_FACTORY,
        OracleKind::Chainlink => CHAINLINK_V3_ORACLE_FACTORY,
        OracleKind::PtLinear => PT_LINEAR_ORACLE_FACTORY,
        OracleKind::Scaler => ORACLE_SCALER_FACTORY,
        OracleKind::Generic => {
            return Some(Expectation::Unclassified(CheckOutcome::warning(
                "oracle type not recognised; factory unknown",
            )))
        }
    };
    Some(Expectation::Factory(name))
}

pub fn factory_provenance(ctx: &Arc<VerificationContext>) -> Vec<VerificationCheck> {
    let mut checks = Vec::new();

    for side in Side::ALL {
        let s = ctx.snapshot.side(side);
        let expectation = irm_expectation(s.irm_kind);
        let component = s.interest_rate_model;
        let ctx = Arc::clone(ctx);
        checks.push(VerificationCheck::new(
            format!("factory_provenance:{side}:irm"),
            format!("{side} interest rate model provenance"),
            FACTORY_PROVENANCE_ORDER,
            side.label(),
            move || check_provenance(ctx, component, expectation),
        ));
    }

    for target in oracle_targets(ctx) {
        let Some(expectation) = oracle_expectation(target.oracle.kind) else {
            continue;
        };
        let component = target.oracle.address;
        let ctx = Arc::clone(ctx);
        checks.push(VerificationCheck::new(
            target.id("factory_provenance"),
            format!("{} provenance", target.label()),
            FACTORY_PROVENANCE_ORDER,
            target.side.label(),
            move || check_provenance(ctx, component, expectation),
        ));
    }
    checks
}

async fn check_provenance(
    ctx: Arc<VerificationContext>,
    component: Address,
    expectation: Expectation,
) -> anyhow::Result<CheckOutcome> {
    let name = match expectation {
        Expectation::Factory(name) => name,
        Expectation::Unclassified(outcome) => return Ok(outcome),
    };
    let Some(factory) = ctx.contracts.get(name) else {
        return Ok(CheckOutcome::warning(format!(
            "{name} not in the address book for this chain"
        )));
    };
    let call = ICreatedInFactory::createdInFactoryCall { _contract: component };
    let outcome = match try_call(ctx.reader.as_ref(), factory, &call).await? {
        Probe::Answered(true) => CheckOutcome::success(format!("{component} created by {name}")),
        Probe::Answered(false) => CheckOutcome::failed(format!("{component} not created by {name} ({factory})")),
        Probe::Rejected => CheckOutcome::failed(format!("{name} ({factory}) rejected createdInFactory")),
    };
    Ok(outcome)
}

pub fn hook_implementation(ctx: &Arc<VerificationContext>) -> Vec<VerificationCheck> {
    let ctx = Arc::clone(ctx);
    vec![VerificationCheck::new(
        "hook_implementation",
        "hook receiver implementation",
        HOOK_IMPLEMENTATION_ORDER,
        MARKET_SOURCE,
        move || check_hook_implementation(ctx),
    )]
}

async fn check_hook_implementation(ctx: Arc<VerificationContext>) -> anyhow::Result<CheckOutcome> {
    let hook = ctx.snapshot.silo0.hook_receiver;
    if hook.is_zero() {
        return Ok(CheckOutcome::failed("market has no hook receiver"));
    }
    let code = ctx.reader.get_code(hook).await?;
    let Some(implementation) = clone_implementation(&code) else {
        return Ok(CheckOutcome::failed(format!(
            "hook receiver {hook} is not a minimal proxy ({} bytes of code)",
            code.len()
        )));
    };

    let name = ctx.hook_implementation_name();
    let outcome = match ctx.contracts.get(name) {
        None => CheckOutcome::warning(format!(
            "hook clones {implementation}; {name} not in the address book"
        )),
        Some(expected) if expected == implementation => {
            CheckOutcome::success(format!("hook clones {name} ({implementation})"))
        }
        Some(expected) => CheckOutcome::failed(format!(
            "hook clones {implementation}, expected {name} ({expected})"
        )),
    };
    Ok(outcome)
}

/// Implementation address of an EIP-1167 clone's runtime code.
pub fn clone_implementation(code: &[u8]) -> Option<Address> {
    const LEN: usize = EIP1167_PREFIX.len() + 20 + EIP1167_SUFFIX.len();
    if code.len() != LEN || !code.starts_with(&EIP1167_PREFIX) || !code.ends_with(&EIP1167_SUFFIX) {
        return None;
    }
    Some(Address::from_slice(&code[EIP1167_PREFIX.len()..EIP1167_PREFIX.len() + 20]))
}

#[cfg(test)]
pub(crate) fn clone_code(implementation: Address) -> alloy::primitives::Bytes {
    let mut code = EIP1167_PREFIX.to_vec();
    code.extend_from_slice(implementation.as_slice());
    code.extend_from_slice(&EIP1167_SUFFIX);
    code.into()
}
