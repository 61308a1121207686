use alloy::primitives::Address;
use std::sync::Arc;

use super::MARKET_SOURCE;
use crate::chain::contracts::IOwnable;
use crate::chain::{try_call, Probe};
use crate::types::{IrmKind, Side};
use crate::verify::check::{CheckOutcome, VerificationCheck};
use crate::verify::VerificationContext;

pub const HOOK_OWNER_ORDER: u32 = 100;
pub const IRM_OWNER_ORDER: u32 = 110;

/// Both silos share one hook receiver, owned by the expected address.
pub fn hook_owner(ctx: &Arc<VerificationContext>) -> Vec<VerificationCheck> {
    let ctx = Arc::clone(ctx);
    vec![VerificationCheck::new(
        "hook_owner",
        "hook receiver owner",
        HOOK_OWNER_ORDER,
        MARKET_SOURCE,
        move || check_hook_owner(ctx),
    )]
}

async fn check_hook_owner(ctx: Arc<VerificationContext>) -> anyhow::Result<CheckOutcome> {
    let (silo0, silo1) = (&ctx.snapshot.silo0, &ctx.snapshot.silo1);
    if silo0.hook_receiver != silo1.hook_receiver {
        return Ok(CheckOutcome::failed(format!(
            "silos use different hook receivers: {} and {}",
            silo0.hook_receiver, silo1.hook_receiver
        )));
    }
    if silo0.hook_receiver.is_zero() {
        return Ok(CheckOutcome::failed("market has no hook receiver"));
    }
    let Some(owner) = silo0.hook_owner else {
        return Ok(CheckOutcome::failed(format!(
            "hook receiver {} does not answer owner()",
            silo0.hook_receiver
        )));
    };
    Ok(compare_owner("hook owner", owner, ctx.reference_hook_owner()))
}

/// Kink models are owned contracts; legacy models have no owner.
pub fn irm_owner(ctx: &Arc<VerificationContext>) -> Vec<VerificationCheck> {
    Side::ALL
        .into_iter()
        .filter(|side| ctx.snapshot.side(*side).irm_kind == IrmKind::Kink)
        .map(|side| {
            let ctx = Arc::clone(ctx);
            VerificationCheck::new(
                format!("irm_owner:{side}"),
                format!("{side} interest rate model owner"),
                IRM_OWNER_ORDER,
                side.label(),
                move || check_irm_owner(ctx, side),
            )
        })
        .collect()
}

async fn check_irm_owner(ctx: Arc<VerificationContext>, side: Side) -> anyhow::Result<CheckOutcome> {
    let irm = ctx.snapshot.side(side).interest_rate_model;
    let outcome = match try_call(ctx.reader.as_ref(), irm, &IOwnable::ownerCall {}).await? {
        Probe::Rejected => CheckOutcome::failed(format!("interest rate model {irm} does not answer owner()")),
        Probe::Answered(owner) => compare_owner("IRM owner", owner, ctx.reference_irm_owner(side)),
    };
    Ok(outcome)
}

fn compare_owner(label: &str, actual: Address, reference: Option<Address>) -> CheckOutcome {
    match reference {
        None => CheckOutcome::warning(format!("{label} is {actual}; no reference owner configured")),
        Some(want) if want == actual => CheckOutcome::success(format!("{label} is {actual}")),
        Some(want) => CheckOutcome::failed(format!("{label} is {actual}, expected {want}")),
    }
}
