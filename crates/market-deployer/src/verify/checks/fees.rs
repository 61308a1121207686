//! Fee bound checks. Fees are stored per silo but the DAO and deployer fees
//! are shared, so both sides must agree.

use alloy::primitives::U256;
use rust_decimal::Decimal;
use std::sync::Arc;

use super::{pct, wad_bound, MARKET_SOURCE};
use crate::types::{Side, SideSnapshot};
use crate::verify::check::{CheckOutcome, VerificationCheck};
use crate::verify::VerificationContext;

pub const DAO_FEE_ORDER: u32 = 10;
pub const DEPLOYER_FEE_ORDER: u32 = 20;
pub const LIQUIDATION_FEE_ORDER: u32 = 30;
pub const FLASHLOAN_FEE_ORDER: u32 = 40;

pub fn dao_fee(ctx: &Arc<VerificationContext>) -> Vec<VerificationCheck> {
    let ctx = Arc::clone(ctx);
    vec![VerificationCheck::new(
        "dao_fee",
        "daoFee bounds",
        DAO_FEE_ORDER,
        MARKET_SOURCE,
        move || check_dao_fee(ctx),
    )]
}

async fn check_dao_fee(ctx: Arc<VerificationContext>) -> anyhow::Result<CheckOutcome> {
    let snapshot = &ctx.snapshot;
    if let Some(outcome) = shared_fee_mismatch("daoFee", snapshot.silo0.dao_fee, snapshot.silo1.dao_fee) {
        return Ok(outcome);
    }
    let fee = snapshot.silo0.dao_fee;
    let (min, max) = (ctx.bounds.dao_fee_min_pct, ctx.bounds.dao_fee_max_pct);
    let range = format!("{min}%–{max}%");
    if fee >= wad_bound(min)? && fee <= wad_bound(max)? {
        Ok(CheckOutcome::success(format!("daoFee {} within {range} range", pct(fee))))
    } else {
        Ok(CheckOutcome::failed(format!("daoFee {} not within {range} range", pct(fee))))
    }
}

pub fn deployer_fee(ctx: &Arc<VerificationContext>) -> Vec<VerificationCheck> {
    let ctx = Arc::clone(ctx);
    vec![VerificationCheck::new(
        "deployer_fee",
        "deployerFee bounds",
        DEPLOYER_FEE_ORDER,
        MARKET_SOURCE,
        move || check_deployer_fee(ctx),
    )]
}

async fn check_deployer_fee(ctx: Arc<VerificationContext>) -> anyhow::Result<CheckOutcome> {
    let snapshot = &ctx.snapshot;
    if let Some(outcome) =
        shared_fee_mismatch("deployerFee", snapshot.silo0.deployer_fee, snapshot.silo1.deployer_fee)
    {
        return Ok(outcome);
    }
    let fee = snapshot.silo0.deployer_fee;
    let max = ctx.bounds.deployer_fee_max_pct;
    if fee > wad_bound(max)? {
        return Ok(CheckOutcome::failed(format!(
            "deployerFee {} above {max}% maximum",
            pct(fee)
        )));
    }
    if fee.is_zero() {
        return Ok(CheckOutcome::success("deployerFee is 0%"));
    }
    let outcome = match &ctx.expected {
        Some(expected) if expected.deployer.is_zero() => CheckOutcome::failed(format!(
            "deployerFee {} set but no deployer fee receiver was configured",
            pct(fee)
        )),
        Some(expected) => CheckOutcome::success(format!(
            "deployerFee {} paid to {}",
            pct(fee),
            expected.deployer
        )),
        None => CheckOutcome::warning(format!(
            "deployerFee {} within bounds; fee receiver not known",
            pct(fee)
        )),
    };
    Ok(outcome)
}

pub fn liquidation_fee(ctx: &Arc<VerificationContext>) -> Vec<VerificationCheck> {
    let max = ctx.bounds.liquidation_fee_max_pct;
    per_side_bound(ctx, "liquidation_fee", "liquidationFee", LIQUIDATION_FEE_ORDER, max, |s| {
        s.liquidation_fee
    })
}

pub fn flashloan_fee(ctx: &Arc<VerificationContext>) -> Vec<VerificationCheck> {
    let max = ctx.bounds.flashloan_fee_max_pct;
    per_side_bound(ctx, "flashloan_fee", "flashloanFee", FLASHLOAN_FEE_ORDER, max, |s| {
        s.flashloan_fee
    })
}

fn per_side_bound(
    ctx: &Arc<VerificationContext>,
    id: &'static str,
    label: &'static str,
    order: u32,
    max: Decimal,
    field: fn(&SideSnapshot) -> U256,
) -> Vec<VerificationCheck> {
    Side::ALL
        .into_iter()
        .map(|side| {
            let fee = field(ctx.snapshot.side(side));
            VerificationCheck::new(
                format!("{id}:{side}"),
                format!("{side} {label} bounds"),
                order,
                side.label(),
                move || check_upper_bound(label, fee, max),
            )
        })
        .collect()
}

async fn check_upper_bound(label: &'static str, fee: U256, max: Decimal) -> anyhow::Result<CheckOutcome> {
    if fee <= wad_bound(max)? {
        Ok(CheckOutcome::success(format!("{label} {} within 0%–{max}%", pct(fee))))
    } else {
        Ok(CheckOutcome::failed(format!("{label} {} above {max}% maximum", pct(fee))))
    }
}

fn shared_fee_mismatch(label: &str, fee0: U256, fee1: U256) -> Option<CheckOutcome> {
    (fee0 != fee1).then(|| {
        CheckOutcome::failed(format!(
            "{label} differs between silos: {} vs {}",
            pct(fee0),
            pct(fee1)
        ))
    })
}
