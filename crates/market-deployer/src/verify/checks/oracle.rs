//! Oracle checks: reference price, quote token, and the edge-amount and
//! linearity probes. A revert means different things per check, so each
//! check interprets it itself.

use alloy::primitives::{Address, U256};
use rust_decimal::Decimal;
use std::sync::Arc;

use super::MARKET_SOURCE;
use crate::chain::contracts::{IERC20Metadata, IPTLinearOracle, ISiloOracle};
use crate::chain::snapshot::one_token;
use crate::chain::{try_call, Probe};
use crate::constants::{LARGE_QUOTE_EXTRA_DECIMALS, WAD};
use crate::types::{OracleKind, OracleRole, OracleSnapshot, Side, Token};
use crate::verify::check::{CheckOutcome, VerificationCheck};
use crate::verify::VerificationContext;

pub const ORACLE_PRICE_ORDER: u32 = 70;
pub const ORACLE_QUOTE_TOKEN_ORDER: u32 = 75;
pub const ORACLE_ZERO_AMOUNT_ORDER: u32 = 80;
pub const ORACLE_LARGE_AMOUNT_ORDER: u32 = 85;
pub const PT_LINEAR_ORDER: u32 = 90;

/// A configured oracle slot of one side. The max-LTV slot is skipped when
/// it points at the solvency oracle.
#[derive(Debug, Clone)]
pub(super) struct OracleTarget {
    pub side: Side,
    pub role: OracleRole,
    pub oracle: OracleSnapshot,
    pub base: Token,
}

impl OracleTarget {
    pub fn id(&self, check: &str) -> String {
        let role = match self.role {
            OracleRole::Solvency => "solvency",
            OracleRole::MaxLtv => "max_ltv",
        };
        format!("{check}:{}:{role}", self.side)
    }

    pub fn label(&self) -> String {
        format!("{} {}", self.side, self.role.label())
    }

    fn name(&self, what: &str) -> String {
        format!("{} {what}", self.label())
    }
}

pub(super) fn oracle_targets(ctx: &VerificationContext) -> Vec<OracleTarget> {
    let mut out = Vec::new();
    for side in Side::ALL {
        let s = ctx.snapshot.side(side);
        for role in OracleRole::ALL {
            let oracle = s.oracle(role);
            if !oracle.is_set() {
                continue;
            }
            if role == OracleRole::MaxLtv && oracle.address == s.solvency_oracle.address {
                continue;
            }
            out.push(OracleTarget {
                side,
                role,
                oracle: oracle.clone(),
                base: s.token.clone(),
            });
        }
    }
    out
}

// ---------------------------------------------------------------------------
// Reference price
// ---------------------------------------------------------------------------

pub fn oracle_price(ctx: &Arc<VerificationContext>) -> Vec<VerificationCheck> {
    oracle_targets(ctx)
        .into_iter()
        .map(|target| {
            let ctx = Arc::clone(ctx);
            VerificationCheck::new(
                target.id("oracle_price"),
                target.name("price"),
                ORACLE_PRICE_ORDER,
                target.side.label(),
                move || check_oracle_price(ctx, target),
            )
        })
        .collect()
}

async fn check_oracle_price(ctx: Arc<VerificationContext>, target: OracleTarget) -> anyhow::Result<CheckOutcome> {
    let Some(raw) = target.oracle.unit_quote else {
        return Ok(CheckOutcome::failed(format!(
            "quote for one {} reverted",
            symbol_or_address(&target.base)
        )));
    };
    let Some(quote_token) = target.oracle.quote_token else {
        return Ok(CheckOutcome::failed("oracle does not report a quote token"));
    };

    let decimals = match ctx.market_token_decimals(quote_token) {
        Some(d) => Some(d),
        None => try_call(ctx.reader.as_ref(), quote_token, &IERC20Metadata::decimalsCall {})
            .await?
            .answered(),
    };
    let Some(decimals) = decimals else {
        return Ok(CheckOutcome::warning(format!(
            "quote token {quote_token} does not report decimals; raw quote {raw}"
        )));
    };
    let Some(price) = to_token_units(raw, decimals) else {
        return Ok(CheckOutcome::failed(format!(
            "quote {raw} is not representable with {decimals} decimals"
        )));
    };

    let Some(reference) = ctx.reference.price(target.base.address, quote_token) else {
        return Ok(CheckOutcome::warning(format!(
            "no reference price for {}/{quote_token}; oracle quotes {price}",
            symbol_or_address(&target.base)
        )));
    };
    if reference <= Decimal::ZERO {
        return Ok(CheckOutcome::failed(format!("reference price {reference} is not positive")));
    }

    let deviation_bps = ((price - reference).abs() / reference * Decimal::from(10_000)).round_dp(2);
    let tolerance = Decimal::from(ctx.bounds.price_tolerance_bps);
    if deviation_bps <= tolerance {
        Ok(CheckOutcome::success(format!(
            "oracle quotes {price}, reference {reference} ({deviation_bps} bps)"
        )))
    } else {
        Ok(CheckOutcome::failed(format!(
            "oracle quotes {price}, reference {reference}: {deviation_bps} bps exceeds {tolerance} bps"
        )))
    }
}

/// `raw / 10^decimals`, exactly, if it fits a `Decimal`.
fn to_token_units(raw: U256, decimals: u8) -> Option<Decimal> {
    let value = i128::try_from(u128::try_from(raw).ok()?).ok()?;
    Decimal::try_from_i128_with_scale(value, u32::from(decimals))
        .ok()
        .map(|d| d.normalize())
}

fn symbol_or_address(token: &Token) -> String {
    if token.symbol.is_empty() {
        token.address.to_string()
    } else {
        token.symbol.clone()
    }
}

// ---------------------------------------------------------------------------
// Quote token
// ---------------------------------------------------------------------------

/// All oracles of a market must quote in the same token.
pub fn oracle_quote_token(ctx: &Arc<VerificationContext>) -> Vec<VerificationCheck> {
    let targets = oracle_targets(ctx);
    if targets.is_empty() {
        return Vec::new();
    }
    let ctx = Arc::clone(ctx);
    vec![VerificationCheck::new(
        "oracle_quote_token",
        "oracle quote token",
        ORACLE_QUOTE_TOKEN_ORDER,
        MARKET_SOURCE,
        move || check_quote_token(ctx, targets),
    )]
}

async fn check_quote_token(
    ctx: Arc<VerificationContext>,
    targets: Vec<OracleTarget>,
) -> anyhow::Result<CheckOutcome> {
    let mut quote: Option<Address> = None;
    for target in &targets {
        let Some(token) = target.oracle.quote_token else {
            return Ok(CheckOutcome::failed(format!(
                "{} does not report a quote token",
                target.label()
            )));
        };
        match quote {
            None => quote = Some(token),
            Some(first) if first != token => {
                return Ok(CheckOutcome::failed(format!(
                    "oracles quote in different tokens: {first} and {token}"
                )));
            }
            Some(_) => {}
        }
    }
    let Some(token) = quote else {
        return Ok(CheckOutcome::warning("no oracle configured"));
    };
    match ctx.market_token_decimals(token) {
        Some(_) => Ok(CheckOutcome::success(format!("all oracles quote in {token}"))),
        None => Ok(CheckOutcome::success(format!(
            "all oracles quote in {token} (not one of the market tokens)"
        ))),
    }
}

// ---------------------------------------------------------------------------
// Edge amounts
// ---------------------------------------------------------------------------

/// `quote(0)` must revert or return zero.
pub fn oracle_zero_amount(ctx: &Arc<VerificationContext>) -> Vec<VerificationCheck> {
    oracle_targets(ctx)
        .into_iter()
        .map(|target| {
            let ctx = Arc::clone(ctx);
            VerificationCheck::new(
                target.id("oracle_zero_amount"),
                target.name("zero amount quote"),
                ORACLE_ZERO_AMOUNT_ORDER,
                target.side.label(),
                move || check_zero_amount(ctx, target),
            )
        })
        .collect()
}

async fn check_zero_amount(ctx: Arc<VerificationContext>, target: OracleTarget) -> anyhow::Result<CheckOutcome> {
    let call = ISiloOracle::quoteCall {
        _baseAmount: U256::ZERO,
        _baseToken: target.base.address,
    };
    let outcome = match try_call(ctx.reader.as_ref(), target.oracle.address, &call).await? {
        Probe::Rejected => CheckOutcome::success("quote(0) reverts"),
        Probe::Answered(v) if v.is_zero() => CheckOutcome::success("quote(0) returns 0"),
        Probe::Answered(v) => CheckOutcome::failed(format!("quote(0) returned {v}")),
    };
    Ok(outcome)
}

/// The oracle must still answer for `10^(decimals + 20)` base units.
pub fn oracle_large_amount(ctx: &Arc<VerificationContext>) -> Vec<VerificationCheck> {
    oracle_targets(ctx)
        .into_iter()
        .map(|target| {
            let ctx = Arc::clone(ctx);
            VerificationCheck::new(
                target.id("oracle_large_amount"),
                target.name("large amount quote"),
                ORACLE_LARGE_AMOUNT_ORDER,
                target.side.label(),
                move || check_large_amount(ctx, target),
            )
        })
        .collect()
}

pub(crate) fn large_amount(decimals: u8) -> Option<U256> {
    one_token(decimals.saturating_add(LARGE_QUOTE_EXTRA_DECIMALS))
}

async fn check_large_amount(ctx: Arc<VerificationContext>, target: OracleTarget) -> anyhow::Result<CheckOutcome> {
    let exponent = u32::from(target.base.decimals) + u32::from(LARGE_QUOTE_EXTRA_DECIMALS);
    let Some(amount) = large_amount(target.base.decimals) else {
        return Ok(CheckOutcome::failed(format!("10^{exponent} does not fit in uint256")));
    };
    let call = ISiloOracle::quoteCall {
        _baseAmount: amount,
        _baseToken: target.base.address,
    };
    let outcome = match try_call(ctx.reader.as_ref(), target.oracle.address, &call).await? {
        Probe::Answered(v) => CheckOutcome::success(format!("quote(10^{exponent}) = {v}")),
        Probe::Rejected => CheckOutcome::failed(format!("quote(10^{exponent}) reverted")),
    };
    Ok(outcome)
}

// ---------------------------------------------------------------------------
// PT-linear
// ---------------------------------------------------------------------------

/// PT-linear oracles: the discount is at most 100% per year, and the quote
/// scales linearly with the amount.
pub fn pt_linear(ctx: &Arc<VerificationContext>) -> Vec<VerificationCheck> {
    oracle_targets(ctx)
        .into_iter()
        .filter(|t| t.oracle.kind == OracleKind::PtLinear)
        .map(|target| {
            let ctx = Arc::clone(ctx);
            VerificationCheck::new(
                target.id("pt_linear"),
                target.name("linear pricing"),
                PT_LINEAR_ORDER,
                target.side.label(),
                move || check_pt_linear(ctx, target),
            )
        })
        .collect()
}

async fn check_pt_linear(ctx: Arc<VerificationContext>, target: OracleTarget) -> anyhow::Result<CheckOutcome> {
    let reader = ctx.reader.as_ref();
    let oracle = target.oracle.address;

    let Some(discount) = try_call(reader, oracle, &IPTLinearOracle::baseDiscountPerYearCall {})
        .await?
        .answered()
    else {
        return Ok(CheckOutcome::failed("baseDiscountPerYear() reverted"));
    };
    if discount > WAD {
        return Ok(CheckOutcome::failed(format!(
            "baseDiscountPerYear {discount} exceeds 100% per year"
        )));
    }

    let amounts = one_token(target.base.decimals)
        .and_then(|unit| unit.checked_mul(U256::from(2u64)).map(|two| (unit, two)));
    let Some((unit, two_units)) = amounts else {
        return Ok(CheckOutcome::failed(format!(
            "{} decimals too large to quote two whole tokens",
            target.base.decimals
        )));
    };
    let quote = |amount: U256| ISiloOracle::quoteCall {
        _baseAmount: amount,
        _baseToken: target.base.address,
    };
    let single = try_call(reader, oracle, &quote(unit)).await?.answered();
    let double = try_call(reader, oracle, &quote(two_units)).await?.answered();
    let (Some(single), Some(double)) = (single, double) else {
        return Ok(CheckOutcome::failed("quote reverted for one or two whole tokens"));
    };
    if single.is_zero() {
        return Ok(CheckOutcome::failed("quote for one whole token is 0"));
    }

    let expected = single.saturating_mul(U256::from(2u64));
    let diff = if double > expected { double - expected } else { expected - double };
    if diff > U256::from(1u64) {
        return Ok(CheckOutcome::failed(format!(
            "quote is not linear: 2 × {single} != {double}"
        )));
    }
    Ok(CheckOutcome::success(format!(
        "discount {discount} per year, quote {single} per token"
    )))
}
