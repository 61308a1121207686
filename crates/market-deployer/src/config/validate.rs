use anyhow::{bail, Result};
use rust_decimal_macros::dec;

use super::types::DeployerConfig;
use crate::logging::build_filter;

/// Validate invariants across the merged config that serde alone cannot
/// enforce. Called automatically by [`super::load_config`].
pub fn validate_config(config: &DeployerConfig) -> Result<()> {
    let mut errors: Vec<String> = Vec::new();

    validate_app_config(config, &mut errors);
    validate_chain_config(config, &mut errors);
    validate_verification_config(config, &mut errors);

    if errors.is_empty() {
        Ok(())
    } else {
        let msg = format!(
            "Configuration validation failed ({} error{}):\n  - {}",
            errors.len(),
            if errors.len() == 1 { "" } else { "s" },
            errors.join("\n  - ")
        );
        bail!("{msg}");
    }
}

// ---------------------------------------------------------------------------
// App config
// ---------------------------------------------------------------------------

fn validate_app_config(config: &DeployerConfig, errors: &mut Vec<String>) {
    let logging = &config.app.logging;
    if logging.log_dir.as_deref() == Some("") {
        errors.push("app.logging: log_dir is empty".into());
    }
    if logging.file_prefix.is_empty() {
        errors.push("app.logging: file_prefix is empty".into());
    }
    if let Err(e) = build_filter(None, &logging.default_filter) {
        errors.push(format!("app.logging: {e:#}"));
    }
}

// ---------------------------------------------------------------------------
// Chain config
// ---------------------------------------------------------------------------

fn validate_chain_config(config: &DeployerConfig, errors: &mut Vec<String>) {
    let chain = &config.chain;

    if chain.chain_id == 0 {
        errors.push("chain: chain_id must be non-zero".into());
    }

    if chain.alias.is_empty() {
        errors.push("chain: alias is empty".into());
    }

    if chain.rpc.http_url.is_empty() {
        errors.push("chain.rpc: http_url is empty".into());
    } else if !chain.rpc.http_url.starts_with("http://") && !chain.rpc.http_url.starts_with("https://") {
        errors.push(format!(
            "chain.rpc: http_url must be an http(s) URL, got '{}'",
            chain.rpc.http_url
        ));
    }

    if chain.deployments.modules.is_empty() {
        errors.push("chain.deployments: modules must list at least one module".into());
    }

    for oracle in &chain.known_oracles {
        if oracle.address.is_zero() {
            errors.push(format!("chain.known_oracles.{}: address is zero", oracle.name));
        }
    }

    for price in &chain.reference.prices {
        if price.price <= dec!(0) {
            errors.push(format!(
                "chain.reference.prices: {}/{} must be > 0, got {}",
                price.base, price.quote, price.price
            ));
        }
    }
}

// ---------------------------------------------------------------------------
// Verification bounds
// ---------------------------------------------------------------------------

fn validate_verification_config(config: &DeployerConfig, errors: &mut Vec<String>) {
    let v = &config.verification;

    let bounds = [
        ("dao_fee_min_pct", v.dao_fee_min_pct),
        ("dao_fee_max_pct", v.dao_fee_max_pct),
        ("deployer_fee_max_pct", v.deployer_fee_max_pct),
        ("liquidation_fee_max_pct", v.liquidation_fee_max_pct),
        ("flashloan_fee_max_pct", v.flashloan_fee_max_pct),
    ];
    for (name, value) in bounds {
        if value < dec!(0) || value > dec!(100) {
            errors.push(format!("verification.{name}: must be in [0, 100], got {value}"));
        }
    }

    if v.dao_fee_min_pct > v.dao_fee_max_pct {
        errors.push(format!(
            "verification: dao_fee_min_pct ({}) must be <= dao_fee_max_pct ({})",
            v.dao_fee_min_pct, v.dao_fee_max_pct
        ));
    }

    if v.price_tolerance_bps > 10_000 {
        errors.push(format!(
            "verification.price_tolerance_bps: must be <= 10000, got {}",
            v.price_tolerance_bps
        ));
    }
}
