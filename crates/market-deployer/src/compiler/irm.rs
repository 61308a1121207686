//! Interest rate model encoders.
//!
//! The legacy model is bounds-checked here because its factory rejects bad
//! configs only after the deploy transaction is mined. The dynamic kink model
//! is encoded as entered.

use alloy::primitives::{Bytes, I256};
use alloy::sol_types::SolValue;

use crate::chain::contracts::{DynamicKinkConfig, DynamicKinkImmutableArgs, InterestRateModelV2Config};
use crate::constants::WAD;
use crate::errors::DeployerError;
use crate::types::{IrmSelection, KinkIrmConfig, LegacyIrmConfig, Side};

/// Raw `irmConfigData` bytes for one side.
pub fn encode_irm(selection: &IrmSelection, side: Side) -> Result<Bytes, DeployerError> {
    match selection {
        IrmSelection::Legacy(cfg) => {
            validate_legacy(cfg, side)?;
            Ok(encode_legacy(cfg))
        }
        IrmSelection::Kink(cfg) => Ok(encode_kink(cfg)),
    }
}

/// `abi.encode(InterestRateModelV2.Config)`.
pub fn encode_legacy(cfg: &LegacyIrmConfig) -> Bytes {
    let config = InterestRateModelV2Config {
        uopt: cfg.uopt,
        ucrit: cfg.ucrit,
        ulow: cfg.ulow,
        ki: cfg.ki,
        kcrit: cfg.kcrit,
        klow: cfg.klow,
        klin: cfg.klin,
        beta: cfg.beta,
        ri: cfg.ri,
        Tcrit: cfg.tcrit,
    };
    Bytes::from(config.abi_encode())
}

/// `abi.encode(config, immutableArgs, initialOwner)`.
pub fn encode_kink(cfg: &KinkIrmConfig) -> Bytes {
    let config = DynamicKinkConfig {
        ulow: cfg.ulow,
        u1: cfg.u1,
        u2: cfg.u2,
        ucrit: cfg.ucrit,
        rmin: cfg.rmin,
        kmin: cfg.kmin,
        kmax: cfg.kmax,
        alpha: cfg.alpha,
        cminus: cfg.cminus,
        cplus: cfg.cplus,
        c1: cfg.c1,
        c2: cfg.c2,
        dmax: cfg.dmax,
    };
    let immutable_args = DynamicKinkImmutableArgs {
        timelock: cfg.timelock,
        rcompCap: cfg.rcomp_cap,
    };
    Bytes::from((config, immutable_args, cfg.initial_owner).abi_encode_params())
}

/// Bounds enforced by `InterestRateModelV2Config` at deploy time.
pub fn validate_legacy(cfg: &LegacyIrmConfig, side: Side) -> Result<(), DeployerError> {
    validate_legacy_at(cfg, &format!("{side}.irm"))
}

/// [`validate_legacy`] with errors labelled under `prefix`.
pub fn validate_legacy_at(cfg: &LegacyIrmConfig, prefix: &str) -> Result<(), DeployerError> {
    let dp = I256::from_raw(WAD);
    let field = |name: &str| format!("{prefix}.{name}");

    if cfg.uopt <= I256::ZERO || cfg.uopt >= dp {
        return Err(DeployerError::validation(
            field("uopt"),
            format!("must be > 0 and < 1e18, got {}", cfg.uopt),
        ));
    }
    if cfg.ucrit <= cfg.uopt || cfg.ucrit >= dp {
        return Err(DeployerError::validation(
            field("ucrit"),
            format!("must be > uopt ({}) and < 1e18, got {}", cfg.uopt, cfg.ucrit),
        ));
    }
    if cfg.ulow <= I256::ZERO || cfg.ulow >= cfg.uopt {
        return Err(DeployerError::validation(
            field("ulow"),
            format!("must be > 0 and < uopt ({}), got {}", cfg.uopt, cfg.ulow),
        ));
    }

    let non_negative = [
        ("ki", cfg.ki),
        ("kcrit", cfg.kcrit),
        ("klow", cfg.klow),
        ("klin", cfg.klin),
        ("beta", cfg.beta),
    ];
    for (name, value) in non_negative {
        if value.is_negative() {
            return Err(DeployerError::validation(field(name), format!("must be >= 0, got {value}")));
        }
    }
    if cfg.ri.is_negative() {
        return Err(DeployerError::validation(field("ri"), format!("must be >= 0, got {}", cfg.ri)));
    }
    if cfg.tcrit.is_negative() {
        return Err(DeployerError::validation(
            field("Tcrit"),
            format!("must be >= 0, got {}", cfg.tcrit),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::irm::{I112, I96};
    use alloy::primitives::{Address, U256};
    use alloy::sol_types::SolType;
    use std::str::FromStr;

    fn i(v: &str) -> I256 {
        I256::from_dec_str(v).unwrap()
    }

    fn legacy() -> LegacyIrmConfig {
        LegacyIrmConfig {
            uopt: i("800000000000000000"),
            ucrit: i("900000000000000000"),
            ulow: i("500000000000000000"),
            ki: i("367011"),
            kcrit: i("919583967529"),
            klow: i("95129375951"),
            klin: i("1585489599"),
            beta: i("69444444444444"),
            ri: I112::ZERO,
            tcrit: I112::ZERO,
        }
    }

    #[test]
    fn test_legacy_accepts_valid_config() {
        assert!(validate_legacy(&legacy(), Side::Zero).is_ok());
        let bytes = encode_irm(&IrmSelection::Legacy(legacy()), Side::Zero).unwrap();
        // Ten static words.
        assert_eq!(bytes.len(), 10 * 32);
        let decoded = <InterestRateModelV2Config as SolValue>::abi_decode(&bytes).unwrap();
        assert_eq!(decoded.klin, i("1585489599"));
    }

    #[test]
    fn test_legacy_rejects_zero_uopt() {
        let cfg = LegacyIrmConfig {
            uopt: I256::ZERO,
            ..legacy()
        };
        let err = encode_irm(&IrmSelection::Legacy(cfg), Side::One).unwrap_err();
        match err {
            DeployerError::Validation { field, reason } => {
                assert_eq!(field, "silo1.irm.uopt");
                assert!(reason.contains("> 0"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_legacy_rejects_ucrit_not_above_uopt() {
        let cfg = LegacyIrmConfig {
            ucrit: i("800000000000000000"),
            ..legacy()
        };
        let err = validate_legacy(&cfg, Side::Zero).unwrap_err();
        assert!(matches!(err, DeployerError::Validation { ref field, .. } if field == "silo0.irm.ucrit"));
    }

    #[test]
    fn test_legacy_rejects_ulow_and_negatives() {
        let cfg = LegacyIrmConfig {
            ulow: i("800000000000000000"),
            ..legacy()
        };
        assert!(validate_legacy(&cfg, Side::Zero).is_err());

        let cfg = LegacyIrmConfig {
            beta: i("-1"),
            ..legacy()
        };
        let err = validate_legacy(&cfg, Side::Zero).unwrap_err();
        assert!(err.to_string().contains("silo0.irm.beta"));

        let cfg = LegacyIrmConfig {
            tcrit: I112::from_dec_str("-5").unwrap(),
            ..legacy()
        };
        assert!(validate_legacy(&cfg, Side::Zero).is_err());
    }

    #[test]
    fn test_kink_is_not_bounds_checked() {
        let owner = Address::from_str("0x8888888888888888888888888888888888888888").unwrap();
        let cfg = KinkIrmConfig {
            ulow: i("-1"),
            u1: I256::ZERO,
            u2: I256::ZERO,
            ucrit: I256::ZERO,
            rmin: I256::ZERO,
            kmin: I96::ZERO,
            kmax: I96::ZERO,
            alpha: I256::ZERO,
            cminus: I256::ZERO,
            cplus: I256::ZERO,
            c1: I256::ZERO,
            c2: I256::ZERO,
            dmax: I256::ZERO,
            timelock: 3600,
            rcomp_cap: I96::from_dec_str("2000000000000000000").unwrap(),
            initial_owner: owner,
        };
        let bytes = encode_irm(&IrmSelection::Kink(cfg), Side::Zero).unwrap();
        // 13 + 2 + 1 static words, back to back.
        assert_eq!(bytes.len(), 16 * 32);
        assert_eq!(&bytes[15 * 32 + 12..], owner.as_slice());
        // timelock sits right after the 13-word config.
        assert_eq!(U256::from_be_slice(&bytes[13 * 32..14 * 32]), U256::from(3600u64));
        // ulow = -1 is two's complement, all 0xff.
        assert!(bytes[..32].iter().all(|b| *b == 0xff));

        type Triple = (DynamicKinkConfig, DynamicKinkImmutableArgs, alloy::sol_types::sol_data::Address);
        let (_, args, decoded_owner) = <Triple as SolType>::abi_decode_params(&bytes).unwrap();
        assert_eq!(args.timelock, 3600);
        assert_eq!(decoded_owner, owner);
    }
}
