pub mod types;
pub mod validate;

pub use types::*;

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::info;

use crate::catalog::{AddressBook, IrmPresets, OracleCatalog};

/// Load and merge all config JSON files into a single [`DeployerConfig`],
/// then apply environment variable overrides and validate.
///
/// Expected directory layout:
/// ```text
/// config/
///   app.json
///   chains/{alias}.json
///   verification.json   (optional)
///   irm_presets.json    (optional)
/// ```
///
/// A relative `deployments.root`, from the chain file or the environment, is
/// resolved against the config directory.
///
/// # Environment variable overrides
///
/// | Env Var                     | Config Field                 |
/// |-----------------------------|------------------------------|
/// | `DEPLOYER_CHAIN`            | `app.default_chain`          |
/// | `DEPLOYER_RPC_URL`          | `chain.rpc.http_url`         |
/// | `DEPLOYER_DEPLOYMENTS_DIR`  | `chain.deployments.root`     |
pub fn load_config(config_dir: &Path) -> Result<DeployerConfig> {
    let read = |name: &str| -> Result<String> {
        let path = config_dir.join(name);
        std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config file: {}", path.display()))
    };

    let mut app: AppConfig = serde_json::from_str(&read("app.json")?).context("parsing app.json")?;

    // The chain alias decides which chain file is read, so it is overridden
    // before the remaining files are loaded.
    if let Some(val) = env_string("DEPLOYER_CHAIN") {
        info!(chain = %val, "env override: DEPLOYER_CHAIN");
        app.default_chain = val;
    }

    let chain_file = format!("chains/{}.json", app.default_chain);
    let chain: ChainConfig =
        serde_json::from_str(&read(&chain_file)?).with_context(|| format!("parsing {chain_file}"))?;

    // Verification bounds are optional; defaults apply.
    let verification: VerificationConfig = match read("verification.json") {
        Ok(contents) => serde_json::from_str(&contents).context("parsing verification.json")?,
        Err(_) => VerificationConfig::default(),
    };

    let irm_presets =
        IrmPresets::load(&config_dir.join("irm_presets.json")).context("parsing irm_presets.json")?;

    let mut config = DeployerConfig {
        app,
        chain,
        verification,
        irm_presets,
    };

    apply_env_overrides(&mut config);
    if config.chain.deployments.root.is_relative() {
        config.chain.deployments.root = config_dir.join(&config.chain.deployments.root);
    }
    validate::validate_config(&config)?;

    Ok(config)
}

impl DeployerConfig {
    /// Address book for the configured chain, read from the deployments
    /// mirror.
    pub fn address_book(&self) -> Result<AddressBook> {
        AddressBook::load(
            &self.chain.deployments.root,
            &self.chain.deployments.modules,
            &self.chain.alias,
        )
        .with_context(|| {
            format!(
                "loading deployments for '{}' from {}",
                self.chain.alias,
                self.chain.deployments.root.display()
            )
        })
    }

    /// Oracle factories from `book` plus the chain's catalogued oracles.
    pub fn oracle_catalog(&self, book: &AddressBook) -> OracleCatalog {
        OracleCatalog::from_address_book(book, self.chain.known_oracles.clone())
    }
}

// ---------------------------------------------------------------------------
// Environment variable overrides
// ---------------------------------------------------------------------------

/// Apply environment variable overrides to the loaded config.
///
/// Only non-empty env vars take effect.
fn apply_env_overrides(config: &mut DeployerConfig) {
    if let Some(val) = env_string("DEPLOYER_RPC_URL") {
        info!("env override: DEPLOYER_RPC_URL");
        config.chain.rpc.http_url = val;
    }

    if let Some(val) = env_string("DEPLOYER_DEPLOYMENTS_DIR") {
        info!(dir = %val, "env override: DEPLOYER_DEPLOYMENTS_DIR");
        config.chain.deployments.root = PathBuf::from(val);
    }
}

/// Read a non-empty env var as a `String`.
fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;
    use serial_test::serial;
    use std::str::FromStr;

    fn project_config_dir() -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR"))
            .join("..")
            .join("..")
            .join("config")
    }

    // -----------------------------------------------------------------------
    // Helper: write a minimal set of config JSON files to a temp dir.
    // -----------------------------------------------------------------------

    fn write_test_configs(dir: &Path) {
        std::fs::create_dir_all(dir.join("chains")).unwrap();

        std::fs::write(
            dir.join("app.json"),
            r#"{
                "default_chain": "testnet",
                "logging": { "log_dir": "logs" }
            }"#,
        )
        .unwrap();

        std::fs::write(
            dir.join("chains/testnet.json"),
            r#"{
                "chain_id": 31337,
                "alias": "testnet",
                "rpc": { "http_url": "http://127.0.0.1:8545" },
                "deployments": { "root": "deployments", "modules": ["silo-core", "silo-oracles"] },
                "known_oracles": [
                    {
                        "name": "USDC scaler",
                        "address": "0x1100000000000000000000000000000000000011",
                        "kind": "scaler",
                        "quote_token": "0x2222222222222222222222222222222222222222"
                    }
                ],
                "reference": {
                    "hook_owner": "0x3333333333333333333333333333333333333333",
                    "prices": [
                        {
                            "base": "0x1111111111111111111111111111111111111111",
                            "quote": "0x2222222222222222222222222222222222222222",
                            "price": "3000"
                        }
                    ]
                }
            }"#,
        )
        .unwrap();
    }

    fn write_deployment(root: &Path, module: &str, name: &str, address: &str) {
        let dir = root.join(module).join("deployments").join("testnet");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(
            dir.join(format!("{name}.json")),
            format!(r#"{{ "address": "{address}" }}"#),
        )
        .unwrap();
    }

    // -----------------------------------------------------------------------
    // Env cleanup helper
    // -----------------------------------------------------------------------

    fn clean_deployer_env() {
        for key in ["DEPLOYER_CHAIN", "DEPLOYER_RPC_URL", "DEPLOYER_DEPLOYMENTS_DIR"] {
            std::env::remove_var(key);
        }
    }

    // -----------------------------------------------------------------------
    // Tests
    // -----------------------------------------------------------------------

    #[test]
    #[serial]
    fn test_load_real_configs() {
        clean_deployer_env();
        let dir = project_config_dir();
        if !dir.exists() {
            eprintln!("skipping — config dir not found at {}", dir.display());
            return;
        }
        let config = load_config(&dir).expect("config should load and validate");
        assert_eq!(config.chain.chain_id, 1);
        assert_eq!(config.chain.alias, "mainnet");
        assert!(config.irm_presets.get("static-4pct").is_some());
        clean_deployer_env();
    }

    #[test]
    #[serial]
    fn test_load_test_configs() {
        clean_deployer_env();
        let tmp = tempfile::tempdir().unwrap();
        write_test_configs(tmp.path());
        let config = load_config(tmp.path()).expect("test config should load");
        assert_eq!(config.chain.chain_id, 31337);
        assert_eq!(config.chain.deployments.root, tmp.path().join("deployments"));
        assert_eq!(config.chain.known_oracles.len(), 1);
        assert_eq!(config.app.logging.default_filter, "market_deployer=info,warn");
        // verification.json absent: defaults.
        assert_eq!(config.verification.dao_fee_max_pct, Decimal::from(25));
        assert_eq!(config.verification.price_tolerance_bps, 100);
        assert_eq!(config.irm_presets.names().count(), 0);
        clean_deployer_env();
    }

    #[test]
    #[serial]
    fn test_reference_price_lookup() {
        clean_deployer_env();
        let tmp = tempfile::tempdir().unwrap();
        write_test_configs(tmp.path());
        let config = load_config(tmp.path()).unwrap();
        let base = alloy::primitives::Address::repeat_byte(0x11);
        let quote = alloy::primitives::Address::repeat_byte(0x22);
        assert_eq!(config.chain.reference.price(base, quote), Some(Decimal::from(3000)));
        assert_eq!(config.chain.reference.price(quote, base), None);
        clean_deployer_env();
    }

    #[test]
    #[serial]
    fn test_missing_config_file_errors() {
        clean_deployer_env();
        let tmp = tempfile::tempdir().unwrap();
        let err = load_config(tmp.path()).unwrap_err();
        assert!(
            err.to_string().contains("failed to read config file"),
            "expected file-not-found error, got: {err}"
        );
        clean_deployer_env();
    }

    #[test]
    #[serial]
    fn test_verification_file_overrides_defaults() {
        clean_deployer_env();
        let tmp = tempfile::tempdir().unwrap();
        write_test_configs(tmp.path());
        std::fs::write(
            tmp.path().join("verification.json"),
            r#"{ "dao_fee_max_pct": "30", "price_tolerance_bps": 250 }"#,
        )
        .unwrap();
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.verification.dao_fee_max_pct, Decimal::from(30));
        assert_eq!(
            config.verification.dao_fee_min_pct,
            Decimal::from_str("0.01").unwrap()
        );
        assert_eq!(config.verification.price_tolerance_bps, 250);
        clean_deployer_env();
    }

    #[test]
    #[serial]
    fn test_env_override_chain_selects_other_file() {
        clean_deployer_env();
        let tmp = tempfile::tempdir().unwrap();
        write_test_configs(tmp.path());
        std::env::set_var("DEPLOYER_CHAIN", "sepolia");
        let err = load_config(tmp.path()).unwrap_err();
        assert!(
            err.to_string().contains("chains/sepolia.json"),
            "expected missing sepolia file, got: {err}"
        );
        clean_deployer_env();
    }

    #[test]
    #[serial]
    fn test_env_override_rpc_url() {
        clean_deployer_env();
        let tmp = tempfile::tempdir().unwrap();
        write_test_configs(tmp.path());

        std::env::set_var("DEPLOYER_RPC_URL", "https://custom-rpc.example.com");
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.chain.rpc.http_url, "https://custom-rpc.example.com");
        clean_deployer_env();
    }

    #[test]
    #[serial]
    fn test_env_override_empty_string_ignored() {
        clean_deployer_env();
        let tmp = tempfile::tempdir().unwrap();
        write_test_configs(tmp.path());

        std::env::set_var("DEPLOYER_RPC_URL", "");
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.chain.rpc.http_url, "http://127.0.0.1:8545");
        clean_deployer_env();
    }

    #[test]
    #[serial]
    fn test_invalid_rpc_url_rejected() {
        clean_deployer_env();
        let tmp = tempfile::tempdir().unwrap();
        write_test_configs(tmp.path());

        std::env::set_var("DEPLOYER_RPC_URL", "ws://127.0.0.1:8546");
        let err = load_config(tmp.path()).unwrap_err();
        assert!(
            err.to_string().contains("http_url must be an http(s) URL"),
            "expected rpc url error, got: {err}"
        );
        clean_deployer_env();
    }

    #[test]
    #[serial]
    fn test_validation_collects_all_errors() {
        clean_deployer_env();
        let tmp = tempfile::tempdir().unwrap();
        write_test_configs(tmp.path());
        std::fs::write(
            tmp.path().join("verification.json"),
            r#"{ "dao_fee_min_pct": "30", "dao_fee_max_pct": "20", "price_tolerance_bps": 20000 }"#,
        )
        .unwrap();
        let err = load_config(tmp.path()).unwrap_err().to_string();
        assert!(err.contains("(2 errors)"), "got: {err}");
        assert!(err.contains("dao_fee_min_pct"));
        assert!(err.contains("price_tolerance_bps"));
        clean_deployer_env();
    }

    #[test]
    #[serial]
    fn test_catalogs_from_deployments_mirror() {
        clean_deployer_env();
        let tmp = tempfile::tempdir().unwrap();
        write_test_configs(tmp.path());
        let root = tmp.path().join("deployments");
        write_deployment(&root, "silo-core", "SiloDeployer", "0x5555555555555555555555555555555555555555");
        write_deployment(
            &root,
            "silo-oracles",
            "ChainlinkV3OracleFactory",
            "0x9999999999999999999999999999999999999999",
        );

        let config = load_config(tmp.path()).unwrap();
        let book = config.address_book().unwrap();
        assert_eq!(book.len(), 2);
        let catalog = config.oracle_catalog(&book);
        assert!(catalog.factory(crate::constants::CHAINLINK_V3_ORACLE_FACTORY).is_some());
        assert_eq!(catalog.known().len(), 1);
        clean_deployer_env();
    }

    #[test]
    #[serial]
    fn test_env_override_deployments_dir() {
        clean_deployer_env();
        let tmp = tempfile::tempdir().unwrap();
        write_test_configs(tmp.path());
        let mirror = tempfile::tempdir().unwrap();
        write_deployment(mirror.path(), "silo-core", "SiloDeployer", "0x5555555555555555555555555555555555555555");

        std::env::set_var("DEPLOYER_DEPLOYMENTS_DIR", mirror.path());
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.chain.deployments.root, mirror.path());
        assert_eq!(config.address_book().unwrap().len(), 1);
        clean_deployer_env();
    }

    #[test]
    #[serial]
    fn test_relative_env_deployments_dir_resolves_against_config_dir() {
        clean_deployer_env();
        let tmp = tempfile::tempdir().unwrap();
        write_test_configs(tmp.path());
        write_deployment(&tmp.path().join("mirror"), "silo-core", "SiloDeployer", "0x5555555555555555555555555555555555555555");

        std::env::set_var("DEPLOYER_DEPLOYMENTS_DIR", "mirror");
        let config = load_config(tmp.path()).unwrap();
        assert_eq!(config.chain.deployments.root, tmp.path().join("mirror"));
        assert_eq!(config.address_book().unwrap().len(), 1);
        clean_deployer_env();
    }

    #[test]
    #[serial]
    fn test_invalid_log_filter_fails_validation() {
        clean_deployer_env();
        let tmp = tempfile::tempdir().unwrap();
        write_test_configs(tmp.path());
        std::fs::write(
            tmp.path().join("app.json"),
            r#"{
                "default_chain": "testnet",
                "logging": { "default_filter": "market_deployer=loudest" }
            }"#,
        )
        .unwrap();
        let err = load_config(tmp.path()).unwrap_err();
        assert!(err.to_string().contains("app.logging: invalid log filter"), "got: {err}");
        clean_deployer_env();
    }
}
