//! Name → address lookup over deployment documents.
//!
//! Documents follow the published layout
//! `{root}/{module}/deployments/{chainAlias}/{ContractName}.json`, each with
//! an `address` field. They are read from a local mirror of that tree.

use alloy::primitives::Address;
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

use crate::errors::DeployerError;

#[derive(Debug, Deserialize)]
struct DeploymentDocument {
    address: Address,
}

/// Path of one deployment document.
pub fn deployment_path(root: &Path, module: &str, chain_alias: &str, name: &str) -> PathBuf {
    root.join(module)
        .join("deployments")
        .join(chain_alias)
        .join(format!("{name}.json"))
}

#[derive(Debug, Clone, Default)]
pub struct AddressBook {
    chain_alias: String,
    entries: BTreeMap<String, Address>,
}

impl AddressBook {
    pub fn new(chain_alias: impl Into<String>) -> Self {
        Self {
            chain_alias: chain_alias.into(),
            entries: BTreeMap::new(),
        }
    }

    pub fn chain_alias(&self) -> &str {
        &self.chain_alias
    }

    pub fn insert(&mut self, name: impl Into<String>, address: Address) {
        self.entries.insert(name.into(), address);
    }

    pub fn with(mut self, name: impl Into<String>, address: Address) -> Self {
        self.insert(name, address);
        self
    }

    pub fn get(&self, name: &str) -> Option<Address> {
        self.entries.get(name).copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Load every document under `{root}/{module}/deployments/{alias}/` for
    /// each module. A missing module directory is skipped; a malformed
    /// document is an error. Later modules win on name clashes.
    pub fn load(root: &Path, modules: &[String], chain_alias: &str) -> Result<Self, DeployerError> {
        let mut book = Self::new(chain_alias);

        for module in modules {
            let dir = root.join(module).join("deployments").join(chain_alias);
            if !dir.is_dir() {
                debug!(dir = %dir.display(), "deployment directory missing, skipped");
                continue;
            }

            let mut paths: Vec<PathBuf> = std::fs::read_dir(&dir)?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|p| p.extension().is_some_and(|ext| ext == "json"))
                .collect();
            paths.sort();

            for path in paths {
                let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                    continue;
                };
                let contents = std::fs::read_to_string(&path)?;
                let doc: DeploymentDocument =
                    serde_json::from_str(&contents).map_err(|e| DeployerError::Catalog {
                        reason: format!("{}: {e}", path.display()),
                    })?;
                book.insert(name, doc.address);
            }
        }

        info!(chain = chain_alias, contracts = book.len(), "address book loaded");
        Ok(book)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy::primitives::address;

    fn write_doc(root: &Path, module: &str, alias: &str, name: &str, body: &str) {
        let path = deployment_path(root, module, alias, name);
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, body).unwrap();
    }

    #[test]
    fn test_deployment_path_layout() {
        let p = deployment_path(Path::new("/repo"), "silo-core", "arbitrum_one", "SiloDeployer");
        assert_eq!(
            p,
            PathBuf::from("/repo/silo-core/deployments/arbitrum_one/SiloDeployer.json")
        );
    }

    #[test]
    fn test_load_across_modules() {
        let tmp = tempfile::tempdir().unwrap();
        write_doc(
            tmp.path(),
            "silo-core",
            "mainnet",
            "SiloDeployer",
            r#"{"address":"0x1111111111111111111111111111111111111111","abi":[]}"#,
        );
        write_doc(
            tmp.path(),
            "silo-oracles",
            "mainnet",
            "OracleScalerFactory",
            r#"{"address":"0x2222222222222222222222222222222222222222"}"#,
        );
        // Other chains are not picked up.
        write_doc(
            tmp.path(),
            "silo-core",
            "sonic",
            "SiloDeployer",
            r#"{"address":"0x3333333333333333333333333333333333333333"}"#,
        );

        let modules = vec!["silo-core".to_string(), "silo-oracles".to_string(), "absent".to_string()];
        let book = AddressBook::load(tmp.path(), &modules, "mainnet").unwrap();
        assert_eq!(book.len(), 2);
        assert_eq!(
            book.get("SiloDeployer"),
            Some(address!("0x1111111111111111111111111111111111111111"))
        );
        assert_eq!(book.get("SiloFactory"), None);
        assert_eq!(book.chain_alias(), "mainnet");
    }

    #[test]
    fn test_malformed_document_is_catalog_error() {
        let tmp = tempfile::tempdir().unwrap();
        write_doc(tmp.path(), "silo-core", "mainnet", "Broken", r#"{"addr":"0x"}"#);
        let err = AddressBook::load(tmp.path(), &["silo-core".to_string()], "mainnet").unwrap_err();
        assert!(matches!(err, DeployerError::Catalog { .. }));
    }
}
