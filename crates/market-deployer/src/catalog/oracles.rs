use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::address_book::AddressBook;
use crate::constants::ORACLE_FACTORY_NAMES;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KnownOracleKind {
    Scaler,
    Chainlink,
    PtLinear,
    Other,
}

/// Already deployed oracle listed for a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KnownOracle {
    pub name: String,
    pub address: Address,
    pub kind: KnownOracleKind,
    /// For scalers: the token whose amounts the scaler normalizes.
    pub quote_token: Address,
}

/// Known oracle factories and pre-deployed oracles on one chain.
#[derive(Debug, Clone, Default)]
pub struct OracleCatalog {
    factories: BTreeMap<String, Address>,
    known: Vec<KnownOracle>,
}

impl OracleCatalog {
    pub fn new(known: Vec<KnownOracle>) -> Self {
        Self {
            factories: BTreeMap::new(),
            known,
        }
    }

    /// Take every oracle factory present in the address book.
    pub fn from_address_book(book: &AddressBook, known: Vec<KnownOracle>) -> Self {
        let mut catalog = Self::new(known);
        for name in ORACLE_FACTORY_NAMES {
            if let Some(address) = book.get(name) {
                catalog.factories.insert(name.to_string(), address);
            }
        }
        catalog
    }

    pub fn with_factory(mut self, name: impl Into<String>, address: Address) -> Self {
        self.factories.insert(name.into(), address);
        self
    }

    /// Factory address by canonical name; zero addresses count as unknown.
    pub fn factory(&self, name: &str) -> Option<Address> {
        self.factories.get(name).copied().filter(|a| !a.is_zero())
    }

    /// First catalogued scaler for `quote_token`.
    pub fn find_scaler(&self, quote_token: Address) -> Option<&KnownOracle> {
        self.known
            .iter()
            .find(|o| o.kind == KnownOracleKind::Scaler && o.quote_token == quote_token)
    }

    pub fn known(&self) -> &[KnownOracle] {
        &self.known
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{CHAINLINK_V3_ORACLE_FACTORY, SILO_DEPLOYER};

    #[test]
    fn test_only_oracle_factories_are_taken_from_book() {
        let book = AddressBook::new("mainnet")
            .with(CHAINLINK_V3_ORACLE_FACTORY, Address::repeat_byte(0x01))
            .with(SILO_DEPLOYER, Address::repeat_byte(0x02));
        let catalog = OracleCatalog::from_address_book(&book, vec![]);
        assert_eq!(catalog.factory(CHAINLINK_V3_ORACLE_FACTORY), Some(Address::repeat_byte(0x01)));
        assert_eq!(catalog.factory(SILO_DEPLOYER), None);
    }

    #[test]
    fn test_zero_factory_is_unknown() {
        let catalog = OracleCatalog::default().with_factory(CHAINLINK_V3_ORACLE_FACTORY, Address::ZERO);
        assert_eq!(catalog.factory(CHAINLINK_V3_ORACLE_FACTORY), None);
    }

    #[test]
    fn test_find_scaler_by_quote_token() {
        let usdc = Address::repeat_byte(0xcc);
        let catalog = OracleCatalog::new(vec![
            KnownOracle {
                name: "USDC chainlink".into(),
                address: Address::repeat_byte(0x10),
                kind: KnownOracleKind::Chainlink,
                quote_token: usdc,
            },
            KnownOracle {
                name: "USDC scaler".into(),
                address: Address::repeat_byte(0x11),
                kind: KnownOracleKind::Scaler,
                quote_token: usdc,
            },
        ]);
        assert_eq!(catalog.find_scaler(usdc).map(|o| o.address), Some(Address::repeat_byte(0x11)));
        assert!(catalog.find_scaler(Address::repeat_byte(0xdd)).is_none());
    }
}
