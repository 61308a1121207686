pub mod address_book;
pub mod irm_presets;
pub mod oracles;

pub use address_book::{deployment_path, AddressBook};
pub use irm_presets::IrmPresets;
pub use oracles::{KnownOracle, KnownOracleKind, OracleCatalog};
