pub mod deploy;
pub mod fixed_point;
pub mod irm;
pub mod market;
pub mod oracle;
pub mod serde_num;
pub mod snapshot;

pub use deploy::{CompiledDeployment, DeployArguments, ResolutionWarning};
pub use fixed_point::Percent;
pub use irm::{IrmSelection, KinkIrmConfig, LegacyIrmConfig};
pub use market::{ManageableOracleSettings, MarketConfiguration, MarketSide, Side, Token};
pub use oracle::{OracleRole, OracleSelection, OracleSlotInput};
pub use snapshot::{ConfigSnapshot, IrmKind, OracleKind, OracleSnapshot, SideSnapshot};
