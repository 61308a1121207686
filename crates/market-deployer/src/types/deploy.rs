use alloy::primitives::{Address, Bytes};
use alloy::sol_types::SolCall;
use std::fmt;

use super::market::Side;
use super::oracle::OracleRole;
use crate::chain::contracts::{
    ClonableHookReceiver, ISiloDeployer, InitData, OracleCreationTxData, Oracles,
};

// ---------------------------------------------------------------------------
// Oracle slot helpers
// ---------------------------------------------------------------------------

impl OracleCreationTxData {
    /// Zero address and empty call data: the slot is unset.
    pub fn unset() -> Self {
        Self::default()
    }

    pub fn deployed(oracle: Address) -> Self {
        Self {
            deployed: oracle,
            factory: Address::ZERO,
            txInput: Bytes::new(),
        }
    }

    pub fn create(factory: Address, tx_input: Bytes) -> Self {
        Self {
            deployed: Address::ZERO,
            factory,
            txInput: tx_input,
        }
    }

    pub fn is_unset(&self) -> bool {
        self.deployed.is_zero() && self.factory.is_zero() && self.txInput.is_empty()
    }
}

impl Oracles {
    pub fn slot(&self, side: Side, role: OracleRole) -> &OracleCreationTxData {
        match (side, role) {
            (Side::Zero, OracleRole::Solvency) => &self.solvencyOracle0,
            (Side::Zero, OracleRole::MaxLtv) => &self.maxLtvOracle0,
            (Side::One, OracleRole::Solvency) => &self.solvencyOracle1,
            (Side::One, OracleRole::MaxLtv) => &self.maxLtvOracle1,
        }
    }
}

// ---------------------------------------------------------------------------
// DeployArguments
// ---------------------------------------------------------------------------

/// The five positional arguments of `SiloDeployer.deploy`, in call order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeployArguments {
    pub oracles: Oracles,
    pub irm_config_data0: Bytes,
    pub irm_config_data1: Bytes,
    pub clonable_hook_receiver: ClonableHookReceiver,
    pub init_data: InitData,
}

impl DeployArguments {
    pub fn to_call(&self) -> ISiloDeployer::deployCall {
        ISiloDeployer::deployCall {
            _oracles: self.oracles.clone(),
            _irmConfigData0: self.irm_config_data0.clone(),
            _irmConfigData1: self.irm_config_data1.clone(),
            _clonableHookReceiver: self.clonable_hook_receiver.clone(),
            _siloInitData: self.init_data.clone(),
        }
    }

    /// Full `deploy(...)` call data, selector included.
    pub fn calldata(&self) -> Bytes {
        Bytes::from(self.to_call().abi_encode())
    }
}

// ---------------------------------------------------------------------------
// Resolution warnings
// ---------------------------------------------------------------------------

/// Non-fatal gap found while compiling. Any warning blocks submission until
/// the operator resolves or accepts it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionWarning {
    /// Contract name absent from the address book; zero address used.
    MissingContract { name: String },
    /// An oracle candidate was skipped because its factory is unknown.
    UnknownOracleFactory {
        side: Side,
        role: OracleRole,
        variant: &'static str,
    },
    /// No valid hook owner; hook init data left empty.
    MissingHookOwner,
}

impl fmt::Display for ResolutionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ResolutionWarning::MissingContract { name } => {
                write!(f, "{name} not found in address book, using zero address")
            }
            ResolutionWarning::UnknownOracleFactory { side, role, variant } => write!(
                f,
                "{side} {}: {variant} factory unknown on this chain, candidate skipped",
                role.label()
            ),
            ResolutionWarning::MissingHookOwner => {
                f.write_str("hook owner missing, hook initialization data is empty")
            }
        }
    }
}

// ---------------------------------------------------------------------------
// CompiledDeployment
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct CompiledDeployment {
    pub arguments: DeployArguments,
    /// `SiloDeployer` address the call must be sent to.
    pub deployer: Address,
    pub irm_factory: Address,
    pub hook_implementation: Address,
    pub warnings: Vec<ResolutionWarning>,
}

impl CompiledDeployment {
    pub fn calldata(&self) -> Bytes {
        self.arguments.calldata()
    }

    /// Any resolution gap blocks submission.
    pub fn is_ready(&self) -> bool {
        self.warnings.is_empty()
    }
}
