pub mod contracts;
pub mod deployment;
#[cfg(test)]
pub mod mock;
pub mod reader;
pub mod snapshot;

pub use deployment::{locate_deployment, DeployedMarket};
pub use reader::{try_call, CallOutcome, ChainReader, Probe, RpcChainReader};
pub use snapshot::read_snapshot;
