//! Verification of a deployed market: a registry of independent checks run
//! concurrently over one immutable snapshot.

pub mod check;
pub mod checks;
pub mod context;
pub mod engine;
pub mod registry;

pub use check::{CheckEvent, CheckInfo, CheckOutcome, CheckResult, CheckStatus, VerificationCheck};
pub use context::VerificationContext;
pub use engine::{run_checks, VerificationEngine, VerificationReport};
pub use registry::{CheckFactory, CheckRegistry};
