use alloy::primitives::Address;
use thiserror::Error;

/// Typed error hierarchy for the deployer.
///
/// Library-internal errors use specific variants; application code wraps with
/// `anyhow::Context` for propagation. Verification outcomes are never errors:
/// they are check statuses (see [`crate::verify`]).
#[derive(Error, Debug)]
pub enum DeployerError {
    // -- Validation ---------------------------------------------------------
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    // -- Numeric ------------------------------------------------------------
    #[error("cannot parse '{input}' as a decimal number")]
    Parse { input: String },

    #[error("value out of range: {reason}")]
    OutOfRange { reason: String },

    // -- Chain --------------------------------------------------------------
    #[error("{method} on {to} reverted")]
    UnexpectedRevert { to: Address, method: &'static str },

    #[error("{method} on {to} returned undecodable data")]
    Decode { to: Address, method: &'static str },

    #[error("snapshot read failed: {reason}")]
    Snapshot { reason: String },

    #[error("deployment not found: {reason}")]
    DeploymentNotFound { reason: String },

    // -- Catalogs -----------------------------------------------------------
    #[error("catalog error: {reason}")]
    Catalog { reason: String },

    // -- Configuration ------------------------------------------------------
    #[error("configuration error: {0}")]
    Config(String),

    // -- Forwarded errors ---------------------------------------------------
    #[error(transparent)]
    Alloy(#[from] alloy::transports::TransportError),

    #[error(transparent)]
    SerdeJson(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl DeployerError {
    /// Shorthand for a labeled validation failure.
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }
}
