use futures::future::BoxFuture;
use serde::Serialize;
use std::fmt;
use std::future::Future;

/// Terminal state of a check.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckStatus {
    Success,
    Failed,
    /// Independent reference data is missing; the on-chain value is reported
    /// but not judged.
    Warning,
}

impl CheckStatus {
    pub fn symbol(self) -> &'static str {
        match self {
            CheckStatus::Success => "✓",
            CheckStatus::Failed => "✗",
            CheckStatus::Warning => "⚠",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckOutcome {
    pub status: CheckStatus,
    pub message: String,
}

impl CheckOutcome {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Success,
            message: message.into(),
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Failed,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            status: CheckStatus::Warning,
            message: message.into(),
        }
    }
}

pub type ProbeFuture = BoxFuture<'static, anyhow::Result<CheckOutcome>>;
type ProbeFn = Box<dyn FnOnce() -> ProbeFuture + Send>;

/// Identity and ordering key of a check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckInfo {
    pub id: String,
    pub name: String,
    pub order: u32,
    /// `market`, `silo0` or `silo1`.
    pub source: String,
}

/// One narrowly scoped audit step. The probe runs once; anything it
/// captures must be immutable.
pub struct VerificationCheck {
    pub info: CheckInfo,
    probe: ProbeFn,
}

impl VerificationCheck {
    pub fn new<F, Fut>(
        id: impl Into<String>,
        name: impl Into<String>,
        order: u32,
        source: impl Into<String>,
        probe: F,
    ) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<CheckOutcome>> + Send + 'static,
    {
        Self {
            info: CheckInfo {
                id: id.into(),
                name: name.into(),
                order,
                source: source.into(),
            },
            probe: Box::new(move || -> ProbeFuture { Box::pin(probe()) }),
        }
    }

    pub(crate) fn into_parts(self) -> (CheckInfo, ProbeFn) {
        (self.info, self.probe)
    }
}

impl fmt::Debug for VerificationCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VerificationCheck")
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    #[serde(flatten)]
    pub info: CheckInfo,
    #[serde(flatten)]
    pub outcome: CheckOutcome,
}

impl CheckResult {
    pub fn status(&self) -> CheckStatus {
        self.outcome.status
    }
}

/// Progress notifications for a UI or log follower.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckEvent {
    Pending { id: String },
    Running { id: String },
    Finished(CheckResult),
}
