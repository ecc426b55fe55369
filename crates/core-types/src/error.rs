//! Per-step error taxonomy.

use crate::result::StepStatus;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Everything that can go wrong while executing one step.
///
/// These are always caught by the step executor and folded into a
/// `StepResult`; they never escape the scenario runner as faults.
#[derive(Debug, Error, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepError {
    /// Locator resolved to zero elements when exactly one was required.
    #[error("target not found: {locator}")]
    TargetNotFound { locator: String },

    /// Locator resolved to more than one element when exactly one was
    /// required. Never silently picks the first match.
    #[error("ambiguous target: {locator} matched {count} elements")]
    AmbiguousTarget { locator: String, count: usize },

    /// The action itself failed (element detached, click intercepted,
    /// invalid selector, ...).
    #[error("action failed: {0}")]
    ActionFailed(String),

    /// An assert step observed something other than what was expected.
    #[error("assertion mismatch: expected {expected}, observed {actual}")]
    AssertionMismatch { expected: String, actual: String },

    /// A wait ran out of budget. Carries the last-observed state for
    /// diagnostics.
    #[error("timed out after {timeout_ms}ms: {last_observed}")]
    TimedOut {
        timeout_ms: u64,
        last_observed: String,
    },

    /// Browser/process-level failure.
    #[error("session error: {0}")]
    SessionError(String),

    /// Diagnostic capture itself failed. Only ever recorded as a
    /// secondary note; never replaces the original failure.
    #[error("diagnostic capture failed: {0}")]
    CaptureError(String),
}

impl StepError {
    /// Step status this error maps to.
    pub fn status(&self) -> StepStatus {
        match self {
            StepError::TimedOut { .. } => StepStatus::TimedOut,
            _ => StepStatus::Failed,
        }
    }
}
