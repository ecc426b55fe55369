//! Execution results: the engine's sole output contract.

use crate::error::StepError;
use crate::RunId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StepStatus {
    Passed,
    Failed,
    TimedOut,
    /// Never attempted because an earlier step did not pass.
    NotRun,
}

impl StepStatus {
    pub fn is_passed(&self) -> bool {
        matches!(self, StepStatus::Passed)
    }
}

/// Reference to diagnostic artifacts stored in the artifact sink.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactRef {
    /// Sink key of the screenshot, if one was captured.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<String>,

    /// Sink key of the textual document/console snapshot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<String>,
}

impl ArtifactRef {
    pub fn is_empty(&self) -> bool {
        self.screenshot.is_none() && self.snapshot.is_none()
    }
}

/// Immutable record of one executed (or skipped) step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StepResult {
    /// Zero-based position within the scenario.
    pub index: usize,

    /// Human label of the step, e.g. `click role=button name="Login"`.
    pub label: String,

    pub status: StepStatus,

    /// Why the step failed or timed out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<StepError>,

    /// Diagnostic artifacts captured on failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub artifact: Option<ArtifactRef>,

    /// Secondary note when diagnostic capture itself failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub capture_note: Option<String>,

    pub started_at: DateTime<Utc>,

    pub latency_ms: u64,
}

impl StepResult {
    /// Record for a step that was never attempted.
    pub fn not_run(index: usize, label: String) -> Self {
        Self {
            index,
            label,
            status: StepStatus::NotRun,
            error: None,
            artifact: None,
            capture_note: None,
            started_at: Utc::now(),
            latency_ms: 0,
        }
    }
}

/// Ordered record of one scenario execution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub run_id: RunId,

    pub scenario: String,

    /// True iff every step passed.
    pub passed: bool,

    /// Scenario-level failure (session creation, cancellation). When a
    /// session could not be created there are no step results at all.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    pub step_results: Vec<StepResult>,

    pub started_at: DateTime<Utc>,

    pub finished_at: DateTime<Utc>,

    pub latency_ms: u64,
}

impl ScenarioResult {
    pub fn new(scenario: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            run_id: RunId::new(),
            scenario: scenario.into(),
            passed: false,
            error: None,
            step_results: Vec::new(),
            started_at: now,
            finished_at: now,
            latency_ms: 0,
        }
    }

    pub fn with_step(mut self, result: StepResult) -> Self {
        self.step_results.push(result);
        self
    }

    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.passed = false;
        self.error = Some(error.into());
        self
    }

    /// Seal the result: set finish time, latency and the overall flag.
    pub fn finish(mut self) -> Self {
        self.finished_at = Utc::now();
        self.latency_ms = (self.finished_at - self.started_at).num_milliseconds().max(0) as u64;
        self.passed =
            self.error.is_none() && self.step_results.iter().all(|r| r.status.is_passed());
        self
    }

    /// First step that did not pass, if any.
    pub fn first_failure(&self) -> Option<&StepResult> {
        self.step_results
            .iter()
            .find(|r| !r.status.is_passed() && r.status != StepStatus::NotRun)
    }
}
