//! Per-step execution state machine.
//!
//! Every step moves through `Pending → Resolving → Waiting → Acting`
//! and ends `Passed`, `Failed` or `TimedOut`. All failures are caught
//! here and folded into the `StepResult`; timeouts skip the acting
//! phase and trigger diagnostic capture.

use crate::reporter::{ArtifactSink, FailureReporter};
use browser_session::{Session, SessionError};
use chrono::Utc;
use pageproof_core_types::{
    DomSnapshot, ElementHandle, EngineConfig, Locator, Step, StepAction, StepError, StepResult,
    WaitCondition,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use target_resolver::{ResolveError, TargetResolver};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use url::Url;
use wait_engine::{WaitEngine, WaitOutcome};

/// Phase a step is in; carried in logs and failure context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepPhase {
    Pending,
    Resolving,
    Waiting,
    Acting,
}

/// Executes one step against one session.
pub struct StepExecutor {
    resolver: Arc<dyn TargetResolver>,
    waits: Arc<WaitEngine>,
    reporter: Arc<dyn FailureReporter>,
    sink: Arc<dyn ArtifactSink>,
    config: Arc<EngineConfig>,
}

impl StepExecutor {
    pub fn new(
        resolver: Arc<dyn TargetResolver>,
        waits: Arc<WaitEngine>,
        reporter: Arc<dyn FailureReporter>,
        sink: Arc<dyn ArtifactSink>,
        config: Arc<EngineConfig>,
    ) -> Self {
        Self {
            resolver,
            waits,
            reporter,
            sink,
            config,
        }
    }

    /// Run the step and record its outcome. Never returns an error:
    /// every fault becomes part of the `StepResult`.
    pub async fn execute(
        &self,
        scenario: &str,
        index: usize,
        step: &Step,
        session: &dyn Session,
        cancel: &CancellationToken,
    ) -> StepResult {
        let label = step.action.label();
        let started_at = Utc::now();
        let start = Instant::now();
        let timeout = Duration::from_millis(
            step.timeout_ms.unwrap_or(self.config.default_timeout_ms),
        );

        info!(scenario, index, step = %label, "step start");

        let outcome = self
            .run_action(&step.action, timeout, session, cancel)
            .await;

        let latency_ms = start.elapsed().as_millis() as u64;
        let mut result = StepResult {
            index,
            label,
            status: pageproof_core_types::StepStatus::Passed,
            error: None,
            artifact: None,
            capture_note: None,
            started_at,
            latency_ms,
        };

        match outcome {
            Ok(artifact) => {
                result.artifact = artifact;
                debug!(scenario, index, latency_ms, "step passed");
            }
            Err(error) => {
                result.status = error.status();
                warn!(scenario, index, %error, status = ?result.status, "step did not pass");

                // Capture evidence unless the run is being torn down.
                if !cancel.is_cancelled() {
                    let capture = self.reporter.capture(scenario, index, session).await;
                    result.artifact = capture.artifact;
                    result.capture_note = capture.note;
                }
                result.error = Some(error);
            }
        }

        result
    }

    /// The state machine body. Returns an artifact reference only for
    /// steps that produce one on success (Screenshot).
    async fn run_action(
        &self,
        action: &StepAction,
        timeout: Duration,
        session: &dyn Session,
        cancel: &CancellationToken,
    ) -> Result<Option<pageproof_core_types::ArtifactRef>, StepError> {
        if cancel.is_cancelled() {
            return Err(cancelled(StepPhase::Pending));
        }

        match action {
            StepAction::Navigate { url } => {
                debug!(phase = ?StepPhase::Acting, "navigate");
                let full = self.resolve_url(url)?;
                session.navigate(&full).await.map_err(map_session)?;

                self.wait_or_fail(session, &WaitCondition::DocumentReady, timeout, cancel)
                    .await?;
                Ok(None)
            }

            StepAction::Click { target } => {
                self.wait_or_fail(
                    session,
                    &WaitCondition::ElementVisible {
                        target: target.clone(),
                    },
                    timeout,
                    cancel,
                )
                .await?;

                debug!(phase = ?StepPhase::Resolving, %target, "resolving click target");
                let doc = session.current_document().await.map_err(map_session)?;
                let handle = self.resolve_unique(target, &doc)?;

                debug!(phase = ?StepPhase::Acting, %target, "click");
                session.click(&handle).await.map_err(map_session)?;
                Ok(None)
            }

            StepAction::Fill { target, value } => {
                self.wait_or_fail(
                    session,
                    &WaitCondition::ElementVisible {
                        target: target.clone(),
                    },
                    timeout,
                    cancel,
                )
                .await?;

                debug!(phase = ?StepPhase::Resolving, %target, "resolving fill target");
                let doc = session.current_document().await.map_err(map_session)?;
                let handle = self.resolve_unique(target, &doc)?;

                debug!(phase = ?StepPhase::Acting, %target, "fill");
                session.fill(&handle, value).await.map_err(map_session)?;
                Ok(None)
            }

            StepAction::WaitFor { condition } => {
                self.wait_or_fail(session, condition, timeout, cancel)
                    .await?;
                Ok(None)
            }

            StepAction::AssertVisible { target } => {
                self.wait_or_fail(
                    session,
                    &WaitCondition::ElementResolvable {
                        target: target.clone(),
                    },
                    timeout,
                    cancel,
                )
                .await?;

                debug!(phase = ?StepPhase::Resolving, %target, "resolving assertion target");
                let doc = session.current_document().await.map_err(map_session)?;
                let candidates = self.resolve_all(target, &doc)?;
                if candidates.is_empty() {
                    return Err(StepError::TargetNotFound {
                        locator: target.to_string(),
                    });
                }

                let visible = candidates
                    .iter()
                    .filter_map(|h| doc.node(h))
                    .filter(|n| n.visible)
                    .count();
                if visible == 0 {
                    return Err(StepError::AssertionMismatch {
                        expected: format!("{} visible", target),
                        actual: format!("{} matches, none visible", candidates.len()),
                    });
                }
                Ok(None)
            }

            StepAction::AssertText { target, expected } => {
                self.wait_or_fail(
                    session,
                    &WaitCondition::ElementResolvable {
                        target: target.clone(),
                    },
                    timeout,
                    cancel,
                )
                .await?;

                debug!(phase = ?StepPhase::Resolving, %target, "resolving assertion target");
                let doc = session.current_document().await.map_err(map_session)?;
                let candidates = self.resolve_all(target, &doc)?;
                if candidates.is_empty() {
                    return Err(StepError::TargetNotFound {
                        locator: target.to_string(),
                    });
                }

                let mut observed: Vec<String> = Vec::new();
                for handle in &candidates {
                    let text = session.read_text(handle).await.map_err(map_session)?;
                    if text.contains(expected.as_str()) {
                        return Ok(None);
                    }
                    observed.push(text);
                }
                Err(StepError::AssertionMismatch {
                    expected: format!("text containing {:?}", expected),
                    actual: format!("{:?}", observed),
                })
            }

            StepAction::Screenshot { name } => {
                debug!(phase = ?StepPhase::Acting, name, "screenshot");
                let bytes = session.screenshot().await.map_err(map_session)?;
                let key = self
                    .sink
                    .put(name, &bytes)
                    .await
                    .map_err(|err| StepError::ActionFailed(err.to_string()))?;
                Ok(Some(pageproof_core_types::ArtifactRef {
                    screenshot: Some(key),
                    snapshot: None,
                }))
            }
        }
    }

    /// Run a wait and translate non-ready outcomes into step errors.
    async fn wait_or_fail(
        &self,
        session: &dyn Session,
        condition: &WaitCondition,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<(), StepError> {
        debug!(phase = ?StepPhase::Waiting, %condition, "waiting");
        let outcome = self
            .waits
            .wait(session, condition, timeout, cancel)
            .await
            .map_err(|err| match err {
                wait_engine::WaitError::Session(e) => map_session(e),
                wait_engine::WaitError::Resolve(e) => map_resolve(e),
            })?;

        match outcome {
            WaitOutcome::Ready { .. } => Ok(()),
            WaitOutcome::TimedOut { last_observed, .. } => Err(StepError::TimedOut {
                timeout_ms: timeout.as_millis() as u64,
                last_observed,
            }),
            WaitOutcome::Cancelled => Err(cancelled(StepPhase::Waiting)),
        }
    }

    /// Fresh resolution with the uniqueness policy Click/Fill require:
    /// zero or multiple matches fail the step, never a silent pick.
    fn resolve_unique(
        &self,
        target: &Locator,
        doc: &DomSnapshot,
    ) -> Result<ElementHandle, StepError> {
        let candidates = self.resolve_all(target, doc)?;
        match candidates.len() {
            0 => Err(StepError::TargetNotFound {
                locator: target.to_string(),
            }),
            1 => Ok(candidates[0]),
            count => Err(StepError::AmbiguousTarget {
                locator: target.to_string(),
                count,
            }),
        }
    }

    fn resolve_all(
        &self,
        target: &Locator,
        doc: &DomSnapshot,
    ) -> Result<Vec<ElementHandle>, StepError> {
        self.resolver.resolve(target, doc).map_err(map_resolve)
    }

    /// Absolute URLs pass through; relative ones are joined onto the
    /// configured base URL when one is set.
    fn resolve_url(&self, url: &str) -> Result<String, StepError> {
        if url.contains("://") {
            return Ok(url.to_string());
        }
        match &self.config.base_url {
            Some(base) => {
                let base = Url::parse(base).map_err(|err| {
                    StepError::ActionFailed(format!("invalid base url {:?}: {}", base, err))
                })?;
                let joined = base.join(url).map_err(|err| {
                    StepError::ActionFailed(format!("cannot join {:?} onto base: {}", url, err))
                })?;
                Ok(joined.to_string())
            }
            None => Ok(url.to_string()),
        }
    }
}

fn cancelled(phase: StepPhase) -> StepError {
    StepError::ActionFailed(format!("scenario cancelled during {:?} phase", phase))
}

fn map_session(err: SessionError) -> StepError {
    if err.is_action_level() {
        StepError::ActionFailed(err.to_string())
    } else {
        StepError::SessionError(err.to_string())
    }
}

fn map_resolve(err: ResolveError) -> StepError {
    StepError::ActionFailed(err.to_string())
}
