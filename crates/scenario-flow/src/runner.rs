//! Scenario runner: strict-order, fail-fast execution on one session.

use crate::executor::StepExecutor;
use crate::reporter::{ArtifactSink, DefaultFailureReporter};
use browser_session::Browser;
use pageproof_core_types::{EngineConfig, Scenario, ScenarioResult, StepResult};
use std::sync::Arc;
use target_resolver::DefaultTargetResolver;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use wait_engine::WaitEngine;

/// Runs scenarios, one isolated session each.
///
/// The runner holds no per-run state, so one instance may drive many
/// scenarios concurrently; sessions are never shared between runs.
pub struct ScenarioRunner {
    browser: Arc<dyn Browser>,
    executor: StepExecutor,
}

impl ScenarioRunner {
    pub fn new(
        browser: Arc<dyn Browser>,
        config: EngineConfig,
        sink: Arc<dyn ArtifactSink>,
    ) -> Self {
        let config = Arc::new(config);
        let resolver = Arc::new(DefaultTargetResolver::new());
        let waits = Arc::new(WaitEngine::new(resolver.clone(), &config));
        let reporter = Arc::new(DefaultFailureReporter::new(sink.clone()));
        let executor = StepExecutor::new(resolver, waits, reporter, sink, config);
        Self { browser, executor }
    }

    /// Run to completion without external cancellation.
    pub async fn run(&self, scenario: &Scenario) -> ScenarioResult {
        self.run_cancellable(scenario, &CancellationToken::new())
            .await
    }

    /// Execute the scenario's steps strictly in declared order,
    /// stopping at the first step that does not pass. Every remaining
    /// step is recorded as `NotRun`, so the result always has exactly
    /// one record per step. The session is closed on every exit path.
    pub async fn run_cancellable(
        &self,
        scenario: &Scenario,
        cancel: &CancellationToken,
    ) -> ScenarioResult {
        info!(scenario = %scenario.name, steps = scenario.steps.len(), "scenario start");
        let mut result = ScenarioResult::new(&scenario.name);

        let session = match self.browser.new_session().await {
            Ok(session) => session,
            Err(err) => {
                warn!(scenario = %scenario.name, %err, "session creation failed");
                return result
                    .with_error(format!("session creation failed: {}", err))
                    .finish();
            }
        };

        let mut stopped = false;
        for (index, step) in scenario.steps.iter().enumerate() {
            if stopped || cancel.is_cancelled() {
                result = result.with_step(StepResult::not_run(index, step.action.label()));
                continue;
            }

            let step_result = self
                .executor
                .execute(&scenario.name, index, step, session.as_ref(), cancel)
                .await;

            // Later steps presuppose this one's side effects.
            if !step_result.status.is_passed() {
                stopped = true;
            }
            result = result.with_step(step_result);
        }

        if cancel.is_cancelled() {
            result = result.with_error("scenario cancelled");
        }

        // Release the browser context no matter how the run went.
        if let Err(err) = session.close().await {
            warn!(scenario = %scenario.name, %err, "session close failed");
        }

        let result = result.finish();
        info!(
            scenario = %scenario.name,
            passed = result.passed,
            latency_ms = result.latency_ms,
            "scenario finished"
        );
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporter::MemoryArtifactSink;
    use async_trait::async_trait;
    use browser_session::{
        ClickEffect, ElementModel, PageModel, ScriptedBrowser, Session, SessionError, SiteModel,
    };
    use pageproof_core_types::{Locator, Step, StepStatus, WaitCondition};
    use parking_lot::Mutex;

    /// Wrapper that remembers handed-out sessions so tests can check
    /// they were closed.
    struct TrackingBrowser {
        inner: ScriptedBrowser,
        sessions: Mutex<Vec<Arc<dyn Session>>>,
    }

    impl TrackingBrowser {
        fn new(site: SiteModel) -> Self {
            Self {
                inner: ScriptedBrowser::new(site),
                sessions: Mutex::new(Vec::new()),
            }
        }

        async fn all_closed(&self) -> bool {
            let sessions: Vec<Arc<dyn Session>> = self.sessions.lock().clone();
            for session in sessions {
                if session.current_url().await != Err(SessionError::Closed) {
                    return false;
                }
            }
            true
        }
    }

    #[async_trait]
    impl Browser for TrackingBrowser {
        async fn launch(&self) -> Result<(), SessionError> {
            self.inner.launch().await
        }

        async fn new_session(&self) -> Result<Arc<dyn Session>, SessionError> {
            let session = self.inner.new_session().await?;
            self.sessions.lock().push(session.clone());
            Ok(session)
        }
    }

    fn fast_config() -> EngineConfig {
        EngineConfig {
            poll_interval_ms: 20,
            default_timeout_ms: 400,
            ..EngineConfig::default()
        }
    }

    fn login_site() -> SiteModel {
        SiteModel::new()
            .with_page(
                PageModel::new("/login")
                    .with_title("Login")
                    .with_element(ElementModel::input("email", "Email"))
                    .with_element(ElementModel::input("password", "Password"))
                    .with_element(ElementModel::button("login", "Login").on_click(
                        ClickEffect::Goto {
                            path: "/dashboard".into(),
                            after_ms: 30,
                        },
                    )),
            )
            .with_page(
                PageModel::new("/dashboard")
                    .with_title("Dashboard")
                    .with_load_ms(40)
                    .with_element(ElementModel::new("heading", "h1").with_text("Dashboard")),
            )
    }

    fn login_scenario() -> Scenario {
        Scenario::new("login")
            .with_step(Step::navigate("/login"))
            .with_step(Step::fill(Locator::label("Email"), "a@b.com"))
            .with_step(Step::fill(Locator::label("Password"), "x"))
            .with_step(Step::click(Locator::role("button", "Login")))
            .with_step(Step::assert_visible(Locator::text("Dashboard")))
    }

    fn runner_for(browser: Arc<dyn Browser>) -> ScenarioRunner {
        ScenarioRunner::new(browser, fast_config(), Arc::new(MemoryArtifactSink::new()))
    }

    #[tokio::test]
    async fn login_flow_passes_end_to_end() {
        let browser = Arc::new(TrackingBrowser::new(login_site()));
        let runner = runner_for(browser.clone());

        let result = runner.run(&login_scenario()).await;

        assert!(result.passed, "{:?}", result);
        assert_eq!(result.step_results.len(), 5);
        assert!(result
            .step_results
            .iter()
            .all(|r| r.status == StepStatus::Passed));
        assert!(browser.all_closed().await);
    }

    #[tokio::test]
    async fn failure_stops_the_run_and_pads_not_run() {
        let site = SiteModel::new().with_page(
            PageModel::new("/form")
                .with_element(ElementModel::button("a", "Submit"))
                .with_element(ElementModel::button("b", "Submit")),
        );
        let browser = Arc::new(TrackingBrowser::new(site));
        let runner = runner_for(browser.clone());

        let scenario = Scenario::new("double submit")
            .with_step(Step::navigate("/form"))
            .with_step(Step::click(Locator::role("button", "Submit")))
            .with_step(Step::assert_visible(Locator::text("Done")));

        let result = runner.run(&scenario).await;

        assert!(!result.passed);
        assert_eq!(result.step_results.len(), 3);
        assert_eq!(result.step_results[0].status, StepStatus::Passed);
        assert_eq!(result.step_results[1].status, StepStatus::Failed);
        assert_eq!(result.step_results[2].status, StepStatus::NotRun);
        assert!(browser.all_closed().await);
    }

    #[tokio::test]
    async fn wait_timeout_marks_step_timed_out() {
        let browser = Arc::new(TrackingBrowser::new(login_site()));
        let runner = runner_for(browser.clone());

        let scenario = Scenario::new("stuck")
            .with_step(Step::navigate("/login"))
            .with_step(
                Step::wait_for(WaitCondition::UrlMatches {
                    pattern: "/dashboard".into(),
                })
                .with_timeout_ms(120),
            )
            .with_step(Step::assert_visible(Locator::text("Dashboard")));

        let result = runner.run(&scenario).await;

        assert!(!result.passed);
        assert_eq!(result.step_results[1].status, StepStatus::TimedOut);
        assert!(result.step_results[1].artifact.is_some());
        assert_eq!(result.step_results[2].status, StepStatus::NotRun);
        assert!(browser.all_closed().await);
    }

    #[tokio::test]
    async fn session_refusal_is_a_scenario_level_failure() {
        let browser = Arc::new(ScriptedBrowser::refusing_sessions("no display"));
        let runner = runner_for(browser);

        let result = runner.run(&login_scenario()).await;

        assert!(!result.passed);
        assert!(result.step_results.is_empty());
        assert!(result.error.as_deref().unwrap().contains("no display"));
    }

    #[tokio::test]
    async fn cancelled_run_skips_steps_and_closes_session() {
        let browser = Arc::new(TrackingBrowser::new(login_site()));
        let runner = runner_for(browser.clone());

        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = runner.run_cancellable(&login_scenario(), &cancel).await;

        assert!(!result.passed);
        assert_eq!(result.step_results.len(), 5);
        assert!(result
            .step_results
            .iter()
            .all(|r| r.status == StepStatus::NotRun));
        assert!(result.error.as_deref().unwrap().contains("cancelled"));
        assert!(browser.all_closed().await);
    }

    #[tokio::test]
    async fn cancellation_mid_wait_fails_the_inflight_step() {
        let browser = Arc::new(TrackingBrowser::new(login_site()));
        let runner = runner_for(browser.clone());

        // The wait can never complete; only cancellation ends it.
        let scenario = Scenario::new("interrupted")
            .with_step(Step::navigate("/login"))
            .with_step(
                Step::wait_for(WaitCondition::UrlMatches {
                    pattern: "/never".into(),
                })
                .with_timeout_ms(10_000),
            )
            .with_step(Step::assert_visible(Locator::text("Dashboard")));

        let cancel = CancellationToken::new();
        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(std::time::Duration::from_millis(60)).await;
            trigger.cancel();
        });

        let result = runner.run_cancellable(&scenario, &cancel).await;

        assert!(!result.passed);
        assert_eq!(result.step_results.len(), 3);
        assert_eq!(result.step_results[0].status, StepStatus::Passed);

        let interrupted = &result.step_results[1];
        assert_eq!(interrupted.status, StepStatus::Failed);
        let reason = interrupted.error.as_ref().unwrap().to_string();
        assert!(reason.contains("cancelled"), "{}", reason);
        // Teardown skips diagnostic capture.
        assert!(interrupted.artifact.is_none());
        // The step ended well before its own timeout.
        assert!(interrupted.latency_ms < 1_000);

        assert_eq!(result.step_results[2].status, StepStatus::NotRun);
        assert!(result.error.as_deref().unwrap().contains("cancelled"));
        assert!(browser.all_closed().await);
    }

    #[tokio::test]
    async fn rerun_yields_identical_status_sequences() {
        let browser = Arc::new(TrackingBrowser::new(login_site()));
        let runner = runner_for(browser.clone());
        let scenario = login_scenario();

        let first = runner.run(&scenario).await;
        let second = runner.run(&scenario).await;

        let statuses =
            |r: &ScenarioResult| r.step_results.iter().map(|s| s.status).collect::<Vec<_>>();
        assert_eq!(statuses(&first), statuses(&second));
    }

    #[tokio::test]
    async fn concurrent_scenarios_use_isolated_sessions() {
        let browser = Arc::new(TrackingBrowser::new(login_site()));
        let runner = Arc::new(runner_for(browser.clone()));

        let a = {
            let runner = runner.clone();
            tokio::spawn(async move { runner.run(&login_scenario()).await })
        };
        let b = {
            let runner = runner.clone();
            tokio::spawn(async move { runner.run(&login_scenario()).await })
        };

        let (a, b) = (a.await.unwrap(), b.await.unwrap());
        assert!(a.passed && b.passed);
        assert_eq!(browser.sessions.lock().len(), 2);
        assert!(browser.all_closed().await);
    }
}
