//! End-to-end verification flows against the scripted browser,
//! mirroring the onboarding/login/dashboard journeys the engine is
//! meant to confirm after a deploy.

use anyhow::Result;
use browser_session::{ClickEffect, ElementModel, PageModel, ScriptedBrowser, SiteModel};
use pageproof_cli::scenario_file;
use pageproof_core_types::{
    EngineConfig, Locator, Scenario, Step, StepError, StepStatus, WaitCondition,
};
use scenario_flow::{FsArtifactSink, MemoryArtifactSink, ScenarioRunner};
use std::sync::Arc;
use tempfile::TempDir;

/// Site model of the target banking app: onboarding, login, dashboard,
/// transactions, cards.
fn bank_site() -> SiteModel {
    SiteModel::new()
        .with_page(
            PageModel::new("/onboarding")
                .with_title("Welcome")
                .with_element(
                    ElementModel::new("welcome", "div").with_class("welcome-container"),
                )
                .with_element(
                    ElementModel::button("get-started", "Get Started").on_click(
                        ClickEffect::Reveal {
                            keys: vec!["bank".into(), "continue".into()],
                            after_ms: 30,
                        },
                    ),
                )
                .with_element(
                    ElementModel::new("bank", "div")
                        .with_class("bank-card")
                        .with_text("Chase")
                        .hidden(),
                )
                .with_element(
                    ElementModel::button("continue", "Continue")
                        .hidden()
                        .on_click(ClickEffect::Goto {
                            path: "/".into(),
                            after_ms: 40,
                        }),
                ),
        )
        .with_page(
            PageModel::new("/login")
                .with_title("Login")
                .with_element(ElementModel::input("email", "Email").with_attr("name", "email"))
                .with_element(
                    ElementModel::input("password", "Password").with_attr("name", "password"),
                )
                .with_element(ElementModel::button("login", "Login").with_attr("type", "submit").on_click(
                    ClickEffect::Goto {
                        path: "/".into(),
                        after_ms: 50,
                    },
                )),
        )
        .with_page(
            PageModel::new("/")
                .with_title("Dashboard")
                .with_load_ms(40)
                .with_element(
                    ElementModel::new("container", "div").with_class("dashboard-container"),
                )
                .with_element(ElementModel::new("heading", "h1").with_text("Dashboard")),
        )
        .with_page(
            PageModel::new("/transactions")
                .with_title("Transactions")
                .with_element(
                    ElementModel::new("row", "div")
                        .with_class("transaction-row")
                        .with_text("Coffee -3.50"),
                ),
        )
        .with_page(
            PageModel::new("/cards")
                .with_title("My Cards")
                .with_element({
                    let mut h = ElementModel::new("heading", "h1").with_text("My Cards");
                    h.role = Some("heading".into());
                    h.name = Some("My Cards".into());
                    h
                })
                .with_element(
                    ElementModel::new("empty", "p")
                        .with_text("No virtual cards found. Create one to get started!"),
                ),
        )
}

fn fast_config() -> EngineConfig {
    EngineConfig {
        base_url: Some("http://localhost:3000".into()),
        poll_interval_ms: 20,
        default_timeout_ms: 2_000,
        ..EngineConfig::default()
    }
}

fn runner() -> ScenarioRunner {
    ScenarioRunner::new(
        Arc::new(ScriptedBrowser::new(bank_site())),
        fast_config(),
        Arc::new(MemoryArtifactSink::new()),
    )
}

#[tokio::test]
async fn login_scenario_passes_with_five_green_steps() {
    let scenario = Scenario::new("login")
        .with_step(Step::navigate("/login"))
        .with_step(Step::fill(Locator::label("Email"), "test@example.com"))
        .with_step(Step::fill(Locator::label("Password"), "password123"))
        .with_step(Step::click(Locator::role("button", "Login")))
        .with_step(Step::assert_visible(Locator::text("Dashboard")));

    let result = runner().run(&scenario).await;

    assert!(result.passed, "{:?}", result);
    assert_eq!(result.step_results.len(), 5);
    assert!(result
        .step_results
        .iter()
        .all(|r| r.status == StepStatus::Passed));
}

#[tokio::test]
async fn onboarding_flow_with_selectors_and_delayed_reveals() {
    let scenario = Scenario::new("onboarding")
        .with_step(Step::navigate("/onboarding"))
        .with_step(Step::assert_visible(Locator::selector(".welcome-container")))
        .with_step(Step::click(Locator::selector(
            r#"button:has-text("Get Started")"#,
        )))
        .with_step(Step::click(Locator::selector(".bank-card")))
        .with_step(Step::click(Locator::selector(
            r#"button:has-text("Continue")"#,
        )))
        .with_step(Step::wait_for(WaitCondition::UrlMatches {
            pattern: "localhost:3000/".into(),
        }))
        .with_step(Step::assert_visible(Locator::selector(
            ".dashboard-container",
        )));

    let result = runner().run(&scenario).await;
    assert!(result.passed, "{:?}", result);
}

#[tokio::test]
async fn transactions_page_renders_a_row_after_login() {
    let scenario = Scenario::new("transactions")
        .with_step(Step::navigate("/login"))
        .with_step(Step::fill(Locator::label("Email"), "test@example.com"))
        .with_step(Step::fill(Locator::label("Password"), "password"))
        .with_step(Step::click(Locator::selector(r#"button[type="submit"]"#)))
        .with_step(Step::wait_for(WaitCondition::NetworkIdle))
        .with_step(Step::navigate("/transactions"))
        .with_step(Step::assert_visible(Locator::selector(".transaction-row")))
        .with_step(Step::assert_text(
            Locator::selector(".transaction-row"),
            "Coffee",
        ))
        .with_step(Step::screenshot("transactions-page.png"));

    let result = runner().run(&scenario).await;
    assert!(result.passed, "{:?}", result);
}

#[tokio::test]
async fn cards_page_heading_and_empty_state() {
    let scenario = Scenario::new("cards")
        .with_step(Step::navigate("/cards"))
        .with_step(Step::assert_visible(Locator::role("heading", "My Cards")))
        .with_step(Step::assert_text(
            Locator::selector("p"),
            "No virtual cards found",
        ));

    let result = runner().run(&scenario).await;
    assert!(result.passed, "{:?}", result);
}

#[tokio::test]
async fn ambiguous_button_fails_and_pads_the_rest() {
    let site = bank_site().with_page(
        PageModel::new("/dup")
            .with_element(ElementModel::button("a", "Submit"))
            .with_element(ElementModel::button("b", "Submit")),
    );
    let runner = ScenarioRunner::new(
        Arc::new(ScriptedBrowser::new(site)),
        fast_config(),
        Arc::new(MemoryArtifactSink::new()),
    );

    let scenario = Scenario::new("ambiguous")
        .with_step(Step::navigate("/dup"))
        .with_step(Step::click(Locator::role("button", "Submit")))
        .with_step(Step::assert_visible(Locator::text("Done")));

    let result = runner.run(&scenario).await;

    assert!(!result.passed);
    assert_eq!(result.step_results.len(), 3);
    assert!(matches!(
        result.step_results[1].error,
        Some(StepError::AmbiguousTarget { count: 2, .. })
    ));
    assert_eq!(result.step_results[2].status, StepStatus::NotRun);
}

#[tokio::test]
async fn stalled_navigation_times_out_with_artifacts_on_disk() {
    let dir = TempDir::new().unwrap();
    let runner = ScenarioRunner::new(
        Arc::new(ScriptedBrowser::new(bank_site())),
        fast_config(),
        Arc::new(FsArtifactSink::new(dir.path())),
    );

    let scenario = Scenario::new("stalled")
        .with_step(Step::navigate("/login"))
        .with_step(
            Step::wait_for(WaitCondition::UrlMatches {
                pattern: "/dashboard".into(),
            })
            .with_timeout_ms(1_000),
        );

    let result = runner.run(&scenario).await;

    assert!(!result.passed);
    let step = &result.step_results[1];
    assert_eq!(step.status, StepStatus::TimedOut);
    // Timed out at roughly the configured second, not the default.
    assert!(step.latency_ms >= 1_000 && step.latency_ms < 1_500);

    let artifact = step.artifact.as_ref().expect("artifact");
    let screenshot = artifact.screenshot.as_ref().unwrap();
    let snapshot = artifact.snapshot.as_ref().unwrap();
    assert!(std::path::Path::new(screenshot).exists());
    let text = std::fs::read_to_string(snapshot).unwrap();
    assert!(text.contains("url: http://localhost:3000/login"));
}

#[tokio::test]
async fn scenario_loaded_from_json_runs_green() -> Result<()> {
    let dir = TempDir::new()?;
    let path = dir.path().join("login.json");
    std::fs::write(
        &path,
        r#"{
          "name": "login from file",
          "steps": [
            {"kind": "navigate", "url": "/login"},
            {"kind": "fill", "target": {"kind": "by_label", "text": "Email"}, "value": "test@example.com"},
            {"kind": "fill", "target": {"kind": "by_label", "text": "Password"}, "value": "password"},
            {"kind": "click", "target": {"kind": "by_role", "role": "button", "name": "Login"}},
            {"kind": "assert_visible", "target": {"kind": "by_text", "text": "Dashboard"}}
          ]
        }"#,
    )?;

    let scenario = scenario_file::load_scenario(&path)?;
    let result = runner().run(&scenario).await;

    assert!(result.passed, "{:?}", result);
    assert_eq!(result.step_results.len(), scenario.steps.len());
    Ok(())
}
