//! Human-readable result summary and exit-code mapping.

use pageproof_core_types::{ScenarioResult, StepStatus};

fn status_tag(status: StepStatus) -> &'static str {
    match status {
        StepStatus::Passed => "PASS",
        StepStatus::Failed => "FAIL",
        StepStatus::TimedOut => "TIME",
        StepStatus::NotRun => "SKIP",
    }
}

/// Render a per-step summary table.
pub fn render(result: &ScenarioResult) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "scenario {:?}: {} ({}ms)\n",
        result.scenario,
        if result.passed { "PASSED" } else { "FAILED" },
        result.latency_ms
    ));
    if let Some(error) = &result.error {
        out.push_str(&format!("  error: {}\n", error));
    }

    for step in &result.step_results {
        out.push_str(&format!(
            "  [{}] {:>2}. {} ({}ms)\n",
            status_tag(step.status),
            step.index + 1,
            step.label,
            step.latency_ms
        ));
        if let Some(error) = &step.error {
            out.push_str(&format!("        reason: {}\n", error));
        }
        if let Some(artifact) = &step.artifact {
            if let Some(screenshot) = &artifact.screenshot {
                out.push_str(&format!("        screenshot: {}\n", screenshot));
            }
            if let Some(snapshot) = &artifact.snapshot {
                out.push_str(&format!("        snapshot: {}\n", snapshot));
            }
        }
        if let Some(note) = &step.capture_note {
            out.push_str(&format!("        note: {}\n", note));
        }
    }
    out
}

/// 0 = passed, 1 = verification failure. Usage/config errors map to 2
/// in `main`.
pub fn exit_code(result: &ScenarioResult) -> i32 {
    if result.passed {
        0
    } else {
        1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pageproof_core_types::{StepError, StepResult};

    #[test]
    fn render_marks_each_status() {
        let mut failed = StepResult::not_run(1, "click login".into());
        failed.status = StepStatus::Failed;
        failed.error = Some(StepError::TargetNotFound {
            locator: "role=button".into(),
        });

        let result = ScenarioResult::new("login")
            .with_step({
                let mut r = StepResult::not_run(0, "navigate /login".into());
                r.status = StepStatus::Passed;
                r
            })
            .with_step(failed)
            .with_step(StepResult::not_run(2, "assert".into()))
            .finish();

        let text = render(&result);
        assert!(text.contains("[PASS]"));
        assert!(text.contains("[FAIL]"));
        assert!(text.contains("[SKIP]"));
        assert!(text.contains("target not found"));
        assert_eq!(exit_code(&result), 1);
    }
}
