//! Declarative scenario model: locators, steps, wait conditions.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Declarative description of a target UI element.
///
/// Locators are resolved fresh against the live document every time a
/// step uses them; element handles are never cached across navigations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Locator {
    /// ARIA role plus accessible name, both exact.
    ByRole { role: String, name: String },

    /// Associated label text, exact.
    ByLabel { text: String },

    /// Visible text content, exact (trimmed).
    ByText { text: String },

    /// Structural predicate, e.g. `button[type="submit"]` or
    /// `.bank-card:has-text("Chase")`.
    BySelector { selector: String },
}

impl Locator {
    pub fn role(role: impl Into<String>, name: impl Into<String>) -> Self {
        Locator::ByRole {
            role: role.into(),
            name: name.into(),
        }
    }

    pub fn label(text: impl Into<String>) -> Self {
        Locator::ByLabel { text: text.into() }
    }

    pub fn text(text: impl Into<String>) -> Self {
        Locator::ByText { text: text.into() }
    }

    pub fn selector(selector: impl Into<String>) -> Self {
        Locator::BySelector {
            selector: selector.into(),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Locator::ByRole { role, name } => write!(f, "role={} name={:?}", role, name),
            Locator::ByLabel { text } => write!(f, "label={:?}", text),
            Locator::ByText { text } => write!(f, "text={:?}", text),
            Locator::BySelector { selector } => write!(f, "selector={:?}", selector),
        }
    }
}

/// Condition the wait engine can poll for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum WaitCondition {
    /// Locator resolves to at least one element.
    ElementResolvable { target: Locator },

    /// Locator resolves to at least one visible element.
    ElementVisible { target: Locator },

    /// Current URL contains the given pattern.
    UrlMatches { pattern: String },

    /// Document finished loading.
    DocumentReady,

    /// No in-flight network requests for a sustained quiet window.
    NetworkIdle,
}

impl fmt::Display for WaitCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WaitCondition::ElementResolvable { target } => {
                write!(f, "element resolvable ({})", target)
            }
            WaitCondition::ElementVisible { target } => write!(f, "element visible ({})", target),
            WaitCondition::UrlMatches { pattern } => write!(f, "url matches {:?}", pattern),
            WaitCondition::DocumentReady => write!(f, "document ready"),
            WaitCondition::NetworkIdle => write!(f, "network idle"),
        }
    }
}

/// One declarative action or check within a scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StepAction {
    /// Navigate the session to a URL (absolute, or relative to the
    /// configured base URL).
    Navigate { url: String },

    /// Click the element the locator resolves to (must be unique).
    Click { target: Locator },

    /// Fill the element the locator resolves to (must be unique).
    Fill { target: Locator, value: String },

    /// Block until the condition holds or the timeout elapses.
    WaitFor { condition: WaitCondition },

    /// Assert that the target resolves to a visible element.
    AssertVisible { target: Locator },

    /// Assert that the target's text contains the expected substring.
    AssertText { target: Locator, expected: String },

    /// Capture a screenshot to the artifact sink under `name`.
    Screenshot { name: String },
}

impl StepAction {
    /// Locator carried by this action, if any.
    pub fn target(&self) -> Option<&Locator> {
        match self {
            StepAction::Click { target }
            | StepAction::Fill { target, .. }
            | StepAction::AssertVisible { target }
            | StepAction::AssertText { target, .. } => Some(target),
            StepAction::WaitFor { .. }
            | StepAction::Navigate { .. }
            | StepAction::Screenshot { .. } => None,
        }
    }

    /// Short human label used in results and logs.
    pub fn label(&self) -> String {
        match self {
            StepAction::Navigate { url } => format!("navigate {}", url),
            StepAction::Click { target } => format!("click {}", target),
            StepAction::Fill { target, .. } => format!("fill {}", target),
            StepAction::WaitFor { condition } => format!("wait for {}", condition),
            StepAction::AssertVisible { target } => format!("assert visible {}", target),
            StepAction::AssertText { target, expected } => {
                format!("assert text {:?} at {}", expected, target)
            }
            StepAction::Screenshot { name } => format!("screenshot {}", name),
        }
    }
}

/// A step plus its optional timeout override.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
    #[serde(flatten)]
    pub action: StepAction,

    /// Overrides the process-wide default timeout for this step only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
}

impl Step {
    pub fn new(action: StepAction) -> Self {
        Self {
            action,
            timeout_ms: None,
        }
    }

    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = Some(timeout_ms);
        self
    }

    pub fn navigate(url: impl Into<String>) -> Self {
        Self::new(StepAction::Navigate { url: url.into() })
    }

    pub fn click(target: Locator) -> Self {
        Self::new(StepAction::Click { target })
    }

    pub fn fill(target: Locator, value: impl Into<String>) -> Self {
        Self::new(StepAction::Fill {
            target,
            value: value.into(),
        })
    }

    pub fn wait_for(condition: WaitCondition) -> Self {
        Self::new(StepAction::WaitFor { condition })
    }

    pub fn assert_visible(target: Locator) -> Self {
        Self::new(StepAction::AssertVisible { target })
    }

    pub fn assert_text(target: Locator, expected: impl Into<String>) -> Self {
        Self::new(StepAction::AssertText {
            target,
            expected: expected.into(),
        })
    }

    pub fn screenshot(name: impl Into<String>) -> Self {
        Self::new(StepAction::Screenshot { name: name.into() })
    }
}

/// An ordered, dependent sequence of steps representing one UI flow.
///
/// Order is meaningful: step *n* assumes the side effects of steps
/// *1..n-1*, so the runner never reorders or parallelizes within one
/// scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub steps: Vec<Step>,
}

impl Scenario {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            steps: Vec::new(),
        }
    }

    pub fn with_step(mut self, step: Step) -> Self {
        self.steps.push(step);
        self
    }
}
