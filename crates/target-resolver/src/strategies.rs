//! One matching strategy per locator kind.
//!
//! Priority of interpretation mirrors the locator variants: exact
//! role+accessible-name, exact label association, exact visible text,
//! structural predicate. All matchers are pure functions over a single
//! element.

use crate::errors::ResolveError;
use crate::selector::Predicate;
use pageproof_core_types::{ElementNode, Locator};

/// Compiled form of a locator, ready to test against nodes.
pub enum Matcher {
    Role { role: String, name: String },
    Label { text: String },
    Text { text: String },
    Structural(Predicate),
}

impl Matcher {
    /// Compile a locator. Only structural predicates can fail.
    pub fn compile(locator: &Locator) -> Result<Self, ResolveError> {
        Ok(match locator {
            Locator::ByRole { role, name } => Matcher::Role {
                role: role.clone(),
                name: name.clone(),
            },
            Locator::ByLabel { text } => Matcher::Label { text: text.clone() },
            Locator::ByText { text } => Matcher::Text { text: text.clone() },
            Locator::BySelector { selector } => Matcher::Structural(Predicate::parse(selector)?),
        })
    }

    pub fn matches(&self, node: &ElementNode) -> bool {
        match self {
            Matcher::Role { role, name } => {
                node.role.as_deref() == Some(role.as_str())
                    && node.name.as_deref() == Some(name.as_str())
            }
            // Label association first, aria-label as the fallback the
            // accessibility tree would provide.
            Matcher::Label { text } => {
                node.label.as_deref() == Some(text.as_str())
                    || node.attrs.get("aria-label").map(String::as_str) == Some(text.as_str())
            }
            Matcher::Text { text } => node.visible && node.text.trim() == text.as_str(),
            Matcher::Structural(predicate) => predicate.matches(node),
        }
    }
}
