//! Structural predicate parsing and matching.
//!
//! Supports the selector shapes scenario authors actually write:
//! `button`, `#app`, `.bank-card`, `input[name="email"]`,
//! `button[type=submit]`, `button:has-text("Get Started")`, and any
//! combination of those parts in that order.

use crate::errors::ResolveError;
use pageproof_core_types::ElementNode;

/// Parsed structural predicate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Predicate {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
    /// Attribute requirements; `None` value means presence only.
    pub attrs: Vec<(String, Option<String>)>,
    /// `:has-text("...")` substring requirement.
    pub has_text: Option<String>,
}

impl Predicate {
    /// Parse a predicate string.
    pub fn parse(selector: &str) -> Result<Self, ResolveError> {
        let mut predicate = Predicate::default();
        let mut chars = selector.trim().char_indices().peekable();
        let input = selector.trim();

        let invalid = |reason: &str| ResolveError::InvalidSelector {
            selector: selector.to_string(),
            reason: reason.to_string(),
        };

        if input.is_empty() {
            return Err(invalid("empty selector"));
        }

        // Leading tag name.
        let mut tag = String::new();
        while let Some((_, c)) = chars.peek() {
            if c.is_ascii_alphanumeric() || *c == '-' {
                tag.push(*c);
                chars.next();
            } else {
                break;
            }
        }
        if !tag.is_empty() {
            predicate.tag = Some(tag.to_ascii_lowercase());
        }

        while let Some((pos, c)) = chars.next() {
            match c {
                '#' => {
                    let word = take_word(&mut chars);
                    if word.is_empty() {
                        return Err(invalid("expected id after '#'"));
                    }
                    predicate.id = Some(word);
                }
                '.' => {
                    let word = take_word(&mut chars);
                    if word.is_empty() {
                        return Err(invalid("expected class after '.'"));
                    }
                    predicate.classes.push(word);
                }
                '[' => {
                    let rest = &input[pos + 1..];
                    let end = rest.find(']').ok_or_else(|| invalid("unclosed '['"))?;
                    let body = &rest[..end];
                    // Consume up to and including the ']'.
                    while let Some((p, _)) = chars.next() {
                        if p == pos + 1 + end {
                            break;
                        }
                    }
                    let (name, value) = match body.split_once('=') {
                        Some((name, value)) => {
                            (name.trim(), Some(unquote(value.trim()).to_string()))
                        }
                        None => (body.trim(), None),
                    };
                    if name.is_empty() {
                        return Err(invalid("empty attribute name"));
                    }
                    predicate.attrs.push((name.to_string(), value));
                }
                ':' => {
                    let rest = &input[pos + 1..];
                    let arg = rest
                        .strip_prefix("has-text(")
                        .and_then(|r| r.strip_suffix(')'))
                        .ok_or_else(|| invalid("only the :has-text(\"...\") pseudo is supported"))?;
                    predicate.has_text = Some(unquote(arg.trim()).to_string());
                    // :has-text must be the final part.
                    return Ok(predicate);
                }
                _ => return Err(invalid(&format!("unexpected character {:?}", c))),
            }
        }

        Ok(predicate)
    }

    /// Whether the element satisfies every part of the predicate.
    pub fn matches(&self, node: &ElementNode) -> bool {
        if let Some(tag) = &self.tag {
            if !node.tag.eq_ignore_ascii_case(tag) {
                return false;
            }
        }
        if let Some(id) = &self.id {
            if node.id.as_deref() != Some(id.as_str()) {
                return false;
            }
        }
        for class in &self.classes {
            if !node.classes.iter().any(|c| c == class) {
                return false;
            }
        }
        for (name, expected) in &self.attrs {
            match (node.attrs.get(name), expected) {
                (Some(actual), Some(expected)) if actual == expected => {}
                (Some(_), None) => {}
                _ => return false,
            }
        }
        if let Some(needle) = &self.has_text {
            if !node.text.contains(needle.as_str()) {
                return false;
            }
        }
        true
    }
}

fn take_word(chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>) -> String {
    let mut word = String::new();
    while let Some((_, c)) = chars.peek() {
        if c.is_ascii_alphanumeric() || *c == '-' || *c == '_' {
            word.push(*c);
            chars.next();
        } else {
            break;
        }
    }
    word
}

fn unquote(value: &str) -> &str {
    let value = value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value);
    value
        .strip_prefix('\'')
        .and_then(|v| v.strip_suffix('\''))
        .unwrap_or(value)
}
