//! Resolver error types.

use thiserror::Error;

/// Errors surfaced while resolving a locator.
///
/// An empty candidate list is not an error here; only malformed input
/// is. Uniqueness policy lives with the consuming step.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// Structural predicate string could not be parsed.
    #[error("invalid selector {selector:?}: {reason}")]
    InvalidSelector { selector: String, reason: String },
}
