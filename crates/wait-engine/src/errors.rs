//! Wait engine error types.

use browser_session::SessionError;
use target_resolver::ResolveError;
use thiserror::Error;

/// Failures while probing a condition. A timeout is not an error; it
/// is a [`crate::WaitOutcome`] the caller decides about.
#[derive(Debug, Error, Clone)]
pub enum WaitError {
    /// The session failed while being probed.
    #[error("session failed during wait: {0}")]
    Session(#[from] SessionError),

    /// The condition's locator could not be compiled.
    #[error("condition locator invalid: {0}")]
    Resolve(#[from] ResolveError),
}
