//! Session-level error types.

use thiserror::Error;

/// Errors surfaced by the browser capability.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// Browser process could not be launched or refused a session.
    #[error("launch failed: {0}")]
    Launch(String),

    /// Navigation was rejected by the browser.
    #[error("navigation failed: {0}")]
    Navigation(String),

    /// Element handle refers to a document that has since been
    /// replaced (the resolve/act race).
    #[error("stale element: {0}")]
    StaleElement(String),

    /// Element exists but cannot receive the action (hidden, disabled,
    /// obscured).
    #[error("element not interactable: {0}")]
    NotInteractable(String),

    /// Session was already closed.
    #[error("session closed")]
    Closed,

    /// Transport or process-level failure.
    #[error("browser i/o failure: {0}")]
    Io(String),
}

impl SessionError {
    /// Action-level failures are recorded as a failed step; anything
    /// else is a session failure.
    pub fn is_action_level(&self) -> bool {
        matches!(
            self,
            SessionError::StaleElement(_) | SessionError::NotInteractable(_)
        )
    }
}
