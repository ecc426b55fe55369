//! The injected browser-automation capability.

use crate::errors::SessionError;
use async_trait::async_trait;
use pageproof_core_types::{DomSnapshot, ElementHandle, SessionId};
use std::sync::Arc;

/// External browser-automation capability. Launch/close of the
/// underlying process is the adapter's concern, not the engine's.
#[async_trait]
pub trait Browser: Send + Sync {
    /// Make the browser ready to hand out sessions.
    async fn launch(&self) -> Result<(), SessionError>;

    /// Create a fresh, isolated session (own cookies, storage,
    /// navigation state). Exactly one scenario run owns it.
    async fn new_session(&self) -> Result<Arc<dyn Session>, SessionError>;
}

/// One isolated browser context.
///
/// The session is the sole mutator of navigation state; no other
/// component issues navigation commands. `close` must run on every
/// scenario exit path so no OS-level browser context leaks.
#[async_trait]
pub trait Session: Send + Sync {
    fn id(&self) -> &SessionId;

    async fn navigate(&self, url: &str) -> Result<(), SessionError>;

    async fn click(&self, handle: &ElementHandle) -> Result<(), SessionError>;

    async fn fill(&self, handle: &ElementHandle, text: &str) -> Result<(), SessionError>;

    async fn read_text(&self, handle: &ElementHandle) -> Result<String, SessionError>;

    /// Instantaneous snapshot of the current document.
    async fn current_document(&self) -> Result<DomSnapshot, SessionError>;

    async fn current_url(&self) -> Result<String, SessionError>;

    /// Number of in-flight network requests.
    async fn inflight_requests(&self) -> Result<usize, SessionError>;

    /// Console output accumulated so far.
    async fn console_messages(&self) -> Result<Vec<String>, SessionError>;

    async fn screenshot(&self) -> Result<Vec<u8>, SessionError>;

    async fn close(&self) -> Result<(), SessionError>;
}
