//! Failure evidence capture and artifact storage.

use crate::errors::ReportError;
use async_trait::async_trait;
use browser_session::Session;
use pageproof_core_types::{ArtifactRef, StepError};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{debug, warn};

/// Destination for diagnostic bytes. Supplied by the caller; the
/// engine does not define storage beyond "bytes under a name".
#[async_trait]
pub trait ArtifactSink: Send + Sync {
    /// Store bytes under `name`, returning the sink-specific key
    /// (e.g. a filesystem path) to record in the result.
    async fn put(&self, name: &str, bytes: &[u8]) -> Result<String, ReportError>;
}

/// Filesystem sink writing into one directory.
pub struct FsArtifactSink {
    root: PathBuf,
}

impl FsArtifactSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ArtifactSink for FsArtifactSink {
    async fn put(&self, name: &str, bytes: &[u8]) -> Result<String, ReportError> {
        tokio::fs::create_dir_all(&self.root).await?;
        let path = self.root.join(sanitize(name));
        tokio::fs::write(&path, bytes).await?;
        Ok(path.display().to_string())
    }
}

/// In-memory sink for tests and embedding.
#[derive(Default)]
pub struct MemoryArtifactSink {
    entries: Mutex<HashMap<String, Vec<u8>>>,
}

impl MemoryArtifactSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, name: &str) -> Option<Vec<u8>> {
        self.entries.lock().get(name).cloned()
    }

    pub fn names(&self) -> Vec<String> {
        self.entries.lock().keys().cloned().collect()
    }
}

#[async_trait]
impl ArtifactSink for MemoryArtifactSink {
    async fn put(&self, name: &str, bytes: &[u8]) -> Result<String, ReportError> {
        self.entries
            .lock()
            .insert(name.to_string(), bytes.to_vec());
        Ok(name.to_string())
    }
}

/// Outcome of a capture attempt. `note` records a secondary capture
/// failure; it never replaces the original step error.
#[derive(Debug, Clone, Default)]
pub struct CaptureReport {
    pub artifact: Option<ArtifactRef>,
    pub note: Option<String>,
}

/// Captures failure evidence for a step.
#[async_trait]
pub trait FailureReporter: Send + Sync {
    async fn capture(
        &self,
        scenario: &str,
        step_index: usize,
        session: &dyn Session,
    ) -> CaptureReport;
}

/// Default reporter: screenshot plus a textual document/console
/// snapshot, both written through the artifact sink.
pub struct DefaultFailureReporter {
    sink: Arc<dyn ArtifactSink>,
}

impl DefaultFailureReporter {
    pub fn new(sink: Arc<dyn ArtifactSink>) -> Self {
        Self { sink }
    }
}

#[async_trait]
impl FailureReporter for DefaultFailureReporter {
    async fn capture(
        &self,
        scenario: &str,
        step_index: usize,
        session: &dyn Session,
    ) -> CaptureReport {
        let base = format!("{}-step{}", sanitize(scenario), step_index + 1);
        let mut artifact = ArtifactRef::default();
        let mut problems: Vec<String> = Vec::new();

        match session.screenshot().await {
            Ok(bytes) => match self.sink.put(&format!("{}.png", base), &bytes).await {
                Ok(key) => artifact.screenshot = Some(key),
                Err(err) => problems.push(format!("screenshot store: {}", err)),
            },
            Err(err) => problems.push(format!("screenshot: {}", err)),
        }

        match render_text_snapshot(session).await {
            Ok(text) => match self.sink.put(&format!("{}.txt", base), text.as_bytes()).await {
                Ok(key) => artifact.snapshot = Some(key),
                Err(err) => problems.push(format!("snapshot store: {}", err)),
            },
            Err(err) => problems.push(format!("snapshot: {}", err)),
        }

        let note = if problems.is_empty() {
            None
        } else {
            let err = StepError::CaptureError(problems.join("; "));
            warn!(scenario, step_index, %err, "diagnostic capture incomplete");
            Some(err.to_string())
        };

        if artifact.is_empty() {
            CaptureReport {
                artifact: None,
                note,
            }
        } else {
            debug!(scenario, step_index, ?artifact, "diagnostics captured");
            CaptureReport {
                artifact: Some(artifact),
                note,
            }
        }
    }
}

async fn render_text_snapshot(
    session: &dyn Session,
) -> Result<String, browser_session::SessionError> {
    let doc = session.current_document().await?;
    let console = session.console_messages().await?;

    let mut out = String::new();
    out.push_str(&format!("url: {}\n", doc.url));
    out.push_str(&format!("title: {}\n", doc.title));
    out.push_str(&format!("ready: {}\n", doc.ready));
    out.push_str("elements:\n");
    for node in &doc.nodes {
        out.push_str(&format!("  {}\n", node.describe()));
    }
    out.push_str("console:\n");
    for line in console.iter().rev().take(20).rev() {
        out.push_str(&format!("  {}\n", line));
    }
    Ok(out)
}

fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '-' || c == '_' {
                c
            } else {
                '-'
            }
        })
        .collect()
}
