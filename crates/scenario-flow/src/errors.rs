//! Flow-layer error types.

use thiserror::Error;

/// Artifact sink failures. These surface as capture notes or failed
/// screenshot steps; they never abort a scenario by themselves.
#[derive(Debug, Error, Clone)]
pub enum ReportError {
    #[error("artifact i/o failed: {0}")]
    Io(String),
}

impl From<std::io::Error> for ReportError {
    fn from(err: std::io::Error) -> Self {
        ReportError::Io(err.to_string())
    }
}
