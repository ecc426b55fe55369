//! Scenario orchestration layer.
//!
//! Drives one declarative [`Scenario`](pageproof_core_types::Scenario)
//! against one isolated browser session: per-step resolve → wait → act
//! state machine, fail-fast sequencing with `NotRun` padding, and
//! diagnostic capture on failure. Per-step errors never escape the
//! runner; they are folded into the result.

pub mod errors;
pub mod executor;
pub mod reporter;
pub mod runner;

pub use errors::ReportError;
pub use executor::{StepExecutor, StepPhase};
pub use reporter::{
    ArtifactSink, CaptureReport, DefaultFailureReporter, FailureReporter, FsArtifactSink,
    MemoryArtifactSink,
};
pub use runner::ScenarioRunner;
