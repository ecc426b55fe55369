//! pageproof CLI library.
//!
//! Thin glue around the kernel crates: configuration layering,
//! scenario/site file loading, and result presentation. The engine
//! itself lives in the workspace crates and knows nothing about files,
//! flags, or exit codes.

pub mod config;
pub mod scenario_file;
pub mod summary;

pub use browser_session::{Browser, ScriptedBrowser, Session, SiteModel};
pub use pageproof_core_types::{
    EngineConfig, Locator, Scenario, ScenarioResult, Step, StepResult, StepStatus,
};
pub use scenario_flow::{ArtifactSink, FsArtifactSink, ScenarioRunner};
