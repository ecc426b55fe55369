//! Shared primitives for the pageproof verification kernel.
//!
//! Everything the layered crates exchange lives here: the declarative
//! scenario model, the DOM snapshot model the resolver works against,
//! result/record types, the per-step error taxonomy, and the read-only
//! engine configuration.

pub mod config;
pub mod dom;
pub mod error;
pub mod result;
pub mod scenario;

pub use config::EngineConfig;
pub use dom::{DomSnapshot, ElementHandle, ElementNode};
pub use error::StepError;
pub use result::{ArtifactRef, ScenarioResult, StepResult, StepStatus};
pub use scenario::{Locator, Scenario, Step, StepAction, WaitCondition};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for one scenario execution.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct RunId(pub String);

impl RunId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

/// Unique identifier for an isolated browser session.
#[derive(Clone, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub String);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
