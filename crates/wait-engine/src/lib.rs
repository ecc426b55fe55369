//! Deterministic waiting: poll a condition until it holds, the budget
//! runs out, or the run is cancelled.
//!
//! This is the synchronization contract that replaces ad-hoc fixed
//! sleeps: every action-producing step waits through this engine, so
//! suspension points and timeouts are uniform and testable.

pub mod engine;
pub mod errors;

pub use engine::{WaitEngine, WaitOutcome};
pub use errors::WaitError;

pub use pageproof_core_types::WaitCondition;
