//! Process-wide engine configuration. Read-only after initialization.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Defaults shared by every scenario run in the process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Base URL relative step targets are resolved against.
    pub base_url: Option<String>,

    /// Default per-step timeout, overridable per step.
    pub default_timeout_ms: u64,

    /// Wait engine poll interval.
    pub poll_interval_ms: u64,

    /// Quiet window for the network-idle condition.
    pub network_quiet_ms: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            default_timeout_ms: 30_000,
            poll_interval_ms: 75,
            network_quiet_ms: 500,
        }
    }
}

impl EngineConfig {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_default_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.default_timeout_ms = timeout_ms;
        self
    }

    pub fn default_timeout(&self) -> Duration {
        Duration::from_millis(self.default_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn network_quiet(&self) -> Duration {
        Duration::from_millis(self.network_quiet_ms)
    }
}
