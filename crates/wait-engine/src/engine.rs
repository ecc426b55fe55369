//! The polling loop.

use crate::errors::WaitError;
use browser_session::Session;
use pageproof_core_types::{EngineConfig, WaitCondition};
use std::sync::Arc;
use std::time::{Duration, Instant};
use target_resolver::TargetResolver;
use tokio::time::sleep;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// How a wait ended. A timeout carries the last-observed state so the
/// caller can report something better than "timed out".
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WaitOutcome {
    Ready {
        waited_ms: u64,
    },
    TimedOut {
        waited_ms: u64,
        last_observed: String,
    },
    /// Cancellation was observed; polling stopped within one interval.
    Cancelled,
}

impl WaitOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, WaitOutcome::Ready { .. })
    }
}

struct Probe {
    satisfied: bool,
    observed: String,
}

/// Poll-until-true over a session, with a fixed short interval.
///
/// The condition is evaluated once before the first sleep, so a
/// condition that already holds returns `Ready` without waiting.
pub struct WaitEngine {
    resolver: Arc<dyn TargetResolver>,
    poll_interval: Duration,
    network_quiet: Duration,
}

impl WaitEngine {
    pub fn new(resolver: Arc<dyn TargetResolver>, config: &EngineConfig) -> Self {
        Self {
            resolver,
            poll_interval: config.poll_interval(),
            network_quiet: config.network_quiet(),
        }
    }

    /// Poll `condition` until it holds, `timeout` elapses, or `cancel`
    /// fires. Returns `TimedOut` no later than `timeout` plus one poll
    /// interval.
    pub async fn wait(
        &self,
        session: &dyn Session,
        condition: &WaitCondition,
        timeout: Duration,
        cancel: &CancellationToken,
    ) -> Result<WaitOutcome, WaitError> {
        let started = Instant::now();
        let deadline = started + timeout;
        let mut quiet_since: Option<Instant> = None;

        debug!(condition = %condition, timeout_ms = timeout.as_millis() as u64, "wait start");

        loop {
            if cancel.is_cancelled() {
                return Ok(WaitOutcome::Cancelled);
            }

            let probe = self.probe(session, condition, &mut quiet_since).await?;
            let now = Instant::now();

            if probe.satisfied {
                let waited_ms = (now - started).as_millis() as u64;
                debug!(condition = %condition, waited_ms, "wait satisfied");
                return Ok(WaitOutcome::Ready { waited_ms });
            }
            trace!(condition = %condition, observed = %probe.observed, "wait probe");

            if now >= deadline {
                let waited_ms = (now - started).as_millis() as u64;
                debug!(condition = %condition, waited_ms, observed = %probe.observed, "wait timed out");
                return Ok(WaitOutcome::TimedOut {
                    waited_ms,
                    last_observed: probe.observed,
                });
            }

            let nap = self.poll_interval.min(deadline - now);
            tokio::select! {
                _ = cancel.cancelled() => return Ok(WaitOutcome::Cancelled),
                _ = sleep(nap) => {}
            }
        }
    }

    async fn probe(
        &self,
        session: &dyn Session,
        condition: &WaitCondition,
        quiet_since: &mut Option<Instant>,
    ) -> Result<Probe, WaitError> {
        match condition {
            WaitCondition::ElementResolvable { target } => {
                let doc = session.current_document().await?;
                let candidates = self.resolver.resolve(target, &doc)?;
                Ok(Probe {
                    satisfied: !candidates.is_empty(),
                    observed: format!("{} matches for {} at {}", candidates.len(), target, doc.url),
                })
            }

            WaitCondition::ElementVisible { target } => {
                let doc = session.current_document().await?;
                let candidates = self.resolver.resolve(target, &doc)?;
                let visible = candidates
                    .iter()
                    .filter_map(|h| doc.node(h))
                    .filter(|n| n.visible)
                    .count();
                Ok(Probe {
                    satisfied: visible > 0,
                    observed: format!(
                        "{} matches ({} visible) for {} at {}",
                        candidates.len(),
                        visible,
                        target,
                        doc.url
                    ),
                })
            }

            WaitCondition::UrlMatches { pattern } => {
                let url = session.current_url().await?;
                Ok(Probe {
                    satisfied: url.contains(pattern.as_str()),
                    observed: format!("url={}", url),
                })
            }

            WaitCondition::DocumentReady => {
                let doc = session.current_document().await?;
                Ok(Probe {
                    satisfied: doc.ready,
                    observed: format!("document not ready at {}", doc.url),
                })
            }

            WaitCondition::NetworkIdle => {
                let inflight = session.inflight_requests().await?;
                if inflight > 0 {
                    *quiet_since = None;
                    return Ok(Probe {
                        satisfied: false,
                        observed: format!("{} requests in flight", inflight),
                    });
                }
                let since = *quiet_since.get_or_insert_with(Instant::now);
                let quiet_for = Instant::now() - since;
                Ok(Probe {
                    satisfied: quiet_for >= self.network_quiet,
                    observed: format!("network quiet for {}ms", quiet_for.as_millis()),
                })
            }
        }
    }
}
