//! Resolver: locator + snapshot -> ordered candidate handles.

use crate::errors::ResolveError;
use crate::strategies::Matcher;
use pageproof_core_types::{DomSnapshot, ElementHandle, Locator};
use tracing::debug;

/// Resolves declarative locators against an instantaneous snapshot.
pub trait TargetResolver: Send + Sync {
    /// Returns all matching elements in DOM order. An empty result is
    /// not an error; uniqueness policy belongs to the caller.
    fn resolve(
        &self,
        locator: &Locator,
        document: &DomSnapshot,
    ) -> Result<Vec<ElementHandle>, ResolveError>;
}

/// Default resolver over the flat snapshot model.
#[derive(Debug, Default)]
pub struct DefaultTargetResolver;

impl DefaultTargetResolver {
    pub fn new() -> Self {
        Self
    }
}

impl TargetResolver for DefaultTargetResolver {
    fn resolve(
        &self,
        locator: &Locator,
        document: &DomSnapshot,
    ) -> Result<Vec<ElementHandle>, ResolveError> {
        let matcher = Matcher::compile(locator)?;
        let candidates: Vec<ElementHandle> = document
            .nodes
            .iter()
            .filter(|node| matcher.matches(node))
            .map(|node| document.handle_for(node))
            .collect();

        debug!(
            locator = %locator,
            url = %document.url,
            candidates = candidates.len(),
            "resolved locator"
        );

        Ok(candidates)
    }
}
