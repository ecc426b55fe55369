//! Locator resolution over document snapshots.
//!
//! Turns a declarative [`Locator`] into zero, one, or many candidate
//! elements within an instantaneous snapshot. Resolution is read-only
//! and never blocks; multiplicity is not an error at this layer. The
//! step executor decides whether a step requires uniqueness.

pub mod errors;
pub mod resolver;
pub mod selector;
pub mod strategies;

pub use errors::ResolveError;
pub use resolver::{DefaultTargetResolver, TargetResolver};
pub use selector::Predicate;

pub use pageproof_core_types::Locator;
