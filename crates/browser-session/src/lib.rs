//! Browser capability surface for the pageproof kernel.
//!
//! The engine is polymorphic over these traits: a [`Browser`] launches
//! and hands out isolated [`Session`]s, and a session exposes the
//! handful of primitives the step executor needs. A CDP- or
//! WebDriver-backed adapter plugs in here; the crate ships
//! [`scripted::ScriptedBrowser`], a deterministic in-memory adapter
//! driven by a declarative site model, which backs the test suite and
//! the CLI's simulate mode.

pub mod errors;
pub mod scripted;
pub mod session;

pub use errors::SessionError;
pub use scripted::{ClickEffect, ElementModel, PageModel, ScriptedBrowser, SiteModel};
pub use session::{Browser, Session};
