//! Instantaneous document snapshot model.
//!
//! A `DomSnapshot` is what the session hands the resolver: a flat,
//! read-only view of the current document. Element handles are only
//! valid for the snapshot sequence they were taken from; a session
//! rejects handles from before a navigation.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One element in a document snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementNode {
    /// Stable id within one snapshot, in DOM order.
    pub node_id: u32,

    /// Lowercase tag name.
    pub tag: String,

    /// `id` attribute, if present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Class list.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,

    /// Remaining attributes (name, type, href, ...).
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub attrs: HashMap<String, String>,

    /// ARIA role (explicit or implicit).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    /// Accessible name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Associated label text (for form controls).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    /// Visible text content.
    #[serde(default)]
    pub text: String,

    #[serde(default = "default_true")]
    pub visible: bool,

    #[serde(default = "default_true")]
    pub enabled: bool,
}

fn default_true() -> bool {
    true
}

impl ElementNode {
    pub fn new(node_id: u32, tag: impl Into<String>) -> Self {
        Self {
            node_id,
            tag: tag.into(),
            id: None,
            classes: Vec::new(),
            attrs: HashMap::new(),
            role: None,
            name: None,
            label: None,
            text: String::new(),
            visible: true,
            enabled: true,
        }
    }

    /// Short description for diagnostics, e.g. `button#submit "Login"`.
    pub fn describe(&self) -> String {
        let mut out = self.tag.clone();
        if let Some(id) = &self.id {
            out.push('#');
            out.push_str(id);
        }
        let text = self.text.trim();
        if !text.is_empty() {
            out.push_str(&format!(" {:?}", text));
        } else if let Some(name) = &self.name {
            out.push_str(&format!(" {:?}", name));
        }
        if !self.visible {
            out.push_str(" (hidden)");
        }
        out
    }
}

/// Instantaneous, read-only view of the current document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomSnapshot {
    /// Monotonic sequence number; bumped on every navigation.
    pub seq: u64,

    pub url: String,

    pub title: String,

    /// Whether the document has finished loading.
    pub ready: bool,

    /// Elements in DOM order.
    pub nodes: Vec<ElementNode>,
}

impl DomSnapshot {
    pub fn node(&self, handle: &ElementHandle) -> Option<&ElementNode> {
        if handle.snapshot_seq != self.seq {
            return None;
        }
        self.nodes.iter().find(|n| n.node_id == handle.node_id)
    }

    pub fn handle_for(&self, node: &ElementNode) -> ElementHandle {
        ElementHandle {
            node_id: node.node_id,
            snapshot_seq: self.seq,
        }
    }
}

/// Reference to an element within one specific snapshot.
///
/// Handles become stale as soon as the session navigates; the session
/// reports a stale handle as an action-level failure rather than
/// silently acting on the wrong document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ElementHandle {
    pub node_id: u32,
    pub snapshot_seq: u64,
}
