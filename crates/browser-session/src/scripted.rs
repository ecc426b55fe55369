//! Deterministic in-memory browser driven by a declarative site model.
//!
//! `ScriptedBrowser` implements the capability traits against a
//! `SiteModel`: pages keyed by path, elements with accessibility
//! metadata, and click effects that navigate or reveal elements after a
//! delay. Delays make asynchronous UI behavior (slow page loads,
//! late-rendered dashboards) reproducible, which is exactly what the
//! wait engine has to be tested against.

use crate::errors::SessionError;
use crate::session::{Browser, Session};
use async_trait::async_trait;
use parking_lot::Mutex;
use pageproof_core_types::{DomSnapshot, ElementHandle, ElementNode, SessionId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use url::Url;

/// What happens when a scripted element is clicked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ClickEffect {
    /// Navigate to another page once `after_ms` has elapsed. While the
    /// navigation is pending the session reports one in-flight request.
    Goto { path: String, after_ms: u64 },

    /// Reveal initially hidden elements once `after_ms` has elapsed.
    Reveal { keys: Vec<String>, after_ms: u64 },
}

/// One element of a scripted page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ElementModel {
    /// Unique key within the page; reveal effects refer to it.
    pub key: String,

    pub tag: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub classes: Vec<String>,

    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub attrs: HashMap<String, String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,

    #[serde(default)]
    pub text: String,

    /// Hidden until a reveal effect targets this key.
    #[serde(default)]
    pub hidden: bool,

    #[serde(default = "default_true")]
    pub enabled: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub on_click: Option<ClickEffect>,
}

fn default_true() -> bool {
    true
}

impl ElementModel {
    pub fn new(key: impl Into<String>, tag: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            tag: tag.into(),
            id: None,
            classes: Vec::new(),
            attrs: HashMap::new(),
            role: None,
            name: None,
            label: None,
            text: String::new(),
            hidden: false,
            enabled: true,
            on_click: None,
        }
    }

    /// Button with matching role, accessible name and text.
    pub fn button(key: impl Into<String>, name: impl Into<String>) -> Self {
        let name = name.into();
        let mut model = Self::new(key, "button");
        model.role = Some("button".into());
        model.name = Some(name.clone());
        model.text = name;
        model
    }

    /// Labelled text input.
    pub fn input(key: impl Into<String>, label: impl Into<String>) -> Self {
        let mut model = Self::new(key, "input");
        model.role = Some("textbox".into());
        model.label = Some(label.into());
        model
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = text.into();
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.classes.push(class.into());
        self
    }

    pub fn with_attr(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attrs.insert(name.into(), value.into());
        self
    }

    pub fn hidden(mut self) -> Self {
        self.hidden = true;
        self
    }

    pub fn on_click(mut self, effect: ClickEffect) -> Self {
        self.on_click = Some(effect);
        self
    }
}

/// One scripted page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageModel {
    pub path: String,

    #[serde(default)]
    pub title: String,

    /// Document stays not-ready (with one in-flight request) for this
    /// long after navigation lands on it.
    #[serde(default)]
    pub load_ms: u64,

    #[serde(default)]
    pub elements: Vec<ElementModel>,
}

impl PageModel {
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            title: String::new(),
            load_ms: 0,
            elements: Vec::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn with_load_ms(mut self, load_ms: u64) -> Self {
        self.load_ms = load_ms;
        self
    }

    pub fn with_element(mut self, element: ElementModel) -> Self {
        self.elements.push(element);
        self
    }
}

/// Declarative model of the simulated target application.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteModel {
    pub pages: Vec<PageModel>,
}

impl SiteModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_page(mut self, page: PageModel) -> Self {
        self.pages.push(page);
        self
    }

    fn page(&self, path: &str) -> Option<&PageModel> {
        self.pages.iter().find(|p| p.path == path)
    }
}

/// In-memory browser over a [`SiteModel`]. Every session is isolated:
/// sessions share the site definition but nothing mutable.
pub struct ScriptedBrowser {
    site: Arc<SiteModel>,
    refuse_sessions: Option<String>,
}

impl ScriptedBrowser {
    pub fn new(site: SiteModel) -> Self {
        Self {
            site: Arc::new(site),
            refuse_sessions: None,
        }
    }

    /// Browser that fails session creation, for exercising
    /// scenario-level session errors.
    pub fn refusing_sessions(reason: impl Into<String>) -> Self {
        Self {
            site: Arc::new(SiteModel::default()),
            refuse_sessions: Some(reason.into()),
        }
    }
}

#[async_trait]
impl Browser for ScriptedBrowser {
    async fn launch(&self) -> Result<(), SessionError> {
        info!(pages = self.site.pages.len(), "scripted browser ready");
        Ok(())
    }

    async fn new_session(&self) -> Result<Arc<dyn Session>, SessionError> {
        if let Some(reason) = &self.refuse_sessions {
            return Err(SessionError::Launch(reason.clone()));
        }
        let session = ScriptedSession {
            id: SessionId::new(),
            site: self.site.clone(),
            state: Mutex::new(State::new()),
        };
        debug!(session = %session.id, "scripted session created");
        Ok(Arc::new(session))
    }
}

/// Pending navigation triggered by a click effect.
struct PendingGoto {
    path: String,
    due: Instant,
}

struct State {
    /// Path of the current page, or None before the first navigation.
    path: Option<String>,
    /// Full URL as last navigated (origin preserved across gotos).
    url: String,
    /// Document sequence; bumped on every navigation.
    seq: u64,
    /// Document not ready until this instant.
    loading_until: Option<Instant>,
    pending_goto: Option<PendingGoto>,
    /// Reveal deadlines by element key.
    reveal_at: HashMap<String, Instant>,
    /// Values typed into inputs, by element key.
    values: HashMap<String, String>,
    console: Vec<String>,
    closed: bool,
}

impl State {
    fn new() -> Self {
        Self {
            path: None,
            url: "about:blank".into(),
            seq: 0,
            loading_until: None,
            pending_goto: None,
            reveal_at: HashMap::new(),
            values: HashMap::new(),
            console: Vec::new(),
            closed: false,
        }
    }

    fn loading(&self, now: Instant) -> bool {
        self.loading_until.map(|t| now < t).unwrap_or(false)
    }
}

pub struct ScriptedSession {
    id: SessionId,
    site: Arc<SiteModel>,
    state: Mutex<State>,
}

impl ScriptedSession {
    fn with_state<T>(
        &self,
        f: impl FnOnce(&mut State, Instant) -> Result<T, SessionError>,
    ) -> Result<T, SessionError> {
        let mut state = self.state.lock();
        if state.closed {
            return Err(SessionError::Closed);
        }
        let now = Instant::now();
        self.settle(&mut state, now);
        f(&mut state, now)
    }

    /// Complete any click-triggered navigation whose delay has elapsed.
    fn settle(&self, state: &mut State, now: Instant) {
        if let Some(pending) = &state.pending_goto {
            if now >= pending.due {
                let path = pending.path.clone();
                state.pending_goto = None;
                self.load(state, &path, now);
            }
        }
    }

    /// Replace the current document with the page at `path`.
    fn load(&self, state: &mut State, path: &str, now: Instant) {
        state.seq += 1;
        state.url = join_url(&state.url, path);
        state.path = Some(path.to_string());
        state.reveal_at.clear();
        state.values.clear();
        let load_ms = self.site.page(path).map(|p| p.load_ms).unwrap_or(0);
        state.loading_until = if load_ms > 0 {
            Some(now + Duration::from_millis(load_ms))
        } else {
            None
        };
        state.console.push(format!("navigated to {}", state.url));
    }

    fn snapshot(&self, state: &State, now: Instant) -> DomSnapshot {
        let loading = state.loading(now);
        let page = state.path.as_deref().and_then(|p| self.site.page(p));

        let (title, nodes) = match page {
            // While loading, the new document has not rendered yet.
            Some(_) if loading => (String::new(), Vec::new()),
            Some(page) => {
                let nodes = page
                    .elements
                    .iter()
                    .enumerate()
                    .map(|(idx, model)| {
                        let mut node = ElementNode::new(idx as u32 + 1, model.tag.clone());
                        node.id = model.id.clone();
                        node.classes = model.classes.clone();
                        node.attrs = model.attrs.clone();
                        node.role = model.role.clone();
                        node.name = model.name.clone();
                        node.label = model.label.clone();
                        node.text = state
                            .values
                            .get(&model.key)
                            .cloned()
                            .unwrap_or_else(|| model.text.clone());
                        node.visible = !model.hidden
                            || state
                                .reveal_at
                                .get(&model.key)
                                .map(|t| now >= *t)
                                .unwrap_or(false);
                        node.enabled = model.enabled;
                        node
                    })
                    .collect();
                (page.title.clone(), nodes)
            }
            None => ("Not Found".to_string(), Vec::new()),
        };

        DomSnapshot {
            seq: state.seq,
            url: state.url.clone(),
            title,
            ready: !loading && state.path.is_some(),
            nodes,
        }
    }

    /// Element model behind a handle, with staleness checking.
    fn element<'a>(
        &'a self,
        state: &State,
        now: Instant,
        handle: &ElementHandle,
    ) -> Result<&'a ElementModel, SessionError> {
        if handle.snapshot_seq != state.seq {
            return Err(SessionError::StaleElement(format!(
                "handle from document #{} but current document is #{}",
                handle.snapshot_seq, state.seq
            )));
        }
        if state.loading(now) {
            return Err(SessionError::StaleElement("document is loading".into()));
        }
        let page = state
            .path
            .as_deref()
            .and_then(|p| self.site.page(p))
            .ok_or_else(|| SessionError::StaleElement("no document loaded".into()))?;
        page.elements
            .get(handle.node_id.saturating_sub(1) as usize)
            .ok_or_else(|| {
                SessionError::StaleElement(format!("no element #{}", handle.node_id))
            })
    }
}

#[async_trait]
impl Session for ScriptedSession {
    fn id(&self) -> &SessionId {
        &self.id
    }

    async fn navigate(&self, url: &str) -> Result<(), SessionError> {
        let path = path_of(url)
            .ok_or_else(|| SessionError::Navigation(format!("unparseable url {:?}", url)))?;
        self.with_state(|state, now| {
            if url.contains("://") {
                state.url = url.to_string();
            }
            self.load(state, &path, now);
            debug!(session = %self.id, url = %state.url, "navigate");
            Ok(())
        })
    }

    async fn click(&self, handle: &ElementHandle) -> Result<(), SessionError> {
        self.with_state(|state, now| {
            let model = self.element(state, now, handle)?;
            let visible = !model.hidden
                || state
                    .reveal_at
                    .get(&model.key)
                    .map(|t| now >= *t)
                    .unwrap_or(false);
            if !visible || !model.enabled {
                return Err(SessionError::NotInteractable(format!(
                    "{} is not clickable",
                    model.key
                )));
            }
            state.console.push(format!("click {}", model.key));
            match model.on_click.clone() {
                Some(ClickEffect::Goto { path, after_ms }) => {
                    let due = now + Duration::from_millis(after_ms);
                    if after_ms == 0 {
                        self.load(state, &path, now);
                    } else {
                        state.pending_goto = Some(PendingGoto { path, due });
                    }
                }
                Some(ClickEffect::Reveal { keys, after_ms }) => {
                    let at = now + Duration::from_millis(after_ms);
                    for key in keys {
                        state.reveal_at.insert(key, at);
                    }
                }
                None => {}
            }
            Ok(())
        })
    }

    async fn fill(&self, handle: &ElementHandle, text: &str) -> Result<(), SessionError> {
        self.with_state(|state, now| {
            let model = self.element(state, now, handle)?;
            if model.hidden || !model.enabled {
                return Err(SessionError::NotInteractable(format!(
                    "{} cannot be filled",
                    model.key
                )));
            }
            let key = model.key.clone();
            state.console.push(format!("fill {}", key));
            state.values.insert(key, text.to_string());
            Ok(())
        })
    }

    async fn read_text(&self, handle: &ElementHandle) -> Result<String, SessionError> {
        self.with_state(|state, now| {
            let model = self.element(state, now, handle)?;
            Ok(state
                .values
                .get(&model.key)
                .cloned()
                .unwrap_or_else(|| model.text.clone()))
        })
    }

    async fn current_document(&self) -> Result<DomSnapshot, SessionError> {
        self.with_state(|state, now| Ok(self.snapshot(state, now)))
    }

    async fn current_url(&self) -> Result<String, SessionError> {
        self.with_state(|state, _| Ok(state.url.clone()))
    }

    async fn inflight_requests(&self) -> Result<usize, SessionError> {
        self.with_state(|state, now| {
            Ok(if state.loading(now) || state.pending_goto.is_some() {
                1
            } else {
                0
            })
        })
    }

    async fn console_messages(&self) -> Result<Vec<String>, SessionError> {
        self.with_state(|state, _| Ok(state.console.clone()))
    }

    async fn screenshot(&self) -> Result<Vec<u8>, SessionError> {
        self.with_state(|state, now| {
            let snapshot = self.snapshot(state, now);
            let mut rendering = format!("[{}] {}\n", snapshot.url, snapshot.title);
            for node in &snapshot.nodes {
                rendering.push_str(&node.describe());
                rendering.push('\n');
            }
            Ok(rendering.into_bytes())
        })
    }

    async fn close(&self) -> Result<(), SessionError> {
        let mut state = self.state.lock();
        state.closed = true;
        debug!(session = %self.id, "scripted session closed");
        Ok(())
    }
}

/// Path component of an absolute or relative URL.
fn path_of(url: &str) -> Option<String> {
    if url.contains("://") {
        Url::parse(url).ok().map(|u| u.path().to_string())
    } else if url.starts_with('/') {
        Some(url.to_string())
    } else {
        None
    }
}

/// Keep the origin of the previous URL when following a path.
fn join_url(previous: &str, path: &str) -> String {
    match Url::parse(previous) {
        Ok(mut url) if url.has_host() => {
            url.set_path(path);
            url.set_query(None);
            url.to_string()
        }
        _ => path.to_string(),
    }
}
