//! In-memory host: a document head, a tag registry and element attributes without a browser.
//!
//! Script fetches are simulated through [`Route`]s: a routed source settles as soon as its
//! node is appended, an unrouted one stays pending until [`MemoryDocument::fire`] is called.

use crate::document::{NodeId, ScriptEvent, ScriptHost, ScriptListener, ScriptRequest};
use crate::error::HostError;
use crate::registry::{ElementHost, TagRegistry};
use fxhash::FxHashMap;
use hatch_kernel::TagGuard;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use tracing::trace;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RouteKind {
    Load,
    Error,
    Hold,
}

/// Simulated network response for one script source.
#[derive(Clone)]
pub struct Route {
    kind: RouteKind,
    effect: Option<Rc<dyn Fn()>>,
}

impl Route {
    /// Loads successfully without side effects.
    #[must_use]
    pub const fn load() -> Self {
        Self { kind: RouteKind::Load, effect: None }
    }

    /// Runs `effect` (what executing the script does) and then reports a load.
    #[must_use]
    pub fn load_with(effect: impl Fn() + 'static) -> Self {
        Self { kind: RouteKind::Load, effect: Some(Rc::new(effect)) }
    }

    /// Reports a fetch error.
    #[must_use]
    pub const fn error() -> Self {
        Self { kind: RouteKind::Error, effect: None }
    }

    /// Never settles on its own.
    #[must_use]
    pub const fn hold() -> Self {
        Self { kind: RouteKind::Hold, effect: None }
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("kind", &self.kind)
            .field("effect", &self.effect.is_some())
            .finish()
    }
}

struct AttachedScript {
    id: NodeId,
    request: ScriptRequest,
    listener: Option<Rc<dyn ScriptListener>>,
}

#[derive(Default)]
struct DocumentState {
    next_id: u64,
    head: Vec<AttachedScript>,
    routes: FxHashMap<String, Route>,
    history: Vec<String>,
}

/// Document head kept in memory. Clones share the same document.
#[derive(Clone, Default)]
pub struct MemoryDocument {
    inner: Rc<RefCell<DocumentState>>,
}

impl MemoryDocument {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets how future injections of `src` behave.
    pub fn route(&self, src: impl Into<String>, route: Route) {
        self.inner.borrow_mut().routes.insert(src.into(), route);
    }

    /// Delivers `event` to the first attached script for `src` that still has a listener.
    ///
    /// Returns `false` when no such script exists.
    pub fn fire(&self, src: &str, event: ScriptEvent) -> bool {
        let target = self
            .inner
            .borrow()
            .head
            .iter()
            .find(|script| script.request.src == src && script.listener.is_some())
            .map(|script| script.id);

        target.is_some_and(|id| self.dispatch(id, event))
    }

    /// Scripts currently attached to the head, in insertion order.
    #[must_use]
    pub fn attached(&self) -> Vec<ScriptRequest> {
        self.inner.borrow().head.iter().map(|script| script.request.clone()).collect()
    }

    #[must_use]
    pub fn is_attached(&self, src: &str) -> bool {
        self.inner.borrow().head.iter().any(|script| script.request.src == src)
    }

    #[must_use]
    pub fn contains(&self, node: NodeId) -> bool {
        self.inner.borrow().head.iter().any(|script| script.id == node)
    }

    /// How many times `src` was injected since the document was created.
    #[must_use]
    pub fn injections(&self, src: &str) -> usize {
        self.inner.borrow().history.iter().filter(|seen| *seen == src).count()
    }

    /// Number of scripts still holding a listener.
    #[must_use]
    pub fn listeners(&self) -> usize {
        self.inner.borrow().head.iter().filter(|script| script.listener.is_some()).count()
    }

    fn dispatch(&self, id: NodeId, event: ScriptEvent) -> bool {
        let listener = self
            .inner
            .borrow()
            .head
            .iter()
            .find(|script| script.id == id)
            .and_then(|script| script.listener.clone());

        // The borrow is released here: listeners call back into the document.
        listener.is_some_and(|listener| {
            trace!(node = %id, ?event, "Dispatching script event");
            listener.on_event(event);
            true
        })
    }

    fn respond(&self, id: NodeId, route: &Route) {
        match route.kind {
            RouteKind::Hold => {},
            RouteKind::Load => {
                if let Some(effect) = &route.effect {
                    effect();
                }
                self.dispatch(id, ScriptEvent::Load);
            },
            RouteKind::Error => {
                self.dispatch(id, ScriptEvent::Error);
            },
        }
    }
}

impl ScriptHost for MemoryDocument {
    fn append_script(
        &self,
        request: &ScriptRequest,
        listener: Rc<dyn ScriptListener>,
    ) -> Result<NodeId, HostError> {
        let (id, route) = {
            let mut state = self.inner.borrow_mut();
            state.next_id += 1;
            let id = NodeId(state.next_id);
            state.head.push(AttachedScript { id, request: request.clone(), listener: Some(listener) });
            state.history.push(request.src.clone());
            (id, state.routes.get(&request.src).cloned())
        };

        trace!(node = %id, src = %request.src, "Script appended to head");

        if let Some(route) = route {
            self.respond(id, &route);
        }

        Ok(id)
    }

    fn detach_listener(&self, node: NodeId) {
        if let Some(script) = self.inner.borrow_mut().head.iter_mut().find(|script| script.id == node)
        {
            script.listener = None;
        }
    }

    fn remove_script(&self, node: NodeId) -> Result<(), HostError> {
        let mut state = self.inner.borrow_mut();
        let Some(position) = state.head.iter().position(|script| script.id == node) else {
            return Err(HostError::NodeNotFound { message: node.to_string().into(), context: None });
        };
        state.head.remove(position);
        Ok(())
    }
}

impl fmt::Debug for MemoryDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.borrow();
        f.debug_struct("MemoryDocument")
            .field("attached", &state.head.len())
            .field("routes", &state.routes.len())
            .field("injections", &state.history.len())
            .finish()
    }
}

/// Tag registry kept in memory. Clones share the same registry.
pub struct MemoryTagRegistry<C> {
    classes: Rc<RefCell<FxHashMap<String, C>>>,
}

impl<C> MemoryTagRegistry<C> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.classes.borrow().len()
    }

    /// Registered tags, sorted.
    #[must_use]
    pub fn tags(&self) -> Vec<String> {
        let mut tags: Vec<String> = self.classes.borrow().keys().cloned().collect();
        tags.sort();
        tags
    }
}

impl<C: Clone> MemoryTagRegistry<C> {
    #[must_use]
    pub fn get(&self, name: &str) -> Option<C> {
        self.classes.borrow().get(name).cloned()
    }
}

impl<C> Default for MemoryTagRegistry<C> {
    fn default() -> Self {
        Self { classes: Rc::new(RefCell::new(FxHashMap::default())) }
    }
}

impl<C> Clone for MemoryTagRegistry<C> {
    fn clone(&self) -> Self {
        Self { classes: Rc::clone(&self.classes) }
    }
}

impl<C> fmt::Debug for MemoryTagRegistry<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryTagRegistry").field("tags", &self.tags()).finish()
    }
}

impl<C> TagRegistry for MemoryTagRegistry<C> {
    type Class = C;

    fn has_tag(&self, name: &str) -> bool {
        self.classes.borrow().contains_key(name)
    }

    fn define(&self, name: &str, class: C) -> Result<(), HostError> {
        TagGuard::verify(name)?;

        let mut classes = self.classes.borrow_mut();
        if classes.contains_key(name) {
            return Err(HostError::AlreadyDefined {
                message: name.to_owned().into(),
                context: Some("MemoryTagRegistry".into()),
            });
        }
        classes.insert(name.to_owned(), class);
        trace!(tag = name, "Element class registered");
        Ok(())
    }
}

/// Element instance with a mutable attribute map.
#[derive(Debug, Clone, Default)]
pub struct MemoryElement {
    attributes: Rc<RefCell<FxHashMap<String, String>>>,
}

impl MemoryElement {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_attribute(self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_attribute(name, value);
        self
    }

    pub fn set_attribute(&self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.borrow_mut().insert(name.into(), value.into());
    }

    pub fn remove_attribute(&self, name: &str) {
        self.attributes.borrow_mut().remove(name);
    }
}

impl ElementHost for MemoryElement {
    fn attribute(&self, name: &str) -> Option<String> {
        self.attributes.borrow().get(name).cloned()
    }
}
