//! Browser host built on `web-sys`.
//!
//! [`CustomElementRegistry`] registers a JavaScript constructor, so its `Class` is a
//! [`js_sys::Function`]. No glue in this crate turns an element class into that constructor:
//! the embedding page writes the JavaScript class itself. Its `connectedCallback` and
//! `disconnectedCallback` forward to the connect and disconnect of a widget instance created for
//! the host [`Element`], which implements [`ElementHost`]. Page bootstrapping with Rust-side
//! classes runs against an in-process registry such as `MemoryTagRegistry`.

use crate::document::{NodeId, ScriptEvent, ScriptHost, ScriptListener, ScriptRequest};
use crate::error::HostError;
use crate::registry::{ElementHost, TagRegistry};
use crate::timer::Timer;
use futures_util::FutureExt;
use futures_util::future::LocalBoxFuture;
use fxhash::FxHashMap;
use hatch_kernel::TagGuard;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use std::time::Duration;
use tokio::sync::oneshot;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CustomElementRegistry, Document, Element, Event, HtmlScriptElement};

fn js_error(value: &JsValue) -> HostError {
    HostError::Js {
        message: value.as_string().unwrap_or_else(|| format!("{value:?}")).into(),
        context: None,
    }
}

/// The `customElements` registry of the current window, if the page has one (native or
/// polyfilled).
#[must_use]
pub fn custom_elements() -> Option<CustomElementRegistry> {
    let window = web_sys::window()?;
    let value = js_sys::Reflect::get(&window, &JsValue::from_str("customElements")).ok()?;
    if value.is_undefined() || value.is_null() {
        return None;
    }
    // A polyfilled registry is not an instance of the native class.
    Some(value.unchecked_into())
}

struct Handlers {
    _on_load: Closure<dyn FnMut(Event)>,
    _on_error: Closure<dyn FnMut(Event)>,
}

struct WebScript {
    element: HtmlScriptElement,
    handlers: Option<Handlers>,
}

impl WebScript {
    fn clear_handlers(&mut self) {
        self.element.set_onload(None);
        self.element.set_onerror(None);
        self.handlers = None;
    }
}

/// Script nodes appended to `document.head`.
#[derive(Clone)]
pub struct WebDocument {
    document: Document,
    scripts: Rc<RefCell<FxHashMap<NodeId, WebScript>>>,
    next_id: Rc<Cell<u64>>,
}

impl WebDocument {
    #[must_use]
    pub fn new(document: Document) -> Self {
        Self { document, scripts: Rc::default(), next_id: Rc::default() }
    }

    /// The document of the current window.
    ///
    /// # Errors
    /// Returns [`HostError::Unavailable`] outside a window context (e.g. in a worker).
    pub fn current() -> Result<Self, HostError> {
        web_sys::window().and_then(|window| window.document()).map(Self::new).ok_or_else(|| {
            HostError::Unavailable { message: "window.document".into(), context: None }
        })
    }
}

impl ScriptHost for WebDocument {
    fn append_script(
        &self,
        request: &ScriptRequest,
        listener: Rc<dyn ScriptListener>,
    ) -> Result<NodeId, HostError> {
        let head = self.document.head().ok_or_else(|| HostError::Unavailable {
            message: "document.head".into(),
            context: Some(request.src.clone().into()),
        })?;

        let element: HtmlScriptElement = self
            .document
            .create_element("script")
            .map_err(|e| js_error(&e))?
            .dyn_into()
            .map_err(|_| HostError::Js { message: "not a script element".into(), context: None })?;

        element.set_async(request.is_async);
        element.set_type(request.script_type);
        element.set_charset(request.charset);
        element.set_src(&request.src);

        let on_load = {
            let listener = Rc::clone(&listener);
            Closure::<dyn FnMut(Event)>::new(move |_: Event| listener.on_event(ScriptEvent::Load))
        };
        let on_error =
            Closure::<dyn FnMut(Event)>::new(move |_: Event| listener.on_event(ScriptEvent::Error));
        element.set_onload(Some(on_load.as_ref().unchecked_ref()));
        element.set_onerror(Some(on_error.as_ref().unchecked_ref()));

        head.append_child(&element).map_err(|e| js_error(&e))?;

        let id = NodeId(self.next_id.get() + 1);
        self.next_id.set(id.0);
        self.scripts.borrow_mut().insert(
            id,
            WebScript { element, handlers: Some(Handlers { _on_load: on_load, _on_error: on_error }) },
        );

        Ok(id)
    }

    fn detach_listener(&self, node: NodeId) {
        if let Some(script) = self.scripts.borrow_mut().get_mut(&node) {
            script.clear_handlers();
        }
    }

    fn remove_script(&self, node: NodeId) -> Result<(), HostError> {
        let mut script = self.scripts.borrow_mut().remove(&node).ok_or_else(|| {
            HostError::NodeNotFound { message: node.to_string().into(), context: None }
        })?;
        script.clear_handlers();
        script.element.remove();
        Ok(())
    }
}

impl fmt::Debug for WebDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebDocument").field("attached", &self.scripts.borrow().len()).finish()
    }
}

/// `setTimeout`-backed timer.
#[derive(Debug, Clone, Copy, Default)]
pub struct WindowTimer;

struct PendingTimeout {
    handle: Option<i32>,
    _callback: Closure<dyn FnMut()>,
}

impl Drop for PendingTimeout {
    fn drop(&mut self) {
        if let (Some(handle), Some(window)) = (self.handle, web_sys::window()) {
            window.clear_timeout_with_handle(handle);
        }
    }
}

impl Timer for WindowTimer {
    fn sleep(&self, duration: Duration) -> LocalBoxFuture<'static, ()> {
        let (tx, rx) = oneshot::channel::<()>();
        let callback: Closure<dyn FnMut()> = Closure::once(move || {
            let _ = tx.send(());
        });
        let millis = i32::try_from(duration.as_millis()).unwrap_or(i32::MAX);
        let handle = web_sys::window().and_then(|window| {
            window
                .set_timeout_with_callback_and_timeout_and_arguments_0(
                    callback.as_ref().unchecked_ref(),
                    millis,
                )
                .ok()
        });
        let pending = PendingTimeout { handle, _callback: callback };

        async move {
            let _pending = pending;
            let _ = rx.await;
        }
        .boxed_local()
    }
}

impl TagRegistry for CustomElementRegistry {
    type Class = js_sys::Function;

    fn has_tag(&self, name: &str) -> bool {
        !self.get(name).is_undefined()
    }

    fn define(&self, name: &str, class: js_sys::Function) -> Result<(), HostError> {
        TagGuard::verify(name)?;
        if TagRegistry::has_tag(self, name) {
            return Err(HostError::AlreadyDefined {
                message: name.to_owned().into(),
                context: Some("customElements".into()),
            });
        }
        Self::define(self, name, &class).map_err(|e| js_error(&e).with_context(name.to_owned()))
    }
}

impl ElementHost for Element {
    fn attribute(&self, name: &str) -> Option<String> {
        self.get_attribute(name)
    }
}
