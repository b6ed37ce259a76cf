//! Per-instance connect/mount/disconnect/unmount state machine.

use crate::error::ElementError;
use crate::module::ModuleLoader;
use crate::render::{MountProps, RenderCapability};
use crate::token::{DisconnectSignal, DisconnectToken};
use futures_util::FutureExt;
use futures_util::future::{self, LocalBoxFuture};
use hatch_host::ElementHost;
use hatch_kernel::safe_nanoid;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use tracing::{debug, error, info, trace, warn};

/// Lifecycle phase of a [`WidgetElement`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Created, never connected.
    Idle,
    /// Connected, widget module loading.
    Connecting,
    /// Connected and holding a mount handle.
    Mounted,
    /// Disconnected after a mount; the handle was released.
    Unmounted,
    /// Disconnected before the module finished loading.
    Aborted,
    /// The module load or the mount failed.
    Failed,
}

/// How a mount task ended.
#[derive(Debug)]
pub enum MountOutcome {
    Mounted,
    /// Disconnected (or superseded by a newer connect) before mounting.
    Aborted,
    /// `connect` arrived while the instance was already mounted.
    AlreadyMounted,
    Failed(ElementError),
}

impl MountOutcome {
    #[must_use]
    pub const fn is_mounted(&self) -> bool {
        matches!(self, Self::Mounted)
    }
}

/// Future returned by [`WidgetElement::connect`].
pub type MountTask = LocalBoxFuture<'static, MountOutcome>;

type Render<M> = <M as ModuleLoader>::Render;
type Handle<M> = <Render<M> as RenderCapability>::Handle;

struct State<M: ModuleLoader> {
    phase: Phase,
    generation: u64,
    location: String,
    token: Option<DisconnectToken>,
    mounted: Option<(Rc<Render<M>>, Handle<M>)>,
}

struct Inner<M: ModuleLoader> {
    id: String,
    tag: Rc<str>,
    location_attribute: Rc<str>,
    host: Rc<dyn ElementHost>,
    modules: Rc<M>,
    state: RefCell<State<M>>,
}

/// One custom element instance bridged to a widget.
///
/// Clones share the instance.
pub struct WidgetElement<M: ModuleLoader> {
    inner: Rc<Inner<M>>,
}

impl<M: ModuleLoader + 'static> WidgetElement<M> {
    pub(crate) fn new(
        tag: Rc<str>,
        location_attribute: Rc<str>,
        host: Rc<dyn ElementHost>,
        modules: Rc<M>,
    ) -> Self {
        let inner = Inner {
            id: safe_nanoid!(),
            tag,
            location_attribute,
            host,
            modules,
            state: RefCell::new(State {
                phase: Phase::Idle,
                generation: 0,
                location: String::new(),
                token: None,
                mounted: None,
            }),
        };
        trace!(tag = %inner.tag, instance = %inner.id, "Element instance created");
        Self { inner: Rc::new(inner) }
    }

    /// Handles the element entering the document.
    ///
    /// The synchronous part runs immediately: the location attribute is read, the connection
    /// generation advances and a fresh disconnect token is issued. The returned task loads the
    /// widget module and mounts it unless the element disconnected in the meantime. Load and
    /// mount failures are logged here and reported as [`MountOutcome::Failed`].
    pub fn connect(&self) -> MountTask {
        let inner = &self.inner;
        let (generation, signal, location) = {
            let mut state = inner.state.borrow_mut();
            match state.phase {
                Phase::Mounted => {
                    warn!(tag = %inner.tag, instance = %inner.id, "Connect ignored, already mounted");
                    return future::ready(MountOutcome::AlreadyMounted).boxed_local();
                },
                Phase::Connecting => {
                    if let Some(token) = state.token.take() {
                        debug!(tag = %inner.tag, instance = %inner.id, "Superseding pending connect");
                        token.cancel();
                    }
                },
                Phase::Idle | Phase::Unmounted | Phase::Aborted | Phase::Failed => {},
            }

            let location = inner.host.attribute(&inner.location_attribute).unwrap_or_else(|| {
                warn!(
                    tag = %inner.tag,
                    instance = %inner.id,
                    attribute = %inner.location_attribute,
                    "Location attribute missing, mounting with an empty location"
                );
                String::new()
            });

            let (token, signal) = DisconnectToken::new();
            state.generation += 1;
            state.phase = Phase::Connecting;
            state.location.clone_from(&location);
            state.token = Some(token);
            (state.generation, signal, location)
        };

        debug!(
            tag = %inner.tag,
            instance = %inner.id,
            generation,
            location = %location,
            "Element connected, loading widget module"
        );

        let load = inner.modules.load();
        Rc::clone(inner).mount_when_loaded(generation, signal, location, load).boxed_local()
    }

    /// Handles the element leaving the document.
    ///
    /// Aborts a pending module load, or unmounts the widget if it is mounted. Otherwise a no-op.
    pub fn disconnect(&self) {
        let inner = &self.inner;
        let mounted = {
            let mut state = inner.state.borrow_mut();
            match state.phase {
                Phase::Connecting => {
                    if let Some(token) = state.token.take() {
                        token.cancel();
                    }
                    state.phase = Phase::Aborted;
                    debug!(tag = %inner.tag, instance = %inner.id, "Disconnected while loading");
                    None
                },
                Phase::Mounted => {
                    state.phase = Phase::Unmounted;
                    state.mounted.take()
                },
                Phase::Idle | Phase::Unmounted | Phase::Aborted | Phase::Failed => {
                    trace!(tag = %inner.tag, instance = %inner.id, "Disconnect without mount");
                    None
                },
            }
        };

        if let Some((render, handle)) = mounted {
            render.unmount(handle);
            info!(tag = %inner.tag, instance = %inner.id, "Widget unmounted");
        }
    }
}

impl<M: ModuleLoader> WidgetElement<M> {
    /// Short id used to correlate log lines of this instance.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.inner.id
    }

    #[must_use]
    pub fn tag(&self) -> &str {
        &self.inner.tag
    }

    #[must_use]
    pub fn phase(&self) -> Phase {
        self.inner.state.borrow().phase
    }

    /// Location read by the latest connect.
    #[must_use]
    pub fn location(&self) -> String {
        self.inner.state.borrow().location.clone()
    }

    #[must_use]
    pub fn has_handle(&self) -> bool {
        self.inner.state.borrow().mounted.is_some()
    }

    /// Number of connects that started a load.
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.inner.state.borrow().generation
    }
}

impl<M: ModuleLoader> Inner<M> {
    fn is_current(&self, generation: u64) -> bool {
        let state = self.state.borrow();
        state.generation == generation && state.phase == Phase::Connecting
    }

    async fn mount_when_loaded(
        self: Rc<Self>,
        generation: u64,
        mut signal: DisconnectSignal,
        location: String,
        load: LocalBoxFuture<'static, Result<Rc<Render<M>>, ElementError>>,
    ) -> MountOutcome {
        let loaded = tokio::select! {
            biased;
            () = signal.cancelled() => None,
            result = load => Some(result),
        };

        let Some(result) = loaded else {
            debug!(tag = %self.tag, instance = %self.id, generation, "Module load aborted");
            return MountOutcome::Aborted;
        };

        if signal.is_cancelled() || !self.is_current(generation) {
            debug!(tag = %self.tag, instance = %self.id, generation, "Module loaded after disconnect");
            return MountOutcome::Aborted;
        }

        let render = match result {
            Ok(render) => render,
            Err(error) => return self.fail(generation, error),
        };

        let props = MountProps { location, tag: self.tag.to_string() };
        let handle = match render.mount(&props) {
            Ok(handle) => handle,
            Err(error) => return self.fail(generation, error),
        };

        let mut state = self.state.borrow_mut();
        if state.generation != generation || state.phase != Phase::Connecting {
            // The instance changed while `mount` ran.
            drop(state);
            render.unmount(handle);
            debug!(tag = %self.tag, instance = %self.id, generation, "Mount discarded");
            return MountOutcome::Aborted;
        }
        state.phase = Phase::Mounted;
        state.token = None;
        state.mounted = Some((render, handle));
        drop(state);

        info!(tag = %self.tag, instance = %self.id, location = %props.location, "Widget mounted");
        MountOutcome::Mounted
    }

    fn fail(&self, generation: u64, error: ElementError) -> MountOutcome {
        error!(tag = %self.tag, instance = %self.id, error = %error, "Widget mount failed");
        let mut state = self.state.borrow_mut();
        if state.generation == generation && state.phase == Phase::Connecting {
            state.phase = Phase::Failed;
            state.token = None;
        }
        MountOutcome::Failed(error)
    }
}

impl<M: ModuleLoader> Clone for WidgetElement<M> {
    fn clone(&self) -> Self {
        Self { inner: Rc::clone(&self.inner) }
    }
}

impl<M: ModuleLoader> fmt::Debug for WidgetElement<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.inner.state.borrow();
        f.debug_struct("WidgetElement")
            .field("id", &self.inner.id)
            .field("tag", &self.inner.tag)
            .field("phase", &state.phase)
            .field("generation", &state.generation)
            .field("mounted", &state.mounted.is_some())
            .finish()
    }
}
