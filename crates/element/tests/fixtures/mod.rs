#![allow(dead_code)]

use futures_util::FutureExt;
use futures_util::future::LocalBoxFuture;
use hatch_element::{ElementError, MountProps, RenderCapability};
use std::cell::{Cell, RefCell};
use std::rc::Rc;
use tokio::sync::watch;

pub type ModuleFuture = LocalBoxFuture<'static, Result<Rc<RecordingRender>, ElementError>>;

/// Render capability that records every call.
#[derive(Default)]
pub struct RecordingRender {
    mounts: RefCell<Vec<MountProps>>,
    unmounts: RefCell<Vec<u32>>,
    next_handle: Cell<u32>,
    fail: Cell<bool>,
    on_mount: RefCell<Option<Box<dyn Fn()>>>,
}

impl RecordingRender {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn failing() -> Rc<Self> {
        let render = Self::default();
        render.fail.set(true);
        Rc::new(render)
    }

    /// Runs `hook` inside `mount`, before the handle is returned.
    pub fn on_mount(&self, hook: impl Fn() + 'static) {
        *self.on_mount.borrow_mut() = Some(Box::new(hook));
    }

    pub fn mounts(&self) -> Vec<MountProps> {
        self.mounts.borrow().clone()
    }

    pub fn unmounts(&self) -> Vec<u32> {
        self.unmounts.borrow().clone()
    }
}

impl RenderCapability for RecordingRender {
    type Handle = u32;

    fn mount(&self, props: &MountProps) -> Result<u32, ElementError> {
        if self.fail.get() {
            return Err(ElementError::render("widget exploded"));
        }
        self.mounts.borrow_mut().push(props.clone());
        if let Some(hook) = self.on_mount.borrow().as_ref() {
            hook();
        }
        let handle = self.next_handle.get() + 1;
        self.next_handle.set(handle);
        Ok(handle)
    }

    fn unmount(&self, handle: u32) {
        self.unmounts.borrow_mut().push(handle);
    }
}

/// Module that resolves immediately.
pub fn ready_module(render: Rc<RecordingRender>) -> impl Fn() -> ModuleFuture {
    move || {
        let render = Rc::clone(&render);
        async move { Ok(render) }.boxed_local()
    }
}

/// Module that always fails to load.
pub fn broken_module() -> impl Fn() -> ModuleFuture {
    || async { Err(ElementError::dependency("chunk failed")) }.boxed_local()
}

/// Holds module loads back until opened.
pub struct Gate {
    tx: watch::Sender<bool>,
    loads: Rc<Cell<u32>>,
}

impl Gate {
    pub fn closed() -> Self {
        Self { tx: watch::channel(false).0, loads: Rc::default() }
    }

    pub fn open(&self) {
        self.tx.send_replace(true);
    }

    /// Module loads started so far.
    pub fn loads(&self) -> u32 {
        self.loads.get()
    }

    pub fn module(&self, render: Rc<RecordingRender>) -> impl Fn() -> ModuleFuture + use<> {
        let rx = self.tx.subscribe();
        let loads = Rc::clone(&self.loads);
        move || {
            loads.set(loads.get() + 1);
            let mut rx = rx.clone();
            let render = Rc::clone(&render);
            async move {
                let _ = rx.wait_for(|open| *open).await;
                Ok(render)
            }
            .boxed_local()
        }
    }
}
