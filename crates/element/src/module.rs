//! Loading the UI implementation of a widget.

use crate::error::ElementError;
use crate::render::RenderCapability;
use futures_util::FutureExt;
use futures_util::future::LocalBoxFuture;
use fxhash::FxHashMap;
use hatch_loader::{FeatureDescriptor, FeatureLoader};
use std::cell::RefCell;
use std::fmt;
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;

/// Produces the render capability of a widget. Dropping the returned future aborts the load.
pub trait ModuleLoader {
    type Render: RenderCapability;

    fn load(&self) -> LocalBoxFuture<'static, Result<Rc<Self::Render>, ElementError>>;
}

impl<F, Fut, R> ModuleLoader for F
where
    F: Fn() -> Fut,
    Fut: Future<Output = Result<Rc<R>, ElementError>> + 'static,
    R: RenderCapability,
{
    type Render = R;

    fn load(&self) -> LocalBoxFuture<'static, Result<Rc<R>, ElementError>> {
        self().boxed_local()
    }
}

/// Render capabilities published by loaded widget bundles, keyed by tag.
pub struct RenderExports<R> {
    inner: Rc<RefCell<FxHashMap<String, Rc<R>>>>,
}

impl<R> RenderExports<R> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Called by a bundle once it has executed.
    pub fn publish(&self, tag: impl Into<String>, render: Rc<R>) {
        self.inner.borrow_mut().insert(tag.into(), render);
    }

    #[must_use]
    pub fn get(&self, tag: &str) -> Option<Rc<R>> {
        self.inner.borrow().get(tag).cloned()
    }

    #[must_use]
    pub fn contains(&self, tag: &str) -> bool {
        self.inner.borrow().contains_key(tag)
    }
}

impl<R> Default for RenderExports<R> {
    fn default() -> Self {
        Self { inner: Rc::new(RefCell::new(FxHashMap::default())) }
    }
}

impl<R> Clone for RenderExports<R> {
    fn clone(&self) -> Self {
        Self { inner: Rc::clone(&self.inner) }
    }
}

impl<R> fmt::Debug for RenderExports<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut tags: Vec<String> = self.inner.borrow().keys().cloned().collect();
        tags.sort();
        f.debug_struct("RenderExports").field("tags", &tags).finish()
    }
}

/// Loads a widget bundle through the [`FeatureLoader`] and picks its render capability out of
/// [`RenderExports`].
///
/// Once the bundle has published, later loads resolve without touching the document.
pub struct ScriptModule<R> {
    loader: FeatureLoader,
    feature: FeatureDescriptor<Rc<R>>,
}

impl<R: 'static> ScriptModule<R> {
    pub fn new(
        loader: FeatureLoader,
        exports: RenderExports<R>,
        tag: impl Into<String>,
        src: impl Into<String>,
        max_timeout: Duration,
    ) -> Self {
        let tag = tag.into();
        let feature = FeatureDescriptor::builder(format!("widget:{tag}"))
            .check(move || exports.get(&tag))
            .script(src)
            .max_timeout(max_timeout)
            .build();
        Self { loader, feature }
    }

    #[must_use]
    pub fn src(&self) -> Option<&str> {
        self.feature.script_src()
    }
}

impl<R> Clone for ScriptModule<R> {
    fn clone(&self) -> Self {
        Self { loader: self.loader.clone(), feature: self.feature.clone() }
    }
}

impl<R> fmt::Debug for ScriptModule<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptModule").field("feature", &self.feature).finish_non_exhaustive()
    }
}

impl<R: RenderCapability + 'static> ModuleLoader for ScriptModule<R> {
    type Render = R;

    fn load(&self) -> LocalBoxFuture<'static, Result<Rc<R>, ElementError>> {
        let loader = self.loader.clone();
        let feature = self.feature.clone();
        async move { loader.ensure(&feature).await.map_err(ElementError::from) }.boxed_local()
    }
}
