//! Capability descriptors and the check/acquire/re-check loader.

use crate::error::LoadError;
use crate::script::{DEFAULT_SCRIPT_TIMEOUT, ScriptInjector};
use futures_util::FutureExt;
use futures_util::future::{LocalBoxFuture, Shared, WeakShared};
use fxhash::FxHashMap;
use private::Sealed;
use std::borrow::Cow;
use std::cell::{Cell, RefCell};
use std::fmt;
use std::future::Future;
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, instrument, trace, warn};

type CheckFn<C> = Rc<dyn Fn() -> Option<C>>;
type LoaderFn = Rc<dyn Fn() -> LocalBoxFuture<'static, Result<(), LoadError>>>;

#[derive(Clone)]
enum Acquisition {
    Loader(LoaderFn),
    Script { src: String, max_timeout: Duration },
}

/// Names a capability, says how to detect it and how to acquire it when it is missing.
///
/// `check` must be cheap and free of side effects; [`FeatureLoader::ensure`] calls it at most
/// twice. Build one with [`FeatureDescriptor::builder`].
pub struct FeatureDescriptor<C> {
    name: Cow<'static, str>,
    check: CheckFn<C>,
    acquisition: Acquisition,
}

impl FeatureDescriptor<()> {
    /// Starts a descriptor for the capability called `name`.
    pub fn builder(name: impl Into<Cow<'static, str>>) -> FeatureBuilder {
        FeatureBuilder { name: name.into(), check: NoCheck, acquisition: NoAcquisition }
    }
}

impl<C> FeatureDescriptor<C> {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Runs the capability check.
    pub fn available(&self) -> Option<C> {
        (self.check)()
    }

    /// The script this descriptor injects, if it uses the script strategy.
    #[must_use]
    pub fn script_src(&self) -> Option<&str> {
        match &self.acquisition {
            Acquisition::Script { src, .. } => Some(src),
            Acquisition::Loader(_) => None,
        }
    }
}

impl<C> Clone for FeatureDescriptor<C> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            check: Rc::clone(&self.check),
            acquisition: self.acquisition.clone(),
        }
    }
}

impl<C> fmt::Debug for FeatureDescriptor<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let strategy = match &self.acquisition {
            Acquisition::Loader(_) => "loader",
            Acquisition::Script { .. } => "script",
        };
        f.debug_struct("FeatureDescriptor")
            .field("name", &self.name)
            .field("strategy", &strategy)
            .field("src", &self.script_src())
            .finish_non_exhaustive()
    }
}

pub struct NoCheck;
pub struct WithCheck<C>(CheckFn<C>);
pub struct NoAcquisition;
pub struct ViaLoader(LoaderFn);
pub struct ViaScript {
    src: String,
    max_timeout: Duration,
}

mod private {
    pub trait Sealed {}
}
impl Sealed for NoCheck {}
impl<C> Sealed for WithCheck<C> {}
impl Sealed for NoAcquisition {}
impl Sealed for ViaLoader {}
impl Sealed for ViaScript {}

impl fmt::Debug for NoCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NoCheck")
    }
}

impl<C> fmt::Debug for WithCheck<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("WithCheck")
    }
}

impl fmt::Debug for NoAcquisition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("NoAcquisition")
    }
}

impl fmt::Debug for ViaLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ViaLoader")
    }
}

impl fmt::Debug for ViaScript {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ViaScript")
            .field("src", &self.src)
            .field("max_timeout", &self.max_timeout)
            .finish()
    }
}

/// Typestate builder for [`FeatureDescriptor`]: a check and exactly one acquisition strategy
/// are required before [`FeatureBuilder::build`] becomes available.
#[derive(Debug)]
pub struct FeatureBuilder<K: Sealed = NoCheck, A: Sealed = NoAcquisition> {
    name: Cow<'static, str>,
    check: K,
    acquisition: A,
}

impl<A: Sealed> FeatureBuilder<NoCheck, A> {
    /// Sets the availability check. `Some` carries the capability itself.
    pub fn check<C>(
        self,
        check: impl Fn() -> Option<C> + 'static,
    ) -> FeatureBuilder<WithCheck<C>, A> {
        FeatureBuilder {
            name: self.name,
            check: WithCheck(Rc::new(check)),
            acquisition: self.acquisition,
        }
    }
}

impl<K: Sealed> FeatureBuilder<K, NoAcquisition> {
    /// Acquires the capability through a caller-supplied future. No timeout applies.
    pub fn loader<F, Fut>(self, loader: F) -> FeatureBuilder<K, ViaLoader>
    where
        F: Fn() -> Fut + 'static,
        Fut: Future<Output = Result<(), LoadError>> + 'static,
    {
        FeatureBuilder {
            name: self.name,
            check: self.check,
            acquisition: ViaLoader(Rc::new(move || loader().boxed_local())),
        }
    }

    /// Acquires the capability by injecting `src`, bounded by [`DEFAULT_SCRIPT_TIMEOUT`] unless
    /// overridden with [`FeatureBuilder::max_timeout`].
    pub fn script(self, src: impl Into<String>) -> FeatureBuilder<K, ViaScript> {
        FeatureBuilder {
            name: self.name,
            check: self.check,
            acquisition: ViaScript { src: src.into(), max_timeout: DEFAULT_SCRIPT_TIMEOUT },
        }
    }
}

impl<K: Sealed> FeatureBuilder<K, ViaScript> {
    /// Overrides the script timeout. [`Duration::ZERO`] disables it.
    #[must_use = "The builder must be configured before it can be used to build a descriptor."]
    pub fn max_timeout(mut self, max_timeout: Duration) -> Self {
        self.acquisition.max_timeout = max_timeout;
        self
    }
}

impl<C> FeatureBuilder<WithCheck<C>, ViaLoader> {
    #[must_use]
    pub fn build(self) -> FeatureDescriptor<C> {
        FeatureDescriptor {
            name: self.name,
            check: self.check.0,
            acquisition: Acquisition::Loader(self.acquisition.0),
        }
    }
}

impl<C> FeatureBuilder<WithCheck<C>, ViaScript> {
    #[must_use]
    pub fn build(self) -> FeatureDescriptor<C> {
        let ViaScript { src, max_timeout } = self.acquisition;
        FeatureDescriptor {
            name: self.name,
            check: self.check.0,
            acquisition: Acquisition::Script { src, max_timeout },
        }
    }
}

/// Outcome shared by every caller waiting on the same acquisition.
type Acquire = Shared<LocalBoxFuture<'static, Result<(), LoadError>>>;

/// Registration of an acquisition that has not finished yet. Only a weak handle is kept, so the
/// acquisition is dropped (and its script node removed) once every waiter is gone.
struct InFlight {
    id: u64,
    acquire: WeakShared<LocalBoxFuture<'static, Result<(), LoadError>>>,
}

/// Makes capabilities available on demand.
///
/// Clones share the injector and the table of in-flight acquisitions: concurrent
/// [`FeatureLoader::ensure`] calls for the same descriptor name join a single acquisition
/// instead of injecting the same script again.
#[derive(Clone)]
pub struct FeatureLoader {
    injector: ScriptInjector,
    inflight: Rc<RefCell<FxHashMap<String, InFlight>>>,
    next_id: Rc<Cell<u64>>,
}

impl FeatureLoader {
    #[must_use]
    pub fn new(injector: ScriptInjector) -> Self {
        Self { injector, inflight: Rc::default(), next_id: Rc::default() }
    }

    #[must_use]
    pub const fn injector(&self) -> &ScriptInjector {
        &self.injector
    }

    /// Number of acquisitions currently awaited by at least one caller.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.inflight.borrow().values().filter(|entry| entry.acquire.upgrade().is_some()).count()
    }

    /// Returns the capability described by `descriptor`, acquiring it first if needed.
    ///
    /// When the check already succeeds nothing is injected and no loader runs. While an
    /// acquisition for the same name is in flight, later callers wait for it rather than
    /// starting their own; each caller then runs the check again.
    ///
    /// # Errors
    /// Acquisition errors are returned unchanged. If acquisition succeeds but the check still
    /// fails, returns [`LoadError::FeatureUnavailable`].
    #[instrument(skip_all, fields(feature = %descriptor.name))]
    pub async fn ensure<C>(&self, descriptor: &FeatureDescriptor<C>) -> Result<C, LoadError> {
        if let Some(capability) = descriptor.available() {
            trace!("Feature already available");
            return Ok(capability);
        }

        let (id, acquire) = self.acquisition(descriptor);
        let outcome = acquire.await;
        self.finish(&descriptor.name, id);
        outcome?;

        descriptor.available().ok_or_else(|| {
            warn!("Feature still unavailable after acquisition");
            LoadError::FeatureUnavailable { feature: descriptor.name.clone(), context: None }
        })
    }

    /// Joins the in-flight acquisition for `descriptor`, or starts one.
    fn acquisition<C>(&self, descriptor: &FeatureDescriptor<C>) -> (u64, Acquire) {
        let joined = self.inflight.borrow().get(descriptor.name()).and_then(|entry| {
            entry.acquire.upgrade().map(|acquire| (entry.id, acquire))
        });
        if let Some(joined) = joined {
            debug!("Joining in-flight acquisition");
            return joined;
        }

        let future = match &descriptor.acquisition {
            Acquisition::Loader(load) => {
                debug!("Acquiring feature through loader");
                load()
            },
            Acquisition::Script { src, max_timeout } => {
                debug!(src = %src, "Acquiring feature through script");
                let (injector, src, max_timeout) =
                    (self.injector.clone(), src.clone(), *max_timeout);
                async move { injector.load(&src, max_timeout).await }.boxed_local()
            },
        };
        let acquire = future.shared();

        let id = self.next_id.get() + 1;
        self.next_id.set(id);
        if let Some(weak) = acquire.downgrade() {
            let entry = InFlight { id, acquire: weak };
            self.inflight.borrow_mut().insert(descriptor.name().to_owned(), entry);
        }
        (id, acquire)
    }

    /// Forgets acquisition `id` of `name`; a newer one under the same name is kept.
    fn finish(&self, name: &str, id: u64) {
        let mut inflight = self.inflight.borrow_mut();
        if inflight.get(name).is_some_and(|entry| entry.id == id) {
            inflight.remove(name);
        }
    }
}

impl fmt::Debug for FeatureLoader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeatureLoader")
            .field("injector", &self.injector)
            .field("pending", &self.pending())
            .finish()
    }
}
