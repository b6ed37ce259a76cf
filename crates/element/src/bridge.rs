//! Capability-gated definition of custom element types.

use crate::error::ElementError;
use crate::lifecycle::WidgetElement;
use crate::module::ModuleLoader;
use hatch_domain::constants::LOCATION_ATTRIBUTE;
use hatch_host::{ElementHost, HostError, TagRegistry};
use hatch_kernel::TagGuard;
use hatch_loader::{FeatureDescriptor, FeatureLoader};
use std::fmt;
use std::rc::Rc;
use tracing::{debug, info, instrument};

/// Result of a successful [`ElementBridge::define`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DefineOutcome {
    /// The class was registered under the tag.
    Registered,
    /// The tag was taken already; the class factory did not run or its class was discarded.
    AlreadyDefined,
}

/// Element class for hosts whose registry stores Rust values: creates one [`WidgetElement`] per
/// element instance.
pub struct ElementClass<M> {
    tag: Rc<str>,
    location_attribute: Rc<str>,
    modules: Rc<M>,
}

impl<M: ModuleLoader + 'static> ElementClass<M> {
    pub fn new(tag: impl Into<Rc<str>>, modules: M) -> Self {
        Self {
            tag: tag.into(),
            location_attribute: Rc::from(LOCATION_ATTRIBUTE),
            modules: Rc::new(modules),
        }
    }

    /// Reads the location from `attribute` instead of `location`.
    #[must_use]
    pub fn with_location_attribute(mut self, attribute: impl Into<Rc<str>>) -> Self {
        self.location_attribute = attribute.into();
        self
    }

    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// Constructs the instance backing `host`.
    pub fn create(&self, host: impl ElementHost + 'static) -> WidgetElement<M> {
        WidgetElement::new(
            Rc::clone(&self.tag),
            Rc::clone(&self.location_attribute),
            Rc::new(host),
            Rc::clone(&self.modules),
        )
    }
}

impl<M> Clone for ElementClass<M> {
    fn clone(&self) -> Self {
        Self {
            tag: Rc::clone(&self.tag),
            location_attribute: Rc::clone(&self.location_attribute),
            modules: Rc::clone(&self.modules),
        }
    }
}

impl<M> fmt::Debug for ElementClass<M> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementClass")
            .field("tag", &self.tag)
            .field("location_attribute", &self.location_attribute)
            .finish_non_exhaustive()
    }
}

/// First step of a definition: a validated tag waiting for its capability.
#[derive(Debug, Clone, Copy)]
pub struct Definition<'a> {
    tag: &'a str,
}

/// Second step: the capability (the tag registry) is available, the type can be built.
#[derive(Debug)]
pub struct CapabilityReady<'a, R> {
    tag: &'a str,
    registry: R,
}

impl<'a> Definition<'a> {
    /// # Errors
    /// Returns [`ElementError::InvalidTag`] if `tag` is not a valid custom element name.
    pub fn new(tag: &'a str) -> Result<Self, ElementError> {
        TagGuard::verify(tag)?;
        Ok(Self { tag })
    }

    /// Waits until the registry capability is available.
    ///
    /// # Errors
    /// Returns [`ElementError::FeatureUnavailable`] when it cannot be acquired.
    pub async fn acquire_capability<R>(
        self,
        loader: &FeatureLoader,
        capability: &FeatureDescriptor<R>,
    ) -> Result<CapabilityReady<'a, R>, ElementError> {
        let registry = loader.ensure(capability).await.map_err(|source| {
            ElementError::FeatureUnavailable { tag: self.tag.to_owned(), source, context: None }
        })?;
        Ok(CapabilityReady { tag: self.tag, registry })
    }
}

impl<R: TagRegistry> CapabilityReady<'_, R> {
    /// Runs `factory` and registers its class, unless the tag is taken.
    ///
    /// A duplicate reported by the registry itself (a concurrent definition won) counts as
    /// [`DefineOutcome::AlreadyDefined`].
    ///
    /// # Errors
    /// Returns [`ElementError::Registration`] for any other registry failure.
    pub fn build_type(
        self,
        factory: impl FnOnce() -> R::Class,
    ) -> Result<DefineOutcome, ElementError> {
        let tag = self.tag;
        if self.registry.has_tag(tag) {
            debug!(tag, "Tag already defined, class factory skipped");
            return Ok(DefineOutcome::AlreadyDefined);
        }

        match self.registry.define(tag, factory()) {
            Ok(()) => {
                info!(tag, "Element type registered");
                Ok(DefineOutcome::Registered)
            },
            Err(HostError::AlreadyDefined { .. }) => {
                debug!(tag, "Concurrent definition registered first, class discarded");
                Ok(DefineOutcome::AlreadyDefined)
            },
            Err(source) => {
                Err(ElementError::Registration { tag: tag.to_owned(), source, context: None })
            },
        }
    }
}

/// Defines element types once the custom element capability is present.
pub struct ElementBridge<R> {
    loader: FeatureLoader,
    capability: FeatureDescriptor<R>,
}

impl<R: TagRegistry> ElementBridge<R> {
    /// `capability` yields the tag registry; its acquisition typically injects a polyfill.
    #[must_use]
    pub const fn new(loader: FeatureLoader, capability: FeatureDescriptor<R>) -> Self {
        Self { loader, capability }
    }

    #[must_use]
    pub const fn loader(&self) -> &FeatureLoader {
        &self.loader
    }

    /// Registers the class built by `factory` under `tag`.
    ///
    /// The tag is validated first. The factory runs after the capability is available, at most
    /// once, and only when the tag is still free.
    ///
    /// Failures are returned without being logged; the caller decides how to report them.
    ///
    /// # Errors
    /// * [`ElementError::InvalidTag`] for an invalid tag; nothing is acquired.
    /// * [`ElementError::FeatureUnavailable`] when the capability cannot be acquired.
    /// * [`ElementError::Registration`] when the registry refuses the class.
    #[instrument(skip(self, factory))]
    pub async fn define(
        &self,
        tag: &str,
        factory: impl FnOnce() -> R::Class,
    ) -> Result<DefineOutcome, ElementError> {
        Definition::new(tag)?
            .acquire_capability(&self.loader, &self.capability)
            .await?
            .build_type(factory)
    }
}

impl<R> fmt::Debug for ElementBridge<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ElementBridge")
            .field("capability", &self.capability)
            .finish_non_exhaustive()
    }
}
