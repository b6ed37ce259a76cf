//! Page bootstrap: registers every configured widget as a custom element type.

use futures_util::future::join_all;
use hatch_domain::config::HatchConfig;
use hatch_domain::constants::CUSTOM_ELEMENTS_FEATURE;
use hatch_domain::widget::WidgetConfig;
use hatch_element::{
    DefineOutcome, ElementBridge, ElementClass, ElementError, RenderCapability, RenderExports,
    ScriptModule,
};
use hatch_host::TagRegistry;
use hatch_loader::{FeatureDescriptor, FeatureLoader};
use std::fmt;
use tracing::{error, info, instrument};

/// Element class registered for a configured widget.
pub type WidgetClass<V> = ElementClass<ScriptModule<V>>;

/// Describes the custom element capability of a page: `check` yields the registry when it is
/// present, otherwise the configured polyfill is injected.
pub fn custom_elements_capability<R>(
    config: &HatchConfig,
    check: impl Fn() -> Option<R> + 'static,
) -> FeatureDescriptor<R> {
    FeatureDescriptor::builder(CUSTOM_ELEMENTS_FEATURE)
        .check(check)
        .script(config.polyfill_src())
        .max_timeout(config.loader.script_timeout())
        .build()
}

/// A widget that could not be registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetFailure {
    pub tag: String,
    pub message: String,
}

/// What [`Page::bootstrap`] did, per tag and in configuration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BootstrapReport {
    pub registered: Vec<String>,
    pub already_defined: Vec<String>,
    pub failed: Vec<WidgetFailure>,
}

impl BootstrapReport {
    /// `true` when every configured widget has a registered type.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Everything one embedding page needs to turn its widget list into element types.
pub struct Page<R, V> {
    config: HatchConfig,
    bridge: ElementBridge<R>,
    exports: RenderExports<V>,
}

impl<R, V> Page<R, V>
where
    R: TagRegistry<Class = WidgetClass<V>>,
    V: RenderCapability + 'static,
{
    /// `exports` is where the widget bundles publish their render capabilities.
    #[must_use]
    pub const fn new(
        config: HatchConfig,
        loader: FeatureLoader,
        capability: FeatureDescriptor<R>,
        exports: RenderExports<V>,
    ) -> Self {
        Self { config, bridge: ElementBridge::new(loader, capability), exports }
    }

    #[must_use]
    pub const fn config(&self) -> &HatchConfig {
        &self.config
    }

    #[must_use]
    pub const fn exports(&self) -> &RenderExports<V> {
        &self.exports
    }

    /// Builds the class for `widget`; its instances load the widget bundle on first connect.
    #[must_use]
    pub fn widget_class(&self, widget: &WidgetConfig) -> WidgetClass<V> {
        let module = ScriptModule::new(
            self.bridge.loader().clone(),
            self.exports.clone(),
            widget.tag.clone(),
            widget.bundle_src(&self.config.public.base_url),
            self.config.loader.script_timeout(),
        );
        ElementClass::new(widget.tag.as_str(), module)
            .with_location_attribute(self.config.elements.location_attribute.as_str())
    }

    /// Registers a single widget.
    ///
    /// # Errors
    /// See [`ElementBridge::define`].
    pub async fn define_widget(&self, widget: &WidgetConfig) -> Result<DefineOutcome, ElementError> {
        self.bridge.define(&widget.tag, || self.widget_class(widget)).await
    }

    /// Registers every configured widget concurrently.
    ///
    /// A failing widget is logged and reported; it never prevents the others from registering.
    #[instrument(skip_all, fields(widgets = self.config.widgets.len()))]
    pub async fn bootstrap(&self) -> BootstrapReport {
        let results = join_all(self.config.widgets.iter().map(|widget| async move {
            (widget.tag.clone(), self.define_widget(widget).await)
        }))
        .await;

        let mut report = BootstrapReport::default();
        for (tag, result) in results {
            match result {
                Ok(DefineOutcome::Registered) => report.registered.push(tag),
                Ok(DefineOutcome::AlreadyDefined) => report.already_defined.push(tag),
                Err(e) => {
                    error!(tag = %tag, error = %e, "Widget type unavailable on this page");
                    report.failed.push(WidgetFailure { tag, message: e.to_string() });
                },
            }
        }

        info!(
            registered = report.registered.len(),
            already_defined = report.already_defined.len(),
            failed = report.failed.len(),
            "Page bootstrap finished"
        );
        report
    }
}

impl<R, V> fmt::Debug for Page<R, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Page")
            .field("widgets", &self.config.widgets.len())
            .field("bridge", &self.bridge)
            .finish_non_exhaustive()
    }
}
