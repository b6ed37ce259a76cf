//! # Hatch Demo
//!
//! Runs a page bootstrap against an in-memory document.
//!
//! The simulated network serves the custom elements polyfill and one bundle per configured
//! widget. Executing a bundle publishes a render capability that writes to the log, so the whole
//! define, connect, mount, disconnect and unmount sequence is observable through `tracing`.
//!
//! ## Example
//! ```no_run
//! use hatch::domain::config::HatchConfig;
//! use hatch_demo::{demo_config, simulate};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let summary = simulate(demo_config(HatchConfig::default()), "/dashboard").await?;
//! assert!(summary.report.is_complete());
//! # Ok(())
//! # }
//! ```

use anyhow::{Context, Result};
use hatch::domain::config::HatchConfig;
use hatch::domain::widget::WidgetConfig;
use hatch::element::{ElementError, MountOutcome, MountProps, RenderCapability, RenderExports};
use hatch::host::{MemoryDocument, MemoryElement, MemoryTagRegistry, Route, TokioTimer};
use hatch::loader::{FeatureLoader, ScriptInjector};
use hatch::{BootstrapReport, Page, WidgetClass, custom_elements_capability};
use std::cell::Cell;
use std::rc::Rc;
use tracing::{info, warn};

/// Widget registered when the configuration lists none.
pub const DEMO_WIDGET: (&str, &str) = ("hello", "hello-widget");

/// Render capability of a simulated bundle: logs instead of drawing.
#[derive(Debug)]
pub struct LogRender {
    widget: String,
    next_handle: Cell<u64>,
}

impl LogRender {
    #[must_use]
    pub fn new(widget: impl Into<String>) -> Self {
        Self { widget: widget.into(), next_handle: Cell::new(0) }
    }
}

impl RenderCapability for LogRender {
    type Handle = u64;

    fn mount(&self, props: &MountProps) -> Result<u64, ElementError> {
        let handle = self.next_handle.get() + 1;
        self.next_handle.set(handle);
        info!(widget = %self.widget, tag = %props.tag, location = %props.location, handle, "Rendered");
        Ok(handle)
    }

    fn unmount(&self, handle: u64) {
        info!(widget = %self.widget, handle, "Render root released");
    }
}

type Registry = MemoryTagRegistry<WidgetClass<LogRender>>;

/// What a simulation run did.
#[derive(Debug)]
pub struct DemoSummary {
    pub report: BootstrapReport,
    /// Tag of the instance that was connected, if any widget registered.
    pub mounted: Option<String>,
    /// Scripts injected into the document over the whole run.
    pub injections: usize,
}

/// Falls back to [`DEMO_WIDGET`] when `config` lists no widgets.
#[must_use]
pub fn demo_config(mut config: HatchConfig) -> HatchConfig {
    if config.widgets.is_empty() {
        config.widgets = vec![WidgetConfig::new(DEMO_WIDGET.0, DEMO_WIDGET.1)];
    }
    config
}

/// Parses a `name=tag` widget argument.
///
/// # Errors
/// Returns a message when either side is missing.
pub fn parse_widget(value: &str) -> Result<WidgetConfig, String> {
    match value.split_once('=') {
        Some((name, tag)) if !name.trim().is_empty() && !tag.trim().is_empty() => {
            Ok(WidgetConfig::new(name.trim(), tag.trim()))
        },
        _ => Err(format!("expected NAME=TAG, got '{value}'")),
    }
}

/// Bootstraps the configured widgets on a fresh in-memory page, then connects one instance of
/// the first registered widget at `location` and disconnects it again.
///
/// # Errors
/// Fails when the connected instance does not mount.
pub async fn simulate(config: HatchConfig, location: &str) -> Result<DemoSummary> {
    let document = MemoryDocument::new();
    let registry = Registry::new();
    let exports = RenderExports::new();

    let installed = Rc::new(Cell::new(false));
    let flag = Rc::clone(&installed);
    document.route(config.polyfill_src(), Route::load_with(move || flag.set(true)));

    for widget in &config.widgets {
        let (exports, widget) = (exports.clone(), widget.clone());
        document.route(
            widget.bundle_src(&config.public.base_url),
            Route::load_with(move || {
                exports.publish(widget.tag.as_str(), Rc::new(LogRender::new(widget.name.as_str())));
            }),
        );
    }

    let capability = {
        let registry = registry.clone();
        custom_elements_capability(&config, move || installed.get().then(|| registry.clone()))
    };
    let loader = FeatureLoader::new(ScriptInjector::new(document.clone(), TokioTimer));
    let location_attribute = config.elements.location_attribute.clone();
    let page = Page::new(config, loader, capability, exports);

    let report = page.bootstrap().await;

    let Some(tag) = report.registered.first().or_else(|| report.already_defined.first()).cloned()
    else {
        warn!("No widget registered, nothing to mount");
        let injections = config_injections(&document, &page);
        return Ok(DemoSummary { report, mounted: None, injections });
    };

    let class = registry.get(&tag).with_context(|| format!("class for <{tag}> missing"))?;
    let element = class.create(MemoryElement::new().with_attribute(location_attribute, location));

    match element.connect().await {
        MountOutcome::Mounted => {},
        MountOutcome::Failed(e) => return Err(e).context(format!("Mounting <{tag}> failed")),
        outcome => anyhow::bail!("Mounting <{tag}> ended with {outcome:?}"),
    }
    element.disconnect();

    let injections = config_injections(&document, &page);
    Ok(DemoSummary { report, mounted: Some(tag), injections })
}

fn config_injections(document: &MemoryDocument, page: &Page<Registry, LogRender>) -> usize {
    let config = page.config();
    let bundles: usize = config
        .widgets
        .iter()
        .map(|widget| document.injections(&widget.bundle_src(&config.public.base_url)))
        .sum();
    document.injections(&config.polyfill_src()) + bundles
}
