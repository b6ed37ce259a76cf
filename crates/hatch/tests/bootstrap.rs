use hatch::prelude::*;
use hatch_host::{MemoryDocument, MemoryElement, MemoryTagRegistry, Route, ScriptEvent, TokioTimer};
use std::cell::{Cell, RefCell};
use std::rc::Rc;

const BASE_URL: &str = "https://cdn.example";
const POLYFILL: &str = "https://cdn.example/_next/static/chunks/customElements.js";
const HELLO_BUNDLE: &str = "https://cdn.example/_next/static/widgets/hello/index.js";

/// Renders into a string buffer, one entry per mounted instance.
#[derive(Default)]
struct TextRender {
    output: RefCell<Vec<String>>,
    unmounted: Cell<usize>,
}

impl RenderCapability for TextRender {
    type Handle = usize;

    fn mount(&self, props: &MountProps) -> Result<usize, ElementError> {
        let mut output = self.output.borrow_mut();
        output.push(format!("<{}> at {}", props.tag, props.location));
        Ok(output.len() - 1)
    }

    fn unmount(&self, _handle: usize) {
        self.unmounted.set(self.unmounted.get() + 1);
    }
}

type Registry = MemoryTagRegistry<WidgetClass<TextRender>>;

struct Fixture {
    document: MemoryDocument,
    registry: Registry,
    installed: Rc<Cell<bool>>,
    page: Page<Registry, TextRender>,
}

fn config(widgets: &[(&str, &str)]) -> HatchConfig {
    let mut config = HatchConfig::default();
    config.public.base_url = BASE_URL.to_owned();
    config.widgets =
        widgets.iter().map(|(name, tag)| WidgetConfig::new(*name, *tag)).collect();
    config
}

fn fixture(config: HatchConfig) -> Fixture {
    let document = MemoryDocument::new();
    let registry = Registry::new();
    let installed = Rc::new(Cell::new(false));
    let exports = RenderExports::new();

    let flag = Rc::clone(&installed);
    document.route(POLYFILL, Route::load_with(move || flag.set(true)));

    let capability = {
        let (installed, registry) = (Rc::clone(&installed), registry.clone());
        custom_elements_capability(&config, move || installed.get().then(|| registry.clone()))
    };
    let loader = FeatureLoader::new(ScriptInjector::new(document.clone(), TokioTimer));
    let page = Page::new(config, loader, capability, exports);

    Fixture { document, registry, installed, page }
}

#[tokio::test]
async fn bootstrap_registers_every_widget_after_polyfill() {
    let fx = fixture(config(&[("hello", "hello-widget"), ("chart", "chart-widget")]));

    let report = fx.page.bootstrap().await;

    assert!(report.is_complete());
    assert_eq!(report.registered, vec!["hello-widget", "chart-widget"]);
    assert!(fx.installed.get());
    assert_eq!(fx.document.injections(POLYFILL), 1);
    assert_eq!(fx.registry.tags(), vec!["chart-widget", "hello-widget"]);
}

#[tokio::test]
async fn concurrent_widgets_share_a_pending_polyfill() {
    let fx = fixture(config(&[("hello", "hello-widget"), ("chart", "chart-widget")]));
    fx.document.route(POLYFILL, Route::hold());

    let (report, ()) = tokio::join!(fx.page.bootstrap(), async {
        tokio::task::yield_now().await;
        assert_eq!(fx.document.injections(POLYFILL), 1);
        fx.installed.set(true);
        assert!(fx.document.fire(POLYFILL, ScriptEvent::Load));
    });

    assert!(report.is_complete(), "{report:?}");
    assert_eq!(report.registered, vec!["hello-widget", "chart-widget"]);
    assert_eq!(fx.document.injections(POLYFILL), 1);
    assert!(!fx.document.is_attached(POLYFILL));
}

#[tokio::test]
async fn invalid_tag_does_not_block_other_widgets() {
    let fx = fixture(config(&[("hello", "hello-widget"), ("broken", "Broken")]));

    let report = fx.page.bootstrap().await;

    assert!(!report.is_complete());
    assert_eq!(report.registered, vec!["hello-widget"]);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(report.failed[0].tag, "Broken");
    assert!(!fx.registry.has_tag("Broken"));
}

#[tokio::test]
async fn second_bootstrap_reports_already_defined() {
    let fx = fixture(config(&[("hello", "hello-widget")]));

    fx.page.bootstrap().await;
    let report = fx.page.bootstrap().await;

    assert!(report.registered.is_empty());
    assert_eq!(report.already_defined, vec!["hello-widget"]);
    assert_eq!(fx.document.injections(POLYFILL), 1);
}

#[tokio::test]
async fn polyfill_failure_fails_every_widget() {
    let fx = fixture(config(&[("hello", "hello-widget"), ("chart", "chart-widget")]));
    fx.document.route(POLYFILL, Route::error());

    let report = fx.page.bootstrap().await;

    assert!(report.registered.is_empty());
    assert_eq!(report.failed.len(), 2);
    assert!(report.failed.iter().all(|failure| failure.message.contains(POLYFILL)));
    assert_eq!(fx.registry.len(), 0);
}

#[tokio::test]
async fn registered_widget_mounts_from_its_bundle() {
    let fx = fixture(config(&[("hello", "hello-widget")]));
    let exports = fx.page.exports().clone();
    let render = Rc::new(TextRender::default());
    {
        let render = Rc::clone(&render);
        fx.document.route(
            HELLO_BUNDLE,
            Route::load_with(move || exports.publish("hello-widget", Rc::clone(&render))),
        );
    }

    fx.page.bootstrap().await;
    let class = fx.registry.get("hello-widget").expect("class registered");
    let element = class.create(MemoryElement::new().with_attribute("location", "/dashboard"));

    assert!(element.connect().await.is_mounted());
    assert_eq!(*render.output.borrow(), vec!["<hello-widget> at /dashboard"]);
    assert_eq!(fx.document.injections(HELLO_BUNDLE), 1);

    element.disconnect();
    assert_eq!(render.unmounted.get(), 1);
    assert_eq!(element.phase(), Phase::Unmounted);

    // A second instance reuses the published export.
    let other = class.create(MemoryElement::new());
    assert!(other.connect().await.is_mounted());
    assert_eq!(fx.document.injections(HELLO_BUNDLE), 1);
}

#[tokio::test]
async fn location_attribute_follows_config() {
    let mut config = config(&[("hello", "hello-widget")]);
    config.elements.location_attribute = "data-route".to_owned();
    let fx = fixture(config);
    let exports = fx.page.exports().clone();
    let render = Rc::new(TextRender::default());
    exports.publish("hello-widget", Rc::clone(&render));

    let class = fx.page.widget_class(&fx.page.config().widgets[0]);
    let element = class.create(
        MemoryElement::new().with_attribute("data-route", "/a").with_attribute("location", "/b"),
    );

    assert!(element.connect().await.is_mounted());
    assert_eq!(element.location(), "/a");
    assert_eq!(fx.document.injections(HELLO_BUNDLE), 0);
}

#[test]
fn capability_uses_configured_polyfill_and_timeout() {
    let config: HatchConfig = serde_json::from_value(serde_json::json!({
        "loader": { "script_timeout_ms": 0 },
        "elements": { "polyfill_src": "/vendor/ce.js" },
    }))
    .expect("valid config");

    let descriptor = custom_elements_capability(&config, || Some(()));

    assert_eq!(descriptor.name(), "custom-elements");
    assert_eq!(descriptor.script_src(), Some("/vendor/ce.js"));
    assert_eq!(config.loader.script_timeout(), std::time::Duration::ZERO);
}
