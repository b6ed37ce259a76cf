use hatch_domain::config::{HatchConfig, LoaderConfig, LoggingConfig};
use serde_json::json;
use std::time::Duration;

#[test]
fn config_defaults_are_sane() {
    let config = HatchConfig::default();
    assert_eq!(config.loader.script_timeout(), Duration::from_secs(10));
    assert_eq!(config.elements.location_attribute, "location");
    assert!(config.widgets.is_empty());
    assert_eq!(config.polyfill_src(), "/_next/static/chunks/customElements.js");

    let logging = LoggingConfig::default();
    assert_eq!(logging.level, "info");
    assert!(logging.console);
    assert!(logging.path.is_none());
}

#[test]
fn non_positive_timeout_disables_it() {
    assert_eq!(LoaderConfig { script_timeout_ms: 0 }.script_timeout(), Duration::ZERO);
    assert_eq!(LoaderConfig { script_timeout_ms: -5 }.script_timeout(), Duration::ZERO);
    assert_eq!(
        LoaderConfig { script_timeout_ms: 250 }.script_timeout(),
        Duration::from_millis(250)
    );
}

#[test]
fn hatch_config_deserializes() {
    let raw = json!({
        "loader": { "script_timeout_ms": 2500 },
        "public": { "base_url": "https://cdn.example" },
        "logging": { "level": "debug", "json": true },
        "widgets": [
            { "name": "hello", "tag": "hello-widget" },
            { "name": "map", "tag": "map-widget", "src": "/maps/index.js" }
        ]
    });

    let cfg: HatchConfig = serde_json::from_value(raw).expect("config deserialize");
    assert_eq!(cfg.loader.script_timeout(), Duration::from_millis(2500));
    assert_eq!(cfg.logging.level, "debug");
    assert!(cfg.logging.json);
    assert_eq!(cfg.widgets.len(), 2);
    assert_eq!(
        cfg.widgets[0].bundle_src(&cfg.public.base_url),
        "https://cdn.example/_next/static/widgets/hello/index.js"
    );
    assert_eq!(cfg.widgets[1].bundle_src(&cfg.public.base_url), "/maps/index.js");
    assert_eq!(cfg.polyfill_src(), "https://cdn.example/_next/static/chunks/customElements.js");
}

#[test]
fn cloned_config_is_copy_on_write() {
    let original = HatchConfig::default();
    let mut changed = original.clone();
    changed.loader.script_timeout_ms = 1;

    assert_eq!(original.loader.script_timeout_ms, 10_000);
    assert_eq!(changed.loader.script_timeout_ms, 1);
}
