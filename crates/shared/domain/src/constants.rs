//! String and numeric constants shared by the loader, the element bridge and the bundles.

/// Wall-clock bound for one injected script, in milliseconds.
pub const DEFAULT_SCRIPT_TIMEOUT_MS: i64 = 10_000;

/// Attribute read from a widget element when it connects.
pub const LOCATION_ATTRIBUTE: &str = "location";

/// Values set on every injected script node.
pub const SCRIPT_TYPE: &str = "text/javascript";
pub const SCRIPT_CHARSET: &str = "utf-8";

/// Public path prefix the widget bundles are served under.
pub const PUBLIC_PATH: &str = "_next";
/// Directory (below [`PUBLIC_PATH`]) holding one `<name>/index.js` per widget.
pub const WIDGET_BUNDLE_DIR: &str = "static/widgets";
/// Entry file of a widget bundle.
pub const WIDGET_BUNDLE_ENTRY: &str = "index.js";
/// Async chunk carrying the custom elements polyfill.
pub const POLYFILL_CHUNK: &str = "static/chunks/customElements.js";

/// Feature identity of the custom elements capability.
pub const CUSTOM_ELEMENTS_FEATURE: &str = "custom-elements";
