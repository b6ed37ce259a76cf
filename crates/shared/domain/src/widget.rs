use crate::constants::{PUBLIC_PATH, WIDGET_BUNDLE_DIR, WIDGET_BUNDLE_ENTRY};
use serde::Deserialize;

/// One deployable widget: the directory name it was built from and the tag it registers.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct WidgetConfig {
    pub name: String,
    pub tag: String,
    /// Overrides the conventional bundle location.
    #[serde(default)]
    pub src: Option<String>,
}

impl WidgetConfig {
    pub fn new(name: impl Into<String>, tag: impl Into<String>) -> Self {
        Self { name: name.into(), tag: tag.into(), src: None }
    }

    /// Resolves the bundle URL of this widget against the public base URL.
    ///
    /// `https://cdn.example` + `hello` gives
    /// `https://cdn.example/_next/static/widgets/hello/index.js`.
    #[must_use]
    pub fn bundle_src(&self, base_url: &str) -> String {
        self.src.clone().unwrap_or_else(|| {
            public_asset(base_url, &format!("{WIDGET_BUNDLE_DIR}/{}/{WIDGET_BUNDLE_ENTRY}", self.name))
        })
    }
}

/// Joins `base_url`, the public path and `asset` without doubling slashes.
#[must_use]
pub fn public_asset(base_url: &str, asset: &str) -> String {
    let base = base_url.trim_end_matches('/');
    let asset = asset.trim_start_matches('/');
    format!("{base}/{PUBLIC_PATH}/{asset}")
}
