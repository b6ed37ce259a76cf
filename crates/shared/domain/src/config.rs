use crate::constants::{DEFAULT_SCRIPT_TIMEOUT_MS, LOCATION_ATTRIBUTE, POLYFILL_CHUNK};
use crate::widget::{WidgetConfig, public_asset};
use serde::Deserialize;
use std::ops::{Deref, DerefMut};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Top-level configuration of an embedding page.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HatchConfigInner {
    pub loader: LoaderConfig,
    pub elements: ElementsConfig,
    pub public: PublicConfig,
    pub logging: LoggingConfig,
    pub widgets: Vec<WidgetConfig>,
}

/// Thin Arc-wrapped config for inexpensive cloning into subsystems.
#[derive(Default, Debug, Clone, Deserialize)]
pub struct HatchConfig {
    #[serde(flatten, default)]
    inner: Arc<HatchConfigInner>,
}

impl Deref for HatchConfig {
    type Target = HatchConfigInner;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl DerefMut for HatchConfig {
    fn deref_mut(&mut self) -> &mut HatchConfigInner {
        Arc::make_mut(&mut self.inner)
    }
}

impl HatchConfig {
    /// URL of the custom elements polyfill, either explicit or derived from the public base URL.
    #[must_use]
    pub fn polyfill_src(&self) -> String {
        self.elements
            .polyfill_src
            .clone()
            .unwrap_or_else(|| public_asset(&self.public.base_url, POLYFILL_CHUNK))
    }
}

/// Script injection settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// `<= 0` disables the timeout.
    pub script_timeout_ms: i64,
}

impl LoaderConfig {
    /// The effective timeout; [`Duration::ZERO`] means disabled.
    #[must_use]
    pub fn script_timeout(&self) -> Duration {
        u64::try_from(self.script_timeout_ms).map_or(Duration::ZERO, Duration::from_millis)
    }
}

/// Custom element settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ElementsConfig {
    pub polyfill_src: Option<String>,
    pub location_attribute: String,
}

/// Where the widget bundles are published.
#[derive(Default, Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PublicConfig {
    pub base_url: String,
}

/// Log output settings, consumed by the logger builder.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub console: bool,
    pub path: Option<PathBuf>,
    pub json: bool,
    pub max_files: usize,
    pub env_filter: Option<String>,
}

// --- Default ---

impl Default for LoaderConfig {
    fn default() -> Self {
        Self { script_timeout_ms: DEFAULT_SCRIPT_TIMEOUT_MS }
    }
}

impl Default for ElementsConfig {
    fn default() -> Self {
        Self { polyfill_src: None, location_attribute: LOCATION_ATTRIBUTE.to_owned() }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_owned(),
            console: true,
            path: None,
            json: false,
            max_files: 10,
            env_filter: None,
        }
    }
}
