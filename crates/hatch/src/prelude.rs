//! Common imports for embedding hosts.

pub use crate::page::{BootstrapReport, Page, WidgetClass, custom_elements_capability};
pub use hatch_domain::config::HatchConfig;
pub use hatch_domain::widget::WidgetConfig;
pub use hatch_element::{
    DefineOutcome, ElementBridge, ElementClass, ElementError, MountOutcome, MountProps, Phase,
    RenderCapability, RenderExports, WidgetElement,
};
pub use hatch_host::{ElementHost, ScriptHost, TagRegistry, Timer};
pub use hatch_loader::{FeatureDescriptor, FeatureLoader, LoadError, ScriptInjector};
