//! Facade crate for hatch: lazily loaded widgets bridged into custom elements.
//! Re-exports the workspace crates and hosts the page bootstrap.
//! Keep this crate thin: it composes the other crates, it does not implement lifecycle logic.
//!
//! ## Usage
//! - Describe the page in a [`domain::config::HatchConfig`].
//! - Build a [`Page`] over a host backend and call [`Page::bootstrap`] once.
//! - Hand host elements to the registered [`element::ElementClass`] and drive `connect` /
//!   `disconnect` from the host's lifecycle callbacks.

pub mod page;
pub mod prelude;

pub use hatch_domain as domain;
pub use hatch_element as element;
pub use hatch_host as host;
pub use hatch_kernel as kernel;
pub use hatch_loader as loader;

pub use crate::page::{BootstrapReport, Page, WidgetClass, WidgetFailure, custom_elements_capability};
