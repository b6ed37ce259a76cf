//! # Element
//!
//! Bridges lazily loaded widgets into custom element lifecycles.
//!
//! * [`ElementBridge::define`] validates the tag, waits for the custom element capability (the
//!   tag registry itself, possibly polyfilled) and only then builds and registers the element
//!   class.
//! * [`WidgetElement`] runs one instance through connect, module load, mount, disconnect and
//!   unmount. A disconnect while the module is loading aborts the load; a mount never happens
//!   after the instance has left the document.
//! * [`ModuleLoader`] and [`RenderCapability`] are what a widget supplies. [`ScriptModule`]
//!   loads a widget bundle that publishes its render capability into [`RenderExports`].

pub mod bridge;
mod error;
pub mod lifecycle;
pub mod module;
pub mod render;
pub mod token;

pub use crate::bridge::{CapabilityReady, DefineOutcome, Definition, ElementBridge, ElementClass};
pub use crate::error::ElementError;
pub use crate::lifecycle::{MountOutcome, MountTask, Phase, WidgetElement};
pub use crate::module::{ModuleLoader, RenderExports, ScriptModule};
pub use crate::render::{MountProps, RenderCapability};
pub use crate::token::{DisconnectSignal, DisconnectToken};
