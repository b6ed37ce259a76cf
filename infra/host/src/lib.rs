//! # Host
//!
//! The platform contract the loader and the element bridge are written against.
//!
//! A host provides four things:
//! * a document head that accepts external script references ([`ScriptHost`]),
//! * a custom element registry ([`TagRegistry`]),
//! * attribute access on element instances ([`ElementHost`]),
//! * one-shot timers ([`Timer`]).
//!
//! Two backends ship with the crate. The [`memory`] backend keeps everything in process and
//! simulates script fetches, which is what tests and the demo binary run on. The `web` backend
//! (wasm32 only) drives the real DOM through `web-sys`.
//!
//! Everything here is single-threaded: handles are `Rc`-shared and futures are `!Send`.

mod document;
mod error;
pub mod memory;
mod registry;
mod timer;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use crate::document::{NodeId, ScriptEvent, ScriptHost, ScriptListener, ScriptRequest};
pub use crate::error::HostError;
pub use crate::memory::{MemoryDocument, MemoryElement, MemoryTagRegistry, Route};
pub use crate::registry::{ElementHost, TagRegistry};
#[cfg(not(target_arch = "wasm32"))]
pub use crate::timer::TokioTimer;
pub use crate::timer::Timer;
