//! # Loader
//!
//! Lazy acquisition of optional capabilities.
//!
//! * [`ScriptInjector`] appends one external script to the host document and settles exactly
//!   once from load, error or timeout. The node never outlives the settlement.
//! * [`FeatureLoader`] checks whether a capability is present, acquires it through a script or a
//!   caller-supplied loader when it is not, and checks again.
//!
//! ## Example
//!
//! ```rust
//! # use hatch_host::{MemoryDocument, Route, TokioTimer};
//! # use hatch_loader::{FeatureDescriptor, FeatureLoader, ScriptInjector};
//! # use std::{cell::Cell, rc::Rc};
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), hatch_loader::LoadError> {
//! let document = MemoryDocument::new();
//! let installed = Rc::new(Cell::new(false));
//!
//! let flag = Rc::clone(&installed);
//! document.route("/polyfill.js", Route::load_with(move || flag.set(true)));
//!
//! let loader = FeatureLoader::new(ScriptInjector::new(document.clone(), TokioTimer));
//! let present = Rc::clone(&installed);
//! let feature = FeatureDescriptor::builder("polyfill")
//!     .check(move || present.get().then_some(()))
//!     .script("/polyfill.js")
//!     .build();
//!
//! loader.ensure(&feature).await?;
//! assert!(!document.is_attached("/polyfill.js"));
//! # Ok(())
//! # }
//! ```

mod error;
pub mod feature;
pub mod script;
pub mod settle;

pub use crate::error::LoadError;
pub use crate::feature::{FeatureBuilder, FeatureDescriptor, FeatureLoader};
pub use crate::script::{DEFAULT_SCRIPT_TIMEOUT, ScriptInjector};
pub use crate::settle::{Rejection, Settlement, Settler};
