//! # Runtime
//!
//! The event loop natively hosted widgets run on.
//!
//! Element lifecycles share state through `Rc<RefCell<_>>` and their futures are `!Send`, so
//! they run on a current-thread [Tokio](https://tokio.rs) runtime inside a [`LocalSet`]: the
//! native stand-in for the browser's single event loop.
//!
//! ## Example
//!
//! ```rust
//! use hatch_runtime::{RuntimeConfig, run_local};
//! use std::rc::Rc;
//!
//! let shared = Rc::new(41);
//! let answer = run_local(&RuntimeConfig::default(), async move {
//!     let task = tokio::task::spawn_local(async move { *shared + 1 });
//!     task.await.unwrap_or_default()
//! })?;
//! assert_eq!(answer, 42);
//! # Ok::<(), hatch_runtime::RuntimeError>(())
//! ```

use std::borrow::Cow;
use std::future::Future;
use tokio::runtime::{Builder, Runtime};
use tokio::task::LocalSet;
use tracing::debug;

/// Scheduler ticks between polls of external events.
const DEFAULT_EVENT_INTERVAL: u32 = 61;
const DEFAULT_THREAD_NAME: &str = "hatch-loop";

/// Errors raised while building the runtime.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    #[error("Failed to initialize runtime{}: {source}", format_context(.context))]
    Build { source: std::io::Error, context: Option<Cow<'static, str>> },
}

fn format_context(context: &Option<Cow<'static, str>>) -> Cow<'static, str> {
    context.as_ref().map_or(Cow::Borrowed(""), |c| Cow::Owned(format!(" ({c})")))
}

/// Configuration of the event loop.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Name of blocking-pool threads.
    pub thread_name: String,
    pub event_interval: u32,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self { thread_name: DEFAULT_THREAD_NAME.to_owned(), event_interval: DEFAULT_EVENT_INTERVAL }
    }
}

impl RuntimeConfig {
    #[must_use = "Customize the thread name"]
    pub fn with_thread_name(mut self, name: impl Into<String>) -> Self {
        let name = name.into();
        self.thread_name =
            if name.trim().is_empty() { DEFAULT_THREAD_NAME.to_owned() } else { name };
        self
    }

    #[must_use = "Customize how often the scheduler polls for external events"]
    pub fn with_event_interval(mut self, interval: u32) -> Self {
        self.event_interval = interval.max(1);
        self
    }
}

/// Builds a current-thread runtime with the timer driver enabled.
///
/// # Errors
/// Returns [`RuntimeError::Build`] if the OS refuses the runtime's resources.
pub fn build_runtime(config: &RuntimeConfig) -> Result<Runtime, RuntimeError> {
    debug!(config = ?config, "Building current-thread runtime");

    Builder::new_current_thread()
        .thread_name(&config.thread_name)
        .event_interval(config.event_interval.max(1))
        .enable_time()
        .build()
        .map_err(|source| RuntimeError::Build { source, context: Some("current_thread".into()) })
}

/// Runs `future` to completion on a fresh runtime inside a [`LocalSet`], so it may
/// `spawn_local` `!Send` tasks.
///
/// # Errors
/// Returns [`RuntimeError::Build`] if the runtime cannot be created.
pub fn run_local<F: Future>(config: &RuntimeConfig, future: F) -> Result<F::Output, RuntimeError> {
    let runtime = build_runtime(config)?;
    let local = LocalSet::new();
    Ok(local.block_on(&runtime, future))
}
