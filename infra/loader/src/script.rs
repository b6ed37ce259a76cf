//! One-shot injection of an external script reference.

use crate::error::LoadError;
use crate::settle::{Rejection, Settlement, Settler};
use hatch_domain::constants::DEFAULT_SCRIPT_TIMEOUT_MS;
use hatch_host::{NodeId, ScriptHost, ScriptRequest, Timer};
use std::fmt;
use std::rc::Rc;
use std::time::Duration;
use tracing::{debug, instrument, warn};

/// Timeout applied when the caller does not choose one.
pub const DEFAULT_SCRIPT_TIMEOUT: Duration =
    Duration::from_millis(DEFAULT_SCRIPT_TIMEOUT_MS.unsigned_abs());

/// Appends script nodes to the host document and waits for the first of load, error or timeout.
///
/// Clones share the host and the timer.
#[derive(Clone)]
pub struct ScriptInjector {
    host: Rc<dyn ScriptHost>,
    timer: Rc<dyn Timer>,
}

impl ScriptInjector {
    pub fn new(host: impl ScriptHost + 'static, timer: impl Timer + 'static) -> Self {
        Self { host: Rc::new(host), timer: Rc::new(timer) }
    }

    /// Loads `src` once.
    ///
    /// The node is created with `async`, `type="text/javascript"` and `charset="utf-8"` and
    /// appended to the document head. A zero `max_timeout` disables the timeout.
    ///
    /// Whatever the outcome, the node's listeners are detached and the node is removed from the
    /// document before this returns. Dropping the future before it settles does the same.
    ///
    /// # Errors
    /// * [`LoadError::InvalidSource`] if `src` is blank; nothing is injected.
    /// * [`LoadError::ScriptLoadFailed`] if the host reports an error event.
    /// * [`LoadError::ScriptLoadTimeout`] if nothing arrives within `max_timeout`.
    /// * [`LoadError::Host`] if the host refuses the node.
    #[instrument(skip(self))]
    pub async fn load(&self, src: &str, max_timeout: Duration) -> Result<(), LoadError> {
        let src = src.trim();
        if src.is_empty() {
            return Err(LoadError::InvalidSource {
                message: "script source is empty".into(),
                context: None,
            });
        }

        let (settler, settled) = Settler::new();
        let node = self
            .host
            .append_script(&ScriptRequest::new(src), settler.clone())
            .map_err(|e| LoadError::from(e).with_context(src.to_owned()))?;
        let pending = PendingLoad { host: self.host.as_ref(), node, settler, src };
        debug!(%node, "Script injected");

        // A dropped sender means the settler is gone, which cannot happen while `pending` lives.
        let lost = Settlement::Rejected(Rejection::Failed);
        let outcome = if max_timeout.is_zero() {
            settled.await.unwrap_or(lost)
        } else {
            let deadline = self.timer.sleep(max_timeout);
            tokio::select! {
                biased;
                outcome = settled => outcome.unwrap_or(lost),
                () = deadline => {
                    pending.settler.settle(Settlement::Rejected(Rejection::TimedOut));
                    pending.settler.state()
                },
            }
        };
        drop(pending);

        match outcome {
            Settlement::Resolved => {
                debug!("Script loaded");
                Ok(())
            },
            Settlement::Rejected(Rejection::TimedOut) => {
                warn!("Script load timed out");
                Err(LoadError::ScriptLoadTimeout { src: src.to_owned(), context: None })
            },
            Settlement::Rejected(Rejection::Failed) | Settlement::Pending => {
                warn!("Script load failed");
                Err(LoadError::ScriptLoadFailed { src: src.to_owned(), context: None })
            },
        }
    }
}

impl fmt::Debug for ScriptInjector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ScriptInjector").finish_non_exhaustive()
    }
}

/// A script node between injection and settlement. Dropping it detaches and removes the node.
struct PendingLoad<'a> {
    host: &'a dyn ScriptHost,
    node: NodeId,
    settler: Rc<Settler>,
    src: &'a str,
}

impl Drop for PendingLoad<'_> {
    fn drop(&mut self) {
        if !self.settler.state().is_settled() {
            debug!(src = self.src, node = %self.node, "Script load abandoned before settling");
        }
        self.host.detach_listener(self.node);
        if let Err(e) = self.host.remove_script(self.node) {
            warn!(src = self.src, node = %self.node, error = %e, "Failed to remove script node");
        }
    }
}
