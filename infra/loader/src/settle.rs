//! Single-fulfillment settlement of one in-flight load.

use hatch_host::{ScriptEvent, ScriptListener};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;
use tokio::sync::oneshot;
use tracing::trace;

/// Why a load was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    Failed,
    TimedOut,
}

/// State of a [`Settler`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Settlement {
    Pending,
    Resolved,
    Rejected(Rejection),
}

impl Settlement {
    #[must_use]
    pub const fn is_settled(self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl From<ScriptEvent> for Settlement {
    fn from(event: ScriptEvent) -> Self {
        match event {
            ScriptEvent::Load => Self::Resolved,
            ScriptEvent::Error => Self::Rejected(Rejection::Failed),
        }
    }
}

/// Cell that moves from [`Settlement::Pending`] to a final state exactly once.
///
/// Host listeners, the timeout branch and the awaiting caller all share one settler. The first
/// call to [`Settler::settle`] wins and wakes the caller; every later call is ignored.
pub struct Settler {
    state: Cell<Settlement>,
    notify: RefCell<Option<oneshot::Sender<Settlement>>>,
}

impl Settler {
    /// Creates a pending settler and the receiver that observes its outcome.
    #[must_use]
    pub fn new() -> (Rc<Self>, oneshot::Receiver<Settlement>) {
        let (tx, rx) = oneshot::channel();
        let settler =
            Rc::new(Self { state: Cell::new(Settlement::Pending), notify: RefCell::new(Some(tx)) });
        (settler, rx)
    }

    /// Records `outcome` if nothing was recorded yet.
    ///
    /// Returns `true` when this call settled the cell. [`Settlement::Pending`] is never recorded.
    pub fn settle(&self, outcome: Settlement) -> bool {
        if self.state.get().is_settled() || !outcome.is_settled() {
            return false;
        }
        self.state.set(outcome);
        if let Some(tx) = self.notify.borrow_mut().take() {
            // The receiver may be gone if the caller stopped waiting.
            let _ = tx.send(outcome);
        }
        true
    }

    #[must_use]
    pub fn state(&self) -> Settlement {
        self.state.get()
    }
}

impl ScriptListener for Settler {
    fn on_event(&self, event: ScriptEvent) {
        if !self.settle(event.into()) {
            trace!(?event, state = ?self.state(), "Late script event ignored");
        }
    }
}

impl fmt::Debug for Settler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Settler").field("state", &self.state.get()).finish_non_exhaustive()
    }
}
