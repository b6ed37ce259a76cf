//! Disconnect signalling for one connection attempt.

use tokio::sync::watch;

/// Owned by the element while a connection attempt is in flight. Cancelling (or dropping) it
/// tells the matching [`DisconnectSignal`] that the element has left the document.
#[derive(Debug)]
pub struct DisconnectToken {
    tx: watch::Sender<bool>,
}

/// Observer side of a [`DisconnectToken`], carried by the mount task.
#[derive(Debug, Clone)]
pub struct DisconnectSignal {
    rx: watch::Receiver<bool>,
}

impl DisconnectToken {
    #[must_use]
    pub fn new() -> (Self, DisconnectSignal) {
        let (tx, rx) = watch::channel(false);
        (Self { tx }, DisconnectSignal { rx })
    }

    pub fn cancel(&self) {
        self.tx.send_replace(true);
    }
}

impl DisconnectSignal {
    /// `true` once the token was cancelled or dropped.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.rx.borrow() || self.rx.has_changed().is_err()
    }

    /// Resolves when the token is cancelled or dropped.
    pub async fn cancelled(&mut self) {
        // An error means the token is gone, which counts as cancelled.
        let _ = self.rx.wait_for(|cancelled| *cancelled).await;
    }
}
