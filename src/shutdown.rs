//! Shutdown signalling for the long-lived loops.
//!
//! A zero-capacity `crossbeam` channel that never carries a message: the
//! trigger side is dropped (or fired) to disconnect it, which wakes every
//! listener blocked in [`ShutdownListener::sleep`] at once.

use core::time::Duration;

use crossbeam::channel::{self, Receiver, RecvTimeoutError, Sender};

/// Owned by the system; firing or dropping it stops every listener.
#[derive(Debug)]
pub struct ShutdownTrigger {
    tx: Option<Sender<()>>,
}

impl ShutdownTrigger {
    pub fn fire(&mut self) {
        self.tx.take();
    }
}

/// Cloned into each loop.
#[derive(Debug, Clone)]
pub struct ShutdownListener {
    rx: Receiver<()>,
}

impl ShutdownListener {
    /// Wait up to `period`. Returns `true` if shutdown was signalled.
    pub fn sleep(&self, period: Duration) -> bool {
        match self.rx.recv_timeout(period) {
            Err(RecvTimeoutError::Timeout) => false,
            // Nobody sends, so any wake-up other than a timeout is shutdown.
            Ok(()) | Err(RecvTimeoutError::Disconnected) => true,
        }
    }
}

pub fn shutdown_channel() -> (ShutdownTrigger, ShutdownListener) {
    let (tx, rx) = channel::bounded(0);
    (ShutdownTrigger { tx: Some(tx) }, ShutdownListener { rx })
}
