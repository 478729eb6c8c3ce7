//! Shared refreshing flag written by both the caller and the coordinator

use std::rc::Rc;
use tokio::sync::watch;

/// Cloneable handle to the "is refreshing" flag.
///
/// The coordinator sets it when a refresh is triggered; the caller clears it
/// when its own work is done. Every write is observable through a
/// [`watch::Receiver`] obtained from [`RefreshBinding::subscribe`].
#[derive(Debug, Clone)]
pub struct RefreshBinding {
    tx: Rc<watch::Sender<bool>>,
}

impl RefreshBinding {
    pub fn new(initial: bool) -> Self {
        let (tx, _rx) = watch::channel(initial);
        Self { tx: Rc::new(tx) }
    }

    pub fn get(&self) -> bool {
        *self.tx.borrow()
    }

    pub fn set(&self, value: bool) {
        self.tx.send_replace(value);
    }

    /// Clears the flag; called by the caller when its refresh work completes
    pub fn finish(&self) {
        self.set(false);
    }

    pub fn subscribe(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

impl Default for RefreshBinding {
    fn default() -> Self {
        Self::new(false)
    }
}
