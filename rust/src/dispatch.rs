use flume::{Receiver, Sender};

use crate::actions::Action;

/// Cloneable handle for sending actions into the store.
#[derive(Debug, Clone)]
pub struct ActionDispatch {
    tx: Sender<Action>,
}

impl ActionDispatch {
    pub fn new(tx: Sender<Action>) -> Self {
        Self { tx }
    }

    /// Unbounded dispatch channel. The receiver belongs to the store (or to a
    /// test that wants to observe what handlers dispatch).
    pub fn channel() -> (Self, Receiver<Action>) {
        let (tx, rx) = flume::unbounded();
        (Self::new(tx), rx)
    }

    /// Never blocks. Returns false once the store is gone.
    pub fn dispatch(&self, action: impl Into<Action>) -> bool {
        let action = action.into();
        let tag = action.tag();
        match self.tx.send(action) {
            Ok(()) => true,
            Err(_) => {
                tracing::debug!(action = tag, "dispatch after store shutdown");
                false
            }
        }
    }
}
