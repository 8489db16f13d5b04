use std::sync::Arc;
use tokio::sync::watch;

use crate::backend::BackendHandle;

/// ReadinessGate
///
/// One-shot publication point for the backend handle. The initializer publishes the handle
/// once; any number of consumers wait for it. Waiters that arrive before the publication
/// and waiters that arrive after it observe the same handle, and each is woken exactly once.
///
/// There is no timeout. If initialization never publishes, `await_ready` never returns.
#[derive(Clone)]
pub struct ReadinessGate {
    slot: Arc<watch::Sender<Option<BackendHandle>>>,
}

impl Default for ReadinessGate {
    fn default() -> Self {
        Self::new()
    }
}

impl ReadinessGate {
    pub fn new() -> Self {
        let (slot, _) = watch::channel(None);
        Self {
            slot: Arc::new(slot),
        }
    }

    /// A gate that is open from the start. Used by tests and by callers that construct the
    /// backend synchronously.
    pub fn ready(handle: BackendHandle) -> Self {
        let gate = Self::new();
        gate.publish(handle);
        gate
    }

    /// Publishes the handle. Only the first publication counts; later ones return `false`
    /// and leave the stored handle untouched.
    pub fn publish(&self, handle: BackendHandle) -> bool {
        self.slot.send_if_modified(|slot| {
            if slot.is_some() {
                return false;
            }
            *slot = Some(handle);
            true
        })
    }

    /// The handle, if it has been published already.
    pub fn try_get(&self) -> Option<BackendHandle> {
        self.slot.borrow().clone()
    }

    pub fn is_ready(&self) -> bool {
        self.slot.borrow().is_some()
    }

    /// await_ready
    ///
    /// Resolves immediately when the handle exists, otherwise suspends until it is published.
    pub async fn await_ready(&self) -> BackendHandle {
        let mut rx = self.slot.subscribe();
        let handle = match rx.wait_for(Option::is_some).await {
            Ok(slot) => slot.clone(),
            // The sender lives as long as `self`, so the channel cannot close under us.
            Err(_) => None,
        };

        match handle {
            Some(handle) => handle,
            None => std::future::pending().await,
        }
    }
}
