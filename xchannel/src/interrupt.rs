//! Interruption of blocked writers.
//!
//! A writer blocked on a full mailbox normally waits until space frees up
//! or the peer shuts down. An [`Interrupt`] lets another thread abort that
//! wait: the write fails with [`Error::Interrupted`](crate::Error::Interrupted)
//! and the token stays set until [`Interrupt::clear`] is called.
//!
//! Clones share one token, so a single [`Interrupt::interrupt`] aborts
//! every writer blocked under any of them.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;

use crate::channel::Endpoint;

#[derive(Default)]
struct Inner {
    interrupted: AtomicBool,
    /// One entry per writer currently blocked under this token.
    parked_on: Mutex<Vec<Arc<Endpoint>>>,
}

/// Cloneable token that aborts blocked
/// [`write_message_interruptibly`](crate::LocalChannel::write_message_interruptibly) calls.
#[derive(Clone, Default)]
pub struct Interrupt {
    inner: Arc<Inner>,
}

impl Interrupt {
    /// Creates a token that is not set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the token and wakes every writer blocked under it.
    pub fn interrupt(&self) {
        self.inner.interrupted.store(true, Ordering::SeqCst);
        // Clone out so the token lock is released before taking endpoint locks.
        let parked = self.inner.parked_on.lock().clone();
        for endpoint in parked {
            endpoint.wake_all_writers();
        }
    }

    /// Whether the token is set.
    pub fn is_interrupted(&self) -> bool {
        self.inner.interrupted.load(Ordering::SeqCst)
    }

    /// Clears the token, returning whether it was set.
    pub fn clear(&self) -> bool {
        self.inner.interrupted.swap(false, Ordering::SeqCst)
    }

    /// Called with the endpoint lock held, before checking the flag.
    pub(crate) fn park(&self, endpoint: &Arc<Endpoint>) {
        self.inner.parked_on.lock().push(Arc::clone(endpoint));
    }

    /// Drops one registration for `endpoint`, leaving other writers parked.
    pub(crate) fn unpark(&self, endpoint: &Arc<Endpoint>) {
        let mut parked = self.inner.parked_on.lock();
        if let Some(pos) = parked.iter().position(|e| Arc::ptr_eq(e, endpoint)) {
            parked.swap_remove(pos);
        }
    }

    #[cfg(test)]
    pub(crate) fn parked(&self) -> usize {
        self.inner.parked_on.lock().len()
    }
}

impl std::fmt::Debug for Interrupt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Interrupt")
            .field("interrupted", &self.is_interrupted())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flag_is_sticky_until_cleared() {
        let token = Interrupt::new();
        assert!(!token.is_interrupted());

        token.interrupt();
        let clone = token.clone();
        assert!(clone.is_interrupted());

        assert!(clone.clear());
        assert!(!token.is_interrupted());
        assert!(!token.clear());
    }
}
