//! Close lifecycle of an endpoint: one close action, then completion
//! observers.

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::channel::oneshot;
use parking_lot::{Condvar, Mutex};

use crate::channel::LocalChannel;

pub(crate) type CloseHandler = Box<dyn FnOnce(&LocalChannel) + Send + 'static>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Open,
    Closing,
    Closed,
}

struct Inner {
    phase: Phase,
    handlers: Vec<CloseHandler>,
}

pub(crate) struct CloseState {
    inner: Mutex<Inner>,
    done: Condvar,
}

impl CloseState {
    pub(crate) fn new() -> Self {
        Self {
            inner: Mutex::new(Inner {
                phase: Phase::Open,
                handlers: Vec::new(),
            }),
            done: Condvar::new(),
        }
    }

    pub(crate) fn is_open(&self) -> bool {
        self.inner.lock().phase == Phase::Open
    }

    /// Moves to `Closing`. Only the first caller gets `true` and runs the close action.
    pub(crate) fn begin(&self) -> bool {
        let mut inner = self.inner.lock();
        if inner.phase != Phase::Open {
            return false;
        }
        inner.phase = Phase::Closing;
        true
    }

    /// Marks close complete, wakes waiters and hands back the registered handlers.
    pub(crate) fn complete(&self) -> Vec<CloseHandler> {
        let mut inner = self.inner.lock();
        inner.phase = Phase::Closed;
        self.done.notify_all();
        std::mem::take(&mut inner.handlers)
    }

    /// Registers `handler`, or returns it if close already completed.
    pub(crate) fn add(&self, handler: CloseHandler) -> Option<CloseHandler> {
        let mut inner = self.inner.lock();
        if inner.phase == Phase::Closed {
            return Some(handler);
        }
        inner.handlers.push(handler);
        None
    }

    pub(crate) fn wait(&self) {
        let mut inner = self.inner.lock();
        while inner.phase != Phase::Closed {
            self.done.wait(&mut inner);
        }
    }
}

/// Resolves once the endpoint it was obtained from has completed its close.
#[derive(Debug)]
#[must_use = "futures do nothing unless polled"]
pub struct Closed {
    rx: oneshot::Receiver<()>,
}

impl Closed {
    pub(crate) fn new(rx: oneshot::Receiver<()>) -> Self {
        Self { rx }
    }
}

impl Future for Closed {
    type Output = ();

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<()> {
        // A dropped sender means the endpoint went away, which also ends its life.
        Pin::new(&mut self.rx).poll(cx).map(|_| ())
    }
}
