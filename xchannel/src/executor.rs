//! Dispatchers that run receiver callbacks off the calling thread.
//!
//! The channel never invokes user code inline: every message or
//! end-of-stream delivery is packaged as a [`Task`] and handed to an
//! [`Executor`], so no endpoint lock is held while a handler runs.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::thread;

use tokio::runtime::Handle;

/// A one-shot unit of work.
pub type Task = Box<dyn FnOnce() + Send + 'static>;

/// Runs receiver and close-handler callbacks.
pub trait Executor: Send + Sync {
    /// Runs `task` asynchronously. Must not run it on the calling thread.
    fn execute(&self, task: Task);
}

impl<E: Executor + ?Sized> Executor for Arc<E> {
    fn execute(&self, task: Task) {
        (**self).execute(task)
    }
}

/// Spawns a dedicated OS thread per task.
#[derive(Debug, Default)]
pub struct ThreadExecutor {
    spawned: AtomicU64,
}

impl ThreadExecutor {
    /// Creates an executor with a zeroed thread counter.
    pub fn new() -> Self {
        Self::default()
    }
}

impl Executor for ThreadExecutor {
    fn execute(&self, task: Task) {
        let id = self.spawned.fetch_add(1, Ordering::Relaxed);
        let spawned = thread::Builder::new()
            .name(format!("xchannel-task-{}", id))
            .spawn(task);
        if let Err(e) = spawned {
            log::error!("Failed to spawn dispatcher thread: {}", e);
        }
    }
}

/// Runs tasks on a tokio runtime's blocking pool.
///
/// Handlers usually read message streams with blocking I/O, so tasks go
/// through `spawn_blocking` rather than onto the async workers.
#[derive(Debug, Clone)]
pub struct TokioExecutor {
    handle: Handle,
}

impl TokioExecutor {
    /// Spawns onto the runtime behind `handle`.
    pub fn new(handle: Handle) -> Self {
        Self { handle }
    }

    /// Uses the runtime of the calling context.
    ///
    /// # Panics
    ///
    /// Panics when called outside a tokio runtime.
    pub fn current() -> Self {
        Self::new(Handle::current())
    }
}

impl Executor for TokioExecutor {
    fn execute(&self, task: Task) {
        drop(self.handle.spawn_blocking(task));
    }
}
