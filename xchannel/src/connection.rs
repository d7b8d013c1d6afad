//! Connection context collaborators.
//!
//! A channel pair belongs to a connection owned by the surrounding
//! framework. The channel only needs two things from it: the connection
//! handle itself and a hook to report that a remote side has closed.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

/// The connection that owns a channel pair.
pub trait Connection: Send + Sync + fmt::Debug {
    /// Human-readable name, used in logs.
    fn name(&self) -> &str;
}

/// The framework-side hooks a channel pair reports to.
pub trait ConnectionContext: Send + Sync {
    /// The connection owning the channel.
    fn connection(&self) -> Arc<dyn Connection>;

    /// Called once for each endpoint whose peer completed a full close.
    fn remote_closed(&self);
}

/// A named in-process connection.
#[derive(Debug, Clone)]
pub struct LocalConnection {
    name: String,
}

impl LocalConnection {
    /// Creates a connection called `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Connection for LocalConnection {
    fn name(&self) -> &str {
        &self.name
    }
}

/// Context for a [`LocalConnection`], counting remote-close notifications.
#[derive(Debug)]
pub struct LocalConnectionContext {
    connection: Arc<LocalConnection>,
    remote_closed: AtomicUsize,
}

impl LocalConnectionContext {
    /// Wraps `connection` with a zeroed counter.
    pub fn new(connection: LocalConnection) -> Self {
        Self {
            connection: Arc::new(connection),
            remote_closed: AtomicUsize::new(0),
        }
    }

    /// How many remote-close notifications arrived so far.
    pub fn remote_closed_count(&self) -> usize {
        self.remote_closed.load(Ordering::Acquire)
    }
}

impl ConnectionContext for LocalConnectionContext {
    fn connection(&self) -> Arc<dyn Connection> {
        self.connection.clone()
    }

    fn remote_closed(&self) {
        let count = self.remote_closed.fetch_add(1, Ordering::AcqRel) + 1;
        log::debug!(
            "Remote side closed on connection {} ({} notifications)",
            self.connection.name(),
            count
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_context_counts_remote_closed() {
        let context = LocalConnectionContext::new(LocalConnection::new("loopback"));
        assert_eq!(context.connection().name(), "loopback");
        assert_eq!(context.remote_closed_count(), 0);

        context.remote_closed();
        context.remote_closed();
        assert_eq!(context.remote_closed_count(), 2);
    }
}
