//! The local channel pair.
//!
//! [`LocalChannel::pair`] builds two coupled endpoints. A message written
//! on one handle lands in the *other* endpoint's mailbox, or goes straight
//! to a receiver already waiting there. Only stream handles pass through
//! the mailbox; payload bytes flow through each message's own pipe.

mod endpoint;
mod mailbox;
mod receiver;

pub(crate) use endpoint::Endpoint;
pub use receiver::{Delivery, FnReceiver, Receiver, receiver_fn};

use std::fmt;
use std::sync::Arc;

use futures::channel::oneshot;

use crate::attachments::Attachments;
use crate::closeable::Closed;
use crate::config::ChannelConfig;
use crate::connection::{Connection, ConnectionContext};
use crate::error::Result;
use crate::executor::Executor;
use crate::interrupt::Interrupt;
use crate::message::MessageWriter;
use crate::option::ChannelOption;
use endpoint::Dispatch;

/// Handle to one side of a local channel pair.
///
/// Cloning is cheap and yields another handle to the same side.
#[derive(Clone)]
pub struct LocalChannel {
    local: Arc<Endpoint>,
    remote: Arc<Endpoint>,
}

impl LocalChannel {
    /// Creates both sides of a channel, sharing one connection context.
    pub fn pair(
        config: ChannelConfig,
        executor: Arc<dyn Executor>,
        context: Arc<dyn ConnectionContext>,
    ) -> (LocalChannel, LocalChannel) {
        Self::pair_with_contexts(config, executor, Arc::clone(&context), context)
    }

    /// Creates both sides of a channel with a connection context per side.
    pub fn pair_with_contexts(
        config: ChannelConfig,
        executor: Arc<dyn Executor>,
        first: Arc<dyn ConnectionContext>,
        second: Arc<dyn ConnectionContext>,
    ) -> (LocalChannel, LocalChannel) {
        let a = Arc::new(Endpoint::new(config, Arc::clone(&executor), first));
        let b = Arc::new(Endpoint::new(config, executor, second));
        log::debug!("Created local channel pair {} <-> {}", a.id, b.id);
        (
            LocalChannel {
                local: Arc::clone(&a),
                remote: Arc::clone(&b),
            },
            LocalChannel { local: b, remote: a },
        )
    }

    /// The handle of the paired endpoint.
    pub fn other_side(&self) -> LocalChannel {
        LocalChannel {
            local: Arc::clone(&self.remote),
            remote: Arc::clone(&self.local),
        }
    }

    /// Starts a new outbound message.
    ///
    /// Blocks while the peer's mailbox is full. Fails with
    /// [`Error::NotOpen`](crate::Error::NotOpen) once the peer is closed.
    /// Takes the peer's lock and nothing else.
    pub fn write_message(&self) -> Result<MessageWriter> {
        self.write_message_inner(None)
    }

    /// Like [`write_message`](Self::write_message), but a blocked wait fails with
    /// [`Error::Interrupted`](crate::Error::Interrupted) when `interrupt` is set.
    pub fn write_message_interruptibly(&self, interrupt: &Interrupt) -> Result<MessageWriter> {
        self.write_message_inner(Some(interrupt))
    }

    fn write_message_inner(&self, interrupt: Option<&Interrupt>) -> Result<MessageWriter> {
        let (writer, handoff) = self.remote.deliver(self.local.config.buffer_size, interrupt)?;
        if let Some(dispatch) = handoff {
            self.other_side().dispatch(dispatch);
        }
        Ok(writer)
    }

    /// Stops writes towards the peer. The peer still drains what is
    /// queued, then sees end-of-stream. Never blocks, idempotent.
    pub fn write_shutdown(&self) {
        if let Some(dispatch) = self.remote.shut_down() {
            self.other_side().dispatch(dispatch);
        }
    }

    /// Registers `receiver` for the next inbound message or end-of-stream.
    ///
    /// Never blocks. Fails with [`Error::AlreadyWaiting`](crate::Error::AlreadyWaiting)
    /// if a receiver is already pending on this side; the pending one is kept.
    pub fn receive_message<R: Receiver>(&self, receiver: R) -> Result<()> {
        if let Some(dispatch) = self.local.register(Box::new(receiver))? {
            self.dispatch(dispatch);
        }
        Ok(())
    }

    /// Closes this side. The first call closes the endpoint, reports the
    /// closure to the peer's connection context and runs close handlers;
    /// later calls do nothing. Messages already queued on the peer are not
    /// affected.
    pub fn close(&self) {
        if !self.local.close.begin() {
            return;
        }
        self.local.close_local();
        log::debug!("Endpoint {}: closed", self.local.id);
        self.remote.context.remote_closed();
        for handler in self.local.close.complete() {
            self.run_close_handler(handler);
        }
    }

    /// Whether [`close`](Self::close) has not been called on this side.
    pub fn is_open(&self) -> bool {
        self.local.close.is_open()
    }

    /// Runs `handler` on the dispatcher once this side has closed, or right
    /// away if it already has.
    pub fn add_close_handler<F>(&self, handler: F)
    where
        F: FnOnce(&LocalChannel) + Send + 'static,
    {
        if let Some(handler) = self.local.close.add(Box::new(handler)) {
            self.run_close_handler(handler);
        }
    }

    /// Blocks until this side has completed its close.
    pub fn await_closed(&self) {
        self.local.close.wait();
    }

    /// A future resolving when this side has completed its close.
    pub fn closed(&self) -> Closed {
        let (tx, rx) = oneshot::channel();
        self.add_close_handler(move |_| {
            let _ = tx.send(());
        });
        Closed::new(rx)
    }

    /// Always `false`: local channels recognise no options.
    pub fn supports_option<T>(&self, _option: &ChannelOption<T>) -> bool {
        false
    }

    /// Always `None`.
    pub fn get_option<T>(&self, _option: &ChannelOption<T>) -> Option<T> {
        None
    }

    /// Options are not configurable; the value is discarded.
    pub fn set_option<T>(&self, _option: &ChannelOption<T>, _value: T) -> Option<T> {
        None
    }

    /// Attachments of this side, independent of the peer's.
    pub fn attachments(&self) -> &Attachments {
        &self.local.attachments
    }

    /// The connection this side belongs to.
    pub fn connection(&self) -> Arc<dyn Connection> {
        self.local.context.connection()
    }

    /// Configuration the pair was built with.
    pub fn config(&self) -> &ChannelConfig {
        &self.local.config
    }

    fn dispatch(&self, dispatch: Dispatch) {
        let channel = self.clone();
        self.local.executor.execute(Box::new(move || match dispatch {
            Dispatch::Message(receiver, message) => receiver.handle_message(&channel, message),
            Dispatch::End(receiver) => receiver.handle_end(&channel),
        }));
    }

    fn run_close_handler(&self, handler: crate::closeable::CloseHandler) {
        let channel = self.clone();
        self.local.executor.execute(Box::new(move || handler(&channel)));
    }
}

impl fmt::Debug for LocalChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalChannel")
            .field("local", &self.local.id)
            .field("remote", &self.remote.id)
            .finish()
    }
}
