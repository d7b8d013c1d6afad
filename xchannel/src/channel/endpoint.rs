//! State owned by one half of a local channel pair.
//!
//! Every method here takes exactly one lock: this endpoint's. The write
//! path runs on the *peer's* endpoint (the writer targets the other
//! side's mailbox), while receive, shutdown and close run on the
//! endpoint's own. Since no path ever holds two endpoint locks, the pair
//! cannot deadlock. Keep it that way when changing anything below.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use parking_lot::{Condvar, Mutex};

use super::Receiver;
use super::mailbox::Mailbox;
use crate::attachments::Attachments;
use crate::closeable::CloseState;
use crate::config::ChannelConfig;
use crate::connection::ConnectionContext;
use crate::error::{Error, Result};
use crate::executor::Executor;
use crate::interrupt::Interrupt;
use crate::message::{self, MessageReader, MessageWriter};

static NEXT_ENDPOINT_ID: AtomicU64 = AtomicU64::new(1);

/// Work to hand to the dispatcher once the endpoint lock is released.
pub(crate) enum Dispatch {
    Message(Box<dyn Receiver>, MessageReader),
    End(Box<dyn Receiver>),
}

struct EndpointState {
    mailbox: Mailbox,
    /// Only populated while `mailbox` is empty.
    receiver: Option<Box<dyn Receiver>>,
    /// Set once, never cleared.
    closed: bool,
}

pub(crate) struct Endpoint {
    pub(crate) id: u64,
    state: Mutex<EndpointState>,
    /// Writers blocked on a full mailbox wait here.
    writers: Condvar,
    pub(crate) config: ChannelConfig,
    pub(crate) executor: Arc<dyn Executor>,
    pub(crate) context: Arc<dyn ConnectionContext>,
    pub(crate) attachments: Attachments,
    pub(crate) close: CloseState,
}

impl Endpoint {
    pub(crate) fn new(
        config: ChannelConfig,
        executor: Arc<dyn Executor>,
        context: Arc<dyn ConnectionContext>,
    ) -> Self {
        Self {
            id: NEXT_ENDPOINT_ID.fetch_add(1, Ordering::Relaxed),
            state: Mutex::new(EndpointState {
                mailbox: Mailbox::new(config.queue_length),
                receiver: None,
                closed: false,
            }),
            writers: Condvar::new(),
            config,
            executor,
            context,
            attachments: Attachments::new(),
            close: CloseState::new(),
        }
    }

    /// Write path, invoked by the peer. Blocks while the mailbox is full.
    ///
    /// On success the new message either went straight to the pending
    /// receiver (returned as a [`Dispatch`]) or was queued.
    pub(crate) fn deliver(
        self: &Arc<Self>,
        buffer_size: usize,
        interrupt: Option<&Interrupt>,
    ) -> Result<(MessageWriter, Option<Dispatch>)> {
        let mut state = self.state.lock();
        loop {
            if state.closed {
                return Err(Error::NotOpen);
            }
            if !state.mailbox.is_full() {
                break;
            }
            if let Some(token) = interrupt {
                token.park(self);
                if token.is_interrupted() {
                    token.unpark(self);
                    return Err(Error::Interrupted);
                }
            }
            self.writers.wait(&mut state);
            if let Some(token) = interrupt {
                token.unpark(self);
                if token.is_interrupted() {
                    // The wakeup may have been meant for a slot; pass it on.
                    self.writers.notify_one();
                    return Err(Error::Interrupted);
                }
            }
        }

        let (writer, reader) = message::stream_pair(buffer_size);
        // Direct handoff only into an empty mailbox, so queued messages keep their order.
        if state.mailbox.is_empty() {
            if let Some(receiver) = state.receiver.take() {
                self.writers.notify_one();
                log::trace!("Endpoint {}: message handed to waiting receiver", self.id);
                return Ok((writer, Some(Dispatch::Message(receiver, reader))));
            }
        }
        state.mailbox.push(reader);
        self.writers.notify_one();
        log::trace!(
            "Endpoint {}: message queued ({}/{})",
            self.id,
            state.mailbox.len(),
            state.mailbox.capacity()
        );
        Ok((writer, None))
    }

    /// Receive path. Queued messages are drained before end-of-stream is reported.
    pub(crate) fn register(&self, receiver: Box<dyn Receiver>) -> Result<Option<Dispatch>> {
        let mut state = self.state.lock();
        if state.receiver.is_some() {
            return Err(Error::AlreadyWaiting);
        }
        if let Some(message) = state.mailbox.pop() {
            self.writers.notify_one();
            log::trace!(
                "Endpoint {}: dequeued message ({} left)",
                self.id,
                state.mailbox.len()
            );
            return Ok(Some(Dispatch::Message(receiver, message)));
        }
        if state.closed {
            return Ok(Some(Dispatch::End(receiver)));
        }
        state.receiver = Some(receiver);
        self.writers.notify_one();
        Ok(None)
    }

    /// Marks the endpoint closed for writes coming from the peer.
    ///
    /// Returns the end-of-stream delivery for a receiver left waiting on
    /// an empty mailbox. Repeated calls do nothing.
    pub(crate) fn shut_down(&self) -> Option<Dispatch> {
        let mut state = self.state.lock();
        if state.closed {
            return None;
        }
        state.closed = true;
        self.writers.notify_all();
        log::debug!("Endpoint {}: writes shut down", self.id);
        if state.mailbox.is_empty() {
            state.receiver.take().map(Dispatch::End)
        } else {
            None
        }
    }

    /// Close action of a full close: flag and wake every waiter.
    pub(crate) fn close_local(&self) {
        let mut state = self.state.lock();
        state.closed = true;
        self.writers.notify_all();
    }

    pub(crate) fn wake_all_writers(&self) {
        let _state = self.state.lock();
        self.writers.notify_all();
    }

    #[cfg(test)]
    pub(crate) fn queued(&self) -> usize {
        self.state.lock().mailbox.len()
    }

    #[cfg(test)]
    pub(crate) fn has_pending_receiver(&self) -> bool {
        self.state.lock().receiver.is_some()
    }
}
