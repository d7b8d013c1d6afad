//! Channel pair configuration.

use crate::{DEFAULT_BUFFER_SIZE, DEFAULT_QUEUE_LENGTH};

/// Tuning for a local channel pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelConfig {
    /// Maximum number of undelivered messages queued on an endpoint.
    pub queue_length: usize,
    /// Capacity of the byte pipe carrying each message.
    pub buffer_size: usize,
}

impl ChannelConfig {
    /// Defaults: [`DEFAULT_QUEUE_LENGTH`] and [`DEFAULT_BUFFER_SIZE`].
    pub fn new() -> Self {
        Self {
            queue_length: DEFAULT_QUEUE_LENGTH,
            buffer_size: DEFAULT_BUFFER_SIZE,
        }
    }

    /// A mailbox must hold at least one message, otherwise writers could never proceed.
    pub fn with_queue_length(mut self, length: usize) -> Self {
        self.queue_length = length.max(1);
        self
    }

    /// Pipe capacity per message, at least one byte.
    pub fn with_buffer_size(mut self, size: usize) -> Self {
        self.buffer_size = size.max(1);
        self
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self::new()
    }
}
