//! Bounded FIFO of undelivered inbound messages.

use std::collections::VecDeque;

use crate::message::MessageReader;

#[derive(Debug)]
pub(crate) struct Mailbox {
    queue: VecDeque<MessageReader>,
    capacity: usize,
}

impl Mailbox {
    /// Holds at least one message, whatever `capacity` says.
    pub(crate) fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            queue: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.queue.len()
    }

    #[inline]
    pub(crate) fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    #[inline]
    pub(crate) fn is_full(&self) -> bool {
        self.queue.len() >= self.capacity
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.capacity
    }

    /// Callers check [`is_full`](Self::is_full) first.
    pub(crate) fn push(&mut self, message: MessageReader) {
        debug_assert!(!self.is_full(), "mailbox over capacity");
        self.queue.push_back(message);
    }

    pub(crate) fn pop(&mut self) -> Option<MessageReader> {
        self.queue.pop_front()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::stream_pair;
    use std::io::{Read, Write};

    #[test]
    fn test_fifo_order_and_capacity() {
        let mut mailbox = Mailbox::new(2);
        assert!(mailbox.is_empty());
        assert_eq!(mailbox.capacity(), 2);

        let mut writers = Vec::new();
        for tag in [b'a', b'b'] {
            let (mut writer, reader) = stream_pair(4);
            writer.write_all(&[tag]).unwrap();
            writers.push(writer);
            mailbox.push(reader);
        }
        assert!(mailbox.is_full());
        assert_eq!(mailbox.len(), 2);

        let mut first = mailbox.pop().unwrap();
        let mut byte = [0u8; 1];
        first.read_exact(&mut byte).unwrap();
        assert_eq!(byte[0], b'a');
        assert!(!mailbox.is_full());

        let mut second = mailbox.pop().unwrap();
        second.read_exact(&mut byte).unwrap();
        assert_eq!(byte[0], b'b');
        assert!(mailbox.pop().is_none());
    }

    #[test]
    fn test_zero_capacity_holds_one_message() {
        let mut mailbox = Mailbox::new(0);
        assert_eq!(mailbox.capacity(), 1);
        assert!(!mailbox.is_full());

        let (_writer, reader) = stream_pair(4);
        mailbox.push(reader);
        assert!(mailbox.is_full());
    }
}
