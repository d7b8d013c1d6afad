//! Ring buffer implementation for message payload bytes.
//!
//! The capacity is chosen at runtime from the channel configuration,
//! so storage lives on the heap.

/// A fixed-capacity ring buffer for FIFO byte traffic.
///
/// Writes accept as many bytes as fit and report the count, which lets
/// the pipe layered on top decide whether to block.
#[derive(Debug)]
pub struct RingBuffer {
    /// The underlying storage.
    buffer: Box<[u8]>,

    /// Read position (head).
    head: usize,

    /// Write position (tail).
    tail: usize,

    /// Current number of bytes in buffer.
    len: usize,
}

impl RingBuffer {
    /// Creates a new empty ring buffer holding up to `capacity` bytes.
    pub fn new(capacity: usize) -> Self {
        Self {
            buffer: vec![0u8; capacity.max(1)].into_boxed_slice(),
            head: 0,
            tail: 0,
            len: 0,
        }
    }

    /// Number of buffered bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if no bytes are buffered.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns true if no more bytes fit.
    #[inline]
    pub fn is_full(&self) -> bool {
        self.len == self.buffer.len()
    }

    /// Total capacity in bytes.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.buffer.len()
    }

    /// Returns the number of bytes that can be written.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.capacity() - self.len
    }

    /// Discards all buffered bytes.
    pub fn clear(&mut self) {
        self.head = 0;
        self.tail = 0;
        self.len = 0;
    }

    /// Writes data to the buffer.
    ///
    /// Returns the number of bytes written.
    pub fn write(&mut self, data: &[u8]) -> usize {
        let cap = self.capacity();
        let to_write = data.len().min(self.remaining());
        if to_write == 0 {
            return 0;
        }

        let first_chunk = to_write.min(cap - self.tail);
        self.buffer[self.tail..self.tail + first_chunk].copy_from_slice(&data[..first_chunk]);

        // Handle wrap-around
        if to_write > first_chunk {
            let second_chunk = to_write - first_chunk;
            self.buffer[..second_chunk].copy_from_slice(&data[first_chunk..to_write]);
        }

        self.tail = (self.tail + to_write) % cap;
        self.len += to_write;

        to_write
    }

    /// Reads data from the buffer.
    ///
    /// Returns the number of bytes read.
    pub fn read(&mut self, buf: &mut [u8]) -> usize {
        let cap = self.capacity();
        let to_read = buf.len().min(self.len);
        if to_read == 0 {
            return 0;
        }

        let first_chunk = to_read.min(cap - self.head);
        buf[..first_chunk].copy_from_slice(&self.buffer[self.head..self.head + first_chunk]);

        if to_read > first_chunk {
            let second_chunk = to_read - first_chunk;
            buf[first_chunk..to_read].copy_from_slice(&self.buffer[..second_chunk]);
        }

        self.head = (self.head + to_read) % cap;
        self.len -= to_read;

        to_read
    }

    /// Skips (consumes) bytes without reading them.
    pub fn skip(&mut self, count: usize) -> usize {
        let to_skip = count.min(self.len);
        self.head = (self.head + to_skip) % self.capacity();
        self.len -= to_skip;
        to_skip
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_write_read() {
        let mut buf = RingBuffer::new(64);

        let written = buf.write(b"Hello");
        assert_eq!(written, 5);
        assert_eq!(buf.len(), 5);

        let mut out = [0u8; 10];
        let read = buf.read(&mut out);
        assert_eq!(read, 5);
        assert_eq!(&out[..5], b"Hello");
        assert!(buf.is_empty());
    }

    #[test]
    fn test_wrap_around() {
        let mut buf = RingBuffer::new(8);

        buf.write(b"12345");
        let mut out = [0u8; 3];
        buf.read(&mut out);
        assert_eq!(&out, b"123");
        assert_eq!(buf.len(), 2);

        // tail wraps past the end of storage
        buf.write(b"ABCDE");
        assert_eq!(buf.len(), 7);

        let mut out = [0u8; 8];
        let read = buf.read(&mut out);
        assert_eq!(read, 7);
        assert_eq!(&out[..7], b"45ABCDE");
    }

    #[test]
    fn test_full_buffer_accepts_partial_write() {
        let mut buf = RingBuffer::new(8);

        let written = buf.write(b"123456789");
        assert_eq!(written, 8);
        assert!(buf.is_full());
        assert_eq!(buf.remaining(), 0);
        assert_eq!(buf.write(b"9"), 0);
    }

    #[test]
    fn test_skip_across_wrap() {
        let mut buf = RingBuffer::new(4);
        buf.write(b"abc");
        assert_eq!(buf.skip(2), 2);
        buf.write(b"def");
        assert_eq!(buf.skip(10), 4);
        assert!(buf.is_empty());

        buf.write(b"xy");
        let mut out = [0u8; 2];
        buf.read(&mut out);
        assert_eq!(&out, b"xy");
    }

    #[test]
    fn test_clear() {
        let mut buf = RingBuffer::new(16);
        buf.write(b"data");
        buf.clear();
        assert!(buf.is_empty());
        assert_eq!(buf.remaining(), buf.capacity());
    }
}
