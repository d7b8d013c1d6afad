//! Bounded in-memory byte pipe.
//!
//! Each message travels through its own pipe: the sender holds the
//! [`PipeWriter`] and the receiving handler holds the [`PipeReader`].
//! Backpressure inside a single message comes solely from the pipe
//! capacity.

use std::io;
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use crate::buffer::RingBuffer;
use crate::error::{Error, Result};

#[derive(Debug)]
struct PipeState {
    buffer: RingBuffer,
    writer_closed: bool,
    reader_closed: bool,
}

#[derive(Debug)]
struct Shared {
    state: Mutex<PipeState>,
    /// Signalled when bytes arrive or the writer closes.
    readable: Condvar,
    /// Signalled when space frees up or the reader closes.
    writable: Condvar,
}

/// Creates a pipe whose buffer holds `capacity` bytes.
pub fn pipe(capacity: usize) -> (PipeWriter, PipeReader) {
    let shared = Arc::new(Shared {
        state: Mutex::new(PipeState {
            buffer: RingBuffer::new(capacity),
            writer_closed: false,
            reader_closed: false,
        }),
        readable: Condvar::new(),
        writable: Condvar::new(),
    });
    (
        PipeWriter {
            shared: Arc::clone(&shared),
        },
        PipeReader { shared },
    )
}

/// Write end of a byte pipe.
#[derive(Debug)]
pub struct PipeWriter {
    shared: Arc<Shared>,
}

impl PipeWriter {
    /// Writes as many bytes as currently fit, blocking while the buffer is full.
    pub fn write(&mut self, data: &[u8]) -> Result<usize> {
        if data.is_empty() {
            return Ok(0);
        }
        let mut state = self.shared.state.lock();
        loop {
            if state.writer_closed || state.reader_closed {
                return Err(Error::PipeClosed);
            }
            if state.buffer.remaining() > 0 {
                let n = state.buffer.write(data);
                self.shared.readable.notify_all();
                return Ok(n);
            }
            self.shared.writable.wait(&mut state);
        }
    }

    /// Bytes are visible to the reader as soon as they are written, so
    /// this only reports whether the pipe is still usable.
    pub fn flush(&mut self) -> Result<()> {
        let state = self.shared.state.lock();
        if state.writer_closed || state.reader_closed {
            return Err(Error::PipeClosed);
        }
        Ok(())
    }

    /// Closes the write end; the reader sees end-of-stream once it drains
    /// the buffered bytes. Closing twice is a no-op.
    pub fn close(&mut self) -> Result<()> {
        let mut state = self.shared.state.lock();
        if !state.writer_closed {
            state.writer_closed = true;
            self.shared.readable.notify_all();
        }
        Ok(())
    }

    /// Whether the write end has been closed.
    pub fn is_closed(&self) -> bool {
        self.shared.state.lock().writer_closed
    }
}

impl Drop for PipeWriter {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

impl io::Write for PipeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        PipeWriter::write(self, buf).map_err(Into::into)
    }

    fn flush(&mut self) -> io::Result<()> {
        PipeWriter::flush(self).map_err(Into::into)
    }
}

/// Read end of a byte pipe.
#[derive(Debug)]
pub struct PipeReader {
    shared: Arc<Shared>,
}

impl PipeReader {
    /// Reads buffered bytes, blocking while the pipe is empty and the
    /// writer is still open. Returns 0 at end-of-stream.
    pub fn read(&mut self, buf: &mut [u8]) -> Result<usize> {
        if buf.is_empty() {
            return Ok(0);
        }
        let mut state = self.shared.state.lock();
        loop {
            if state.reader_closed {
                return Err(Error::PipeClosed);
            }
            if !state.buffer.is_empty() {
                let n = state.buffer.read(buf);
                self.shared.writable.notify_all();
                return Ok(n);
            }
            if state.writer_closed {
                return Ok(0);
            }
            self.shared.readable.wait(&mut state);
        }
    }

    /// Discards up to `count` bytes with the same blocking rule as [`read`](Self::read).
    pub fn skip(&mut self, count: u64) -> Result<u64> {
        if count == 0 {
            return Ok(0);
        }
        let wanted = usize::try_from(count).unwrap_or(usize::MAX);
        let mut state = self.shared.state.lock();
        loop {
            if state.reader_closed {
                return Err(Error::PipeClosed);
            }
            if !state.buffer.is_empty() {
                let n = state.buffer.skip(wanted);
                self.shared.writable.notify_all();
                return Ok(n as u64);
            }
            if state.writer_closed {
                return Ok(0);
            }
            self.shared.readable.wait(&mut state);
        }
    }

    /// Number of bytes readable without blocking.
    pub fn available(&self) -> Result<usize> {
        let state = self.shared.state.lock();
        if state.reader_closed {
            return Err(Error::PipeClosed);
        }
        Ok(state.buffer.len())
    }

    /// Closes the read end, dropping unread bytes. A blocked writer wakes
    /// and fails with [`Error::PipeClosed`].
    pub fn close(&mut self) -> Result<()> {
        let mut state = self.shared.state.lock();
        if !state.reader_closed {
            state.reader_closed = true;
            state.buffer.clear();
            self.shared.writable.notify_all();
        }
        Ok(())
    }

    /// No-op; marks are not supported.
    pub fn mark(&mut self, _read_limit: usize) {}

    /// Always `false`.
    pub fn mark_supported(&self) -> bool {
        false
    }

    /// Always fails with [`Error::MarkNotSupported`].
    pub fn reset(&mut self) -> Result<()> {
        Err(Error::MarkNotSupported)
    }
}

impl Drop for PipeReader {
    fn drop(&mut self) {
        let _ = self.close();
    }
}

impl io::Read for PipeReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        PipeReader::read(self, buf).map_err(Into::into)
    }
}
