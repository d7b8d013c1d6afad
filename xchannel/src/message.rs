//! Message stream pair.
//!
//! Every written message gets a fresh pipe. The [`MessageWriter`] owns the
//! write end, the [`MessageReader`] owns the read end, and both share a
//! cancellation flag guarded by its own lock, independent of the endpoint
//! lock.

use std::io;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::error::{Error, Result};
use crate::pipe::{self, PipeReader, PipeWriter};

#[derive(Debug, Default)]
struct CancelState {
    cancelled: Mutex<bool>,
}

impl CancelState {
    fn cancel(&self) {
        *self.cancelled.lock() = true;
    }

    fn is_cancelled(&self) -> bool {
        *self.cancelled.lock()
    }

    fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            return Err(Error::Cancelled);
        }
        Ok(())
    }
}

/// Creates the writer/reader pair for one message.
pub(crate) fn stream_pair(buffer_size: usize) -> (MessageWriter, MessageReader) {
    let (pipe_writer, pipe_reader) = pipe::pipe(buffer_size);
    let cancel = Arc::new(CancelState::default());
    (
        MessageWriter {
            pipe: pipe_writer,
            cancel: Arc::clone(&cancel),
        },
        MessageReader {
            pipe: pipe_reader,
            cancel,
        },
    )
}

/// Sending half of a message.
///
/// Any pipe failure cancels the message before the error reaches the
/// caller, so the reader observes [`Error::Cancelled`] instead of a
/// truncated stream. Dropping the writer closes the message normally.
#[derive(Debug)]
pub struct MessageWriter {
    pipe: PipeWriter,
    cancel: Arc<CancelState>,
}

impl MessageWriter {
    fn guard<T>(&mut self, result: Result<T>) -> Result<T> {
        if result.is_err() {
            self.cancel();
        }
        result
    }

    /// Ends the message; the reader sees end-of-stream after the buffered bytes.
    pub fn close(&mut self) -> Result<()> {
        let result = self.pipe.close();
        self.guard(result)
    }

    /// Cancels the message. Every later read on the paired reader fails.
    pub fn cancel(&mut self) -> &mut Self {
        self.cancel.cancel();
        let _ = self.pipe.close();
        log::debug!("Message cancelled by writer");
        self
    }

    /// Whether the message was cancelled, by this writer or by a failed write.
    pub fn was_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

impl io::Write for MessageWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let result = self.pipe.write(buf);
        self.guard(result).map_err(Into::into)
    }

    fn flush(&mut self) -> io::Result<()> {
        let result = self.pipe.flush();
        self.guard(result).map_err(Into::into)
    }
}

/// Receiving half of a message, handed to a [`Receiver`](crate::Receiver).
///
/// Data-carrying operations fail with [`Error::Cancelled`] once the writer
/// cancelled, even when bytes remain buffered.
#[derive(Debug)]
pub struct MessageReader {
    pipe: PipeReader,
    cancel: Arc<CancelState>,
}

impl MessageReader {
    /// Whether the writer cancelled this message.
    pub fn was_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    /// A cancel that lands while the pipe call is blocked wakes it as
    /// end-of-stream, so the flag is checked again on the way out.
    fn settle<T>(&self, result: Result<T>) -> Result<T> {
        self.cancel.check()?;
        result
    }

    /// Discards up to `count` bytes, blocking while none are buffered.
    pub fn skip(&mut self, count: u64) -> Result<u64> {
        self.cancel.check()?;
        let result = self.pipe.skip(count);
        self.settle(result)
    }

    /// Number of bytes readable without blocking.
    pub fn available(&self) -> Result<usize> {
        self.cancel.check()?;
        self.pipe.available()
    }

    /// Hangs up on the message. The writer's next write fails and cancels it.
    pub fn close(&mut self) -> Result<()> {
        self.cancel.check()?;
        self.pipe.close()
    }

    /// No-op; marks are not supported.
    pub fn mark(&mut self, read_limit: usize) {
        self.pipe.mark(read_limit);
    }

    /// Always `false`.
    pub fn mark_supported(&self) -> bool {
        self.pipe.mark_supported()
    }

    /// Fails with [`Error::Cancelled`] or [`Error::MarkNotSupported`].
    pub fn reset(&mut self) -> Result<()> {
        self.cancel.check()?;
        self.pipe.reset()
    }
}

impl io::Read for MessageReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        self.cancel.check()?;
        let result = self.pipe.read(buf);
        Ok(self.settle(result)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use std::io::{Read, Write};
    use std::sync::mpsc;
    use std::thread;
    use std::time::Duration;

    fn read_error_kind(reader: &mut MessageReader) -> Option<ErrorKind> {
        let mut buf = [0u8; 8];
        let err = reader.read(&mut buf).err()?;
        Error::from_io(&err).map(Error::kind)
    }

    #[test]
    fn test_bytes_flow_to_reader() {
        let (mut writer, mut reader) = stream_pair(32);
        writer.write_all(b"payload").unwrap();
        writer.close().unwrap();

        let mut out = String::new();
        reader.read_to_string(&mut out).unwrap();
        assert_eq!(out, "payload");
        assert!(!reader.was_cancelled());
    }

    #[test]
    fn test_cancel_blocks_reads_even_with_buffered_bytes() {
        let (mut writer, mut reader) = stream_pair(32);
        writer.write_all(b"partial").unwrap();
        writer.cancel();

        assert!(reader.was_cancelled());
        assert!(writer.was_cancelled());
        assert_eq!(read_error_kind(&mut reader), Some(ErrorKind::Cancelled));
        assert_eq!(reader.available().unwrap_err().kind(), ErrorKind::Cancelled);
        assert_eq!(reader.skip(1).unwrap_err().kind(), ErrorKind::Cancelled);
        assert_eq!(reader.reset().unwrap_err().kind(), ErrorKind::Cancelled);
        assert_eq!(reader.close().unwrap_err().kind(), ErrorKind::Cancelled);
        // cancellation is permanent for the message
        assert_eq!(read_error_kind(&mut reader), Some(ErrorKind::Cancelled));
    }

    #[test]
    fn test_mark_queries_ignore_cancellation() {
        let (mut writer, mut reader) = stream_pair(8);
        writer.cancel();
        reader.mark(4);
        assert!(!reader.mark_supported());
    }

    #[test]
    fn test_write_failure_cancels_message() {
        let (mut writer, mut reader) = stream_pair(8);
        MessageReader::close(&mut reader).unwrap();

        let err = writer.write(b"data").unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::BrokenPipe);
        assert!(writer.was_cancelled());
        assert!(reader.was_cancelled());
    }

    #[test]
    fn test_write_after_cancel_fails() {
        let (mut writer, _reader) = stream_pair(8);
        writer.cancel();
        assert!(writer.write(b"late").is_err());
        assert!(writer.flush().is_err());
    }

    #[test]
    fn test_reader_close_before_cancel_succeeds() {
        let (mut writer, mut reader) = stream_pair(8);
        writer.write_all(b"abc").unwrap();
        assert_eq!(reader.available().unwrap(), 3);
        reader.close().unwrap();
    }

    #[test]
    fn test_cancel_wakes_blocked_reader_with_error() {
        let (mut writer, mut reader) = stream_pair(32);
        writer.write_all(b"part").unwrap();

        let (tx, rx) = mpsc::channel();
        let handle = thread::spawn(move || {
            let mut out = Vec::new();
            let result = reader.read_to_end(&mut out);
            let _ = tx.send(());
            (result, out)
        });
        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err(), "reader should block");

        writer.cancel();
        let (result, out) = handle.join().unwrap();
        let err = result.unwrap_err();
        assert_eq!(Error::from_io(&err).map(Error::kind), Some(ErrorKind::Cancelled));
        assert_eq!(out, b"part");
    }

    #[test]
    fn test_cancel_wakes_blocked_skip_with_error() {
        let (mut writer, mut reader) = stream_pair(32);
        let handle = thread::spawn(move || reader.skip(8));

        thread::sleep(Duration::from_millis(50));
        writer.cancel();
        assert_eq!(handle.join().unwrap().unwrap_err().kind(), ErrorKind::Cancelled);
    }
}
