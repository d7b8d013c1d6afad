//! Error types for channel and message operations.

use std::io;

/// Coarse classification of an [`Error`], handy for matching in tests
/// and across `io::Error` boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// See [`Error::NotOpen`].
    NotOpen,
    /// See [`Error::AlreadyWaiting`].
    AlreadyWaiting,
    /// See [`Error::Interrupted`].
    Interrupted,
    /// See [`Error::Cancelled`].
    Cancelled,
    /// See [`Error::PipeClosed`].
    PipeClosed,
    /// See [`Error::MarkNotSupported`].
    MarkNotSupported,
    /// See [`Error::Io`].
    Io,
}

/// Errors returned by channel and message operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The target endpoint was shut down or closed.
    #[error("Writes have been shut down")]
    NotOpen,
    /// A receiver is already registered on this side.
    #[error("Message handler already waiting")]
    AlreadyWaiting,
    /// An interruptible write was aborted while blocked.
    #[error("Blocked write was interrupted")]
    Interrupted,
    /// The writer cancelled the message.
    #[error("Message was cancelled")]
    Cancelled,
    /// The other end of the message pipe is gone.
    #[error("Pipe is closed")]
    PipeClosed,
    /// Message streams cannot be reset to a mark.
    #[error("Mark/reset not supported")]
    MarkNotSupported,
    /// Any other I/O failure.
    #[error(transparent)]
    Io(io::Error),
}

impl Error {
    /// The [`ErrorKind`] of this error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::NotOpen => ErrorKind::NotOpen,
            Error::AlreadyWaiting => ErrorKind::AlreadyWaiting,
            Error::Interrupted => ErrorKind::Interrupted,
            Error::Cancelled => ErrorKind::Cancelled,
            Error::PipeClosed => ErrorKind::PipeClosed,
            Error::MarkNotSupported => ErrorKind::MarkNotSupported,
            Error::Io(_) => ErrorKind::Io,
        }
    }

    /// Recovers the channel error carried inside an `io::Error` produced by
    /// the `std::io::Read`/`Write` impls of this crate.
    pub fn from_io(err: &io::Error) -> Option<&Error> {
        err.get_ref().and_then(|inner| inner.downcast_ref::<Error>())
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Error {
        let wraps_channel_error = err.get_ref().is_some_and(|inner| inner.is::<Error>());
        if !wraps_channel_error {
            return Error::Io(err);
        }
        match err.into_inner().map(|inner| inner.downcast::<Error>()) {
            Some(Ok(inner)) => *inner,
            Some(Err(other)) => Error::Io(io::Error::other(other)),
            None => Error::Io(io::Error::other("empty io error")),
        }
    }
}

impl From<Error> for io::Error {
    fn from(err: Error) -> io::Error {
        let kind = match err {
            Error::Io(inner) => return inner,
            Error::NotOpen => io::ErrorKind::NotConnected,
            Error::Interrupted => io::ErrorKind::Interrupted,
            Error::PipeClosed => io::ErrorKind::BrokenPipe,
            Error::MarkNotSupported => io::ErrorKind::Unsupported,
            Error::AlreadyWaiting | Error::Cancelled => io::ErrorKind::Other,
        };
        io::Error::new(kind, err)
    }
}

/// Result alias for channel operations.
pub type Result<T> = core::result::Result<T, Error>;
