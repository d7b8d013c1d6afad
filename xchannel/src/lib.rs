//! # XChannel - An In-Process Message Channel
//!
//! XChannel is the local (loopback) transport of a remoting stack. Two
//! coupled endpoints exchange discrete messages, and each message is a
//! byte stream of its own:
//!
//! - **Bounded mailboxes**: writers block once the peer holds too many undelivered messages
//! - **Direct handoff**: a receiver already waiting gets the next message without queueing
//! - **Half-close**: shutting down writes lets the peer drain its queue, then see end-of-stream
//! - **Per-message cancellation**: a cancelled writer makes every later read on its message fail
//!
//! ## Architecture
//!
//! ```text
//!   handle A                                        handle B
//!   write_message() ──► B: mailbox / receiver slot ──► receive_message(handler)
//!        │                                                   │
//!        ▼                                                   ▼  (on the Executor)
//!   MessageWriter ════════════════ pipe ═══════════════► MessageReader
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use std::io::Write;
//! use std::sync::Arc;
//! use xchannel::{ChannelConfig, LocalChannel, ThreadExecutor, receiver_fn};
//!
//! let (a, b) = LocalChannel::pair(ChannelConfig::default(), Arc::new(ThreadExecutor::new()), context);
//!
//! b.receive_message(receiver_fn(|_, delivery| println!("{:?}", delivery)))?;
//!
//! let mut message = a.write_message()?;
//! message.write_all(b"Hello, World!")?;
//! message.close()?;
//! ```

#![deny(unsafe_code)]
#![warn(missing_docs)]

pub mod attachments;
pub mod buffer;
pub mod channel;
pub mod closeable;
pub mod config;
pub mod connection;
pub mod error;
pub mod executor;
pub mod interrupt;
pub mod message;
pub mod option;
pub mod pipe;

// Re-export commonly used types
pub use attachments::{AttachmentKey, Attachments};
pub use channel::{Delivery, LocalChannel, Receiver, receiver_fn};
pub use closeable::Closed;
pub use config::ChannelConfig;
pub use connection::{Connection, ConnectionContext, LocalConnection, LocalConnectionContext};
pub use error::{Error, ErrorKind, Result};
pub use executor::{Executor, Task, ThreadExecutor, TokioExecutor};
pub use interrupt::Interrupt;
pub use message::{MessageReader, MessageWriter};
pub use option::ChannelOption;

/// Default number of undelivered messages an endpoint queues before writers block.
pub const DEFAULT_QUEUE_LENGTH: usize = 8;

/// Default byte capacity of the pipe behind each message.
pub const DEFAULT_BUFFER_SIZE: usize = 8192;
