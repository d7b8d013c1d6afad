//! Buffer management for message payloads.
//!
//! - RingBuffer: Circular byte buffer backing each message pipe

mod ring;

pub use ring::RingBuffer;
