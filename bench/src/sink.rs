use futures::channel::oneshot;
use log::*;
use std::io::Read;
use xchannel::{LocalChannel, MessageReader, Receiver};

#[derive(Debug, Default, Clone, Copy)]
pub struct SinkStats {
    pub messages: usize,
    pub bytes: u64,
}

/// Drains every inbound message and re-registers itself until end-of-stream.
pub struct Sink {
    stats: SinkStats,
    done: oneshot::Sender<SinkStats>,
}

impl Sink {
    pub fn new(done: oneshot::Sender<SinkStats>) -> Self {
        Self {
            stats: SinkStats::default(),
            done,
        }
    }
}

impl Receiver for Sink {
    fn handle_message(self: Box<Self>, channel: &LocalChannel, mut message: MessageReader) {
        let mut this = *self;
        let mut buf = vec![0u8; 64 * 1024];
        loop {
            match message.read(&mut buf) {
                Ok(0) => break,
                Ok(n) => this.stats.bytes += n as u64,
                Err(e) => {
                    error!("Message read failed: {}", e);
                    break;
                }
            }
        }
        this.stats.messages += 1;
        if this.stats.messages % 100 == 0 {
            debug!("Progress: {} messages received", this.stats.messages);
        }

        if let Err(e) = channel.receive_message(this) {
            error!("Failed to re-register receiver: {}", e);
        }
    }

    fn handle_end(self: Box<Self>, _channel: &LocalChannel) {
        let Sink { stats, done } = *self;
        info!("End of stream after {} messages", stats.messages);
        let _ = done.send(stats);
    }
}
