use super::LocalChannel;
use crate::message::MessageReader;

/// One-shot handler for the next inbound message.
///
/// Exactly one of the two methods is called, on the dispatcher, with the
/// channel the handler was registered on. To keep receiving, register
/// again from inside the callback.
pub trait Receiver: Send + 'static {
    /// The next inbound message arrived.
    fn handle_message(self: Box<Self>, channel: &LocalChannel, message: MessageReader);

    /// No further messages will arrive on `channel`.
    fn handle_end(self: Box<Self>, channel: &LocalChannel);
}

/// What a closure receiver gets.
#[derive(Debug)]
pub enum Delivery {
    /// An inbound message.
    Message(MessageReader),
    /// End-of-stream.
    End,
}

/// Receiver backed by a closure; see [`receiver_fn`].
pub struct FnReceiver<F>(F);

/// Adapts a closure into a [`Receiver`].
pub fn receiver_fn<F>(f: F) -> FnReceiver<F>
where
    F: FnOnce(&LocalChannel, Delivery) + Send + 'static,
{
    FnReceiver(f)
}

impl<F> Receiver for FnReceiver<F>
where
    F: FnOnce(&LocalChannel, Delivery) + Send + 'static,
{
    fn handle_message(self: Box<Self>, channel: &LocalChannel, message: MessageReader) {
        let FnReceiver(f) = *self;
        f(channel, Delivery::Message(message))
    }

    fn handle_end(self: Box<Self>, channel: &LocalChannel) {
        let FnReceiver(f) = *self;
        f(channel, Delivery::End)
    }
}
