//! Event handler trait and the channel-backed subscriber.

use crossbeam_channel::{unbounded, Receiver, Sender};

use super::GestockEvent;

/// Receives every event emitted through the dispatcher.
/// Handlers run on the emitting thread and must not block.
pub trait EventHandler: Send + Sync {
    fn handle(&self, event: &GestockEvent);
}

/// Handler that forwards events into a crossbeam channel.
///
/// Backs the superviseur live stock view: register the subscriber, then
/// drain the receiver to refresh the screen.
pub struct ChannelSubscriber {
    tx: Sender<GestockEvent>,
}

impl ChannelSubscriber {
    pub fn new() -> (Self, Receiver<GestockEvent>) {
        let (tx, rx) = unbounded();
        (Self { tx }, rx)
    }
}

impl EventHandler for ChannelSubscriber {
    fn handle(&self, event: &GestockEvent) {
        // A dropped receiver just means the view navigated away.
        let _ = self.tx.send(event.clone());
    }
}
