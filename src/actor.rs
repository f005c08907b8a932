//! Actors own a piece of state and are driven by events sent over a channel.
//!
//! Every message carries the span it was sent from so the receiving side can
//! re-enter it while handling the event.

use tokio::sync::mpsc;
use tracing::Span;

pub mod auto_commit;
pub mod config_watcher;
pub mod popup;
pub mod switcher;

pub struct Sender<Event>(mpsc::UnboundedSender<(Span, Event)>);
pub type Receiver<Event> = mpsc::UnboundedReceiver<(Span, Event)>;

pub fn channel<Event>() -> (Sender<Event>, Receiver<Event>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Sender(tx), rx)
}

impl<Event> Clone for Sender<Event> {
    fn clone(&self) -> Self { Sender(self.0.clone()) }
}

impl<Event> Sender<Event> {
    /// Sends from the current span, dropping the event if the actor is gone.
    pub fn send(&self, event: Event) { _ = self.try_send(event); }

    pub fn try_send(&self, event: Event) -> Result<(), mpsc::error::SendError<(Span, Event)>> {
        self.0.send((Span::current(), event))
    }
}
