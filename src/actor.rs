//! Actors and the channels between them.
//!
//! Every message carries the span that was current when it was sent, so work
//! done by the receiving actor shows up under the producer's span.

pub mod border;
pub mod reactor;

use tokio::sync::mpsc;
use tracing::{Span, debug};

pub type Receiver<E> = mpsc::UnboundedReceiver<(Span, E)>;

pub struct Sender<E>(mpsc::UnboundedSender<(Span, E)>);

impl<E> Clone for Sender<E> {
    fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<E> Sender<E> {
    /// Sends a message, dropping it if the receiving actor is gone.
    pub fn send(&self, event: E) {
        if self.try_send(event).is_err() {
            debug!("Failed to send event: receiver closed");
        }
    }

    pub fn try_send(&self, event: E) -> Result<(), mpsc::error::SendError<(Span, E)>> {
        self.0.send((Span::current(), event))
    }

    pub fn downgrade(&self) -> WeakSender<E> { WeakSender(self.0.downgrade()) }

    pub fn is_closed(&self) -> bool { self.0.is_closed() }
}

/// A sender that does not keep the channel open.
pub struct WeakSender<E>(mpsc::WeakUnboundedSender<(Span, E)>);

impl<E> Clone for WeakSender<E> {
    fn clone(&self) -> Self { Self(self.0.clone()) }
}

impl<E> WeakSender<E> {
    pub fn upgrade(&self) -> Option<Sender<E>> { self.0.upgrade().map(Sender) }
}

pub fn channel<E>() -> (Sender<E>, Receiver<E>) {
    let (tx, rx) = mpsc::unbounded_channel();
    (Sender(tx), rx)
}

#[cfg(test)]
mod tests {
    use std::thread;

    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn messages_arrive_in_send_order_across_threads() {
        let (tx, mut rx) = channel::<&'static str>();
        tx.send("a");
        let tx2 = tx.clone();
        thread::spawn(move || tx2.send("b")).join().unwrap();
        let tx3 = tx.clone();
        thread::spawn(move || tx3.send("c")).join().unwrap();

        let received: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok().map(|(_, e)| e)).collect();
        assert_eq!(received, vec!["a", "b", "c"]);
    }

    #[test]
    fn weak_sender_does_not_keep_channel_open() {
        let (tx, mut rx) = channel::<u32>();
        let weak = tx.downgrade();
        weak.upgrade().unwrap().send(1);
        drop(tx);
        assert!(weak.upgrade().is_none());
        assert_eq!(rx.try_recv().unwrap().1, 1);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn send_to_closed_channel_is_dropped() {
        let (tx, rx) = channel::<u32>();
        drop(rx);
        assert!(tx.is_closed());
        tx.send(3);
        assert!(tx.try_send(4).is_err());
    }
}
