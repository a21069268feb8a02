//! Activity signals and the subscription list that fans them out.
//!
//! Call sites that finish an independent unit of work (a timer callback, an
//! animation frame, a settled promise, a structural mutation, ...) call
//! [`ActivityHub::notify`]. Every subscriber receives the signal on its own
//! unbounded channel, so notifying never blocks and never re-enters the
//! subscriber.

use std::sync::{Arc, Mutex, PoisonError};

use log::trace;
use tokio::sync::mpsc;

/// A low-level activity signal observed by the host.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Signal {
    TimerFired,
    IntervalFired,
    AnimationFrame,
    PromiseSettled,
    Mutation,
    VisibilityChanged { visible: bool },
    DocumentReady,
    Load,
}

impl Signal {
    /// Visibility transitions are state changes as well as activity.
    pub const fn visibility(self) -> Option<bool> {
        match self {
            Self::VisibilityChanged { visible } => Some(visible),
            _ => None,
        }
    }
}

type Subscribers = Vec<mpsc::UnboundedSender<Signal>>;

/// Explicit subscription list for activity signals. Cloning shares the list.
#[derive(Clone, Debug, Default)]
pub struct ActivityHub {
    subscribers: Arc<Mutex<Subscribers>>,
}

impl ActivityHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new subscriber and return its receiving end.
    pub fn subscribe(&self) -> mpsc::UnboundedReceiver<Signal> {
        let (sender, receiver) = mpsc::unbounded_channel();
        self.with_subscribers(|subscribers| subscribers.push(sender));
        receiver
    }

    /// Deliver `signal` to every live subscriber, pruning closed ones.
    /// Returns the number of subscribers that received it.
    pub fn notify(&self, signal: Signal) -> usize {
        trace!("activity signal {signal:?}");
        self.with_subscribers(|subscribers| {
            subscribers.retain(|sender| sender.send(signal).is_ok());
            subscribers.len()
        })
    }

    pub fn subscriber_count(&self) -> usize {
        self.with_subscribers(|subscribers| {
            subscribers.retain(|sender| !sender.is_closed());
            subscribers.len()
        })
    }

    fn with_subscribers<R>(&self, apply: impl FnOnce(&mut Subscribers) -> R) -> R {
        let mut guard = self
            .subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        apply(&mut guard)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn notify_reaches_every_subscriber() {
        let hub = ActivityHub::new();
        let mut first = hub.subscribe();
        let mut second = hub.clone().subscribe();

        assert_eq!(hub.notify(Signal::Load), 2);
        assert_eq!(first.recv().await, Some(Signal::Load));
        assert_eq!(second.recv().await, Some(Signal::Load));
    }

    #[test]
    fn closed_subscribers_are_pruned() {
        let hub = ActivityHub::new();
        let receiver = hub.subscribe();
        drop(receiver);
        assert_eq!(hub.notify(Signal::Mutation), 0);
        assert_eq!(hub.subscriber_count(), 0);
    }

    #[test]
    fn visibility_payload() {
        assert_eq!(Signal::VisibilityChanged { visible: false }.visibility(), Some(false));
        assert_eq!(Signal::TimerFired.visibility(), None);
    }
}
