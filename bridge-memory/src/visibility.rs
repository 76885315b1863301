//! Host visibility controller
//!
//! A manually driven [`VisibilitySource`]: the embedding host (or a test)
//! calls [`HostVisibility::set_hidden`] when its page-visibility signal
//! fires, and subscribed coordinators are notified through a watch channel.

use bridge_traits::visibility::VisibilitySource;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::watch;

pub struct HostVisibility {
    hidden: AtomicBool,
    tx: watch::Sender<bool>,
}

impl HostVisibility {
    /// Create a controller reporting the page as currently visible.
    pub fn new() -> Self {
        let (tx, _) = watch::channel(false);
        Self {
            hidden: AtomicBool::new(false),
            tx,
        }
    }

    /// Record a visibility transition and notify subscribers.
    ///
    /// Subscribers re-read [`VisibilitySource::is_hidden`] on each
    /// notification, so repeated calls with the same value are harmless.
    pub fn set_hidden(&self, hidden: bool) {
        self.hidden.store(hidden, Ordering::SeqCst);
        // send_replace notifies even with no active receivers
        self.tx.send_replace(hidden);
    }
}

impl Default for HostVisibility {
    fn default() -> Self {
        Self::new()
    }
}

impl VisibilitySource for HostVisibility {
    fn is_hidden(&self) -> bool {
        self.hidden.load(Ordering::SeqCst)
    }

    fn changes(&self) -> watch::Receiver<bool> {
        self.tx.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn notifies_subscribers_of_transitions() {
        let host = HostVisibility::new();
        let mut rx = host.changes();
        assert!(!host.is_hidden());

        host.set_hidden(true);
        rx.changed().await.unwrap();
        assert!(host.is_hidden());

        host.set_hidden(false);
        rx.changed().await.unwrap();
        assert!(!host.is_hidden());
    }
}
