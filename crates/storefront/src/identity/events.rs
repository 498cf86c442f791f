//! Session-change fan-out.

use tokio::sync::broadcast;
use tracing::warn;

use super::SessionChange;

/// Buffered notifications per subscriber before the slowest one starts lagging.
const CHANNEL_CAPACITY: usize = 16;

/// Publishing side of the session-change stream.
///
/// Identity clients own one of these and call [`SessionNotifier::notify`]
/// whenever their notion of the current session changes.
#[derive(Debug, Clone)]
pub struct SessionNotifier {
    tx: broadcast::Sender<SessionChange>,
}

impl Default for SessionNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionNotifier {
    /// Create a notifier with no subscribers.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    /// Publish a change to every live subscriber. Returns how many received it.
    pub fn notify(&self, change: SessionChange) -> usize {
        // No subscribers is not an error: nobody is listening yet.
        self.tx.send(change).unwrap_or(0)
    }

    /// Open a new subscription.
    #[must_use]
    pub fn subscribe(&self) -> SessionEvents {
        SessionEvents {
            rx: self.tx.subscribe(),
        }
    }

    /// Number of live subscriptions.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// Subscribing side of the session-change stream.
///
/// Dropping it unsubscribes.
#[derive(Debug)]
pub struct SessionEvents {
    rx: broadcast::Receiver<SessionChange>,
}

impl SessionEvents {
    /// Wait for the next change.
    ///
    /// Returns `None` once the publisher is gone. If this subscriber fell
    /// behind, the missed changes are skipped and the next retained one is
    /// returned.
    pub async fn next(&mut self) -> Option<SessionChange> {
        loop {
            match self.rx.recv().await {
                Ok(change) => return Some(change),
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!(skipped, "Session event subscriber lagged, skipping events");
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_notify_reaches_subscriber() {
        let notifier = SessionNotifier::new();
        let mut events = notifier.subscribe();

        assert_eq!(notifier.notify(SessionChange::signed_out()), 1);

        let change = events.next().await.unwrap();
        assert!(change.session.is_none());
    }

    #[tokio::test]
    async fn test_drop_unsubscribes() {
        let notifier = SessionNotifier::new();
        let events = notifier.subscribe();
        assert_eq!(notifier.subscriber_count(), 1);

        drop(events);
        assert_eq!(notifier.subscriber_count(), 0);
        assert_eq!(notifier.notify(SessionChange::signed_out()), 0);
    }

    #[tokio::test]
    async fn test_closed_publisher_ends_stream() {
        let notifier = SessionNotifier::new();
        let mut events = notifier.subscribe();
        drop(notifier);
        assert!(events.next().await.is_none());
    }
}
