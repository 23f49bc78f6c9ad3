//! Session lifecycle notifications
//!
//! The client never navigates anywhere itself. Whoever owns the UI subscribes
//! here and decides what "session expired" means for it.

use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::debug;

const EVENT_CHANNEL_CAPACITY: usize = 16;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    LoggedIn { user_id: String },
    Refreshed,
    /// The refresh failed and the session was cleared
    Expired { reason: String },
    LoggedOut,
}

type Listener = Arc<dyn Fn(&SessionEvent) + Send + Sync>;

/// Fan-out of [`SessionEvent`]s to a broadcast channel and registered callbacks
pub struct SessionEvents {
    sender: broadcast::Sender<SessionEvent>,
    listeners: RwLock<Vec<Listener>>,
}

impl Default for SessionEvents {
    fn default() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            sender,
            listeners: RwLock::new(Vec::new()),
        }
    }
}

impl std::fmt::Debug for SessionEvents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionEvents")
            .field("subscribers", &self.sender.receiver_count())
            .field("listeners", &self.listeners.read().len())
            .finish()
    }
}

impl SessionEvents {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }

    /// Register a callback invoked synchronously on every event
    pub fn add_listener<F>(&self, listener: F)
    where
        F: Fn(&SessionEvent) + Send + Sync + 'static,
    {
        self.listeners.write().push(Arc::new(listener));
    }

    pub fn emit(&self, event: SessionEvent) {
        debug!(?event, "Session event");

        // clone out so a listener may register another listener
        let listeners: Vec<Listener> = self.listeners.read().clone();
        for listener in listeners {
            listener(&event);
        }

        // no receivers is fine
        let _ = self.sender.send(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[tokio::test]
    async fn test_events_reach_subscribers_and_listeners() {
        let events = SessionEvents::new();
        let mut rx = events.subscribe();

        let expired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&expired);
        events.add_listener(move |event| {
            if matches!(event, SessionEvent::Expired { .. }) {
                counter.fetch_add(1, Ordering::SeqCst);
            }
        });

        events.emit(SessionEvent::Refreshed);
        events.emit(SessionEvent::Expired {
            reason: "refresh rejected".into(),
        });

        assert_eq!(rx.recv().await.unwrap(), SessionEvent::Refreshed);
        assert!(matches!(rx.recv().await.unwrap(), SessionEvent::Expired { .. }));
        assert_eq!(expired.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_emit_without_subscribers() {
        SessionEvents::new().emit(SessionEvent::LoggedOut);
    }
}
