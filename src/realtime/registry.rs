use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use tokio::sync::mpsc;
use uuid::Uuid;

use crate::realtime::dispatcher::VoteUpdate;

pub type ConnectionId = Uuid;

/// Outbound queue a connection's socket task registers for itself.
/// Bounded, so a reader that stops draining costs dropped snapshots,
/// never a blocked dispatcher.
pub type UpdateSink = mpsc::Sender<VoteUpdate>;

struct Connection {
    sink: UpdateSink,
    poll_id: Option<String>,
}

/// Process-wide map of live connections and the poll each one watches.
///
/// A connection observes at most one poll at a time: joining a poll
/// replaces whatever it was watching before. Leave and disconnect are
/// idempotent. The mutex guards only map mutation and snapshotting; it is
/// never held across an await or a send.
pub struct SubscriptionRegistry {
    connections: Mutex<HashMap<ConnectionId, Connection>>,
}

impl SubscriptionRegistry {
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(HashMap::new()),
        }
    }

    /// Registers a freshly opened connection with its outbound sink.
    pub fn connect(&self, connection_id: ConnectionId, sink: UpdateSink) {
        self.lock().insert(
            connection_id,
            Connection {
                sink,
                poll_id: None,
            },
        );
    }

    /// Subscribes the connection to `poll_id`, dropping any previous
    /// subscription. Unknown connections are ignored: the socket may have
    /// torn down while this message was in flight.
    pub fn join(&self, connection_id: ConnectionId, poll_id: &str) {
        if let Some(connection) = self.lock().get_mut(&connection_id) {
            connection.poll_id = Some(poll_id.to_string());
        }
    }

    pub fn leave(&self, connection_id: ConnectionId) {
        if let Some(connection) = self.lock().get_mut(&connection_id) {
            connection.poll_id = None;
        }
    }

    pub fn on_disconnect(&self, connection_id: ConnectionId) {
        self.lock().remove(&connection_id);
    }

    /// Point-in-time snapshot of the observers of `poll_id`. Senders are
    /// cloned out so delivery happens without the registry lock.
    pub fn observers_of(&self, poll_id: &str) -> Vec<(ConnectionId, UpdateSink)> {
        self.lock()
            .iter()
            .filter(|(_, connection)| connection.poll_id.as_deref() == Some(poll_id))
            .map(|(id, connection)| (*id, connection.sink.clone()))
            .collect()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<ConnectionId, Connection>> {
        self.connections
            .lock()
            .expect("subscription registry lock poisoned")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sink() -> UpdateSink {
        mpsc::channel(1).0
    }

    fn observer_ids(registry: &SubscriptionRegistry, poll_id: &str) -> Vec<ConnectionId> {
        registry
            .observers_of(poll_id)
            .into_iter()
            .map(|(id, _)| id)
            .collect()
    }

    #[test]
    fn join_makes_the_connection_an_observer() {
        let registry = SubscriptionRegistry::new();
        let conn = Uuid::new_v4();

        registry.connect(conn, sink());
        registry.join(conn, "poll-1");

        assert_eq!(observer_ids(&registry, "poll-1"), vec![conn]);
        assert!(observer_ids(&registry, "poll-2").is_empty());
    }

    #[test]
    fn join_replaces_the_previous_subscription() {
        let registry = SubscriptionRegistry::new();
        let conn = Uuid::new_v4();

        registry.connect(conn, sink());
        registry.join(conn, "poll-1");
        registry.join(conn, "poll-2");

        assert!(observer_ids(&registry, "poll-1").is_empty());
        assert_eq!(observer_ids(&registry, "poll-2"), vec![conn]);
    }

    #[test]
    fn leave_is_idempotent() {
        let registry = SubscriptionRegistry::new();
        let conn = Uuid::new_v4();

        registry.connect(conn, sink());
        registry.join(conn, "poll-1");

        registry.leave(conn);
        registry.leave(conn);

        assert!(observer_ids(&registry, "poll-1").is_empty());

        // Leaving a connection that never joined anything is a no-op too.
        registry.leave(Uuid::new_v4());
    }

    #[test]
    fn disconnect_removes_the_connection_entirely() {
        let registry = SubscriptionRegistry::new();
        let conn = Uuid::new_v4();

        registry.connect(conn, sink());
        registry.join(conn, "poll-1");
        registry.on_disconnect(conn);
        registry.on_disconnect(conn);

        assert!(observer_ids(&registry, "poll-1").is_empty());

        // A join arriving after teardown must not resurrect the connection.
        registry.join(conn, "poll-1");
        assert!(observer_ids(&registry, "poll-1").is_empty());
    }

    #[test]
    fn snapshot_is_unaffected_by_later_mutation() {
        let registry = SubscriptionRegistry::new();
        let first = Uuid::new_v4();
        let second = Uuid::new_v4();

        registry.connect(first, sink());
        registry.join(first, "poll-1");
        registry.connect(second, sink());
        registry.join(second, "poll-1");

        let snapshot = registry.observers_of("poll-1");
        registry.on_disconnect(first);
        registry.on_disconnect(second);

        assert_eq!(snapshot.len(), 2);
    }
}
