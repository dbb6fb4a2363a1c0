use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use crate::realtime::registry::SubscriptionRegistry;
use crate::services::aggregation::{Aggregate, OptionCount};

/// One result snapshot for one poll, as pushed to observers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteUpdate {
    pub poll_id: String,
    pub results: Vec<OptionCount>,
}

impl From<Aggregate> for VoteUpdate {
    fn from(aggregate: Aggregate) -> Self {
        Self {
            poll_id: aggregate.poll_id,
            results: aggregate.results,
        }
    }
}

/// Handle the vote path uses to hand a fresh aggregate to the fan-out
/// task. Publishing enqueues and returns; it cannot block or fail the
/// commit that produced the update.
#[derive(Clone)]
pub struct UpdateQueue {
    tx: mpsc::UnboundedSender<VoteUpdate>,
}

impl UpdateQueue {
    pub fn publish(&self, update: VoteUpdate) {
        if self.tx.send(update).is_err() {
            error!("broadcast dispatcher is gone, dropping vote update");
        }
    }
}

/// Spawns the dispatcher task: drains the queue in commit order and fans
/// each update out to the current observers of its poll.
///
/// Updates flow through one queue and one task, and each observer sink is
/// FIFO, so a given observer sees a poll's updates in the order their
/// commits completed. Delivery to one observer is independent of the
/// rest: `try_send` into a full or closed sink loses that one snapshot
/// for that one connection and nothing else.
pub fn spawn_dispatcher(registry: Arc<SubscriptionRegistry>) -> UpdateQueue {
    let (tx, mut rx) = mpsc::unbounded_channel::<VoteUpdate>();

    tokio::spawn(async move {
        while let Some(update) = rx.recv().await {
            let observers = registry.observers_of(&update.poll_id);
            debug!(
                poll_id = %update.poll_id,
                observers = observers.len(),
                "dispatching vote update"
            );

            for (connection_id, sink) in observers {
                if sink.try_send(update.clone()).is_err() {
                    warn!(%connection_id, "observer not keeping up, dropping vote update");
                }
            }
        }
    });

    UpdateQueue { tx }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tokio::time::timeout;
    use uuid::Uuid;

    fn update(poll_id: &str, votes: i64) -> VoteUpdate {
        VoteUpdate {
            poll_id: poll_id.to_string(),
            results: vec![OptionCount {
                id: "opt-1".to_string(),
                text: "Rust".to_string(),
                vote_count: votes,
            }],
        }
    }

    async fn recv(rx: &mut mpsc::Receiver<VoteUpdate>) -> VoteUpdate {
        timeout(Duration::from_secs(1), rx.recv())
            .await
            .expect("no update within 1s")
            .expect("sink closed")
    }

    async fn expect_silence(rx: &mut mpsc::Receiver<VoteUpdate>) {
        assert!(timeout(Duration::from_millis(100), rx.recv()).await.is_err());
    }

    #[tokio::test]
    async fn fans_out_to_every_observer_of_the_poll() {
        let registry = Arc::new(SubscriptionRegistry::new());
        let queue = spawn_dispatcher(registry.clone());

        let (tx_a, mut rx_a) = mpsc::channel(8);
        let (tx_b, mut rx_b) = mpsc::channel(8);
        let (tx_c, mut rx_c) = mpsc::channel(8);

        let a = Uuid::new_v4();
        let b = Uuid::new_v4();
        let c = Uuid::new_v4();

        registry.connect(a, tx_a);
        registry.join(a, "poll-1");
        registry.connect(b, tx_b);
        registry.join(b, "poll-1");
        registry.connect(c, tx_c);
        registry.join(c, "poll-2");

        queue.publish(update("poll-1", 1));

        assert_eq!(recv(&mut rx_a).await.poll_id, "poll-1");
        assert_eq!(recv(&mut rx_b).await.poll_id, "poll-1");
        expect_silence(&mut rx_c).await;
    }

    #[tokio::test]
    async fn delivers_updates_in_publish_order() {
        let registry = Arc::new(SubscriptionRegistry::new());
        let queue = spawn_dispatcher(registry.clone());

        let (tx, mut rx) = mpsc::channel(8);
        let conn = Uuid::new_v4();
        registry.connect(conn, tx);
        registry.join(conn, "poll-1");

        for votes in 1..=3 {
            queue.publish(update("poll-1", votes));
        }

        for votes in 1..=3 {
            assert_eq!(recv(&mut rx).await.results[0].vote_count, votes);
        }
    }

    #[tokio::test]
    async fn slow_observer_does_not_stall_the_rest() {
        let registry = Arc::new(SubscriptionRegistry::new());
        let queue = spawn_dispatcher(registry.clone());

        // Capacity 1 and never drained: the second publish overflows it.
        let (tx_slow, _rx_slow) = mpsc::channel(1);
        let (tx_fast, mut rx_fast) = mpsc::channel(8);

        let slow = Uuid::new_v4();
        let fast = Uuid::new_v4();
        registry.connect(slow, tx_slow);
        registry.join(slow, "poll-1");
        registry.connect(fast, tx_fast);
        registry.join(fast, "poll-1");

        queue.publish(update("poll-1", 1));
        queue.publish(update("poll-1", 2));

        assert_eq!(recv(&mut rx_fast).await.results[0].vote_count, 1);
        assert_eq!(recv(&mut rx_fast).await.results[0].vote_count, 2);
    }

    #[tokio::test]
    async fn disconnected_observer_receives_nothing() {
        let registry = Arc::new(SubscriptionRegistry::new());
        let queue = spawn_dispatcher(registry.clone());

        let (tx, mut rx) = mpsc::channel(8);
        let conn = Uuid::new_v4();
        registry.connect(conn, tx);
        registry.join(conn, "poll-1");
        registry.on_disconnect(conn);

        queue.publish(update("poll-1", 1));

        expect_silence(&mut rx).await;
    }

    #[test]
    fn update_serializes_with_camel_case_fields() {
        let value = serde_json::to_value(update("poll-1", 2)).unwrap();

        assert_eq!(value["pollId"], "poll-1");
        assert_eq!(value["results"][0]["voteCount"], 2);
    }
}
