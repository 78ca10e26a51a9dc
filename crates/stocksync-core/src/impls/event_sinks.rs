//! EventSink implementations.

use tokio::sync::broadcast;

use crate::domain::QueueEvent;
use crate::ports::EventSink;

/// Writes every event as a structured log line.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl EventSink for TracingEventSink {
    fn emit(&self, event: &QueueEvent) {
        match event {
            QueueEvent::Enqueued { id, pending } => {
                tracing::info!(entry_id = %id, pending, "order saved locally, will be sent when back online");
            }
            QueueEvent::ConnectivityChanged { online, pending } => {
                if *online {
                    tracing::info!(pending, "online, ready to sync");
                } else {
                    tracing::info!(pending, "offline, orders will be queued");
                }
            }
            QueueEvent::SyncStarted { pending } => {
                tracing::info!(pending, "syncing offline orders");
            }
            QueueEvent::Dropped { id, reason } => {
                tracing::warn!(entry_id = %id, %reason, "offline order dropped");
            }
            QueueEvent::FlushCompleted {
                delivered,
                dropped,
                remaining,
            } => {
                tracing::info!(delivered, dropped, remaining, "sync pass finished");
            }
            QueueEvent::PersistFailed { reason } => {
                tracing::error!(%reason, "could not save offline queue after sync");
            }
            QueueEvent::Cleared { removed } => {
                tracing::info!(removed, "offline queue cleared");
            }
        }
    }
}

/// Fans events out to any number of subscribers (the presentation layer).
///
/// Slow subscribers lose the oldest events (`RecvError::Lagged`); the queue
/// itself never waits on them.
#[derive(Debug, Clone)]
pub struct BroadcastEventSink {
    tx: broadcast::Sender<QueueEvent>,
}

impl BroadcastEventSink {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<QueueEvent> {
        self.tx.subscribe()
    }
}

impl Default for BroadcastEventSink {
    fn default() -> Self {
        Self::new(64)
    }
}

impl EventSink for BroadcastEventSink {
    fn emit(&self, event: &QueueEvent) {
        // 購読者がいなければ捨てる
        let _ = self.tx.send(event.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn broadcast_reaches_every_subscriber() {
        let sink = BroadcastEventSink::new(8);
        let mut a = sink.subscribe();
        let mut b = sink.subscribe();

        sink.emit(&QueueEvent::Cleared { removed: 2 });

        assert_eq!(a.recv().await.unwrap(), QueueEvent::Cleared { removed: 2 });
        assert_eq!(b.recv().await.unwrap(), QueueEvent::Cleared { removed: 2 });
    }

    #[test]
    fn emit_without_subscribers_is_fine() {
        let sink = BroadcastEventSink::default();
        sink.emit(&QueueEvent::SyncStarted { pending: 1 });
        TracingEventSink.emit(&QueueEvent::SyncStarted { pending: 1 });
    }
}
