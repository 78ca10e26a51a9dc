//! Offline order queue: durable FIFO of orders + policy-driven replay.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::time::Duration;

use tokio::sync::Mutex;
use tracing::Instrument;

use super::state::{EntryResult, EntryState, FlushReport};
use crate::app::status::QueueStatus;
use crate::domain::{
    Decider, Decision, DeliveryOutcome, OrderPayload, QueueEntry, QueueError, QueueEvent,
    SubmissionError,
};
use crate::ports::{Clock, EventSink, IdGenerator, KeyValueStore, OrderSubmissionService};

/// Pause between end-of-pass rewrite attempts.
const PERSIST_RETRY_DELAY: Duration = Duration::from_millis(50);

/// Wiring handed over by `QueueBuilder`.
pub(crate) struct QueueParts {
    pub storage_key: String,
    pub store: Arc<dyn KeyValueStore>,
    pub submitter: Arc<dyn OrderSubmissionService>,
    pub decider: Arc<dyn Decider>,
    pub clock: Arc<dyn Clock>,
    pub ids: Arc<dyn IdGenerator>,
    pub sinks: Vec<Arc<dyn EventSink>>,
    pub attempt_timeout: Duration,
    pub persist_attempts: u32,
    pub online: bool,
}

/// Read the persisted queue.
///
/// A missing key is an empty queue. An unreadable value is an error unless
/// `discard_corrupt` is set.
pub(crate) fn load_entries(
    store: &dyn KeyValueStore,
    key: &str,
    discard_corrupt: bool,
) -> Result<Vec<QueueEntry>, QueueError> {
    let Some(raw) = store.get(key).map_err(QueueError::Persist)? else {
        return Ok(Vec::new());
    };

    match serde_json::from_str::<Vec<QueueEntry>>(&raw) {
        Ok(entries) => Ok(entries),
        Err(source) if discard_corrupt => {
            tracing::warn!(key, error = %source, "stored offline queue is unreadable, starting empty");
            Ok(Vec::new())
        }
        Err(source) => Err(QueueError::CorruptState {
            key: key.to_string(),
            source,
        }),
    }
}

/// Clears the in-flight flag when a pass ends (including early returns).
struct FlushGuard<'a> {
    flag: &'a AtomicBool,
}

impl<'a> FlushGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| Self { flag })
    }
}

impl Drop for FlushGuard<'_> {
    fn drop(&mut self) {
        self.flag.store(false, Ordering::Release);
    }
}

/// Durable, ordered holding area for orders that could not be confirmed live.
///
/// Design:
/// - The in-memory `Vec` is committed only after the store accepted the
///   serialized queue, so persisted state never lags behind memory.
/// - The entry lock is never held across a delivery attempt; `enqueue` works
///   during a flush and its entry lands in the next pass.
/// - At most one flush pass runs at a time; overlapping calls are skipped.
pub struct OfflineOrderQueue {
    storage_key: String,
    store: Arc<dyn KeyValueStore>,
    submitter: Arc<dyn OrderSubmissionService>,
    decider: Arc<dyn Decider>,
    clock: Arc<dyn Clock>,
    ids: Arc<dyn IdGenerator>,
    sinks: Vec<Arc<dyn EventSink>>,
    attempt_timeout: Duration,
    persist_attempts: u32,

    entries: Mutex<Vec<QueueEntry>>,
    pending: AtomicUsize,
    online: AtomicBool,
    flushing: AtomicBool,
}

impl OfflineOrderQueue {
    pub(crate) fn new(parts: QueueParts, entries: Vec<QueueEntry>) -> Self {
        Self {
            storage_key: parts.storage_key,
            store: parts.store,
            submitter: parts.submitter,
            decider: parts.decider,
            clock: parts.clock,
            ids: parts.ids,
            sinks: parts.sinks,
            attempt_timeout: parts.attempt_timeout,
            persist_attempts: parts.persist_attempts.max(1),
            pending: AtomicUsize::new(entries.len()),
            entries: Mutex::new(entries),
            online: AtomicBool::new(parts.online),
            flushing: AtomicBool::new(false),
        }
    }

    /// Park an order. Returns once the entry is durable.
    ///
    /// On storage failure nothing is queued and the error is returned.
    pub async fn enqueue(&self, payload: OrderPayload) -> Result<QueueEntry, QueueError> {
        let payload = payload.normalized()?;
        let entry = QueueEntry::new(self.ids.generate_entry_id(), self.clock.now(), payload);

        let pending = {
            let mut entries = self.entries.lock().await;
            entries.push(entry.clone());
            if let Err(e) = self.persist(&entries) {
                entries.pop();
                tracing::error!(entry_id = %entry.id, error = %e, "could not save order locally");
                return Err(e);
            }
            self.pending.store(entries.len(), Ordering::Release);
            entries.len()
        };

        tracing::debug!(
            entry_id = %entry.id,
            lines = entry.payload.products.len(),
            quantity = entry.payload.total_quantity(),
            "order queued"
        );
        self.emit(&QueueEvent::Enqueued {
            id: entry.id,
            pending,
        });
        Ok(entry)
    }

    /// Run one delivery pass over the entries queued right now.
    ///
    /// Returns immediately with `skipped = true` if a pass is already running,
    /// and with an empty report if there is nothing to send.
    pub async fn flush(&self) -> Result<FlushReport, QueueError> {
        let Some(_guard) = FlushGuard::acquire(&self.flushing) else {
            tracing::debug!("flush already in progress, ignoring");
            return Ok(FlushReport::skipped());
        };

        let snapshot = self.entries.lock().await.clone();
        if snapshot.is_empty() {
            return Ok(FlushReport::empty());
        }

        let pass_id = self.ids.generate_pass_id();
        let span = tracing::info_span!("flush", pass_id = %pass_id, pending = snapshot.len());
        self.run_pass(snapshot).instrument(span).await
    }

    async fn run_pass(&self, snapshot: Vec<QueueEntry>) -> Result<FlushReport, QueueError> {
        self.emit(&QueueEvent::SyncStarted {
            pending: snapshot.len(),
        });

        // 1) FIFO で 1 件ずつ配送（並列にしない）
        let mut decisions = Vec::with_capacity(snapshot.len());
        for entry in &snapshot {
            let result = match tokio::time::timeout(
                self.attempt_timeout,
                self.submitter.submit(&entry.payload),
            )
            .await
            {
                Ok(result) => result,
                Err(_) => Err(SubmissionError::Timeout),
            };

            let outcome = DeliveryOutcome::classify(result);
            let decision = self.decider.decide(entry, &outcome);
            match &decision {
                Decision::Remove => {
                    tracing::info!(entry_id = %entry.id, "offline order delivered");
                }
                Decision::Drop { reason } => {
                    tracing::warn!(entry_id = %entry.id, %reason, "offline order rejected");
                }
                Decision::Retain { reason } => {
                    tracing::warn!(
                        entry_id = %entry.id,
                        attempts = entry.attempts.saturating_add(1),
                        %reason,
                        "offline order kept for retry"
                    );
                }
            }
            let state = match &decision {
                Decision::Remove => EntryState::Delivered {
                    order_number: match outcome {
                        DeliveryOutcome::Delivered(receipt) => receipt.order_number,
                        _ => None,
                    },
                },
                Decision::Drop { reason } => EntryState::Dropped {
                    reason: reason.clone(),
                },
                Decision::Retain { reason } => EntryState::Pending {
                    reason: reason.clone(),
                },
            };
            decisions.push((entry.id, decision, state));
        }

        // 2) 書き戻し（pass 全体で 1 回）
        let by_id: HashMap<_, _> = decisions.iter().map(|(id, d, _)| (*id, d)).collect();
        let mut entries = self.entries.lock().await;
        let next: Vec<QueueEntry> = entries
            .iter()
            .filter_map(|entry| match by_id.get(&entry.id) {
                // pass 中に enqueue された分
                None => Some(entry.clone()),
                Some(Decision::Retain { reason }) => {
                    let mut entry = entry.clone();
                    entry.record_transient_failure(reason.as_str());
                    Some(entry)
                }
                Some(Decision::Remove) | Some(Decision::Drop { .. }) => None,
            })
            .collect();

        if let Err(e) = self.persist_with_retry(&next).await {
            drop(entries);
            tracing::error!(error = %e, "keeping pre-flush queue, delivered orders may be sent again");
            self.emit(&QueueEvent::PersistFailed {
                reason: e.to_string(),
            });
            return Err(e);
        }
        *entries = next;
        let remaining = entries.len();
        self.pending.store(remaining, Ordering::Release);
        drop(entries);

        // 3) 通知（コミット後にだけ出す）
        let mut report = FlushReport {
            remaining,
            ..FlushReport::default()
        };
        for (id, _, state) in decisions {
            match &state {
                EntryState::Delivered { .. } => report.delivered += 1,
                EntryState::Dropped { reason } => {
                    report.dropped += 1;
                    self.emit(&QueueEvent::Dropped {
                        id,
                        reason: reason.clone(),
                    });
                }
                EntryState::Pending { .. } => {}
            }
            report.results.push(EntryResult { id, state });
        }

        tracing::info!(
            delivered = report.delivered,
            dropped = report.dropped,
            remaining,
            "flush pass finished"
        );
        self.emit(&QueueEvent::FlushCompleted {
            delivered: report.delivered,
            dropped: report.dropped,
            remaining,
        });
        Ok(report)
    }

    /// Record a connectivity change reported by the host.
    ///
    /// An offline → online transition starts a flush and returns its report.
    pub async fn connectivity_changed(
        &self,
        online: bool,
    ) -> Result<Option<FlushReport>, QueueError> {
        let was_online = self.online.swap(online, Ordering::AcqRel);
        self.emit(&QueueEvent::ConnectivityChanged {
            online,
            pending: self.size(),
        });

        if online && !was_online {
            self.flush().await.map(Some)
        } else {
            Ok(None)
        }
    }

    /// Remove every pending entry. Returns how many were removed.
    pub async fn clear(&self) -> Result<usize, QueueError> {
        let removed = {
            let mut entries = self.entries.lock().await;
            self.persist(&[])?;
            let removed = entries.len();
            entries.clear();
            self.pending.store(0, Ordering::Release);
            removed
        };

        tracing::info!(removed, "offline queue cleared");
        self.emit(&QueueEvent::Cleared { removed });
        Ok(removed)
    }

    /// Current pending count.
    pub fn size(&self) -> usize {
        self.pending.load(Ordering::Acquire)
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    pub fn is_online(&self) -> bool {
        self.online.load(Ordering::Acquire)
    }

    /// Snapshot of the queued entries, FIFO order.
    pub async fn entries(&self) -> Vec<QueueEntry> {
        self.entries.lock().await.clone()
    }

    pub fn status(&self) -> QueueStatus {
        let pending = self.size();
        QueueStatus {
            online: self.is_online(),
            pending,
            syncing: self.flushing.load(Ordering::Acquire) && pending > 0,
        }
    }

    pub fn storage_key(&self) -> &str {
        &self.storage_key
    }

    fn persist(&self, entries: &[QueueEntry]) -> Result<(), QueueError> {
        let raw = serde_json::to_string(entries).map_err(QueueError::Encode)?;
        self.store
            .set(&self.storage_key, &raw)
            .map_err(QueueError::Persist)
    }

    async fn persist_with_retry(&self, entries: &[QueueEntry]) -> Result<(), QueueError> {
        let mut attempt = 1;
        loop {
            match self.persist(entries) {
                Ok(()) => return Ok(()),
                Err(e) if attempt < self.persist_attempts => {
                    tracing::warn!(attempt, error = %e, "saving offline queue failed, retrying");
                    attempt += 1;
                    tokio::time::sleep(PERSIST_RETRY_DELAY).await;
                }
                Err(e) => return Err(e),
            }
        }
    }

    fn emit(&self, event: &QueueEvent) {
        for sink in &self.sinks {
            sink.emit(event);
        }
    }
}
