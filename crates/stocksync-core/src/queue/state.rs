//! Entry state machine for one flush pass.

use serde::Serialize;

use crate::domain::EntryId;

/// Where an entry ended up after a delivery attempt.
///
/// State transitions:
/// - Pending -> Delivered (removed)
/// - Pending -> Dropped (removed, permanent failure or retry ceiling)
/// - Pending -> Pending (attempts + 1, kept in place)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum EntryState {
    Pending { reason: String },
    Delivered { order_number: Option<String> },
    Dropped { reason: String },
}

impl EntryState {
    /// Is the entry gone from the queue?
    pub fn is_terminal(&self) -> bool {
        matches!(self, EntryState::Delivered { .. } | EntryState::Dropped { .. })
    }
}

/// Result of one attempt within a pass, in FIFO order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryResult {
    pub id: EntryId,
    #[serde(flatten)]
    pub state: EntryState,
}

/// Summary of one flush pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FlushReport {
    /// Another pass was already running; nothing was attempted.
    pub skipped: bool,
    pub delivered: usize,
    pub dropped: usize,
    /// Entries left in the queue after the pass (including ones enqueued meanwhile).
    pub remaining: usize,
    pub results: Vec<EntryResult>,
}

impl FlushReport {
    pub(crate) fn skipped() -> Self {
        Self {
            skipped: true,
            ..Self::default()
        }
    }

    pub(crate) fn empty() -> Self {
        Self::default()
    }

    /// Entry ids in the order delivery was attempted.
    pub fn attempted(&self) -> Vec<EntryId> {
        self.results.iter().map(|r| r.id).collect()
    }
}
