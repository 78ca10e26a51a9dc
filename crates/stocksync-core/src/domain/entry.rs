//! Queue entry: one pending order + delivery bookkeeping.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ids::EntryId;
use super::payload::OrderPayload;

/// One pending order awaiting delivery.
///
/// Design:
/// - The whole queue is persisted as a JSON array of these.
/// - `attempts` is informational; the retry ceiling (if any) lives in `RetryPolicy`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueEntry {
    pub id: EntryId,

    /// When the order was parked.
    #[serde(rename = "timestamp")]
    pub created_at: DateTime<Utc>,

    #[serde(rename = "data")]
    pub payload: OrderPayload,

    /// Failed retryable delivery attempts so far.
    #[serde(default)]
    pub attempts: u32,

    /// Reason of the most recent transient failure.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_error: Option<String>,
}

impl QueueEntry {
    pub fn new(id: EntryId, created_at: DateTime<Utc>, payload: OrderPayload) -> Self {
        Self {
            id,
            created_at,
            payload,
            attempts: 0,
            last_error: None,
        }
    }

    /// Pending -> Pending (transient failure).
    pub fn record_transient_failure(&mut self, reason: impl Into<String>) {
        self.attempts = self.attempts.saturating_add(1);
        self.last_error = Some(reason.into());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::OrderLine;
    use chrono::TimeZone;
    use ulid::Ulid;

    fn sample() -> QueueEntry {
        let at = Utc.with_ymd_and_hms(2024, 1, 1, 12, 0, 0).unwrap();
        QueueEntry::new(
            EntryId::from_ulid(Ulid::new()),
            at,
            OrderPayload::new("Sami", vec![OrderLine::new("A-12", 3)]),
        )
    }

    #[test]
    fn new_entry_has_zero_attempts() {
        let entry = sample();
        assert_eq!(entry.attempts, 0);
        assert!(entry.last_error.is_none());
    }

    #[test]
    fn transient_failure_increments_attempts() {
        let mut entry = sample();
        entry.record_transient_failure("HTTP 503");
        entry.record_transient_failure("timeout");

        assert_eq!(entry.attempts, 2);
        assert_eq!(entry.last_error.as_deref(), Some("timeout"));
    }

    #[test]
    fn persisted_shape_uses_timestamp_and_data_keys() {
        let entry = sample();
        let json = serde_json::to_value(&entry).unwrap();

        assert!(json.get("timestamp").is_some());
        assert_eq!(json["data"]["recipient_name"], "Sami");
        assert_eq!(json["attempts"], 0);
        assert!(json.get("last_error").is_none());

        let back: QueueEntry = serde_json::from_value(json).unwrap();
        assert_eq!(back, entry);
    }
}
