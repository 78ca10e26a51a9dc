//! Decision model: what happens to an entry after one delivery attempt.
//!
//! This module defines the Decision type and the Decider trait. Deciders are
//! pure: given the entry (before the attempt) and the classified outcome they
//! return the next action. Applying it (removing, counting, persisting) is the
//! queue's job.

use super::entry::QueueEntry;
use super::outcome::DeliveryOutcome;
use crate::queue::RetryPolicy;

/// The next action for an entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Delivered: remove and count.
    Remove,

    /// Give up: remove and report `reason` to the user once.
    Drop { reason: String },

    /// Keep in place with `attempts + 1`.
    Retain { reason: String },
}

/// Trait for deciding the next action based on entry state and outcome.
pub trait Decider: Send + Sync {
    fn decide(&self, entry: &QueueEntry, outcome: &DeliveryOutcome) -> Decision;
}

/// Default decider.
///
/// - Delivered → Remove
/// - Permanent → Drop with the server's reason
/// - Transient → Retain, unless the retry ceiling is reached → Drop
#[derive(Debug, Clone, Default)]
pub struct DefaultDecider {
    retry_policy: RetryPolicy,
}

impl DefaultDecider {
    pub fn new(retry_policy: RetryPolicy) -> Self {
        Self { retry_policy }
    }

    pub fn retry_policy(&self) -> &RetryPolicy {
        &self.retry_policy
    }
}

impl Decider for DefaultDecider {
    fn decide(&self, entry: &QueueEntry, outcome: &DeliveryOutcome) -> Decision {
        match outcome {
            DeliveryOutcome::Delivered(_) => Decision::Remove,
            DeliveryOutcome::Permanent { reason, .. } => Decision::Drop {
                reason: reason.clone(),
            },
            DeliveryOutcome::Transient { reason } => {
                let attempts = entry.attempts.saturating_add(1);
                if self.retry_policy.is_exhausted(attempts) {
                    Decision::Drop {
                        reason: format!("gave up after {attempts} attempts: {reason}"),
                    }
                } else {
                    Decision::Retain {
                        reason: reason.clone(),
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{EntryId, OrderLine, OrderPayload, SubmissionReceipt};
    use chrono::Utc;
    use ulid::Ulid;

    fn entry_with_attempts(attempts: u32) -> QueueEntry {
        let mut entry = QueueEntry::new(
            EntryId::from_ulid(Ulid::new()),
            Utc::now(),
            OrderPayload::new("", vec![OrderLine::new("A-1", 1)]),
        );
        entry.attempts = attempts;
        entry
    }

    fn transient() -> DeliveryOutcome {
        DeliveryOutcome::Transient {
            reason: "HTTP 503".into(),
        }
    }

    #[test]
    fn delivered_is_removed() {
        let decider = DefaultDecider::default();
        let outcome = DeliveryOutcome::Delivered(SubmissionReceipt::default());
        assert_eq!(decider.decide(&entry_with_attempts(0), &outcome), Decision::Remove);
    }

    #[test]
    fn permanent_is_dropped_with_server_reason() {
        let decider = DefaultDecider::default();
        let outcome = DeliveryOutcome::Permanent {
            status: 400,
            reason: "insufficient quantity".into(),
        };
        assert_eq!(
            decider.decide(&entry_with_attempts(0), &outcome),
            Decision::Drop {
                reason: "insufficient quantity".into()
            }
        );
    }

    #[test]
    fn transient_is_retained_without_ceiling() {
        let decider = DefaultDecider::default();
        let decision = decider.decide(&entry_with_attempts(1_000), &transient());
        assert!(matches!(decision, Decision::Retain { .. }));
    }

    #[test]
    fn transient_is_dropped_at_ceiling() {
        let decider = DefaultDecider::new(RetryPolicy::with_max_attempts(3));

        assert!(matches!(
            decider.decide(&entry_with_attempts(1), &transient()),
            Decision::Retain { .. }
        ));

        // 3 回目の失敗で打ち切り
        match decider.decide(&entry_with_attempts(2), &transient()) {
            Decision::Drop { reason } => assert!(reason.starts_with("gave up after 3 attempts")),
            other => panic!("expected drop, got {other:?}"),
        }
    }
}
