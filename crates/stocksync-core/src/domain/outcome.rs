//! Outcome model: classification of one delivery attempt.
//!
//! The server contract is HTTP-shaped: 4xx (except 408 Request Timeout and
//! 429 Too Many Requests) means the order itself is invalid and will never
//! succeed on retry. Everything else is worth retrying.

use serde::{Deserialize, Serialize};

use super::errors::SubmissionError;

/// What the server returned for a confirmed order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionReceipt {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_number: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Classification of an attempt result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The server accepted the order.
    Delivered(SubmissionReceipt),

    /// The request is invalid; retrying cannot help.
    Permanent { status: u16, reason: String },

    /// Network/server unavailability; may succeed later.
    Transient { reason: String },
}

/// Is this HTTP status a permanent (client-side) failure?
pub fn is_permanent_status(status: u16) -> bool {
    (400..500).contains(&status) && status != 408 && status != 429
}

impl DeliveryOutcome {
    /// Map a raw submission result onto the retry/drop policy.
    pub fn classify(result: Result<SubmissionReceipt, SubmissionError>) -> Self {
        match result {
            Ok(receipt) => DeliveryOutcome::Delivered(receipt),
            Err(SubmissionError::Rejected { status, message }) if is_permanent_status(status) => {
                DeliveryOutcome::Permanent {
                    status,
                    reason: message,
                }
            }
            Err(err) => DeliveryOutcome::Transient {
                reason: err.to_string(),
            },
        }
    }

    pub fn is_delivered(&self) -> bool {
        matches!(self, DeliveryOutcome::Delivered(_))
    }
}
