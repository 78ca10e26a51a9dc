//! Domain model (IDs, payload, entries, outcomes, decisions, events, errors).

pub mod decision;
pub mod entry;
pub mod errors;
pub mod events;
pub mod ids;
pub mod outcome;
pub mod payload;

pub use decision::{Decider, Decision, DefaultDecider};
pub use entry::QueueEntry;
pub use errors::{QueueError, StoreError, SubmissionError};
pub use events::QueueEvent;
pub use ids::{EntryId, PassId};
pub use outcome::{DeliveryOutcome, SubmissionReceipt, is_permanent_status};
pub use payload::{OrderLine, OrderPayload, PayloadError};
