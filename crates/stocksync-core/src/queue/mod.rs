//! Queue module: the offline order queue, its flush pass and retry policy.

mod offline;
mod retry;
mod state;

pub use offline::OfflineOrderQueue;
pub use retry::RetryPolicy;
pub use state::{EntryResult, EntryState, FlushReport};

pub(crate) use offline::{QueueParts, load_entries};
