//! Test doubles shared by the queue tests.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::domain::{OrderLine, OrderPayload, QueueEvent, SubmissionError, SubmissionReceipt};
use crate::ports::{EventSink, OrderSubmissionService};

/// One scripted server reaction.
#[derive(Debug, Clone)]
pub enum Reply {
    Accept,
    Reject(u16),
    NetworkDown,
    /// Never answers (exercises the per-attempt timeout).
    Hang,
}

#[derive(Default)]
struct ScriptState {
    replies: VecDeque<Reply>,
    /// recipient_name of every submitted payload, in call order
    calls: Vec<String>,
    in_flight: usize,
    max_in_flight: usize,
}

/// Submission service that replays a script; defaults to `Accept` when the
/// script runs out.
#[derive(Clone, Default)]
pub struct ScriptedService {
    state: Arc<Mutex<ScriptState>>,
    gate: Option<Arc<Notify>>,
}

impl ScriptedService {
    pub fn new(replies: impl IntoIterator<Item = Reply>) -> Self {
        let service = Self::default();
        service.state.lock().unwrap().replies = replies.into_iter().collect();
        service
    }

    /// Every submission waits for `gate.notify_one()` before answering.
    pub fn gated(replies: impl IntoIterator<Item = Reply>, gate: Arc<Notify>) -> Self {
        Self {
            gate: Some(gate),
            ..Self::new(replies)
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn max_in_flight(&self) -> usize {
        self.state.lock().unwrap().max_in_flight
    }
}

#[async_trait]
impl OrderSubmissionService for ScriptedService {
    async fn submit(&self, payload: &OrderPayload) -> Result<SubmissionReceipt, SubmissionError> {
        let reply = {
            let mut state = self.state.lock().unwrap();
            state.calls.push(payload.recipient_name.clone());
            state.in_flight += 1;
            state.max_in_flight = state.max_in_flight.max(state.in_flight);
            state.replies.pop_front().unwrap_or(Reply::Accept)
        };

        if let Some(gate) = &self.gate {
            gate.notified().await;
        }

        let result = match reply {
            Reply::Accept => Ok(SubmissionReceipt {
                order_number: Some(format!("ORD-{}", payload.recipient_name)),
                message: None,
            }),
            Reply::Reject(status) => Err(SubmissionError::Rejected {
                status,
                message: format!("rejected with {status}"),
            }),
            Reply::NetworkDown => Err(SubmissionError::Transport("connection refused".into())),
            Reply::Hang => std::future::pending().await,
        };

        self.state.lock().unwrap().in_flight -= 1;
        result
    }
}

/// Records every event it sees.
#[derive(Clone, Default)]
pub struct RecordingSink {
    events: Arc<Mutex<Vec<QueueEvent>>>,
}

impl RecordingSink {
    pub fn events(&self) -> Vec<QueueEvent> {
        self.events.lock().unwrap().clone()
    }

    pub fn dropped(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                QueueEvent::Dropped { reason, .. } => Some(reason),
                _ => None,
            })
            .collect()
    }

    pub fn flush_summaries(&self) -> Vec<usize> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                QueueEvent::FlushCompleted { delivered, .. } => Some(delivered),
                _ => None,
            })
            .collect()
    }
}

impl EventSink for RecordingSink {
    fn emit(&self, event: &QueueEvent) {
        self.events.lock().unwrap().push(event.clone());
    }
}

/// Order whose recipient name doubles as a label in assertions.
pub fn order(label: &str) -> OrderPayload {
    OrderPayload::new(label, vec![OrderLine::new("A-12", 1)])
}
