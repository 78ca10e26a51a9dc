//! Impls - ports の実装
//!
//! # 含まれる実装
//! - **InMemoryStore**: テスト・デモ用の永続化メディア
//! - **FileStore**: ファイルベースの永続化メディア
//! - **HttpSubmissionService**: confirm-products API への送信
//! - **TracingEventSink / BroadcastEventSink**: イベント通知

pub mod event_sinks;
pub mod file_store;
pub mod http_submission;
pub mod inmem_store;

pub use self::event_sinks::{BroadcastEventSink, TracingEventSink};
pub use self::file_store::FileStore;
pub use self::http_submission::HttpSubmissionService;
pub use self::inmem_store::InMemoryStore;
