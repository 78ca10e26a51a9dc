//! stocksync-core
//!
//! Offline order queue for the warehouse inventory client.
//!
//! 注文確定（confirm-products）がネットワーク不通や一時的な失敗で完了できなかったとき、
//! 注文をローカルに永続化し、接続が戻ったら FIFO で再送する。
//!
//! # モジュール構成
//! - **domain**: ドメインモデル（ids, payload, entry, outcome, decision, events, errors）
//! - **ports**: 抽象化レイヤー（KeyValueStore, OrderSubmissionService, EventSink, Clock, IdGenerator）
//! - **queue**: OfflineOrderQueue 本体（flush pass, retry policy）
//! - **app**: 構築（QueueBuilder）と表示モデル（QueueStatus）
//! - **impls**: ports の実装（InMemoryStore, FileStore, HttpSubmissionService, event sinks）
//! - **config**: 設定の読み込み

pub mod app;
pub mod config;
pub mod domain;
pub mod impls;
pub mod ports;
pub mod queue;

#[cfg(test)]
pub(crate) mod testing;

pub use app::{BuildError, Indicator, QueueBuilder, QueueStatus};
pub use config::SyncConfig;
pub use domain::{OrderLine, OrderPayload, QueueEntry, QueueError, QueueEvent};
pub use queue::{FlushReport, OfflineOrderQueue, RetryPolicy};
