//! EventSink port - キューのイベントを UI 層に届ける
//!
//! # 実装
//! - **TracingEventSink**: ログに出すだけ
//! - **BroadcastEventSink**: tokio broadcast で購読者に配る

use crate::domain::QueueEvent;

/// EventSink はキューのイベントを受け取る
///
/// # 設計原則
/// - 同期・非ブロッキング（キューのロック中に呼ばれることはない）
/// - 失敗してもキューの動作には影響しない
pub trait EventSink: Send + Sync {
    fn emit(&self, event: &QueueEvent);
}
