//! Events - キューが外部（UI 層）に通知するイベント
//!
//! キュー本体は UI を持たないので、状態変化はすべてここを通して EventSink に流す。

use serde::Serialize;

use super::ids::EntryId;

/// QueueEvent はキューで発生したイベント
///
/// # 通知の保証
/// - `Dropped`: drop されたエントリごとにちょうど 1 回
/// - `FlushCompleted`: 完了した flush pass ごとに 1 回（空キューの flush では出ない）
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum QueueEvent {
    /// 注文がローカルに保存された
    Enqueued { id: EntryId, pending: usize },

    /// 接続状態が変わった
    ConnectivityChanged { online: bool, pending: usize },

    /// flush pass が始まった（同期中インジケータ用）
    SyncStarted { pending: usize },

    /// 恒久的な失敗で破棄された（ユーザーに理由を伝える）
    Dropped { id: EntryId, reason: String },

    /// flush pass が完了した（サマリ通知用）
    FlushCompleted {
        delivered: usize,
        dropped: usize,
        remaining: usize,
    },

    /// flush 後の書き戻しに失敗した（pre-flush 状態を維持）
    PersistFailed { reason: String },

    /// 手動で全件削除された
    Cleared { removed: usize },
}
