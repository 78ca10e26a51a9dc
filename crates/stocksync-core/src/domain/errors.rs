//! Errors - エラー型と分類
//!
//! - `StoreError`: 永続化メディア（KeyValueStore）の失敗
//! - `SubmissionError`: サーバーへの配送の失敗（分類は `outcome` 側）
//! - `QueueError`: キュー操作が呼び出し元に返すエラー

use thiserror::Error;

use super::payload::PayloadError;

/// 永続化メディアのエラー
#[derive(Debug, Error)]
pub enum StoreError {
    /// 容量不足（書き込みは反映されていない）
    #[error("storage is full: {needed} bytes needed, {capacity} available")]
    Full { needed: usize, capacity: usize },

    /// メディアが使えない（権限、ディスク障害など）
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// 配送 1 回分の失敗
///
/// retry するか drop するかはここでは決めない（`DeliveryOutcome::classify` が決める）。
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    /// サーバーが応答し、失敗を報告した
    #[error("server rejected order (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    /// 応答が期待した JSON ではなかった
    #[error("unexpected response (HTTP {status}): {message}")]
    InvalidResponse { status: u16, message: String },

    /// 接続できない・応答がない
    #[error("transport error: {0}")]
    Transport(String),

    #[error("delivery attempt timed out")]
    Timeout,
}

/// キュー操作のエラー
#[derive(Debug, Error)]
pub enum QueueError {
    /// enqueue 境界での検証エラー（何もキューに入っていない）
    #[error("invalid order payload: {0}")]
    InvalidPayload(#[from] PayloadError),

    /// 永続化できなかった（enqueue なら未登録、flush なら pre-flush 状態を維持）
    #[error("failed to persist queue: {0}")]
    Persist(#[source] StoreError),

    /// 永続化済みの値が読めない
    #[error("persisted queue under key {key:?} is corrupt: {source}")]
    CorruptState {
        key: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("failed to encode queue: {0}")]
    Encode(#[source] serde_json::Error),
}

impl QueueError {
    /// 永続化メディアが原因か（UI で「ストレージがいっぱい」と出す判定用）
    pub fn is_storage_failure(&self) -> bool {
        matches!(self, QueueError::Persist(_))
    }
}
