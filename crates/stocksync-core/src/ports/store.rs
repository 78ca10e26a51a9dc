//! KeyValueStore port - 永続化メディア
//!
//! 文字列の key-value ストア。再起動をまたいで残り、容量に上限がある。
//! キューはエントリ一覧全体を 1 つの key に 1 つの JSON 値として保存する。
//!
//! # 実装
//! - **InMemoryStore**: テスト・デモ用（容量上限と障害注入つき）
//! - **FileStore**: key ごとに 1 ファイル（atomic replace）

use crate::domain::StoreError;

/// KeyValueStore は永続化メディアの抽象
///
/// # 設計原則
/// - 同期 API（書き込みが返った時点で durable）
/// - `set` が Err を返したら値は変わっていない
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError>;

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}
