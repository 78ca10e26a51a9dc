//! Domain identifiers (strongly-typed IDs).
//!
//! # ULID ベースの ID
//! キューのエントリ ID は ULID (Universally Unique Lexicographically Sortable Identifier) です。
//! Phantom type パターンで `EntryId` と `PassId` を取り違えられないようにしています。
//!
//! ## ULID の特性
//! - **時刻でソート可能**: enqueue 順と ID 順がほぼ一致する
//! - **再起動をまたいで安定**: 永続化フォーマットは ULID 文字列そのもの

use serde::{Deserialize, Serialize};
use std::fmt;
use std::marker::PhantomData;
use ulid::Ulid;

/// IdMarker は各 ID 型のマーカー trait
///
/// Display で使うプレフィックス（"entry-", "pass-"）を提供します。
pub trait IdMarker: Send + Sync + 'static {
    fn prefix() -> &'static str;
}

/// ジェネリック ID 型
///
/// 永続化時は ULID 文字列だけを書き出します（`#[serde(transparent)]`）。
#[repr(transparent)]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Id<T: IdMarker> {
    ulid: Ulid,
    #[serde(skip)]
    _marker: PhantomData<T>,
}

impl<T: IdMarker> Id<T> {
    /// ULID から Id を作成
    pub fn from_ulid(ulid: Ulid) -> Self {
        Self {
            ulid,
            _marker: PhantomData,
        }
    }

    /// 内部の ULID を取得
    pub fn as_ulid(&self) -> Ulid {
        self.ulid
    }
}

impl<T: IdMarker> From<Ulid> for Id<T> {
    fn from(ulid: Ulid) -> Self {
        Self::from_ulid(ulid)
    }
}

impl<T: IdMarker> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", T::prefix(), self.ulid)
    }
}

// ========================================
// マーカー型の定義
// ========================================

/// Entry のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Entry {}

impl IdMarker for Entry {
    fn prefix() -> &'static str {
        "entry-"
    }
}

/// Flush pass のマーカー型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Pass {}

impl IdMarker for Pass {
    fn prefix() -> &'static str {
        "pass-"
    }
}

/// Identifier of a queued order (stable across reloads).
pub type EntryId = Id<Entry>;

/// Identifier of one flush pass (log correlation only, never persisted).
pub type PassId = Id<Pass>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_uses_prefix() {
        let ulid = Ulid::new();
        let entry = EntryId::from_ulid(ulid);
        let pass = PassId::from_ulid(ulid);

        assert_eq!(entry.to_string(), format!("entry-{ulid}"));
        assert_eq!(pass.to_string(), format!("pass-{ulid}"));
    }

    #[test]
    fn entry_id_serializes_as_plain_ulid_string() {
        let ulid = Ulid::new();
        let id = EntryId::from_ulid(ulid);

        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, format!("\"{ulid}\""));

        // 再読み込みしても同じ ID
        let back: EntryId = serde_json::from_str(&json).unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn ulid_ids_are_sortable() {
        let id1 = EntryId::from_ulid(Ulid::new());
        std::thread::sleep(std::time::Duration::from_millis(2));
        let id2 = EntryId::from_ulid(Ulid::new());

        assert!(id1 < id2);
    }

    #[test]
    fn phantom_data_does_not_consume_memory() {
        use std::mem::size_of;
        assert_eq!(size_of::<EntryId>(), size_of::<Ulid>());
        assert_eq!(size_of::<PassId>(), size_of::<Ulid>());
    }
}
