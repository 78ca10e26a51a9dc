//! InMemoryStore - テスト・デモ用の KeyValueStore
//!
//! # 特徴
//! - Clone しても同じ中身を共有する（「再起動」を新しいキューの構築で再現できる）
//! - 容量上限（バイト数）を設定できる → `StoreError::Full`
//! - 次の N 回の書き込みを失敗させられる → `StoreError::Unavailable`

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::domain::StoreError;
use crate::ports::KeyValueStore;

#[derive(Default)]
struct Inner {
    values: Mutex<HashMap<String, String>>,
    /// key + value の合計バイト数の上限
    capacity: Option<usize>,
    /// これから失敗させる書き込み回数
    failing_writes: AtomicU32,
    writes: AtomicUsize,
}

/// InMemoryStore は HashMap ベースの KeyValueStore
#[derive(Clone, Default)]
pub struct InMemoryStore {
    inner: Arc<Inner>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 容量上限つきで作成
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            inner: Arc::new(Inner {
                capacity: Some(capacity),
                ..Inner::default()
            }),
        }
    }

    /// 次の `n` 回の `set` を失敗させる
    pub fn fail_next_writes(&self, n: u32) {
        self.inner.failing_writes.store(n, Ordering::SeqCst);
    }

    /// 成功した書き込みの回数
    pub fn write_count(&self) -> usize {
        self.inner.writes.load(Ordering::SeqCst)
    }

    fn values(&self) -> MutexGuard<'_, HashMap<String, String>> {
        self.inner
            .values
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn take_injected_failure(&self) -> bool {
        self.inner
            .failing_writes
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok()
    }
}

impl KeyValueStore for InMemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        Ok(self.values().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.take_injected_failure() {
            return Err(StoreError::Unavailable("injected write failure".to_string()));
        }

        let mut values = self.values();
        if let Some(capacity) = self.inner.capacity {
            let others: usize = values
                .iter()
                .filter(|(k, _)| k.as_str() != key)
                .map(|(k, v)| k.len() + v.len())
                .sum();
            let needed = others + key.len() + value.len();
            if needed > capacity {
                return Err(StoreError::Full { needed, capacity });
            }
        }

        values.insert(key.to_string(), value.to_string());
        self.inner.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get() {
        let store = InMemoryStore::new();
        assert_eq!(store.get("k").unwrap(), None);

        store.set("k", "v").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
        assert_eq!(store.write_count(), 1);
    }

    #[test]
    fn clones_share_contents() {
        let store = InMemoryStore::new();
        let other = store.clone();
        store.set("k", "v").unwrap();
        assert_eq!(other.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn capacity_is_enforced_and_value_is_kept() {
        let store = InMemoryStore::with_capacity(10);
        store.set("k", "1234").unwrap();

        let err = store.set("k", "0123456789").unwrap_err();
        assert!(matches!(err, StoreError::Full { capacity: 10, .. }));
        assert_eq!(store.get("k").unwrap().as_deref(), Some("1234"));
    }

    #[test]
    fn injected_failures_are_consumed() {
        let store = InMemoryStore::new();
        store.fail_next_writes(2);

        assert!(store.set("k", "a").is_err());
        assert!(store.set("k", "b").is_err());
        store.set("k", "c").unwrap();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("c"));
    }
}
