//! QueueBuilder - キューの構築とワイヤリング
//!
//! グローバルなシングルトンは作らない。アプリ起動時に 1 つ構築して、
//! 必要な UI コードに参照（`Arc`）で渡す。テストでは独立したインスタンスを何個でも作れる。

use std::sync::Arc;
use std::time::Duration;

use crate::config::QueueConfig;
use crate::domain::{Decider, DefaultDecider, QueueError};
use crate::ports::{
    Clock, EventSink, IdGenerator, KeyValueStore, OrderSubmissionService, SystemClock,
    UlidGenerator,
};
use crate::queue::{OfflineOrderQueue, QueueParts, RetryPolicy, load_entries};

/// BuildError はキュー構築時のエラー
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("storage key must not be empty")]
    EmptyStorageKey,

    #[error("attempt timeout must be greater than zero")]
    ZeroAttemptTimeout,

    #[error("failed to load persisted queue: {0}")]
    Load(#[from] QueueError),
}

/// QueueBuilder は OfflineOrderQueue を構築
///
/// # 使用例
/// ```ignore
/// let queue = QueueBuilder::new(store, submitter)
///     .retry_policy(RetryPolicy::with_max_attempts(10))
///     .event_sink(TracingEventSink)
///     .build()?;
/// ```
///
/// # Fail-fast 設計
/// - 設定の矛盾は build() 時に BuildError
/// - 永続化済みの値が壊れていれば build() 時に BuildError::Load
pub struct QueueBuilder {
    store: Arc<dyn KeyValueStore>,
    submitter: Arc<dyn OrderSubmissionService>,
    storage_key: String,
    decider: Option<Arc<dyn Decider>>,
    retry_policy: RetryPolicy,
    clock: Arc<dyn Clock>,
    ids: Option<Arc<dyn IdGenerator>>,
    sinks: Vec<Arc<dyn EventSink>>,
    attempt_timeout: Duration,
    persist_attempts: u32,
    discard_corrupt_state: bool,
    online: bool,
}

impl QueueBuilder {
    pub fn new(
        store: impl KeyValueStore + 'static,
        submitter: impl OrderSubmissionService + 'static,
    ) -> Self {
        Self::from_shared(Arc::new(store), Arc::new(submitter))
    }

    /// Store / submitter を他と共有する場合
    pub fn from_shared(
        store: Arc<dyn KeyValueStore>,
        submitter: Arc<dyn OrderSubmissionService>,
    ) -> Self {
        let defaults = QueueConfig::default();
        Self {
            store,
            submitter,
            storage_key: defaults.storage_key.clone(),
            decider: None,
            retry_policy: RetryPolicy::indefinite(),
            clock: Arc::new(SystemClock),
            ids: None,
            sinks: Vec::new(),
            attempt_timeout: defaults.attempt_timeout(),
            persist_attempts: defaults.persist_attempts,
            discard_corrupt_state: defaults.discard_corrupt_state,
            online: true,
        }
    }

    /// 設定ファイルの `[queue]` セクションを反映
    pub fn with_config(mut self, config: &QueueConfig) -> Self {
        self.storage_key = config.storage_key.clone();
        self.retry_policy = config.retry_policy();
        self.attempt_timeout = config.attempt_timeout();
        self.persist_attempts = config.persist_attempts;
        self.discard_corrupt_state = config.discard_corrupt_state;
        self
    }

    pub fn storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    /// DefaultDecider に渡す retry policy（`decider()` を使う場合は無視される）
    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    pub fn decider(mut self, decider: impl Decider + 'static) -> Self {
        self.decider = Some(Arc::new(decider));
        self
    }

    /// 時刻源を差し替え（ID 生成器を明示しなければ、同じ時刻源で ULID を作る）
    pub fn clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn id_generator(mut self, ids: impl IdGenerator + 'static) -> Self {
        self.ids = Some(Arc::new(ids));
        self
    }

    /// イベントの購読先を追加（何個でも）
    pub fn event_sink(self, sink: impl EventSink + 'static) -> Self {
        self.shared_event_sink(Arc::new(sink))
    }

    pub fn shared_event_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sinks.push(sink);
        self
    }

    pub fn attempt_timeout(mut self, timeout: Duration) -> Self {
        self.attempt_timeout = timeout;
        self
    }

    pub fn persist_attempts(mut self, attempts: u32) -> Self {
        self.persist_attempts = attempts;
        self
    }

    pub fn discard_corrupt_state(mut self, discard: bool) -> Self {
        self.discard_corrupt_state = discard;
        self
    }

    /// 起動時の接続状態（ホスト環境から）
    pub fn initially_online(mut self, online: bool) -> Self {
        self.online = online;
        self
    }

    /// 永続化済みのキューを読み込んで OfflineOrderQueue を構築
    pub fn build(self) -> Result<OfflineOrderQueue, BuildError> {
        if self.storage_key.trim().is_empty() {
            return Err(BuildError::EmptyStorageKey);
        }
        if self.attempt_timeout.is_zero() {
            return Err(BuildError::ZeroAttemptTimeout);
        }

        let entries = load_entries(
            self.store.as_ref(),
            &self.storage_key,
            self.discard_corrupt_state,
        )?;
        tracing::debug!(
            key = %self.storage_key,
            pending = entries.len(),
            "offline queue loaded"
        );

        let ids = self
            .ids
            .unwrap_or_else(|| Arc::new(UlidGenerator::new(Arc::clone(&self.clock))));
        let decider = self
            .decider
            .unwrap_or_else(|| Arc::new(DefaultDecider::new(self.retry_policy)));

        let parts = QueueParts {
            storage_key: self.storage_key,
            store: self.store,
            submitter: self.submitter,
            decider,
            clock: self.clock,
            ids,
            sinks: self.sinks,
            attempt_timeout: self.attempt_timeout,
            persist_attempts: self.persist_attempts,
            online: self.online,
        };
        Ok(OfflineOrderQueue::new(parts, entries))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::InMemoryStore;
    use crate::testing::{ScriptedService, order};

    #[tokio::test]
    async fn defaults_come_from_queue_config() {
        let store = InMemoryStore::new();
        let queue = QueueBuilder::new(store.clone(), ScriptedService::default())
            .build()
            .unwrap();

        assert_eq!(queue.storage_key(), QueueConfig::default().storage_key);
        assert!(queue.is_online());

        queue.enqueue(order("a")).await.unwrap();
        let entries = load_entries(&store, "inventory_offline_orders", false).unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[test]
    fn with_config_overrides_storage_key() {
        let config = QueueConfig {
            storage_key: "other_orders".to_string(),
            ..QueueConfig::default()
        };
        let queue = QueueBuilder::new(InMemoryStore::new(), ScriptedService::default())
            .with_config(&config)
            .build()
            .unwrap();

        assert_eq!(queue.storage_key(), "other_orders");
    }

    #[test]
    fn invalid_settings_fail_fast() {
        let blank_key = QueueBuilder::new(InMemoryStore::new(), ScriptedService::default())
            .storage_key("  ")
            .build();
        assert!(matches!(blank_key, Err(BuildError::EmptyStorageKey)));

        let zero_timeout = QueueBuilder::new(InMemoryStore::new(), ScriptedService::default())
            .attempt_timeout(Duration::ZERO)
            .build();
        assert!(matches!(zero_timeout, Err(BuildError::ZeroAttemptTimeout)));
    }
}
