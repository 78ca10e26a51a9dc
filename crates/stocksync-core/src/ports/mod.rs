//! Ports - 抽象化レイヤー
//!
//! キューが依存する外部システムへのインターフェース。
//! 実装は `impls` に置き、テストでは差し替える。
//!
//! - 永続化メディア（localStorage 相当）
//! - 注文送信サービス（サーバー API）
//! - イベント通知（UI 層）
//! - 時刻と ID 生成

pub mod clock;
pub mod event_sink;
pub mod id_generator;
pub mod store;
pub mod submission;

pub use self::clock::{Clock, FixedClock, SystemClock};
pub use self::event_sink::EventSink;
pub use self::id_generator::{IdGenerator, UlidGenerator};
pub use self::store::KeyValueStore;
pub use self::submission::OrderSubmissionService;
