//! App - アプリケーション層
//!
//! # 主要コンポーネント
//! - **QueueBuilder**: キューの構築とワイヤリング
//! - **QueueStatus / Indicator**: オフラインインジケータの表示モデル

pub mod builder;
pub mod status;

pub use self::builder::{BuildError, QueueBuilder};
pub use self::status::{Indicator, QueueStatus};
