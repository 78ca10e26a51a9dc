//! OrderSubmissionService port - 注文をサーバーに届ける
//!
//! # 実装
//! - **HttpSubmissionService**: `POST /api/confirm-products/`（reqwest）

use async_trait::async_trait;

use crate::domain::{OrderPayload, SubmissionError, SubmissionReceipt};

/// OrderSubmissionService は注文 1 件の配送を試みる
///
/// # 契約
/// - 成功したら `Ok(receipt)`
/// - 失敗の分類（retry / drop）は呼び出し側が `DeliveryOutcome::classify` で行う
#[async_trait]
pub trait OrderSubmissionService: Send + Sync {
    async fn submit(&self, payload: &OrderPayload) -> Result<SubmissionReceipt, SubmissionError>;
}
