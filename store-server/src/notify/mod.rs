//! 下单通知
//!
//! 提供可插拔的通知出口：
//! ```text
//!       ┌──────────────────────┐
//!       │  NotificationSink    │  ◄── 可插拔接口
//!       └─────────┬────────────┘
//!                 │
//!        ┌────────┴────────┐
//!        ▼                 ▼
//!  WebhookNotifier    LogNotifier
//!  (HTTP POST)        (仅记录日志)
//! ```
//!
//! 通知在订单事务提交之后异步发出，失败只告警不回滚。

mod log;
mod webhook;

pub use log::LogNotifier;
pub use webhook::WebhookNotifier;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use shared::models::{OrderDetail, OrderStatus};

use crate::core::Config;

/// 通知出口特征
#[async_trait]
pub trait NotificationSink: Send + Sync + std::fmt::Debug {
    /// 一笔订单已成功落库
    async fn order_placed(&self, notification: &OrderNotification) -> anyhow::Result<()>;
}

/// 下单通知载荷
///
/// 只带履约需要的摘要字段，完整订单走 GET /api/orders/{id}。
#[derive(Debug, Clone, Serialize)]
pub struct OrderNotification {
    pub order_id: i64,
    pub status: OrderStatus,
    /// 总金额 (分)
    pub total_amount: i64,
    /// 商品件数合计
    pub item_count: i64,
    pub buyer_name: Option<String>,
    pub student_name: Option<String>,
    pub created_at: i64,
}

impl From<&OrderDetail> for OrderNotification {
    fn from(detail: &OrderDetail) -> Self {
        Self {
            order_id: detail.order.id,
            status: detail.order.status,
            total_amount: detail.order.total_amount,
            item_count: detail.items.iter().map(|item| item.quantity).sum(),
            buyer_name: detail.order.buyer_name.clone(),
            student_name: detail.order.student_name.clone(),
            created_at: detail.order.created_at,
        }
    }
}

/// 根据配置选择通知出口
///
/// 配置了 NOTIFY_WEBHOOK_URL 时走 Webhook，否则退回日志输出。
pub fn from_config(config: &Config) -> Arc<dyn NotificationSink> {
    match config.notify_webhook_url {
        Some(ref url) => Arc::new(WebhookNotifier::new(url.clone())),
        None => Arc::new(LogNotifier),
    }
}
