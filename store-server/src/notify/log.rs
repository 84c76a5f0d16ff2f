//! 日志通知出口 (未配置 Webhook 时的默认出口)

use async_trait::async_trait;

use super::{NotificationSink, OrderNotification};

#[derive(Debug)]
pub struct LogNotifier;

#[async_trait]
impl NotificationSink for LogNotifier {
    async fn order_placed(&self, notification: &OrderNotification) -> anyhow::Result<()> {
        tracing::info!(
            order_id = notification.order_id,
            total_amount = notification.total_amount,
            item_count = notification.item_count,
            "📦 Order placed"
        );
        Ok(())
    }
}
